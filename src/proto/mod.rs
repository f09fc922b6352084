//! Sans-I/O service discovery endpoint.
//!
//! [`DnsSd`] composes the three protocol components — the [`Responder`]'s
//! authoritative record table, the registry of published services, and any
//! number of [`Browser`]s — behind one sans-I/O surface. The caller is
//! responsible for:
//!
//! 1. **Network I/O**: parsing inbound packets from 224.0.0.251:5353 /
//!    \[ff02::fb\]:5353 and packing outbound ones (the DNS wire codec stays
//!    outside this crate)
//! 2. **Timing**: calling `handle_timeout()` when `poll_timeout()` expires
//! 3. **Event processing**: handling events from `poll_event()`
//!
//! # Publishing
//!
//! ```rust
//! use dnssd::{DnsSd, DnsSdConfig, HostInfo, Outbound, ServiceConfig};
//!
//! let host = HostInfo::new("myhost.local", vec!["192.168.1.5".parse().unwrap()]);
//! let mut endpoint = DnsSd::new(DnsSdConfig::default().with_host_info(host));
//!
//! let service = endpoint
//!     .publish(
//!         ServiceConfig::default()
//!             .with_name("My Web Server")
//!             .with_type("http")
//!             .with_port(8080),
//!     )
//!     .unwrap();
//! assert_eq!(service.fqdn, "My Web Server._http._tcp.local");
//!
//! // The unsolicited announcement is queued for the multicast group.
//! match endpoint.poll_write() {
//!     Some(Outbound::Response(announcement)) => assert_eq!(announcement.answers.len(), 5),
//!     other => panic!("expected announcement, got {other:?}"),
//! }
//! ```
//!
//! # Browsing
//!
//! ```rust
//! use dnssd::{BrowserConfig, DnsSd, DnsSdConfig, HostInfo, Outbound};
//!
//! let mut endpoint = DnsSd::new(DnsSdConfig::default().with_host_info(HostInfo::new("h", vec![])));
//! let browser_id = endpoint.find(BrowserConfig::default().with_type("http"));
//!
//! // The initial PTR query is queued; send it, then feed every inbound
//! // response packet to `handle_read()` and poll `ServiceUp`/`ServiceDown`
//! // events carrying `browser_id`.
//! match endpoint.poll_write() {
//!     Some(Outbound::Query(query)) => assert_eq!(query.name, "_http._tcp.local"),
//!     other => panic!("expected query, got {other:?}"),
//! }
//! ```

pub(crate) mod browser;
pub(crate) mod registry;
pub(crate) mod responder;

use std::collections::VecDeque;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::{Duration, Instant};

use crate::config::DnsSdConfig;
use crate::error::{Error, Result};
use crate::hostinfo::HostInfo;
use crate::message::{Packet, Question, Record};
use crate::service::{ServiceConfig, ServiceInfo};

pub use browser::{Browser, BrowserConfig, BrowserEvent, TypeSelector};
pub use responder::Responder;

use registry::Registry;

/// The mDNS IPv4 multicast group address (224.0.0.251).
pub const MDNS_MULTICAST_IPV4: Ipv4Addr = Ipv4Addr::new(224, 0, 0, 251);

/// The mDNS IPv6 multicast group address (ff02::fb).
pub const MDNS_MULTICAST_IPV6: Ipv6Addr = Ipv6Addr::new(0xff02, 0, 0, 0, 0, 0, 0, 0xfb);

/// The standard mDNS port (5353).
pub const MDNS_PORT: u16 = 5353;

/// mDNS multicast destination address (224.0.0.251:5353).
///
/// All outbound packets produced by [`DnsSd::poll_write`] are destined for
/// this group (or its IPv6 sibling).
///
/// # Example
///
/// ```rust
/// use dnssd::MDNS_DEST_ADDR;
///
/// assert_eq!(MDNS_DEST_ADDR.to_string(), "224.0.0.251:5353");
/// ```
pub const MDNS_DEST_ADDR: SocketAddr = SocketAddr::new(IpAddr::V4(MDNS_MULTICAST_IPV4), MDNS_PORT);

/// Unique identifier for tracking browsers created on one endpoint.
///
/// Each call to [`DnsSd::find`] or [`DnsSd::find_one`] returns a unique ID
/// that tags every [`DnsSdEvent`] the browser emits and can be used with
/// [`DnsSd::stop_browser`], [`DnsSd::update_browser`] and
/// [`DnsSd::browser_services`].
pub type BrowserId = u64;

/// An outbound response: answers plus additionals, to be multicast as one
/// packet.
#[derive(Debug, Clone, Default)]
pub struct Response {
    pub answers: Vec<Record>,
    pub additionals: Vec<Record>,
}

impl Response {
    /// View this response as a parsed packet, e.g. to loop it back into
    /// another endpoint in tests or demos.
    pub fn into_packet(self) -> Packet {
        Packet::response(self.answers, self.additionals)
    }
}

/// One outbound packet, already parsed; the caller packs and multicasts it.
#[derive(Debug, Clone)]
pub enum Outbound {
    /// A one-question query.
    Query(Question),
    /// A response (solicited answer, announcement or goodbye).
    Response(Response),
}

impl Outbound {
    /// View this outbound packet as a parsed inbound packet.
    pub fn into_packet(self) -> Packet {
        match self {
            Outbound::Query(question) => Packet::query(vec![question]),
            Outbound::Response(response) => response.into_packet(),
        }
    }
}

/// Events emitted by the endpoint.
///
/// Poll for events after calling [`DnsSd::handle_read`].
#[derive(Debug, Clone, PartialEq)]
pub enum DnsSdEvent {
    /// A browser saw a service come up, or gain a subtype (in which case the
    /// descriptor is re-emitted with the subtype appended).
    ServiceUp(BrowserId, ServiceInfo),
    /// A browser saw a goodbye for a service it was tracking.
    ServiceDown(BrowserId, ServiceInfo),
}

struct BrowserSlot {
    id: BrowserId,
    browser: Browser,
    /// `find_one` browsers stop after their first `ServiceUp`.
    once: bool,
}

/// Sans-I/O mDNS service discovery endpoint.
///
/// One `DnsSd` owns the responder and registry for local advertisements and
/// any number of browsers for remote discovery. All state mutation happens on
/// the caller's thread inside `handle_read`/`handle_timeout` and the publish
/// and browse methods, which is the single-consumer serialization the
/// protocol state requires; wrap the endpoint in a mutex or actor if packets
/// arrive from multiple threads.
pub struct DnsSd {
    host_info: HostInfo,
    refresh_interval: Option<Duration>,
    responder: Responder,
    registry: Registry,
    browsers: Vec<BrowserSlot>,
    next_browser_id: BrowserId,
    write_outs: VecDeque<Outbound>,
    event_outs: VecDeque<DnsSdEvent>,
    next_refresh: Option<Instant>,
    closed: bool,
}

impl DnsSd {
    /// Create a new endpoint with the given configuration.
    ///
    /// Detects the system hostname and interfaces unless
    /// [`DnsSdConfig::with_host_info`] supplied fixed values.
    pub fn new(config: DnsSdConfig) -> Self {
        let host_info = config.host_info.unwrap_or_else(HostInfo::detect);
        Self {
            host_info,
            refresh_interval: config.refresh_interval,
            responder: Responder::new(),
            registry: Registry::default(),
            browsers: Vec::new(),
            next_browser_id: 1,
            write_outs: VecDeque::new(),
            event_outs: VecDeque::new(),
            next_refresh: None,
            closed: false,
        }
    }

    /// The host information published services advertise by default.
    pub fn host_info(&self) -> &HostInfo {
        &self.host_info
    }

    /// Publish a service.
    ///
    /// Registers the service's record set in the responder, then queues the
    /// unsolicited announcement — in that order, so a query arriving between
    /// the two cannot observe a partial record set.
    ///
    /// # Errors
    ///
    /// [`Error::ErrMissingField`] / [`Error::ErrInvalidPortNumber`] from
    /// descriptor validation, [`Error::ErrConnectionClosed`] after `close()`.
    pub fn publish(&mut self, config: ServiceConfig) -> Result<ServiceInfo> {
        if self.closed {
            return Err(Error::ErrConnectionClosed);
        }
        let (service, announcement) =
            self.registry
                .publish(&mut self.responder, &self.host_info, config)?;
        self.write_outs.push_back(Outbound::Response(announcement));
        Ok(service)
    }

    /// Tear down every published service.
    ///
    /// Queues one goodbye response (every shared PTR with TTL zero) and
    /// removes the records from the responder. The goodbye is "sent" once the
    /// caller has drained it from [`poll_write`](Self::poll_write).
    pub fn unpublish_all(&mut self) {
        if let Some(goodbye) = self.registry.unpublish_all(&mut self.responder) {
            self.write_outs.push_back(Outbound::Response(goodbye));
        }
    }

    /// Services currently published on this endpoint.
    pub fn published_services(&self) -> &[ServiceInfo] {
        self.registry.services()
    }

    /// Direct access to the authoritative record table.
    pub fn responder(&self) -> &Responder {
        &self.responder
    }

    /// Start browsing. Queues the initial PTR query for every name the
    /// configuration produces and returns the browser's ID.
    pub fn find(&mut self, config: BrowserConfig) -> BrowserId {
        self.add_browser(config, false)
    }

    /// Start browsing for a single service: the browser stops itself after
    /// its first [`DnsSdEvent::ServiceUp`].
    pub fn find_one(&mut self, config: BrowserConfig) -> BrowserId {
        self.add_browser(config, true)
    }

    fn add_browser(&mut self, config: BrowserConfig, once: bool) -> BrowserId {
        let id = self.next_browser_id;
        self.next_browser_id += 1;

        let mut browser = Browser::new(config);
        browser.start();

        let mut slot = BrowserSlot { id, browser, once };
        drain_slot(&mut slot, &mut self.write_outs, &mut self.event_outs);
        self.browsers.push(slot);

        if let Some(interval) = self.refresh_interval {
            if self.next_refresh.is_none() {
                self.next_refresh = Some(Instant::now() + interval);
            }
        }

        id
    }

    /// Stop a browser. Its discovered services are retained and no further
    /// events are emitted. Unknown IDs are a no-op.
    pub fn stop_browser(&mut self, id: BrowserId) {
        if let Some(slot) = self.browsers.iter_mut().find(|slot| slot.id == id) {
            slot.browser.stop();
        }
    }

    /// Re-issue a browser's PTR queries immediately.
    pub fn update_browser(&mut self, id: BrowserId) {
        if let Some(slot) = self.browsers.iter_mut().find(|slot| slot.id == id) {
            slot.browser.update();
            drain_slot(slot, &mut self.write_outs, &mut self.event_outs);
        }
    }

    /// The services a browser currently tracks, in arrival order.
    pub fn browser_services(&self, id: BrowserId) -> Option<&[ServiceInfo]> {
        self.browsers
            .iter()
            .find(|slot| slot.id == id)
            .map(|slot| slot.browser.services())
    }

    /// Process one inbound parsed packet from source `src`.
    ///
    /// Questions are answered from the responder's record table; answers are
    /// fed to every started browser. Both sections of one packet are
    /// processed, questions first.
    ///
    /// # Errors
    ///
    /// [`Error::ErrConnectionClosed`] after `close()`.
    pub fn handle_read(&mut self, packet: Packet, src: SocketAddr) -> Result<()> {
        if self.closed {
            return Err(Error::ErrConnectionClosed);
        }

        if !packet.questions.is_empty() {
            for response in self.responder.handle_query(&packet) {
                self.write_outs.push_back(Outbound::Response(response));
            }
        }

        if !packet.answers.is_empty() || !packet.additionals.is_empty() {
            for slot in &mut self.browsers {
                if !slot.browser.is_started() {
                    continue;
                }
                slot.browser.handle_response(&packet, src);
                drain_slot(slot, &mut self.write_outs, &mut self.event_outs);
            }
        }

        Ok(())
    }

    /// Get the next packet to multicast, or `None` if the queue is empty.
    ///
    /// Call repeatedly until `None` after every operation that queues
    /// traffic (publish, find, handle_read, handle_timeout, close).
    pub fn poll_write(&mut self) -> Option<Outbound> {
        self.write_outs.pop_front()
    }

    /// Get the next event, or `None` if the queue is empty.
    pub fn poll_event(&mut self) -> Option<DnsSdEvent> {
        self.event_outs.pop_front()
    }

    /// The deadline at which [`handle_timeout`](Self::handle_timeout) should
    /// be called, or `None` when no refresh is scheduled.
    pub fn poll_timeout(&mut self) -> Option<Instant> {
        self.next_refresh
    }

    /// Handle timeout: re-issue every started browser's PTR queries when the
    /// refresh deadline has passed, and schedule the next one.
    ///
    /// # Errors
    ///
    /// [`Error::ErrConnectionClosed`] after `close()`.
    pub fn handle_timeout(&mut self, now: Instant) -> Result<()> {
        if self.closed {
            return Err(Error::ErrConnectionClosed);
        }

        let due = matches!(self.next_refresh, Some(deadline) if deadline <= now);
        if !due {
            return Ok(());
        }

        let mut any_started = false;
        for slot in &mut self.browsers {
            if !slot.browser.is_started() {
                continue;
            }
            any_started = true;
            slot.browser.update();
            drain_slot(slot, &mut self.write_outs, &mut self.event_outs);
        }

        self.next_refresh = match (any_started, self.refresh_interval) {
            (true, Some(interval)) => Some(now + interval),
            _ => None,
        };
        Ok(())
    }

    /// Shut the endpoint down.
    ///
    /// Queues the goodbye for every published service, stops all browsers
    /// and drops pending events. Drain [`poll_write`](Self::poll_write) one
    /// last time to get the goodbye on the wire; afterwards `handle_read`
    /// and `handle_timeout` return [`Error::ErrConnectionClosed`].
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.unpublish_all();
        for slot in &mut self.browsers {
            slot.browser.stop();
        }
        self.event_outs.clear();
        self.next_refresh = None;
        self.closed = true;
        Ok(())
    }
}

// Forward a browser's queued queries and events into the endpoint queues.
// A `find_one` browser is stopped at its first up and its remaining events
// are dropped.
fn drain_slot(
    slot: &mut BrowserSlot,
    write_outs: &mut VecDeque<Outbound>,
    event_outs: &mut VecDeque<DnsSdEvent>,
) {
    while let Some(question) = slot.browser.poll_query() {
        write_outs.push_back(Outbound::Query(question));
    }

    while let Some(event) = slot.browser.poll_event() {
        match event {
            BrowserEvent::Up(service) => {
                event_outs.push_back(DnsSdEvent::ServiceUp(slot.id, service));
                if slot.once {
                    slot.browser.stop();
                    while slot.browser.poll_event().is_some() {}
                    break;
                }
            }
            BrowserEvent::Down(service) => {
                event_outs.push_back(DnsSdEvent::ServiceDown(slot.id, service));
            }
        }
    }
}

#[cfg(test)]
mod browser_test;
