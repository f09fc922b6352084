//! The browser state machine.
//!
//! A browser issues PTR queries for a set of names and reconstructs service
//! descriptors from the multicast responses it is fed. Concurrent senders
//! produce partial, overlapping views; the browser correlates the PTR / SRV /
//! TXT / A / AAAA records of each packet into candidates and reconciles them
//! against its live service list, emitting [`BrowserEvent::Up`] and
//! [`BrowserEvent::Down`] transitions.
//!
//! Browsers are sans-I/O: feed responses with [`Browser::handle_response`],
//! drain outbound queries with [`Browser::poll_query`] and state transitions
//! with [`Browser::poll_event`]. [`DnsSd`](crate::DnsSd) does this wiring for
//! you; standalone use looks like:
//!
//! ```rust
//! use dnssd::{Browser, BrowserConfig, DnsType};
//!
//! let mut browser = Browser::new(BrowserConfig::default().with_type("http"));
//! browser.start();
//!
//! let query = browser.poll_query().unwrap();
//! assert_eq!(query.name, "_http._tcp.local");
//! assert_eq!(query.typ, DnsType::Ptr);
//! ```

use std::collections::{HashSet, VecDeque};
use std::net::SocketAddr;

use crate::config::{TLD, WILDCARD};
use crate::message::{
    DnsType, Packet, Question, Record, RecordData, dns_equal, first_label, label_count, trim_dot,
    txt,
};
use crate::service::{Protocol, ServiceInfo, type_string};

/// One service type to browse for, optionally narrowed to subtypes.
///
/// A selector without subtypes produces one PTR query name
/// (`_<type>._<protocol>.local`); with subtypes it produces one per subtype
/// (`_<subtype>._sub._<type>._<protocol>.local`).
#[derive(Clone, Debug)]
pub struct TypeSelector {
    pub type_name: String,
    pub protocol: Protocol,
    pub subtypes: Vec<String>,
}

impl TypeSelector {
    pub fn new(type_name: impl Into<String>, protocol: Protocol) -> Self {
        Self {
            type_name: type_name.into(),
            protocol,
            subtypes: Vec::new(),
        }
    }

    pub fn with_subtypes(mut self, subtypes: Vec<String>) -> Self {
        self.subtypes = subtypes;
        self
    }

    fn query_names(&self) -> Vec<String> {
        let type_domain = format!("{}{}", type_string(&self.type_name, self.protocol), TLD);
        if self.subtypes.is_empty() {
            vec![type_domain]
        } else {
            self.subtypes
                .iter()
                .map(|subtype| format!("_{subtype}._sub.{type_domain}"))
                .collect()
        }
    }
}

/// Configuration for a [`Browser`].
///
/// Without any type the browser runs in wildcard mode: it queries the
/// service-type enumeration name and starts tracking every type it learns
/// about.
///
/// ```rust
/// use dnssd::BrowserConfig;
///
/// // Browse one type:
/// let http = BrowserConfig::default().with_type("http");
///
/// // Browse everything on the link:
/// let wildcard = BrowserConfig::default();
/// ```
#[derive(Clone, Debug, Default)]
pub struct BrowserConfig {
    /// Explicit list of selectors. Takes precedence over `type_name`.
    pub types: Vec<TypeSelector>,
    /// Single service type shorthand.
    pub type_name: Option<String>,
    /// Transport protocol for `type_name`. Default: TCP.
    pub protocol: Protocol,
    /// Subtypes for `type_name`.
    pub subtypes: Vec<String>,
}

impl BrowserConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_types(mut self, types: Vec<TypeSelector>) -> Self {
        self.types = types;
        self
    }

    pub fn with_type(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    pub fn with_protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = protocol;
        self
    }

    pub fn with_subtypes(mut self, subtypes: Vec<String>) -> Self {
        self.subtypes = subtypes;
        self
    }

    fn query_names(&self) -> (Vec<String>, bool) {
        if !self.types.is_empty() {
            let names = self
                .types
                .iter()
                .flat_map(TypeSelector::query_names)
                .collect();
            return (names, false);
        }
        if let Some(type_name) = &self.type_name {
            let selector = TypeSelector::new(type_name.clone(), self.protocol)
                .with_subtypes(self.subtypes.clone());
            return (selector.query_names(), false);
        }
        (vec![WILDCARD.to_string()], true)
    }
}

/// State transition of one remote service.
#[derive(Debug, Clone, PartialEq)]
pub enum BrowserEvent {
    /// A service went up, or gained a subtype (the descriptor is re-emitted
    /// with the subtype appended).
    Up(ServiceInfo),
    /// A goodbye arrived for the service.
    Down(ServiceInfo),
}

/// Tracks remote services of one or more service types over time.
pub struct Browser {
    /// PTR query names. Fixed in non-wildcard mode; grows at runtime in
    /// wildcard mode as new types are discovered.
    names: Vec<String>,
    wildcard: bool,
    /// Membership set of `names`, lowercased. Grow-only: a wildcard browser
    /// accumulates one entry per distinct type observed for its lifetime.
    name_map: HashSet<String>,
    services: Vec<ServiceInfo>,
    /// Lowercased fqdns of `services`; an fqdn is here iff its descriptor is
    /// in `services`.
    service_map: HashSet<String>,
    started: bool,
    query_outs: VecDeque<Question>,
    event_outs: VecDeque<BrowserEvent>,
}

impl Browser {
    pub fn new(config: BrowserConfig) -> Self {
        let (names, wildcard) = config.query_names();
        let name_map = if wildcard {
            HashSet::new()
        } else {
            names.iter().map(|name| lower_key(name)).collect()
        };

        Self {
            names,
            wildcard,
            name_map,
            services: Vec::new(),
            service_map: HashSet::new(),
            started: false,
            query_outs: VecDeque::new(),
            event_outs: VecDeque::new(),
        }
    }

    /// Queue the initial PTR query for every name. No-op if already started.
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        for name in self.names.clone() {
            self.queue_query(&name);
        }
    }

    /// Re-issue the PTR queries for all names.
    pub fn update(&mut self) {
        for name in self.names.clone() {
            self.queue_query(&name);
        }
    }

    /// Stop consuming responses. Discovered services are retained and no
    /// events are emitted for them. Idempotent.
    pub fn stop(&mut self) {
        self.started = false;
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Services currently up, in arrival order.
    pub fn services(&self) -> &[ServiceInfo] {
        &self.services
    }

    /// The PTR query names this browser tracks.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Next outbound PTR query, if any.
    pub fn poll_query(&mut self) -> Option<Question> {
        self.query_outs.pop_front()
    }

    /// Next service transition, if any.
    pub fn poll_event(&mut self) -> Option<BrowserEvent> {
        self.event_outs.pop_front()
    }

    /// Consume one inbound response packet from source `src`.
    ///
    /// Within a packet goodbyes are processed before additions, so a service
    /// that says goodbye and re-announces in the same packet goes down and
    /// comes back up, in that order.
    pub fn handle_response(&mut self, packet: &Packet, src: SocketAddr) {
        if !self.started {
            return;
        }

        if self.wildcard {
            self.discover_types(packet);
        }

        let names = self.names.clone();
        for name in &names {
            self.process_goodbyes(packet, name);
            self.process_additions(packet, name, src);
        }
    }

    // In wildcard mode, every enumeration PTR answer for an untracked type
    // starts tracking it and queries it. The set never shrinks.
    fn discover_types(&mut self, packet: &Packet) {
        for answer in &packet.answers {
            let RecordData::Ptr(type_domain) = &answer.data else {
                continue;
            };
            if !dns_equal(&answer.name, WILDCARD) {
                continue;
            }
            let key = lower_key(type_domain);
            if self.name_map.contains(&key) {
                continue;
            }
            log::debug!("Wildcard browser discovered type {type_domain}");
            self.name_map.insert(key);
            self.names.push(type_domain.clone());
            self.queue_query(type_domain);
        }
    }

    fn process_goodbyes(&mut self, packet: &Packet, name: &str) {
        let goodbyes: Vec<String> = packet
            .answers
            .iter()
            .chain(packet.additionals.iter())
            .filter(|record| record.ttl == 0 && dns_equal(&record.name, name))
            .filter_map(|record| match &record.data {
                RecordData::Ptr(fqdn) => Some(fqdn.clone()),
                _ => None,
            })
            .collect();

        for fqdn in goodbyes {
            self.remove_service(&fqdn);
        }
    }

    fn process_additions(&mut self, packet: &Packet, name: &str, src: SocketAddr) {
        let live: Vec<&Record> = packet
            .answers
            .iter()
            .chain(packet.additionals.iter())
            .filter(|record| record.ttl > 0)
            .collect();

        let candidates: Vec<ServiceInfo> = live
            .iter()
            .copied()
            .filter(|record| {
                matches!(record.data, RecordData::Ptr(_)) && dns_equal(&record.name, name)
            })
            .filter_map(|ptr| build_candidate(&live, ptr, src))
            .collect();

        for candidate in candidates {
            self.merge(candidate);
        }
    }

    fn merge(&mut self, candidate: ServiceInfo) {
        let key = lower_key(&candidate.fqdn);
        if !self.service_map.contains(&key) {
            log::debug!("Service up: {candidate}");
            self.service_map.insert(key);
            self.services.push(candidate.clone());
            self.event_outs.push_back(BrowserEvent::Up(candidate));
            return;
        }

        // Known fqdn: the only observable change is a subtype addition,
        // which re-emits the (mutated) existing descriptor on the up channel.
        let Some(subtype) = candidate.subtypes.first() else {
            return;
        };
        let Some(existing) = self
            .services
            .iter_mut()
            .find(|service| dns_equal(&service.fqdn, &candidate.fqdn))
        else {
            return;
        };
        if existing.subtypes.contains(subtype) {
            return;
        }
        existing.subtypes.push(subtype.clone());
        let snapshot = existing.clone();
        log::debug!("Service {snapshot} gained subtype {subtype}");
        self.event_outs.push_back(BrowserEvent::Up(snapshot));
    }

    fn remove_service(&mut self, fqdn: &str) {
        let Some(index) = self
            .services
            .iter()
            .position(|service| dns_equal(&service.fqdn, fqdn))
        else {
            return;
        };
        let service = self.services.remove(index);
        self.service_map.remove(&lower_key(&service.fqdn));
        log::debug!("Service down: {service}");
        self.event_outs.push_back(BrowserEvent::Down(service));
    }

    fn queue_query(&mut self, name: &str) {
        log::trace!("Queuing PTR query for {name}");
        self.query_outs
            .push_back(Question::new(name, DnsType::Ptr));
    }
}

fn lower_key(name: &str) -> String {
    trim_dot(name).to_ascii_lowercase()
}

// Reconstruct one candidate descriptor from the live records of a packet,
// anchored at a PTR answer. A candidate needs its SRV and TXT records in the
// same packet; without both it is discarded.
fn build_candidate(live: &[&Record], ptr: &Record, src: SocketAddr) -> Option<ServiceInfo> {
    let RecordData::Ptr(instance) = &ptr.data else {
        return None;
    };

    let srv = live
        .iter()
        .find(|record| matches!(record.data, RecordData::Srv(_)) && dns_equal(&record.name, instance))?;
    let RecordData::Srv(srv_data) = &srv.data else {
        return None;
    };

    let fqdn = trim_dot(&srv.name).to_string();
    let labels: Vec<&str> = fqdn.split('.').collect();
    // <instance>.<_type>.<_protocol>.local at minimum.
    if labels.len() < 4 {
        log::debug!("Ignoring SRV with malformed name {fqdn}");
        return None;
    }
    let middle = &labels[1..labels.len() - 1];
    let name = labels[0].to_string();
    let type_name = middle[0].trim_start_matches('_').to_string();
    let protocol = Protocol::from_label(middle[1]);

    // A PTR name longer than <_type>.<_protocol>.local carries the subtype
    // as its first label.
    let mut subtypes = Vec::new();
    if label_count(&ptr.name) > 3 {
        subtypes.push(first_label(&ptr.name).trim_start_matches('_').to_string());
    }

    let txt_record = live
        .iter()
        .find(|record| matches!(record.data, RecordData::Txt(_)) && dns_equal(&record.name, &fqdn))?;
    let RecordData::Txt(txt_raw) = &txt_record.data else {
        return None;
    };

    let addresses = live
        .iter()
        .filter(|record| dns_equal(&record.name, &srv_data.target))
        .filter_map(|record| match &record.data {
            RecordData::A(ip) => Some(std::net::IpAddr::V4(*ip)),
            RecordData::Aaaa(ip) => Some(std::net::IpAddr::V6(*ip)),
            _ => None,
        })
        .collect();

    Some(ServiceInfo {
        name,
        type_name,
        protocol,
        host: srv_data.target.clone(),
        port: srv_data.port,
        subtypes,
        txt: Some(txt::decode(txt_raw)),
        txt_raw: Some(txt_raw.clone()),
        addresses,
        flush: false,
        fqdn,
        published: false,
        referer: Some(src),
    })
}
