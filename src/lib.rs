//! # dnssd
//!
//! A sans-I/O implementation of mDNS service discovery (DNS-SD, RFC
//! 6762/6763) for Rust.
//!
//! This crate provides the discovery layer used for zero-configuration
//! network services (printers, media players, file shares): a host can
//! **advertise** local services so peers on the same link find them, and
//! **browse** for services advertised by peers.
//!
//! ## What it does
//!
//! A single published "service" fans out into a coordinated set of four to
//! six DNS resource records — PTR records for enumeration, type and subtype
//! pointers, an SRV record for the port and host, a TXT record for metadata,
//! and A/AAAA records for addresses. [`DnsSd`] maintains both directions of
//! that mapping against a live multicast stream:
//!
//! - The **responder** holds the authoritative record table for local
//!   advertisements and answers incoming queries from it, filling the
//!   additionals section along the PTR → SRV/TXT → A/AAAA chain.
//! - The **registry** publishes and tears down services: unsolicited
//!   announcements on publish, goodbye packets (TTL 0) on unpublish.
//! - **Browsers** issue PTR queries, correlate the partial and overlapping
//!   record sets of every inbound response into reconstructed
//!   [`ServiceInfo`] descriptors, and emit `up`/`down` transitions —
//!   including subtype tracking, goodbye handling and wildcard service-type
//!   enumeration via `_services._dns-sd._udp.local`.
//!
//! ## Sans-I/O design
//!
//! The crate follows the [sans-I/O](https://sans-io.readthedocs.io/)
//! pattern:
//!
//! - **No runtime dependency**: works with tokio, async-std, smol, or
//!   blocking I/O
//! - **No codec dependency**: the engine consumes and produces *parsed*
//!   packets; the DNS wire format stays in the caller's codec
//! - **Testable**: protocol logic runs without any network
//! - **Predictable**: no hidden threads, timers, or background tasks
//!
//! The caller is responsible for:
//! 1. Parsing packets from the network and calling [`DnsSd::handle_read`]
//! 2. Packing and multicasting packets returned by [`DnsSd::poll_write`]
//! 3. Calling [`DnsSd::handle_timeout`] when [`DnsSd::poll_timeout`] expires
//! 4. Processing events from [`DnsSd::poll_event`]
//!
//! ## Quick start: advertise
//!
//! ```rust
//! use dnssd::{DnsSd, DnsSdConfig, HostInfo, ServiceConfig};
//!
//! let host = HostInfo::new("myhost.local", vec!["192.168.1.5".parse().unwrap()]);
//! let mut endpoint = DnsSd::new(DnsSdConfig::default().with_host_info(host));
//!
//! let service = endpoint
//!     .publish(
//!         ServiceConfig::default()
//!             .with_name("Foo Bar")
//!             .with_type("http")
//!             .with_port(3000),
//!     )
//!     .unwrap();
//! assert_eq!(service.fqdn, "Foo Bar._http._tcp.local");
//!
//! // Drain the queued announcement and multicast it (via your codec).
//! while let Some(packet) = endpoint.poll_write() {
//!     // pack and send to dnssd::MDNS_DEST_ADDR
//!     drop(packet);
//! }
//! ```
//!
//! ## Quick start: browse
//!
//! ```rust
//! use dnssd::{BrowserConfig, DnsSd, DnsSdConfig, DnsSdEvent, HostInfo};
//!
//! let mut endpoint = DnsSd::new(DnsSdConfig::default().with_host_info(HostInfo::new("h", vec![])));
//! let browser_id = endpoint.find(BrowserConfig::default().with_type("http"));
//!
//! // ... send queued queries, feed inbound responses to handle_read() ...
//!
//! while let Some(event) = endpoint.poll_event() {
//!     match event {
//!         DnsSdEvent::ServiceUp(id, service) => {
//!             assert_eq!(id, browser_id);
//!             println!("up: {} on port {}", service.fqdn, service.port);
//!         }
//!         DnsSdEvent::ServiceDown(_, service) => {
//!             println!("down: {}", service.fqdn);
//!         }
//!     }
//! }
//! ```
//!
//! ## Event loop pattern
//!
//! ```text
//! loop {
//!     // 1. Pack and send any queued packets
//!     while let Some(outbound) = endpoint.poll_write() {
//!         socket.send_to(&codec.pack(outbound), MDNS_DEST_ADDR);
//!     }
//!
//!     // 2. Wait for network activity or the refresh deadline
//!     select! {
//!         (packet, src) = socket.recv_from() => {
//!             endpoint.handle_read(codec.parse(packet), src);
//!         }
//!         _ = sleep_until(endpoint.poll_timeout()) => {
//!             endpoint.handle_timeout(Instant::now());
//!         }
//!     }
//!
//!     // 3. Process events
//!     while let Some(event) = endpoint.poll_event() {
//!         // ServiceUp / ServiceDown
//!     }
//! }
//! ```
//!
//! ## Protocol details
//!
//! - **Multicast address**: 224.0.0.251:5353 (IPv4), \[ff02::fb\]:5353 (IPv6)
//! - **Record types**: PTR, SRV, TXT, A, AAAA (and ANY queries)
//! - **TTLs**: 28800s for shared PTRs, 120s for SRV and addresses, 4500s for
//!   TXT; TTL 0 announces a goodbye
//! - **Not implemented**: RFC 6762 §8.1 probing and conflict resolution,
//!   known-answer suppression, the unicast-response bit

#![warn(rust_2018_idioms)]
#![allow(dead_code)]

pub(crate) mod config;
pub(crate) mod error;
pub(crate) mod hostinfo;
pub(crate) mod message;
pub(crate) mod proto;
pub(crate) mod service;
pub(crate) mod socket;

pub use config::{DnsSdConfig, TLD, WILDCARD};
pub use error::{Error, Result};
pub use hostinfo::HostInfo;
pub use message::{DnsType, Packet, Question, Record, RecordData, SrvData, dns_equal, txt};
pub use proto::{
    Browser, BrowserConfig, BrowserEvent, BrowserId, DnsSd, DnsSdEvent, MDNS_DEST_ADDR,
    MDNS_MULTICAST_IPV4, MDNS_MULTICAST_IPV6, MDNS_PORT, Outbound, Responder, Response,
    TypeSelector,
};
pub use service::{Protocol, ServiceConfig, ServiceInfo, type_string};
pub use socket::MulticastSocket;
