use super::*;
use crate::config::WILDCARD;
use crate::message::{DnsType, Record, RecordData, SrvData};
use crate::service::Protocol;

use bytes::Bytes;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

fn src() -> SocketAddr {
    SocketAddr::new(IpAddr::V4(Ipv4Addr::new(192, 168, 1, 50)), 5353)
}

fn ptr(name: &str, target: &str, ttl: u32) -> Record {
    Record::new(name, ttl, false, RecordData::Ptr(target.to_string()))
}

fn srv(name: &str, target: &str, port: u16) -> Record {
    Record::new(
        name,
        120,
        false,
        RecordData::Srv(SrvData {
            priority: 0,
            weight: 0,
            port,
            target: target.to_string(),
        }),
    )
}

fn txt(name: &str, data: &'static [u8]) -> Record {
    Record::new(name, 4500, false, RecordData::Txt(Bytes::from_static(data)))
}

fn a(name: &str, ip: [u8; 4]) -> Record {
    Record::new(name, 120, false, RecordData::A(Ipv4Addr::from(ip)))
}

// PTR + SRV + TXT + A for instance X of _http._tcp.
fn full_trio() -> Packet {
    Packet::response(
        vec![
            ptr("_http._tcp.local", "X._http._tcp.local", 120),
            srv("X._http._tcp.local", "host.local", 3000),
            txt("X._http._tcp.local", &[0]),
            a("host.local", [10, 0, 0, 1]),
        ],
        vec![],
    )
}

fn http_browser() -> Browser {
    let mut browser = Browser::new(BrowserConfig::default().with_type("http"));
    browser.start();
    while browser.poll_query().is_some() {}
    browser
}

#[test]
fn test_initial_query() {
    let mut browser = Browser::new(BrowserConfig::default().with_type("http"));
    browser.start();

    let query = browser.poll_query().unwrap();
    assert_eq!(query.name, "_http._tcp.local");
    assert_eq!(query.typ, DnsType::Ptr);
    assert!(browser.poll_query().is_none());

    // start() is a no-op when already started.
    browser.start();
    assert!(browser.poll_query().is_none());
}

#[test]
fn test_up_from_ptr_srv_txt() {
    let mut browser = http_browser();
    browser.handle_response(&full_trio(), src());

    let event = browser.poll_event().unwrap();
    let BrowserEvent::Up(service) = event else {
        panic!("expected Up, got {event:?}");
    };
    assert_eq!(service.name, "X");
    assert_eq!(service.type_name, "http");
    assert_eq!(service.protocol, Protocol::Tcp);
    assert_eq!(service.fqdn, "X._http._tcp.local");
    assert_eq!(service.host, "host.local");
    assert_eq!(service.port, 3000);
    assert_eq!(
        service.addresses,
        vec![IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1))]
    );
    assert!(service.subtypes.is_empty());
    assert_eq!(service.referer, Some(src()));

    assert!(browser.poll_event().is_none());
    assert_eq!(browser.services().len(), 1);
}

#[test]
fn test_missing_srv_yields_no_candidate() {
    let mut browser = http_browser();
    let packet = Packet::response(
        vec![
            ptr("_http._tcp.local", "X._http._tcp.local", 120),
            txt("X._http._tcp.local", &[0]),
        ],
        vec![],
    );
    browser.handle_response(&packet, src());
    assert!(browser.poll_event().is_none());
    assert!(browser.services().is_empty());
}

#[test]
fn test_missing_txt_yields_no_candidate() {
    let mut browser = http_browser();
    let packet = Packet::response(
        vec![
            ptr("_http._tcp.local", "X._http._tcp.local", 120),
            srv("X._http._tcp.local", "host.local", 3000),
        ],
        vec![],
    );
    browser.handle_response(&packet, src());
    assert!(browser.poll_event().is_none());
}

#[test]
fn test_records_in_additionals_section_count() {
    // Correlation works across both sections of a packet.
    let mut browser = http_browser();
    let packet = Packet::response(
        vec![ptr("_http._tcp.local", "X._http._tcp.local", 120)],
        vec![
            srv("X._http._tcp.local", "host.local", 3000),
            txt("X._http._tcp.local", &[0]),
            a("host.local", [10, 0, 0, 1]),
        ],
    );
    browser.handle_response(&packet, src());
    assert!(matches!(browser.poll_event(), Some(BrowserEvent::Up(_))));
}

#[test]
fn test_duplicate_announcement_emits_one_up() {
    let mut browser = http_browser();
    browser.handle_response(&full_trio(), src());
    browser.handle_response(&full_trio(), src());

    assert!(matches!(browser.poll_event(), Some(BrowserEvent::Up(_))));
    assert!(browser.poll_event().is_none());
    assert_eq!(browser.services().len(), 1);
}

#[test]
fn test_goodbye_emits_down() {
    let mut browser = http_browser();
    browser.handle_response(&full_trio(), src());
    assert!(matches!(browser.poll_event(), Some(BrowserEvent::Up(_))));

    let goodbye = Packet::response(
        vec![ptr("_http._tcp.local", "X._http._tcp.local", 0)],
        vec![],
    );
    browser.handle_response(&goodbye, src());

    let event = browser.poll_event().unwrap();
    let BrowserEvent::Down(service) = event else {
        panic!("expected Down, got {event:?}");
    };
    assert_eq!(service.fqdn, "X._http._tcp.local");
    assert!(browser.services().is_empty());

    // A goodbye for an unknown service is a no-op.
    browser.handle_response(&goodbye, src());
    assert!(browser.poll_event().is_none());
}

#[test]
fn test_goodbye_processed_before_addition_in_same_packet() {
    let mut browser = http_browser();
    browser.handle_response(&full_trio(), src());
    assert!(matches!(browser.poll_event(), Some(BrowserEvent::Up(_))));

    // One packet: the service says goodbye and immediately re-announces.
    let mut packet = full_trio();
    packet
        .answers
        .insert(0, ptr("_http._tcp.local", "X._http._tcp.local", 0));
    browser.handle_response(&packet, src());

    assert!(matches!(browser.poll_event(), Some(BrowserEvent::Down(_))));
    assert!(matches!(browser.poll_event(), Some(BrowserEvent::Up(_))));
    assert!(browser.poll_event().is_none());
    assert_eq!(browser.services().len(), 1);
}

#[test]
fn test_subtype_addition_reemits_up() {
    let config = BrowserConfig::default().with_types(vec![
        TypeSelector::new("http", Protocol::Tcp),
        TypeSelector::new("http", Protocol::Tcp).with_subtypes(vec!["printer".to_string()]),
    ]);
    let mut browser = Browser::new(config);
    browser.start();
    while browser.poll_query().is_some() {}

    let mut packet = full_trio();
    packet.answers.push(ptr(
        "_printer._sub._http._tcp.local",
        "X._http._tcp.local",
        120,
    ));
    browser.handle_response(&packet, src());

    // First Up from the plain type PTR, second from the subtype PTR with the
    // existing descriptor mutated.
    let BrowserEvent::Up(first) = browser.poll_event().unwrap() else {
        panic!("expected Up");
    };
    assert!(first.subtypes.is_empty());

    let BrowserEvent::Up(second) = browser.poll_event().unwrap() else {
        panic!("expected second Up");
    };
    assert_eq!(second.subtypes, vec!["printer".to_string()]);
    assert_eq!(second.fqdn, first.fqdn);

    assert!(browser.poll_event().is_none());
    assert_eq!(browser.services().len(), 1);
    assert_eq!(browser.services()[0].subtypes, vec!["printer".to_string()]);

    // The same subtype seen again changes nothing.
    browser.handle_response(&packet, src());
    assert!(browser.poll_event().is_none());
}

#[test]
fn test_wildcard_discovers_types() {
    let mut browser = Browser::new(BrowserConfig::default());
    browser.start();

    let query = browser.poll_query().unwrap();
    assert_eq!(query.name, WILDCARD);

    // A service-type enumeration answer triggers a PTR query for that type.
    let enumeration = Packet::response(vec![ptr(WILDCARD, "_http._tcp.local", 28800)], vec![]);
    browser.handle_response(&enumeration, src());

    let query = browser.poll_query().unwrap();
    assert_eq!(query.name, "_http._tcp.local");
    assert_eq!(query.typ, DnsType::Ptr);
    assert!(browser.names().contains(&"_http._tcp.local".to_string()));

    // Seeing the same type again does not re-query: the set is grow-only.
    browser.handle_response(&enumeration, src());
    assert!(browser.poll_query().is_none());

    // Once tracked, instances of the type come up as usual.
    browser.handle_response(&full_trio(), src());
    assert!(matches!(browser.poll_event(), Some(BrowserEvent::Up(_))));
}

#[test]
fn test_wildcard_ignores_non_enumeration_ptrs() {
    let mut browser = Browser::new(BrowserConfig::default());
    browser.start();
    while browser.poll_query().is_some() {}

    // A type PTR is not an enumeration answer; nothing new is tracked.
    browser.handle_response(&full_trio(), src());
    assert!(browser.poll_query().is_none());
    assert_eq!(browser.names().len(), 1);
    assert_eq!(browser.names()[0], WILDCARD);
}

#[test]
fn test_stop_retains_services_and_ignores_responses() {
    let mut browser = http_browser();
    browser.handle_response(&full_trio(), src());
    assert!(matches!(browser.poll_event(), Some(BrowserEvent::Up(_))));

    browser.stop();
    assert!(!browser.is_started());
    assert_eq!(browser.services().len(), 1);

    let goodbye = Packet::response(
        vec![ptr("_http._tcp.local", "X._http._tcp.local", 0)],
        vec![],
    );
    browser.handle_response(&goodbye, src());
    assert!(browser.poll_event().is_none());
    assert_eq!(browser.services().len(), 1);

    // stop() is idempotent.
    browser.stop();
}

#[test]
fn test_update_reissues_queries() {
    let mut browser = http_browser();
    browser.update();
    let query = browser.poll_query().unwrap();
    assert_eq!(query.name, "_http._tcp.local");
    assert!(browser.poll_query().is_none());
}

#[test]
fn test_txt_attributes_decoded() {
    let mut browser = http_browser();
    let packet = Packet::response(
        vec![
            ptr("_http._tcp.local", "X._http._tcp.local", 120),
            srv("X._http._tcp.local", "host.local", 3000),
            txt("X._http._tcp.local", b"\x07foo=bar"),
        ],
        vec![],
    );
    browser.handle_response(&packet, src());

    let BrowserEvent::Up(service) = browser.poll_event().unwrap() else {
        panic!("expected Up");
    };
    let attrs = service.txt.unwrap();
    assert_eq!(attrs.get("foo").map(String::as_str), Some("bar"));
    assert_eq!(&service.txt_raw.unwrap()[..], b"\x07foo=bar");
}

#[test]
fn test_udp_protocol_recovered() {
    let mut browser = Browser::new(
        BrowserConfig::default()
            .with_type("sleep-proxy")
            .with_protocol(Protocol::Udp),
    );
    browser.start();
    let query = browser.poll_query().unwrap();
    assert_eq!(query.name, "_sleep-proxy._udp.local");

    let packet = Packet::response(
        vec![
            ptr("_sleep-proxy._udp.local", "Y._sleep-proxy._udp.local", 120),
            srv("Y._sleep-proxy._udp.local", "host.local", 5353),
            txt("Y._sleep-proxy._udp.local", &[0]),
        ],
        vec![],
    );
    browser.handle_response(&packet, src());

    let BrowserEvent::Up(service) = browser.poll_event().unwrap() else {
        panic!("expected Up");
    };
    assert_eq!(service.type_name, "sleep-proxy");
    assert_eq!(service.protocol, Protocol::Udp);
}

#[test]
fn test_services_preserve_arrival_order() {
    let mut browser = http_browser();
    let packet = Packet::response(
        vec![
            ptr("_http._tcp.local", "A._http._tcp.local", 120),
            srv("A._http._tcp.local", "a.local", 1000),
            txt("A._http._tcp.local", &[0]),
            ptr("_http._tcp.local", "B._http._tcp.local", 120),
            srv("B._http._tcp.local", "b.local", 2000),
            txt("B._http._tcp.local", &[0]),
        ],
        vec![],
    );
    browser.handle_response(&packet, src());

    let names: Vec<String> = browser
        .services()
        .iter()
        .map(|service| service.name.clone())
        .collect();
    assert_eq!(names, vec!["A".to_string(), "B".to_string()]);
    assert_eq!(browser.services().len(), 2);
}
