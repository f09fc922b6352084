//! Service browsing example
//!
//! Runs a publisher and a browser endpoint back to back and shuttles their
//! parsed packets in-process, printing every `up`/`down` transition the
//! browser observes. Pass a service type to browse it, or nothing to run a
//! wildcard browser that enumerates all types first.
//!
//! ```
//! cargo run --example browse -- http
//! cargo run --example browse
//! ```

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use clap::Parser;
use dnssd::{
    BrowserConfig, DnsSd, DnsSdConfig, DnsSdEvent, HostInfo, ServiceConfig,
};

#[derive(Parser, Debug)]
#[command(name = "DNS-SD Browse")]
#[command(version = "0.1.0")]
#[command(author = "Rain Liu <yliu@webrtc.rs>")]
#[command(about = "An example of browsing services with sans-I/O dnssd")]
struct Args {
    /// Service type to browse for; omit to browse every type (wildcard)
    service_type: Option<String>,
}

fn deliver(from: &mut DnsSd, to: &mut DnsSd, from_addr: SocketAddr) {
    while let Some(outbound) = from.poll_write() {
        let _ = to.handle_read(outbound.into_packet(), from_addr);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    // A simulated peer advertising a few services.
    let peer_addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(192, 168, 1, 50)), 5353);
    let peer_host = HostInfo::new(
        "peer.local",
        vec![IpAddr::V4(Ipv4Addr::new(192, 168, 1, 50))],
    );
    let mut peer = DnsSd::new(DnsSdConfig::default().with_host_info(peer_host));
    peer.publish(
        ServiceConfig::default()
            .with_name("Web Server")
            .with_type("http")
            .with_port(8080),
    )?;
    peer.publish(
        ServiceConfig::default()
            .with_name("Printer")
            .with_type("ipp")
            .with_port(631),
    )?;
    while peer.poll_write().is_some() {}

    let mut seeker = DnsSd::new(DnsSdConfig::default());
    let seeker_addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(192, 168, 1, 51)), 5353);

    let config = match &args.service_type {
        Some(service_type) => BrowserConfig::default().with_type(service_type),
        None => BrowserConfig::default(),
    };
    let browser_id = seeker.find(config);
    match &args.service_type {
        Some(service_type) => log::info!("Browsing for _{service_type}._tcp services"),
        None => log::info!("Browsing all service types (wildcard)"),
    }

    // Query -> answer, twice: the wildcard browser needs a second round to
    // query the types it just enumerated.
    for _ in 0..2 {
        deliver(&mut seeker, &mut peer, seeker_addr);
        deliver(&mut peer, &mut seeker, peer_addr);
    }

    while let Some(event) = seeker.poll_event() {
        match event {
            DnsSdEvent::ServiceUp(id, service) if id == browser_id => {
                println!("up: {} ({}:{})", service.fqdn, service.host, service.port);
            }
            DnsSdEvent::ServiceDown(id, service) if id == browser_id => {
                println!("down: {}", service.fqdn);
            }
            _ => {}
        }
    }

    // Say goodbye and let the browser see it.
    peer.unpublish_all();
    deliver(&mut peer, &mut seeker, peer_addr);
    while let Some(event) = seeker.poll_event() {
        if let DnsSdEvent::ServiceDown(_, service) = event {
            println!("down: {}", service.fqdn);
        }
    }

    seeker.close()?;
    peer.close()?;
    Ok(())
}
