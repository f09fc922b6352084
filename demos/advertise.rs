//! Service advertising example
//!
//! Publishes a service on a sans-I/O endpoint, prints its announcement, then
//! answers a simulated PTR query the way a real peer would see it. The
//! multicast transport and DNS wire codec stay outside the engine, so this
//! example exercises the full publish path without touching the network.
//!
//! ```
//! cargo run --example advertise -- --name "Foo Bar" --service-type http --port 3000
//! ```

use std::collections::BTreeMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use clap::Parser;
use dnssd::{DnsSd, DnsSdConfig, DnsType, Outbound, Packet, Question, ServiceConfig};

#[derive(Parser, Debug)]
#[command(name = "DNS-SD Advertise")]
#[command(version = "0.1.0")]
#[command(author = "Rain Liu <yliu@webrtc.rs>")]
#[command(about = "An example of advertising a service with sans-I/O dnssd")]
struct Args {
    /// Service instance name
    #[arg(long, default_value = "Foo Bar")]
    name: String,

    /// Service type, without the leading underscore
    #[arg(long, default_value = "http")]
    service_type: String,

    /// Service port
    #[arg(long, default_value = "3000")]
    port: u16,

    /// TXT attributes as key=value pairs
    #[arg(long)]
    txt: Vec<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut txt = BTreeMap::new();
    for pair in &args.txt {
        match pair.split_once('=') {
            Some((key, value)) => {
                txt.insert(key.to_string(), value.to_string());
            }
            None => {
                txt.insert(pair.clone(), String::new());
            }
        }
    }

    let mut endpoint = DnsSd::new(DnsSdConfig::default());
    log::info!(
        "Advertising as host '{}' with {} address(es)",
        endpoint.host_info().hostname,
        endpoint.host_info().addresses.len()
    );

    let mut config = ServiceConfig::default()
        .with_name(&args.name)
        .with_type(&args.service_type)
        .with_port(args.port);
    if !txt.is_empty() {
        config = config.with_txt(txt);
    }

    let service = endpoint.publish(config)?;
    println!("published {}", service.fqdn);

    // The unsolicited announcement, ready for the caller's codec.
    while let Some(outbound) = endpoint.poll_write() {
        if let Outbound::Response(announcement) = outbound {
            println!("announcement:");
            for record in &announcement.answers {
                println!("  {record}");
            }
        }
    }

    // Simulate a peer asking for the service type.
    let type_domain = format!("{}.local", service.type_string());
    let peer: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(192, 168, 1, 50)), 5353);
    let query = Packet::query(vec![Question::new(&type_domain, DnsType::Ptr)]);
    endpoint.handle_read(query, peer)?;

    while let Some(outbound) = endpoint.poll_write() {
        if let Outbound::Response(response) = outbound {
            println!("answer to PTR {type_domain}:");
            for record in &response.answers {
                println!("  {record}");
            }
            for record in &response.additionals {
                println!("  (additional) {record}");
            }
        }
    }

    endpoint.close()?;
    Ok(())
}
