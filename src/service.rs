//! Service descriptors and their DNS-SD record sets.
//!
//! A [`ServiceInfo`] is the value object at the center of service discovery:
//! it describes one advertised or discovered instance, and it knows how to
//! materialize the coordinated record set (PTR / SRV / TXT / A / AAAA) that
//! publishes the instance on the link.

use std::collections::BTreeMap;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use bytes::Bytes;

use crate::config::{TLD, TTL_ADDR, TTL_PTR, TTL_SRV, TTL_TXT, WILDCARD};
use crate::error::{Error, Result};
use crate::hostinfo::HostInfo;
use crate::message::{Record, RecordData, SrvData, txt};

/// Transport protocol half of a service type.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Protocol {
    #[default]
    Tcp,
    Udp,
}

impl Protocol {
    pub(crate) fn from_label(label: &str) -> Protocol {
        if label.trim_start_matches('_').eq_ignore_ascii_case("udp") {
            Protocol::Udp
        } else {
            Protocol::Tcp
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Tcp => write!(f, "tcp"),
            Protocol::Udp => write!(f, "udp"),
        }
    }
}

/// The DNS-SD "stringified type" of a service: `_<type>._<protocol>`.
///
/// ```rust
/// use dnssd::{Protocol, type_string};
///
/// assert_eq!(type_string("http", Protocol::Tcp), "_http._tcp");
/// ```
pub fn type_string(type_name: &str, protocol: Protocol) -> String {
    format!("_{type_name}._{protocol}")
}

/// Options for publishing a service.
///
/// `name`, `type` and `port` are required; everything else has a default.
/// Validation happens in [`ServiceInfo::new`] (and therefore in
/// [`DnsSd::publish`](crate::DnsSd::publish)).
///
/// # Example
///
/// ```rust
/// use dnssd::ServiceConfig;
///
/// let config = ServiceConfig::default()
///     .with_name("Living Room Printer")
///     .with_type("ipp")
///     .with_port(631)
///     .with_subtypes(vec!["print".to_string()]);
/// ```
#[derive(Clone, Debug, Default)]
pub struct ServiceConfig {
    /// Human-readable instance label, e.g. `"Foo Bar"`.
    pub name: Option<String>,
    /// Application protocol without the leading underscore, e.g. `"http"`.
    pub type_name: Option<String>,
    /// Transport protocol. Default: TCP.
    pub protocol: Protocol,
    /// SRV target hostname. Default: the endpoint's detected hostname.
    pub host: Option<String>,
    /// Service port, 1..65535.
    pub port: Option<u16>,
    /// Subtype labels, one shared PTR is published per entry.
    pub subtypes: Vec<String>,
    /// TXT attributes. `None` publishes the empty TXT rdata.
    pub txt: Option<BTreeMap<String, String>>,
    /// Explicit addresses for A/AAAA records. Default: every non-loopback
    /// address of the host.
    pub addresses: Option<Vec<IpAddr>>,
    /// Cache-flush bit, propagated into every published record.
    pub flush: bool,
}

impl ServiceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
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

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_subtypes(mut self, subtypes: Vec<String>) -> Self {
        self.subtypes = subtypes;
        self
    }

    pub fn with_txt(mut self, txt: BTreeMap<String, String>) -> Self {
        self.txt = Some(txt);
        self
    }

    pub fn with_addresses(mut self, addresses: Vec<IpAddr>) -> Self {
        self.addresses = Some(addresses);
        self
    }

    pub fn with_flush(mut self, flush: bool) -> Self {
        self.flush = flush;
        self
    }
}

/// One advertised or discovered service instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceInfo {
    /// Instance label, e.g. `"Foo Bar"`.
    pub name: String,
    /// Application protocol, e.g. `"http"`.
    pub type_name: String,
    pub protocol: Protocol,
    /// SRV target hostname.
    pub host: String,
    pub port: u16,
    pub subtypes: Vec<String>,
    /// Decoded TXT attributes, `None` until a TXT record has been seen
    /// (discovered) or configured (published).
    pub txt: Option<BTreeMap<String, String>>,
    /// Raw TXT rdata as received; only set on discovered services.
    pub txt_raw: Option<Bytes>,
    pub addresses: Vec<IpAddr>,
    /// Cache-flush bit for published records.
    pub flush: bool,
    /// `<name>.<type_string>.local`, computed eagerly.
    pub fqdn: String,
    /// Whether the registry has emitted the initial announcement.
    pub published: bool,
    /// Source address of the response that introduced a discovered service.
    pub referer: Option<SocketAddr>,
}

impl ServiceInfo {
    /// Validate a [`ServiceConfig`] and fill its defaults from `host_info`.
    ///
    /// # Errors
    ///
    /// [`Error::ErrMissingField`] when `name`, `type` or `port` is absent,
    /// [`Error::ErrInvalidPortNumber`] when the port is zero.
    pub fn new(config: ServiceConfig, host_info: &HostInfo) -> Result<Self> {
        let name = match config.name {
            Some(name) if !name.is_empty() => name,
            _ => return Err(Error::ErrMissingField("name")),
        };
        let type_name = match config.type_name {
            Some(type_name) if !type_name.is_empty() => type_name,
            _ => return Err(Error::ErrMissingField("type")),
        };
        let port = config.port.ok_or(Error::ErrMissingField("port"))?;
        if port == 0 {
            return Err(Error::ErrInvalidPortNumber);
        }

        let host = config
            .host
            .unwrap_or_else(|| host_info.hostname.clone());
        let addresses = config
            .addresses
            .unwrap_or_else(|| host_info.addresses.clone());
        let fqdn = format!(
            "{}.{}{}",
            name,
            type_string(&type_name, config.protocol),
            TLD
        );

        Ok(Self {
            name,
            type_name,
            protocol: config.protocol,
            host,
            port,
            subtypes: config.subtypes,
            txt: config.txt,
            txt_raw: None,
            addresses,
            flush: config.flush,
            fqdn,
            published: false,
            referer: None,
        })
    }

    /// `_<type>._<protocol>` for this instance.
    pub fn type_string(&self) -> String {
        type_string(&self.type_name, self.protocol)
    }

    /// Materialize the DNS-SD record set for this instance.
    ///
    /// The order is deterministic: service-enumeration PTR, type PTR, SRV,
    /// TXT, one PTR per subtype, then one A/AAAA per address.
    pub fn records(&self) -> Vec<Record> {
        let type_domain = format!("{}{}", self.type_string(), TLD);
        let mut records = Vec::with_capacity(4 + self.subtypes.len() + self.addresses.len());

        records.push(Record::new(
            WILDCARD,
            TTL_PTR,
            self.flush,
            RecordData::Ptr(type_domain.clone()),
        ));
        records.push(Record::new(
            type_domain.clone(),
            TTL_PTR,
            self.flush,
            RecordData::Ptr(self.fqdn.clone()),
        ));
        records.push(Record::new(
            self.fqdn.clone(),
            TTL_SRV,
            self.flush,
            RecordData::Srv(SrvData {
                priority: 0,
                weight: 0,
                port: self.port,
                target: self.host.clone(),
            }),
        ));
        let txt_data = match &self.txt {
            Some(attrs) => txt::encode(attrs),
            None => txt::encode(&BTreeMap::new()),
        };
        records.push(Record::new(
            self.fqdn.clone(),
            TTL_TXT,
            self.flush,
            RecordData::Txt(txt_data),
        ));

        for subtype in &self.subtypes {
            records.push(Record::new(
                format!("_{subtype}._sub.{type_domain}"),
                TTL_PTR,
                self.flush,
                RecordData::Ptr(self.fqdn.clone()),
            ));
        }

        for address in &self.addresses {
            let data = match address {
                IpAddr::V4(ip) => RecordData::A(*ip),
                IpAddr::V6(ip) => RecordData::Aaaa(*ip),
            };
            records.push(Record::new(self.host.clone(), TTL_ADDR, self.flush, data));
        }

        records
    }
}

impl fmt::Display for ServiceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}:{})", self.fqdn, self.host, self.port)
    }
}
