use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

use bytes::Bytes;

use super::DnsType;

/// SRV record data: the port and target host of one service instance.
///
/// Priority and weight are carried for completeness; mDNS service discovery
/// publishes both as zero.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SrvData {
    pub priority: u16,
    pub weight: u16,
    pub port: u16,
    pub target: String,
}

/// Record data, tagged by record type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordData {
    /// Pointer to another DNS name.
    Ptr(String),
    /// Service location.
    Srv(SrvData),
    /// Raw TXT rdata, encoded per RFC 6763 §6 (see [`super::txt`]).
    Txt(Bytes),
    /// IPv4 host address.
    A(Ipv4Addr),
    /// IPv6 host address.
    Aaaa(Ipv6Addr),
}

impl RecordData {
    pub fn rtype(&self) -> DnsType {
        match self {
            RecordData::Ptr(_) => DnsType::Ptr,
            RecordData::Srv(_) => DnsType::Srv,
            RecordData::Txt(_) => DnsType::Txt,
            RecordData::A(_) => DnsType::A,
            RecordData::Aaaa(_) => DnsType::Aaaa,
        }
    }
}

/// One resource record of a parsed mDNS message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub name: String,
    pub ttl: u32,
    /// mDNS cache-flush bit (the top bit of the class field on the wire).
    pub flush: bool,
    pub data: RecordData,
}

impl Record {
    pub fn new(name: impl Into<String>, ttl: u32, flush: bool, data: RecordData) -> Self {
        Self {
            name: name.into(),
            ttl,
            flush,
            data,
        }
    }

    pub fn rtype(&self) -> DnsType {
        self.data.rtype()
    }

    // A goodbye is the same record re-announced with TTL zero.
    pub(crate) fn goodbye(&self) -> Record {
        let mut record = self.clone();
        record.ttl = 0;
        record
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ttl={}", self.rtype(), self.name, self.ttl)
    }
}
