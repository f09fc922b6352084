//! Parsed DNS message model for mDNS service discovery.
//!
//! The engine operates entirely on already-parsed messages: the caller owns
//! the wire codec and hands [`Packet`]s to the endpoint, which hands
//! [`Question`]s and record sets back. Records are a tagged variant over the
//! five record types DNS-SD uses (PTR, SRV, TXT, A, AAAA).

mod record;
pub mod txt;

use std::fmt;

pub use record::{Record, RecordData, SrvData};

// A DnsType is a type of DNS question and record.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DnsType {
    A = 1,
    Ptr = 12,
    Txt = 16,
    Aaaa = 28,
    Srv = 33,
    Any = 255,
}

impl fmt::Display for DnsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match *self {
            DnsType::A => "A",
            DnsType::Ptr => "PTR",
            DnsType::Txt => "TXT",
            DnsType::Aaaa => "AAAA",
            DnsType::Srv => "SRV",
            DnsType::Any => "ANY",
        };
        write!(f, "{s}")
    }
}

// A question is a DNS query.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Question {
    pub name: String,
    pub typ: DnsType,
}

impl Question {
    pub fn new(name: impl Into<String>, typ: DnsType) -> Self {
        Self {
            name: name.into(),
            typ,
        }
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.typ, self.name)
    }
}

/// A parsed mDNS message.
///
/// Queries carry `questions`; responses carry `answers` and `additionals`.
/// Both sections may be present in a single packet, the endpoint dispatches
/// them independently.
#[derive(Debug, Default, Clone)]
pub struct Packet {
    pub questions: Vec<Question>,
    pub answers: Vec<Record>,
    pub additionals: Vec<Record>,
}

impl Packet {
    /// Build a query packet from a list of questions.
    pub fn query(questions: Vec<Question>) -> Self {
        Self {
            questions,
            ..Default::default()
        }
    }

    /// Build a response packet from answer and additional records.
    pub fn response(answers: Vec<Record>, additionals: Vec<Record>) -> Self {
        Self {
            answers,
            additionals,
            ..Default::default()
        }
    }
}

pub(crate) fn trim_dot(name: &str) -> &str {
    name.strip_suffix('.').unwrap_or(name)
}

/// DNS name equality: ASCII case-insensitive, tolerant of a trailing dot.
pub fn dns_equal(a: &str, b: &str) -> bool {
    trim_dot(a).eq_ignore_ascii_case(trim_dot(b))
}

pub(crate) fn first_label(name: &str) -> &str {
    trim_dot(name).split('.').next().unwrap_or("")
}

pub(crate) fn label_count(name: &str) -> usize {
    trim_dot(name).split('.').count()
}

// Question names with a dot are matched against the full record name;
// bare names are matched against the record's first label only. This
// supports both fully-qualified and bare-hostname queries.
pub(crate) fn matches_question(question_name: &str, record_name: &str) -> bool {
    let question_name = trim_dot(question_name);
    if question_name.contains('.') {
        dns_equal(question_name, record_name)
    } else {
        question_name.eq_ignore_ascii_case(first_label(record_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dns_equal() {
        assert!(dns_equal("Foo._http._tcp.local", "foo._HTTP._tcp.LOCAL"));
        assert!(dns_equal("host.local.", "host.local"));
        assert!(!dns_equal("host.local", "other.local"));
    }

    #[test]
    fn test_first_label() {
        assert_eq!(first_label("Foo Bar._http._tcp.local"), "Foo Bar");
        assert_eq!(first_label("host"), "host");
        assert_eq!(first_label(""), "");
    }

    #[test]
    fn test_label_count() {
        assert_eq!(label_count("_http._tcp.local"), 3);
        assert_eq!(label_count("_printer._sub._http._tcp.local"), 5);
        assert_eq!(label_count("host.local."), 2);
    }

    #[test]
    fn test_matches_question() {
        // Fully-qualified question names match verbatim, case-insensitive.
        assert!(matches_question("host.local", "HOST.local"));
        assert!(!matches_question("host.local", "host2.local"));
        // Bare question names match the first label of the record name.
        assert!(matches_question("host", "host.local"));
        assert!(!matches_question("host", "other.local"));
    }
}
