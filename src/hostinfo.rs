//! Local host information: hostname and usable interface addresses.

use std::net::IpAddr;

/// The hostname and addresses a published service advertises by default.
///
/// [`HostInfo::detect`] reads them from the system; tests and embedders can
/// construct a fixed value instead and pass it via
/// [`DnsSdConfig::with_host_info`](crate::DnsSdConfig::with_host_info).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostInfo {
    /// Target hostname for SRV records.
    pub hostname: String,
    /// Addresses published as A/AAAA records, one record per address.
    pub addresses: Vec<IpAddr>,
}

impl HostInfo {
    pub fn new(hostname: impl Into<String>, addresses: Vec<IpAddr>) -> Self {
        Self {
            hostname: hostname.into(),
            addresses,
        }
    }

    /// Read the system hostname and enumerate all non-loopback interface
    /// addresses.
    ///
    /// Failures degrade to `localhost` / no addresses with a logged warning;
    /// a host without usable interfaces can still browse.
    pub fn detect() -> Self {
        let hostname = match hostname::get() {
            Ok(name) => name.to_string_lossy().into_owned(),
            Err(err) => {
                log::warn!("Failed to read system hostname: {err}");
                "localhost".to_string()
            }
        };

        let addresses = match if_addrs::get_if_addrs() {
            Ok(interfaces) => interfaces
                .into_iter()
                .filter(|iface| !iface.is_loopback())
                .map(|iface| iface.ip())
                .collect(),
            Err(err) => {
                log::warn!("Failed to enumerate interfaces: {err}");
                Vec::new()
            }
        };

        Self {
            hostname,
            addresses,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn test_fixed_host_info() {
        let host = HostInfo::new("box.local", vec![IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1))]);
        assert_eq!(host.hostname, "box.local");
        assert_eq!(host.addresses.len(), 1);
    }

    #[test]
    fn test_detect_does_not_panic() {
        let host = HostInfo::detect();
        assert!(!host.hostname.is_empty());
    }
}
