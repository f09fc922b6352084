//! Configuration for a service discovery endpoint.
//!
//! # Examples
//!
//! ```rust
//! use dnssd::DnsSdConfig;
//! use std::time::Duration;
//!
//! let config = DnsSdConfig::default()
//!     .with_refresh_interval(Duration::from_secs(30));
//! ```

use std::time::Duration;

use crate::hostinfo::HostInfo;

/// Top-level domain for all multicast DNS names.
pub const TLD: &str = ".local";

/// The DNS-SD service-type enumeration name (RFC 6763 §9).
///
/// A browser configured without a service type queries this name and tracks
/// every service type it learns about.
pub const WILDCARD: &str = "_services._dns-sd._udp.local";

/// TTL for the shared PTR records (service enumeration, type and subtype
/// pointers): 8 hours.
pub(crate) const TTL_PTR: u32 = 28800;

/// TTL for SRV records (120 seconds).
pub(crate) const TTL_SRV: u32 = 120;

/// TTL for TXT records (75 minutes).
pub(crate) const TTL_TXT: u32 = 4500;

/// TTL for A/AAAA records (120 seconds).
pub(crate) const TTL_ADDR: u32 = 120;

/// Configuration for a [`DnsSd`](crate::DnsSd) endpoint.
///
/// Use the builder pattern to construct a configuration:
///
/// ```rust
/// use dnssd::{DnsSdConfig, HostInfo};
/// use std::time::Duration;
///
/// let config = DnsSdConfig::new()
///     .with_host_info(HostInfo::new("myhost.local", vec![]))
///     .with_refresh_interval(Duration::from_secs(60));
/// ```
#[derive(Clone, Debug, Default)]
pub struct DnsSdConfig {
    /// Hostname and addresses advertised for published services.
    ///
    /// When `None`, the endpoint detects the system hostname and its
    /// non-loopback interface addresses at construction time.
    pub host_info: Option<HostInfo>,

    /// Interval at which every started browser re-issues its PTR queries.
    ///
    /// When `None` (the default), no timer is scheduled and callers refresh
    /// browsers explicitly via
    /// [`DnsSd::update_browser`](crate::DnsSd::update_browser).
    pub refresh_interval: Option<Duration>,
}

impl DnsSdConfig {
    /// Create a new configuration with default values.
    ///
    /// Equivalent to [`DnsSdConfig::default()`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the host information used for published services.
    ///
    /// Published services default their SRV target to this hostname and
    /// their A/AAAA records to these addresses. Supplying a fixed
    /// [`HostInfo`] keeps the endpoint off the real host entirely, which is
    /// how the crate's own tests run.
    pub fn with_host_info(mut self, host_info: HostInfo) -> Self {
        self.host_info = Some(host_info);
        self
    }

    /// Set the browser refresh interval.
    ///
    /// When set, [`poll_timeout`](crate::DnsSd::poll_timeout) /
    /// [`handle_timeout`](crate::DnsSd::handle_timeout) re-issue the PTR
    /// queries of every started browser at this cadence. mDNS has no
    /// per-record expiry timer here; refresh plus goodbye packets keep the
    /// remote view current.
    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = Some(interval);
        self
    }
}
