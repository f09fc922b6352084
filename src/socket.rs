//! Socket utilities for mDNS.
//!
//! This module provides [`MulticastSocket`], a builder for creating properly
//! configured UDP sockets for mDNS communication. The engine itself is
//! sans-I/O; this builder exists so callers wiring it to a real network do
//! not have to repeat the multicast boilerplate.
//!
//! # Example
//!
//! ```rust,ignore
//! use dnssd::MulticastSocket;
//!
//! let std_socket = MulticastSocket::new().into_std()?;
//!
//! // For tokio:
//! let socket = tokio::net::UdpSocket::from_std(std_socket)?;
//! ```

use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket};

use socket2::{Domain, Protocol, Socket, Type};

use crate::proto::{MDNS_MULTICAST_IPV4, MDNS_MULTICAST_IPV6, MDNS_PORT};

/// A builder for creating multicast UDP sockets suitable for mDNS.
///
/// [`into_std`](Self::into_std) produces a non-blocking
/// `std::net::UdpSocket` bound to port 5353 with address and port reuse
/// enabled, joined to 224.0.0.251 — or to ff02::fb when
/// [`with_ipv6`](Self::with_ipv6) selects the IPv6 group.
#[derive(Debug, Clone)]
pub struct MulticastSocket {
    multicast_local_ipv4: Option<Ipv4Addr>,
    multicast_local_port: Option<u16>,
    interface: Option<Ipv4Addr>,
    ipv6: bool,
}

impl Default for MulticastSocket {
    fn default() -> Self {
        Self::new()
    }
}

impl MulticastSocket {
    pub fn new() -> Self {
        Self {
            multicast_local_ipv4: None,
            multicast_local_port: None,
            interface: None,
            ipv6: false,
        }
    }

    /// Sets the local IPv4 address to bind instead of the platform default.
    pub fn with_multicast_local_ipv4(mut self, multicast_local_ipv4: Ipv4Addr) -> Self {
        self.multicast_local_ipv4 = Some(multicast_local_ipv4);
        self
    }

    /// Sets the local port to bind instead of 5353.
    pub fn with_multicast_local_port(mut self, multicast_local_port: u16) -> Self {
        self.multicast_local_port = Some(multicast_local_port);
        self
    }

    /// Sets a specific network interface for the IPv4 group join.
    ///
    /// If not set, the join applies to all interfaces (`INADDR_ANY`).
    pub fn with_interface(mut self, interface: Ipv4Addr) -> Self {
        self.interface = Some(interface);
        self
    }

    /// Build an IPv6 socket joined to ff02::fb instead of the IPv4 group.
    pub fn with_ipv6(mut self, ipv6: bool) -> Self {
        self.ipv6 = ipv6;
        self
    }

    // The local address the socket will bind, for the selected family.
    // IPv4 defaults to the group address itself, which keeps unrelated
    // unicast traffic off the socket but is only accepted by Linux; other
    // platforms get the wildcard address.
    fn bind_addr(&self) -> SocketAddr {
        let port = self.multicast_local_port.unwrap_or(MDNS_PORT);
        if self.ipv6 {
            return SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), port);
        }

        let ip = self.multicast_local_ipv4.unwrap_or({
            if cfg!(target_os = "linux") {
                MDNS_MULTICAST_IPV4
            } else {
                Ipv4Addr::UNSPECIFIED
            }
        });
        SocketAddr::new(IpAddr::V4(ip), port)
    }

    /// Converts this builder into a configured `std::net::UdpSocket`.
    ///
    /// # Errors
    ///
    /// Returns an error if socket creation, option setting, binding or the
    /// multicast group join fails.
    pub fn into_std(self) -> io::Result<UdpSocket> {
        let domain = if self.ipv6 { Domain::IPV6 } else { Domain::IPV4 };
        let socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP))?;

        // Every mDNS endpoint on the host shares port 5353, so the socket
        // must allow address reuse (and port reuse where the platform
        // supports it) before binding. Non-blocking mode keeps the socket
        // usable from async runtimes.
        socket.set_reuse_address(true)?;
        #[cfg(all(unix, not(target_os = "solaris"), not(target_os = "illumos")))]
        socket.set_reuse_port(true)?;
        socket.set_nonblocking(true)?;

        if self.ipv6 {
            socket.set_only_v6(true)?;
            socket.bind(&self.bind_addr().into())?;
            socket.join_multicast_v6(&MDNS_MULTICAST_IPV6, 0)?;
        } else {
            socket.bind(&self.bind_addr().into())?;
            let iface = self.interface.unwrap_or(Ipv4Addr::UNSPECIFIED);
            socket.join_multicast_v4(&MDNS_MULTICAST_IPV4, &iface)?;
        }

        Ok(socket.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // into_std() needs a real network (and a free shot at port 5353), so the
    // tests pin down the address selection it feeds into bind().

    #[test]
    fn test_default_bind_addr_is_ipv4_mdns_port() {
        let addr = MulticastSocket::new().bind_addr();
        assert!(addr.is_ipv4());
        assert_eq!(addr.port(), MDNS_PORT);
    }

    #[test]
    fn test_explicit_ipv4_and_port_are_used() {
        let addr = MulticastSocket::new()
            .with_multicast_local_ipv4(Ipv4Addr::new(192, 168, 1, 7))
            .with_multicast_local_port(5454)
            .bind_addr();
        assert_eq!(addr, "192.168.1.7:5454".parse().unwrap());
    }

    #[test]
    fn test_ipv6_selects_wildcard_v6_bind() {
        // The IPv4 override does not leak into the IPv6 branch.
        let addr = MulticastSocket::new()
            .with_ipv6(true)
            .with_multicast_local_ipv4(Ipv4Addr::new(10, 0, 0, 1))
            .bind_addr();
        assert_eq!(addr.ip(), IpAddr::V6(Ipv6Addr::UNSPECIFIED));
        assert_eq!(addr.port(), MDNS_PORT);
    }

    #[test]
    fn test_ipv6_custom_port() {
        let addr = MulticastSocket::new()
            .with_ipv6(true)
            .with_multicast_local_port(5454)
            .bind_addr();
        assert_eq!(addr, "[::]:5454".parse().unwrap());
    }

    #[test]
    fn test_interface_only_affects_group_join() {
        // The join interface is separate from the bind address.
        let builder = MulticastSocket::new().with_interface(Ipv4Addr::new(192, 168, 1, 100));
        assert_eq!(builder.interface, Some(Ipv4Addr::new(192, 168, 1, 100)));
        assert!(builder.bind_addr().is_ipv4());
    }
}
