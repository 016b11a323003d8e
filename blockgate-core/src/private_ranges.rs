//! Reserved and local address space.
//!
//! Requests whose client address falls in one of these ranges are treated as
//! local traffic and never reach the blocklist lookup.

use std::net::IpAddr;

use once_cell::sync::Lazy;

use crate::network::NetworkRange;

/// CIDR literals for loopback, RFC 1918, link-local and unique-local space.
const PRIVATE_CIDRS: &[&str] = &[
    "127.0.0.0/8",    // IPv4 loopback
    "10.0.0.0/8",     // RFC 1918
    "172.16.0.0/12",  // RFC 1918
    "192.168.0.0/16", // RFC 1918
    "169.254.0.0/16", // RFC 3927 link-local
    "::1/128",        // IPv6 loopback
    "fe80::/10",      // IPv6 link-local
    "fc00::/7",       // RFC 4193 unique local
];

static PRIVATE_RANGES: Lazy<PrivateRangeTable> = Lazy::new(PrivateRangeTable::build);

/// Fixed table of private and local ranges.
#[derive(Debug)]
pub struct PrivateRangeTable {
    ranges: Vec<NetworkRange>,
}

impl PrivateRangeTable {
    /// Returns the process-wide table.
    ///
    /// # Panics
    ///
    /// Panics on first use if one of the embedded literals does not parse,
    /// which can only happen with a corrupted build.
    pub fn get() -> &'static PrivateRangeTable {
        &PRIVATE_RANGES
    }

    fn build() -> Self {
        let ranges = PRIVATE_CIDRS
            .iter()
            .map(|cidr| {
                NetworkRange::parse_cidr(cidr)
                    .unwrap_or_else(|| panic!("parse error on private range literal {cidr:?}"))
            })
            .collect();
        Self { ranges }
    }

    /// Returns the fixed ranges in declaration order.
    pub fn ranges(&self) -> &[NetworkRange] {
        &self.ranges
    }

    /// Returns `true` for loopback, link-local and private addresses.
    pub fn contains(&self, addr: IpAddr) -> bool {
        let addr = addr.to_canonical();
        if is_loopback(addr) || is_link_local_unicast(addr) || is_link_local_multicast(addr) {
            return true;
        }
        self.ranges.iter().any(|range| range.contains(addr))
    }
}

/// Returns `true` if `addr` is in the fixed private/local set.
pub fn is_private(addr: IpAddr) -> bool {
    PrivateRangeTable::get().contains(addr)
}

fn is_loopback(addr: IpAddr) -> bool {
    addr.is_loopback()
}

fn is_link_local_unicast(addr: IpAddr) -> bool {
    match addr {
        IpAddr::V4(v4) => v4.is_link_local(),
        IpAddr::V6(v6) => v6.segments()[0] & 0xffc0 == 0xfe80,
    }
}

// 224.0.0.0/24 and ff02::/16 (any flags, link-local scope).
fn is_link_local_multicast(addr: IpAddr) -> bool {
    match addr {
        IpAddr::V4(v4) => {
            let [a, b, c, _] = v4.octets();
            a == 224 && b == 0 && c == 0
        }
        IpAddr::V6(v6) => v6.segments()[0] & 0xff0f == 0xff02,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn test_table_has_all_literals() {
        let table = PrivateRangeTable::get();
        assert_eq!(table.ranges().len(), PRIVATE_CIDRS.len());
        assert_eq!(table.ranges()[2].to_string(), "172.16.0.0/12");
    }

    #[test]
    fn test_ipv4_private_ranges() {
        for addr in [
            "127.0.0.1",
            "127.255.255.254",
            "10.0.0.1",
            "10.255.255.255",
            "172.16.0.1",
            "172.31.255.255",
            "192.168.0.1",
            "192.168.255.255",
            "169.254.10.20",
        ] {
            assert!(is_private(ip(addr)), "{addr} should be private");
        }
    }

    #[test]
    fn test_ipv4_public_addresses() {
        for addr in [
            "8.8.8.8",
            "172.15.255.255",
            "172.32.0.0",
            "192.0.2.1",
            "198.51.100.42",
            "11.0.0.1",
        ] {
            assert!(!is_private(ip(addr)), "{addr} should not be private");
        }
    }

    #[test]
    fn test_ipv6_private_ranges() {
        for addr in ["::1", "fe80::1", "febf::1", "fc00::1", "fd12:3456::1"] {
            assert!(is_private(ip(addr)), "{addr} should be private");
        }
        for addr in ["2001:db8::1", "2001:4860:4860::8888", "fec0::1"] {
            assert!(!is_private(ip(addr)), "{addr} should not be private");
        }
    }

    #[test]
    fn test_link_local_multicast() {
        assert!(is_private(ip("224.0.0.251")));
        assert!(is_private(ip("ff02::1")));
        assert!(is_private(ip("ff12::fb")));
        assert!(!is_private(ip("224.0.1.1")));
        assert!(!is_private(ip("ff05::2")));
    }

    #[test]
    fn test_ipv4_mapped_loopback() {
        assert!(is_private(ip("::ffff:127.0.0.1")));
        assert!(is_private(ip("::ffff:10.1.2.3")));
        assert!(!is_private(ip("::ffff:8.8.8.8")));
    }
}
