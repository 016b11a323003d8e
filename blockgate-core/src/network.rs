//! Network ranges and address parsing.
//!
//! A [`NetworkRange`] is a base address plus a prefix length. Host bits are
//! always cleared on construction, so `192.168.1.5/24` is stored as
//! `192.168.1.0/24`, and a bare address becomes a `/32` or `/128` range.
//!
//! IPv4-mapped IPv6 addresses (`::ffff:a.b.c.d`) are treated as the IPv4
//! address they carry, both when building ranges and when testing
//! membership.

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use ipnet::{IpNet, Ipv4Net};

use crate::error::{BlockGateError, Result};

/// A contiguous block of addresses of a single family.
///
/// # Example
///
/// ```
/// use blockgate_core::network::NetworkRange;
///
/// let range: NetworkRange = "198.51.100.7/24".parse().unwrap();
/// assert_eq!(range.to_string(), "198.51.100.0/24");
/// assert!(range.contains("198.51.100.42".parse().unwrap()));
/// assert!(!range.contains("198.51.101.1".parse().unwrap()));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NetworkRange {
    net: IpNet,
}

impl NetworkRange {
    /// Creates a range from an address and prefix length, clearing host bits.
    ///
    /// # Errors
    ///
    /// Returns [`BlockGateError::InvalidIp`] if the prefix is longer than the
    /// address family allows.
    pub fn new(addr: IpAddr, prefix_len: u8) -> Result<Self> {
        let net = IpNet::new(addr, prefix_len)
            .map_err(|_| BlockGateError::InvalidIp(format!("{addr}/{prefix_len}")))?;
        Ok(Self {
            net: canonical_net(net.trunc()),
        })
    }

    /// Creates a host range (`/32` or `/128`) covering exactly one address.
    pub fn from_addr(addr: IpAddr) -> Self {
        Self {
            net: IpNet::from(addr.to_canonical()),
        }
    }

    /// Parses `address/prefix` notation.
    ///
    /// Returns `None` for anything that is not a well-formed CIDR block,
    /// including bare addresses.
    pub fn parse_cidr(value: &str) -> Option<Self> {
        value
            .trim()
            .parse::<IpNet>()
            .ok()
            .map(|net| Self {
                net: canonical_net(net.trunc()),
            })
    }

    /// Parses either CIDR notation or a bare address.
    ///
    /// CIDR is tried first; a bare address yields a host range.
    pub fn parse(value: &str) -> Option<Self> {
        Self::parse_cidr(value).or_else(|| parse_ip(value).ok().map(Self::from_addr))
    }

    /// Returns the (masked) base address of the range.
    pub fn network(&self) -> IpAddr {
        self.net.network()
    }

    /// Returns the prefix length.
    pub fn prefix_len(&self) -> u8 {
        self.net.prefix_len()
    }

    /// Returns `true` if the range covers a single address.
    pub fn is_host(&self) -> bool {
        self.net.prefix_len() == self.net.max_prefix_len()
    }

    /// Returns `true` if `addr` lies inside this range.
    pub fn contains(&self, addr: IpAddr) -> bool {
        self.net.contains(&addr.to_canonical())
    }
}

impl fmt::Display for NetworkRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.net)
    }
}

impl FromStr for NetworkRange {
    type Err = BlockGateError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s).ok_or_else(|| BlockGateError::InvalidIp(s.to_string()))
    }
}

impl From<IpAddr> for NetworkRange {
    fn from(addr: IpAddr) -> Self {
        Self::from_addr(addr)
    }
}

/// Rewrites an IPv4-mapped IPv6 network (`::ffff:a.b.c.d/96+`) as the IPv4
/// network it covers. Other networks are returned unchanged.
fn canonical_net(net: IpNet) -> IpNet {
    if let IpNet::V6(v6) = net
        && v6.prefix_len() >= 96
        && let Some(v4) = v6.network().to_ipv4_mapped()
        && let Ok(mapped) = Ipv4Net::new(v4, v6.prefix_len() - 96)
    {
        return IpNet::V4(mapped);
    }
    net
}

/// Parses a single address, tolerating surrounding whitespace and brackets
/// around IPv6 literals (`[::1]`).
///
/// # Errors
///
/// Returns [`BlockGateError::InvalidIp`] when the value is not an address.
pub fn parse_ip(value: &str) -> Result<IpAddr> {
    let trimmed = value.trim();
    let unbracketed = trimmed
        .strip_prefix('[')
        .and_then(|v| v.strip_suffix(']'))
        .unwrap_or(trimmed);

    unbracketed
        .parse::<IpAddr>()
        .map(|ip| ip.to_canonical())
        .map_err(|_| BlockGateError::InvalidIp(trimmed.to_string()))
}
