//! Client address candidates.
//!
//! A request can name its client in several places, none of which can be
//! fully trusted. This module gathers every candidate in the fixed order the
//! classifier evaluates them:
//!
//! 1. each comma-separated element of `X-Forwarded-For`, left to right
//!    (across all header lines of that name)
//! 2. `X-Real-IP`
//! 3. the transport peer address, with any port stripped
//!
//! Candidates are collected as raw strings; parsing happens per candidate so
//! that one malformed value does not hide the others.

use std::fmt;
use std::net::IpAddr;

use hyper::HeaderMap;

use crate::error::Result;
use crate::headers::{X_FORWARDED_FOR, X_REAL_IP};
use crate::network::parse_ip;

/// Where a candidate address came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CandidateSource {
    /// An element of the `X-Forwarded-For` chain.
    ForwardedFor,
    /// The `X-Real-IP` header.
    RealIp,
    /// The address the connection arrived from.
    PeerAddr,
}

impl fmt::Display for CandidateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ForwardedFor => "x-forwarded-for",
            Self::RealIp => "x-real-ip",
            Self::PeerAddr => "peer",
        };
        f.write_str(name)
    }
}

/// An unparsed candidate value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCandidate {
    pub source: CandidateSource,
    pub value: String,
}

impl RawCandidate {
    fn new(source: CandidateSource, value: impl Into<String>) -> Self {
        Self {
            source,
            value: value.into(),
        }
    }

    /// Parses the value into a [`CandidateAddress`].
    ///
    /// # Errors
    ///
    /// Returns [`crate::BlockGateError::InvalidIp`] if the value is not an
    /// address.
    pub fn parse(&self) -> Result<CandidateAddress> {
        Ok(CandidateAddress {
            addr: parse_ip(&self.value)?,
            source: self.source,
        })
    }
}

/// A parsed candidate client address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateAddress {
    pub addr: IpAddr,
    pub source: CandidateSource,
}

/// Collects every candidate from the request headers and peer address, in
/// evaluation order.
///
/// # Example
///
/// ```
/// use blockgate_core::ip_filter::{collect_candidates, CandidateSource};
/// use hyper::HeaderMap;
///
/// let mut headers = HeaderMap::new();
/// headers.insert("x-forwarded-for", "203.0.113.7, 10.0.0.2".parse().unwrap());
/// headers.insert("x-real-ip", "198.51.100.1".parse().unwrap());
///
/// let candidates = collect_candidates(&headers, Some("192.0.2.9:53122"));
/// let values: Vec<&str> = candidates.iter().map(|c| c.value.as_str()).collect();
/// assert_eq!(values, ["203.0.113.7", "10.0.0.2", "198.51.100.1", "192.0.2.9"]);
/// assert_eq!(candidates[3].source, CandidateSource::PeerAddr);
/// ```
pub fn collect_candidates(headers: &HeaderMap, peer_addr: Option<&str>) -> Vec<RawCandidate> {
    let mut candidates: Vec<RawCandidate> = forwarded_for_values(headers)
        .map(|value| RawCandidate::new(CandidateSource::ForwardedFor, value))
        .collect();

    if let Some(real_ip) = real_ip_value(headers) {
        candidates.push(RawCandidate::new(CandidateSource::RealIp, real_ip));
    }

    if let Some(peer) = peer_addr.map(str::trim).filter(|p| !p.is_empty()) {
        let host = strip_port(peer).unwrap_or(peer);
        candidates.push(RawCandidate::new(CandidateSource::PeerAddr, host));
    }

    candidates
}

/// Yields the trimmed, non-empty elements of every `X-Forwarded-For` line.
fn forwarded_for_values(headers: &HeaderMap) -> impl Iterator<Item = &str> {
    headers
        .get_all(X_FORWARDED_FOR)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Returns the trimmed `X-Real-IP` value, if present and non-empty.
fn real_ip_value(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(X_REAL_IP)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Splits the host out of `host:port` or `[host]:port`.
///
/// Returns `None` when the value carries no port (a bare IPv4 address, or an
/// unbracketed IPv6 address), in which case callers use the value unchanged.
pub fn strip_port(addr: &str) -> Option<&str> {
    if let Some(rest) = addr.strip_prefix('[') {
        let (host, after) = rest.split_once(']')?;
        // After the bracket only ":port" is acceptable
        return after.strip_prefix(':').map(|_| host);
    }

    let (host, port) = addr.split_once(':')?;
    if port.contains(':') {
        // Unbracketed IPv6 literal
        return None;
    }
    Some(host)
}
