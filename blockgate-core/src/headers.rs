//! HTTP header constants for BlockGate.

/// X-Forwarded-For header - comma-separated chain of client and proxy addresses.
pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// X-Real-IP header - single client address set by a fronting proxy.
pub const X_REAL_IP: &str = "x-real-ip";

/// Host header.
pub const HOST: &str = "host";

/// Content-Length header.
pub const CONTENT_LENGTH: &str = "content-length";

/// Hop-by-hop headers that must not be forwarded upstream or back to the client.
pub const HOP_BY_HOP_HEADERS: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailers",
    "transfer-encoding",
    "upgrade",
];

/// Check if a header is a hop-by-hop header that shouldn't be forwarded.
///
/// # Example
///
/// ```
/// use blockgate_core::headers::is_hop_by_hop;
///
/// assert!(is_hop_by_hop("connection"));
/// assert!(is_hop_by_hop("Transfer-Encoding"));
/// assert!(!is_hop_by_hop("x-forwarded-for"));
/// ```
pub fn is_hop_by_hop(header_name: &str) -> bool {
    HOP_BY_HOP_HEADERS
        .iter()
        .any(|h| h.eq_ignore_ascii_case(header_name))
}
