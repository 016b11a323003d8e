//! Blocklist loading and lookup.
//!
//! The blocklist source is plain text with one entry per line:
//!
//! ```text
//! # Known scanners
//! 192.0.2.1
//! 198.51.100.0/24
//! 2001:db8::/32   # documentation range
//! ```
//!
//! Each line is trimmed and anything from the first `#` is discarded. Blank
//! results are skipped. The remainder is parsed as a CIDR block, then as a
//! bare address (stored as a host range). Lines that are neither are dropped
//! without failing the load, so a typo never takes the gate down and never
//! discards the valid entries around it.
//!
//! Lookups are a linear scan in insertion order.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::net::IpAddr;
use std::path::Path;

use tracing::debug;

use crate::error::{BlockGateError, Result};
use crate::network::NetworkRange;

/// Immutable set of blocked network ranges.
///
/// # Example
///
/// ```
/// use blockgate_core::blocklist::BlocklistTable;
///
/// let table = BlocklistTable::from_entries(["192.0.2.1", "# comment", "198.51.100.0/24", "bogus"]);
/// assert_eq!(table.len(), 2);
/// assert!(table.contains("198.51.100.42".parse().unwrap()));
/// assert!(!table.contains("192.0.2.2".parse().unwrap()));
/// ```
#[derive(Debug, Clone, Default)]
pub struct BlocklistTable {
    entries: Vec<NetworkRange>,
}

impl BlocklistTable {
    /// Creates an empty table that matches nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a table from a file on disk.
    ///
    /// # Errors
    ///
    /// Returns [`BlockGateError::BlocklistUnreadable`] if the file cannot be
    /// opened or read. Invalid lines are not errors.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let unreadable = |source: std::io::Error| BlockGateError::BlocklistUnreadable {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path).map_err(unreadable)?;
        let table = Self::from_reader(BufReader::new(file)).map_err(unreadable)?;

        debug!(path = %path.display(), entries = table.len(), "Blocklist file parsed");
        Ok(table)
    }

    /// Loads a table from any buffered line source.
    ///
    /// Lines that are not valid UTF-8 are decoded lossily and will simply
    /// fail to parse as entries.
    pub fn from_reader<R: BufRead>(mut reader: R) -> std::io::Result<Self> {
        let mut table = Self::new();
        let mut buf = Vec::new();

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            table.push_line(&String::from_utf8_lossy(&buf));
        }

        Ok(table)
    }

    /// Builds a table from in-memory lines, applying the same rules as a file.
    pub fn from_entries<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut table = Self::new();
        for line in lines {
            table.push_line(line.as_ref());
        }
        table
    }

    /// Parses one blocklist line.
    ///
    /// Returns `None` for blank lines, comments, and anything that is not an
    /// address or CIDR block.
    pub fn parse_entry(line: &str) -> Option<NetworkRange> {
        let entry = strip_comment(line);
        if entry.is_empty() {
            return None;
        }
        NetworkRange::parse(entry)
    }

    fn push_line(&mut self, line: &str) {
        match Self::parse_entry(line) {
            Some(range) => self.entries.push(range),
            None => {
                let entry = strip_comment(line);
                if !entry.is_empty() {
                    debug!(entry = %entry, "Ignoring invalid blocklist entry");
                }
            }
        }
    }

    /// Returns `true` if `addr` is inside at least one entry.
    pub fn contains(&self, addr: IpAddr) -> bool {
        self.entries.iter().any(|range| range.contains(addr))
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over entries in load order.
    pub fn iter(&self) -> impl Iterator<Item = &NetworkRange> {
        self.entries.iter()
    }
}

/// Trims a line and drops everything from the first `#`.
fn strip_comment(line: &str) -> &str {
    let line = line.trim();
    match line.find('#') {
        Some(pos) => line[..pos].trim_end(),
        None => line,
    }
}
