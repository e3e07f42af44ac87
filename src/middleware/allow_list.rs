//! CIDR allow-list used by the access guard.
//!
//! Entries are parsed once at construction with [`ipnet`]. Parsing is
//! all-or-nothing: the first malformed entry aborts construction and is named
//! in the returned [`GuardError`].
//!
//! # Accepted Formats
//!
//! - CIDR notation: `10.0.0.0/8`, `2001:db8::/32`
//! - Bare addresses: `192.168.1.1` (treated as `/32`), `::1` (treated as `/128`)
//!
//! Host bits in a CIDR entry are masked off, so `10.1.2.3/8` is stored as
//! `10.0.0.0/8`. Entries written in IPv4-mapped form are stored as IPv4, so
//! `::ffff:10.0.0.0/104` becomes `10.0.0.0/8`.
//!
//! # Empty Lists
//!
//! An empty allow-list matches nothing. A guard built from it denies every
//! request.

use std::net::IpAddr;

use ipnet::{IpNet, Ipv4Net};

use crate::error::GuardError;

/// Immutable, ordered set of allowed network ranges.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowList {
    ranges: Vec<IpNet>,
}

impl AllowList {
    /// Parse a list of CIDR strings.
    ///
    /// # Errors
    ///
    /// Returns [`GuardError::EmptyEntry`] for blank entries and
    /// [`GuardError::InvalidCidr`] for anything that is neither a CIDR range
    /// nor a bare IP address.
    pub fn parse<S: AsRef<str>>(entries: &[S]) -> Result<Self, GuardError> {
        let ranges = entries
            .iter()
            .enumerate()
            .map(|(index, entry)| parse_range(index, entry.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { ranges })
    }

    /// Check if an address falls within any configured range.
    ///
    /// IPv4-mapped IPv6 addresses are compared in their IPv4 form.
    #[inline]
    pub fn contains(&self, ip: IpAddr) -> bool {
        let ip = ip.to_canonical();
        self.ranges.iter().any(|range| range.contains(&ip))
    }

    /// Parse `ip` and check membership. Unparseable input is never allowed.
    pub fn is_allowed(&self, ip: &str) -> bool {
        ip.parse::<IpAddr>().is_ok_and(|ip| self.contains(ip))
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &IpNet> {
        self.ranges.iter()
    }
}

fn parse_range(index: usize, entry: &str) -> Result<IpNet, GuardError> {
    let trimmed = entry.trim();
    if trimmed.is_empty() {
        return Err(GuardError::EmptyEntry { index });
    }

    if trimmed.contains('/') {
        return trimmed
            .parse::<IpNet>()
            .map(|net| canonical_range(net.trunc()))
            .map_err(|e| GuardError::InvalidCidr {
                entry: trimmed.to_string(),
                reason: e.to_string(),
            });
    }

    // Single address, implicit /32 or /128
    let addr = trimmed
        .parse::<IpAddr>()
        .map_err(|e| GuardError::InvalidCidr {
            entry: trimmed.to_string(),
            reason: e.to_string(),
        })?;
    let prefix_len = match addr {
        IpAddr::V4(_) => 32,
        IpAddr::V6(_) => 128,
    };

    IpNet::new(addr, prefix_len)
        .map(canonical_range)
        .map_err(|e| GuardError::InvalidCidr {
            entry: trimmed.to_string(),
            reason: e.to_string(),
        })
}

/// Collapse an IPv4-mapped IPv6 range into its IPv4 equivalent.
///
/// Client addresses are canonicalized before lookup, so a range left in
/// mapped form would never match.
fn canonical_range(net: IpNet) -> IpNet {
    let IpNet::V6(v6) = net else {
        return net;
    };
    match v6.addr().to_ipv4_mapped() {
        Some(v4) if v6.prefix_len() >= 96 => Ipv4Net::new(v4, v6.prefix_len() - 96)
            .map(IpNet::V4)
            .unwrap_or(net),
        _ => net,
    }
}
