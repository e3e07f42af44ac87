//! Client address resolution for the access guard.
//!
//! A [`TrustPolicy`] decides which part of a request names the client:
//!
//! 1. The configured real-IP header, if the deployment is behind a proxy, a
//!    header name is configured, and the header is present
//! 2. `X-Forwarded-For`, if forwarded-for is trusted
//! 3. The socket peer address from Axum's `ConnectInfo<SocketAddr>`
//!
//! The first applicable source wins. Once forwarded-for is trusted, a request
//! without that header does not fall back to the socket address.
//!
//! # Header Normalization
//!
//! Header values go through [`normalize_candidate`]:
//!
//! - Only the first hop of a comma-separated list is used
//!   (`"203.0.113.50, 70.41.3.18"` → `203.0.113.50`)
//! - A trailing port is removed only when the value is a valid socket address
//!   (`"203.0.113.5:51820"`, `"[2001:db8::1]:443"`), so bare IPv6 literals
//!   keep their colons
//! - IPv4-mapped IPv6 addresses collapse to IPv4
//!
//! # Security Warning: IP Spoofing Risk
//!
//! Trusting `X-Forwarded-For` or a real-IP header is only safe when every hop
//! in front of this service is trusted infrastructure that overwrites (not
//! appends to) the header. Otherwise clients can pick their own address.

use std::net::{IpAddr, SocketAddr};

use axum::extract::ConnectInfo;
use axum::http::{HeaderName, HeaderValue, Request};

use crate::error::GuardError;

/// Header consulted when forwarded-for is trusted.
pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Where a candidate client address came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressSource {
    /// The configured real-IP header (proxy mode).
    RealIpHeader,
    /// The first hop of `X-Forwarded-For`.
    ForwardedFor,
    /// The TCP peer address of the connection.
    RemoteAddr,
}

impl AddressSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            AddressSource::RealIpHeader => "real_ip_header",
            AddressSource::ForwardedFor => "x_forwarded_for",
            AddressSource::RemoteAddr => "remote_addr",
        }
    }
}

/// Outcome of resolving a request's client address.
///
/// Borrowed values point into the request headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// A usable address was found.
    Resolved { ip: IpAddr, source: AddressSource },
    /// The chosen source held something that is not an IP address.
    /// `raw` is empty for non-visible-ASCII header values.
    Unparseable { raw: &'a str, source: AddressSource },
    /// The chosen source was absent from the request.
    Missing(AddressSource),
}

/// How to derive the candidate client address from a request.
///
/// The default policy uses only the socket peer address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrustPolicy {
    trust_forwarded_for: bool,
    behind_proxy: bool,
    real_ip_header: Option<HeaderName>,
}

impl TrustPolicy {
    /// Socket peer address only.
    pub fn direct() -> Self {
        Self::default()
    }

    /// Build a policy from its three settings.
    ///
    /// An empty `real_ip_header` is the same as none.
    ///
    /// # Errors
    ///
    /// Returns [`GuardError::InvalidHeaderName`] if `real_ip_header` is not a
    /// legal HTTP header name.
    pub fn new(
        trust_forwarded_for: bool,
        behind_proxy: bool,
        real_ip_header: Option<&str>,
    ) -> Result<Self, GuardError> {
        let real_ip_header = real_ip_header
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(|name| {
                HeaderName::try_from(name).map_err(|e| GuardError::InvalidHeaderName {
                    name: name.to_string(),
                    reason: e.to_string(),
                })
            })
            .transpose()?;

        Ok(Self {
            trust_forwarded_for,
            behind_proxy,
            real_ip_header,
        })
    }

    pub fn trusts_forwarded_for(&self) -> bool {
        self.trust_forwarded_for
    }

    pub fn is_behind_proxy(&self) -> bool {
        self.behind_proxy
    }

    pub fn real_ip_header(&self) -> Option<&HeaderName> {
        self.real_ip_header.as_ref()
    }

    /// Resolve the candidate client address of `req`.
    pub fn resolve<'r, B>(&self, req: &'r Request<B>) -> Resolution<'r> {
        if self.behind_proxy
            && let Some(name) = &self.real_ip_header
            && let Some(value) = req.headers().get(name)
        {
            return from_header(value, AddressSource::RealIpHeader);
        }

        if self.trust_forwarded_for {
            return match req.headers().get(X_FORWARDED_FOR) {
                Some(value) => from_header(value, AddressSource::ForwardedFor),
                None => Resolution::Missing(AddressSource::ForwardedFor),
            };
        }

        match req.extensions().get::<ConnectInfo<SocketAddr>>() {
            Some(ConnectInfo(addr)) => Resolution::Resolved {
                ip: addr.ip().to_canonical(),
                source: AddressSource::RemoteAddr,
            },
            None => Resolution::Missing(AddressSource::RemoteAddr),
        }
    }
}

#[inline]
fn from_header(value: &HeaderValue, source: AddressSource) -> Resolution<'_> {
    let raw = value.to_str().unwrap_or_default();
    match normalize_candidate(raw) {
        Some(ip) => Resolution::Resolved { ip, source },
        None => Resolution::Unparseable { raw, source },
    }
}

/// Reduce a raw header value to a bare IP address.
///
/// Returns `None` when nothing usable remains.
pub fn normalize_candidate(raw: &str) -> Option<IpAddr> {
    let first = raw.split(',').next()?.trim();

    if let Ok(ip) = first.parse::<IpAddr>() {
        return Some(ip.to_canonical());
    }

    // host:port or [v6]:port
    if let Ok(addr) = first.parse::<SocketAddr>() {
        return Some(addr.ip().to_canonical());
    }

    first
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .and_then(|inner| inner.parse::<IpAddr>().ok())
        .map(|ip| ip.to_canonical())
}
