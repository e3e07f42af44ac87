//! IP allow-list access guard.
//!
//! [`AccessGuardLayer`] wraps exactly one inner service. For every request it
//! resolves the client address with its [`TrustPolicy`], checks it against its
//! [`AllowList`], and either forwards the request untouched or answers it
//! directly:
//!
//! | Outcome | Response |
//! |---|---|
//! | Address inside any allowed range | forwarded to the inner service |
//! | Address outside every range | `403 Forbidden` |
//! | Header value is not an IP address | `403 Forbidden` |
//! | Trusted header missing | `403 Forbidden` |
//! | No socket address in direct mode | `400 Bad Request` |
//!
//! The inner service is never called for a rejected request.
//!
//! # Usage
//!
//! ```rust,ignore
//! let guard = AccessGuardLayer::new(&GuardConfig {
//!     source_range: vec!["10.0.0.0/8".to_string()],
//!     ..GuardConfig::default()
//! })?;
//!
//! let app = Router::new()
//!     .route("/internal", get(handler))
//!     .route_layer(guard);
//! ```
//!
//! Direct mode reads `ConnectInfo<SocketAddr>`, so serve the router with
//! `into_make_service_with_connect_info::<SocketAddr>()`.

use std::net::IpAddr;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::response::IntoResponse;
use tower::{Layer, Service};
use tracing::{debug, info, warn};

use super::allow_list::AllowList;
use super::ip::{AddressSource, Resolution, TrustPolicy};
use crate::config::GuardConfig;
use crate::error::GuardError;
use crate::metrics;

/// Name used when a guard is built without one.
pub const DEFAULT_GUARD_NAME: &str = "ip-guard";

/// Verdict for a single request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Forward to the inner service.
    Allow { ip: IpAddr, source: AddressSource },
    /// Answer `403 Forbidden`.
    Forbid,
    /// Answer `400 Bad Request`.
    BadRequest,
}

impl Decision {
    /// Metric label for this decision.
    pub fn label(&self) -> &'static str {
        match self {
            Decision::Allow { .. } => "allowed",
            Decision::Forbid => "forbidden",
            Decision::BadRequest => "bad_request",
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow { .. })
    }
}

#[derive(Debug)]
struct GuardInner {
    name: String,
    allow_list: AllowList,
    policy: TrustPolicy,
}

/// Tower layer enforcing an IP allow-list.
///
/// Cloning is cheap; all clones share one immutable allow-list and policy.
#[derive(Debug, Clone)]
pub struct AccessGuardLayer {
    inner: Arc<GuardInner>,
}

impl AccessGuardLayer {
    /// Build a guard named [`DEFAULT_GUARD_NAME`].
    ///
    /// # Errors
    ///
    /// Fails on the first malformed range or an invalid real-IP header name.
    pub fn new(config: &GuardConfig) -> Result<Self, GuardError> {
        Self::named(DEFAULT_GUARD_NAME, config)
    }

    /// Build a guard whose name appears in logs and metric labels.
    ///
    /// # Errors
    ///
    /// Fails on the first malformed range or an invalid real-IP header name.
    pub fn named(name: impl Into<String>, config: &GuardConfig) -> Result<Self, GuardError> {
        let allow_list = AllowList::parse(&config.source_range)?;
        let policy = TrustPolicy::new(
            config.x_forwarded_for,
            config.proxy,
            config.x_real_ip_header.as_deref(),
        )?;

        Ok(Self::from_parts(name, allow_list, policy))
    }

    /// Assemble a guard from already-validated parts.
    pub fn from_parts(name: impl Into<String>, allow_list: AllowList, policy: TrustPolicy) -> Self {
        let name = name.into();

        if allow_list.is_empty() {
            warn!(guard = %name, "Allow-list is empty, every request will be denied");
        } else {
            info!(
                guard = %name,
                ranges = allow_list.len(),
                x_forwarded_for = policy.trusts_forwarded_for(),
                proxy = policy.is_behind_proxy(),
                real_ip_header = ?policy.real_ip_header(),
                "Access guard configured"
            );
        }
        metrics::set_allowed_ranges(&name, allow_list.len());

        Self {
            inner: Arc::new(GuardInner {
                name,
                allow_list,
                policy,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn allow_list(&self) -> &AllowList {
        &self.inner.allow_list
    }

    pub fn policy(&self) -> &TrustPolicy {
        &self.inner.policy
    }

    /// Decide what to do with `req` without running anything.
    pub fn decide<B>(&self, req: &Request<B>) -> Decision {
        self.inner.decide(req)
    }
}

impl GuardInner {
    fn decide<B>(&self, req: &Request<B>) -> Decision {
        match self.policy.resolve(req) {
            Resolution::Resolved { ip, source } if self.allow_list.contains(ip) => {
                Decision::Allow { ip, source }
            }
            Resolution::Resolved { ip, source } => {
                debug!(
                    guard = %self.name,
                    client_ip = %ip,
                    source = source.as_str(),
                    path = %req.uri().path(),
                    "Client address not in allow-list"
                );
                Decision::Forbid
            }
            Resolution::Unparseable { raw, source } => {
                debug!(
                    guard = %self.name,
                    raw = %raw,
                    source = source.as_str(),
                    "Client address is not an IP address"
                );
                Decision::Forbid
            }
            Resolution::Missing(AddressSource::RemoteAddr) => {
                warn!(
                    guard = %self.name,
                    "No connection address on request; serve with ConnectInfo<SocketAddr>"
                );
                Decision::BadRequest
            }
            Resolution::Missing(source) => {
                debug!(
                    guard = %self.name,
                    source = source.as_str(),
                    "Trusted client address header missing"
                );
                Decision::Forbid
            }
        }
    }
}

impl<S> Layer<S> for AccessGuardLayer {
    type Service = AccessGuardService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AccessGuardService {
            inner,
            guard: self.inner.clone(),
        }
    }
}

/// Access guard service wrapper.
#[derive(Debug, Clone)]
pub struct AccessGuardService<S> {
    inner: S,
    guard: Arc<GuardInner>,
}

impl<S> Service<Request<Body>> for AccessGuardService<S>
where
    S: Service<Request<Body>, Response = Response<Body>> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response<Body>;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let decision = self.guard.decide(&req);
        metrics::record_guard_decision(&self.guard.name, decision.label());

        match decision {
            Decision::Allow { .. } => {
                // Call the instance that was polled ready, keep a fresh clone behind
                let clone = self.inner.clone();
                let mut inner = std::mem::replace(&mut self.inner, clone);
                Box::pin(async move { inner.call(req).await })
            }
            Decision::Forbid => {
                let response = status_response(StatusCode::FORBIDDEN);
                Box::pin(async move { Ok::<_, S::Error>(response) })
            }
            Decision::BadRequest => {
                let response = status_response(StatusCode::BAD_REQUEST);
                Box::pin(async move { Ok::<_, S::Error>(response) })
            }
        }
    }
}

/// Terminal response carrying only the status text.
fn status_response(status: StatusCode) -> Response<Body> {
    (status, status.canonical_reason().unwrap_or_default()).into_response()
}
