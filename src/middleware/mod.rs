//! HTTP middleware for IP-based access control and request correlation.
//!
//! - **Allow-list**: CIDR ranges parsed once, immutable afterwards
//! - **Address resolution**: socket peer, `X-Forwarded-For`, or a configured
//!   real-IP header, depending on the trust policy
//! - **Access guard**: Tower layer that forwards or rejects each request
//! - **Request ID**: generation and propagation of `X-Request-Id`
//!
//! # Architecture
//!
//! ```text
//! Request → Request ID → Trace → Access Guard → Handler → Response
//!                                     ↓
//!                          403 Forbidden / 400 Bad Request
//! ```

pub mod allow_list;
pub mod guard;
pub mod ip;
pub mod request_id;

pub use allow_list::AllowList;
pub use guard::{AccessGuardLayer, AccessGuardService, DEFAULT_GUARD_NAME, Decision};
pub use ip::{AddressSource, Resolution, TrustPolicy, X_FORWARDED_FOR, normalize_candidate};
pub use request_id::{
    REQUEST_ID_HEADER, RequestIdExt, UuidRequestId, propagate_request_id_layer,
    set_request_id_layer,
};
