use std::net::SocketAddr;

use axum::Json;
use axum::extract::{ConnectInfo, Request, State};

use crate::error::{AppError, AppResult};
use crate::middleware::{RequestIdExt, X_FORWARDED_FOR};
use crate::models::WhoAmIResponse;
use crate::state::AppState;

/// Guarded demonstration endpoint.
///
/// Echoes the caller details exactly as they reached the handler. Only
/// requests admitted by the access guard get here.
///
/// # Errors
///
/// Returns `AppError::BadRequest` when an echoed header is not visible ASCII.
pub async fn whoami(
    State(state): State<AppState>,
    req: Request,
) -> AppResult<Json<WhoAmIResponse>> {
    let header = |name: &str| -> AppResult<Option<String>> {
        req.headers()
            .get(name)
            .map(|v| {
                v.to_str()
                    .map(str::to_string)
                    .map_err(|_| AppError::BadRequest(format!("{name} header is not valid text")))
            })
            .transpose()
    };

    let real_ip = match state.config.guard.x_real_ip_header.as_deref() {
        Some(name) => header(name)?,
        None => None,
    };

    Ok(Json(WhoAmIResponse {
        peer_addr: req
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.to_string()),
        forwarded_for: header(X_FORWARDED_FOR)?,
        real_ip,
        request_id: req.request_id().map(str::to_string),
    }))
}
