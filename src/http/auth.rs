//! Optional API token check.
//!
//! Accepts `Authorization: Bearer <token>` or `X-Api-Key: <token>`.

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::net::SocketAddr;
use subtle::ConstantTimeEq;

use super::audit::{AuditEvent, log_audit_event};
use super::{AppError, AppState};

/// Alternate header carrying the raw token.
pub(crate) const API_KEY_HEADER: &str = "x-api-key";

/// Reject requests without the configured token. No-op when none is set.
pub(crate) async fn require_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected) = state.settings.auth_token.as_deref() else {
        return next.run(request).await;
    };

    let remote_addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map_or_else(|| "unknown".to_string(), |info| info.0.to_string());
    let path = request.uri().path().to_string();

    let verdict = match presented_token(request.headers()) {
        Some(token) if tokens_match(token, expected) => Ok(()),
        Some(_) => Err("invalid token"),
        None => Err("missing token"),
    };

    match verdict {
        Ok(()) => {
            log_audit_event(AuditEvent::AuthSuccess { remote_addr, path });
            next.run(request).await
        },
        Err(reason) => {
            log_audit_event(AuditEvent::AuthFailure {
                remote_addr,
                path,
                reason,
            });
            AppError::Unauthorized(format!("Unauthorized: {reason}")).into_response()
        },
    }
}

/// Extract the token from `Authorization: Bearer` or `X-Api-Key`.
fn presented_token(headers: &HeaderMap) -> Option<&str> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer ").or_else(|| v.strip_prefix("bearer ")))
        .map(str::trim);

    bearer
        .or_else(|| headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok()))
        .filter(|t| !t.is_empty())
}

/// Constant-time comparison (length differences exit early).
fn tokens_match(presented: &str, expected: &str) -> bool {
    presented.as_bytes().ct_eq(expected.as_bytes()).into()
}
