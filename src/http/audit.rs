//! Security audit logging for HTTP API events.
//!
//! Authentication outcomes are logged under the `audit` target for
//! monitoring and alerting.

use tracing::{debug, warn};

/// Security audit events.
#[derive(Debug, Clone)]
pub enum AuditEvent {
    /// Missing or wrong API token
    AuthFailure {
        remote_addr: String,
        path: String,
        reason: &'static str,
    },
    /// Token accepted (for correlation)
    AuthSuccess { remote_addr: String, path: String },
}

/// Log a security audit event with structured fields.
pub fn log_audit_event(event: AuditEvent) {
    match event {
        AuditEvent::AuthFailure {
            remote_addr,
            path,
            reason,
        } => {
            warn!(
                target: "audit",
                event_type = "auth_failure",
                %remote_addr,
                %path,
                reason,
                "Authentication failed"
            );
        },
        AuditEvent::AuthSuccess { remote_addr, path } => {
            debug!(
                target: "audit",
                event_type = "auth_success",
                %remote_addr,
                %path,
                "Authentication succeeded"
            );
        },
    }
}
