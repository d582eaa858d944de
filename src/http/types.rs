//! Request and response types for the HTTP API.
//!
//! Query values are taken as raw strings and parsed leniently: a bad
//! `maxResponseElements` or `timeout` falls back to its default instead of
//! failing the request.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::AppError;
use crate::constants;
use crate::queue::{ElementType, TypeFilter};

/// Query parameters of `GET /{queue}/dequeue`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DequeueQuery {
    pub element_type: Option<String>,
    pub max_response_elements: Option<String>,
    /// Seconds, fractional values allowed.
    pub timeout: Option<String>,
    pub lock_read: Option<String>,
}

impl DequeueQuery {
    /// Absent, empty or `-1` selects every type.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::BadRequest`] if `elementType` is not an integer.
    pub fn filter(&self) -> Result<TypeFilter, AppError> {
        match self.element_type.as_deref().map(str::trim) {
            None | Some("") => Ok(TypeFilter::Any),
            Some(raw) => raw
                .parse::<ElementType>()
                .map(|t| TypeFilter::from_wire(Some(t)))
                .map_err(|_| AppError::BadRequest(format!("Invalid elementType: {raw}"))),
        }
    }

    /// Zero or negative means no limit; missing or unparseable means 1.
    pub fn max_count(&self) -> usize {
        let parsed = self
            .max_response_elements
            .as_deref()
            .and_then(|raw| raw.trim().parse::<i64>().ok());

        match parsed {
            Some(n) if n > 0 => usize::try_from(n).unwrap_or(usize::MAX),
            Some(_) => 0,
            None => constants::DEFAULT_MAX_RESPONSE_ELEMENTS,
        }
    }

    /// Requested wait, defaulted and clamped to `max`.
    pub fn timeout(&self, max: Duration) -> Duration {
        let default = Duration::from_secs(constants::DEFAULT_DEQUEUE_TIMEOUT_SECS);
        let requested = self
            .timeout
            .as_deref()
            .and_then(|raw| raw.trim().parse::<f64>().ok())
            .filter(|secs| !secs.is_nan())
            .map_or(default, |secs| {
                Duration::try_from_secs_f64(secs.max(0.0)).unwrap_or(max)
            });
        requested.min(max)
    }

    pub fn lock_read(&self) -> bool {
        self.lock_read.as_deref().is_some_and(|raw| {
            let raw = raw.trim();
            raw == "1" || raw.eq_ignore_ascii_case("true") || raw.eq_ignore_ascii_case("yes")
        })
    }
}

/// Query parameters of `GET /queues` and `GET /clear`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueIdQuery {
    pub queue_id: Option<String>,
}

impl QueueIdQuery {
    /// Requested name; empty means "all queues".
    pub fn name(&self) -> &str {
        self.queue_id.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub queues: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
