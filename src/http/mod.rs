//! HTTP API for the queue broker.
//!
//! Thin axum layer over [`QueueContainer`]: request parsing, response
//! rendering (JSON or delimited rows) and optional token authentication.
//!
//! # Routes
//!
//! | Method | Path | Purpose |
//! |---|---|---|
//! | POST | `/create` | Create a queue (JSON string body) |
//! | POST | `/{queue}/enqueue` | Append an element |
//! | GET | `/{queue}/dequeue` | Long-poll dequeue |
//! | POST | `/{queue}/unlock` | Clear the read lock |
//! | GET | `/queues` | Inspect one or all queues |
//! | GET | `/clear` | Reset one or all queues |
//! | GET | `/health` | Liveness, never authenticated |

pub mod audit;
mod auth;
mod handlers;
pub mod render;
pub mod types;

use axum::{
    Json, Router,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::timeout::TimeoutLayer;
use tracing::{debug, error};

use crate::config::BrokerConfig;
use crate::constants;
use crate::queue::{QueueContainer, QueueError};
use types::ErrorResponse;

/// Request-independent settings shared by all handlers.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    /// Upper bound applied to every dequeue timeout.
    pub max_dequeue_timeout: Duration,
    /// Required API token; `None` disables authentication.
    pub auth_token: Option<String>,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            max_dequeue_timeout: Duration::from_secs(constants::DEFAULT_MAX_DEQUEUE_TIMEOUT_SECS),
            auth_token: None,
        }
    }
}

impl HttpSettings {
    pub fn from_config(config: &BrokerConfig) -> Self {
        Self {
            max_dequeue_timeout: config.max_dequeue_timeout(),
            auth_token: config.auth.token.clone(),
        }
    }
}

/// State handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub(crate) container: QueueContainer,
    pub(crate) settings: Arc<HttpSettings>,
}

impl AppState {
    pub fn new(container: QueueContainer, settings: HttpSettings) -> Self {
        Self {
            container,
            settings: Arc::new(settings),
        }
    }
}

/// Build the broker router.
pub fn router(state: AppState) -> Router {
    let request_timeout = state
        .settings
        .max_dequeue_timeout
        .saturating_add(Duration::from_secs(constants::REQUEST_TIMEOUT_GRACE_SECS));

    let protected = Router::new()
        .route("/create", post(handlers::create_queue))
        .route("/queues", get(handlers::get_queues))
        .route("/clear", get(handlers::clear_queue))
        .route("/{queue_name}/enqueue", post(handlers::enqueue_element))
        .route("/{queue_name}/dequeue", get(handlers::dequeue_element))
        .route("/{queue_name}/unlock", post(handlers::unlock_read))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_token,
        ));

    #[allow(deprecated)]
    let timeout_layer = TimeoutLayer::new(request_timeout);

    Router::new()
        .route("/health", get(handlers::health))
        .merge(protected)
        .layer(timeout_layer)
        .with_state(state)
}

/// Errors returned by handlers.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error(transparent)]
    Queue(#[from] QueueError),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Queue(e) => {
                StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        } else {
            debug!(status = status.as_u16(), error = %self, "Request rejected");
        }

        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
