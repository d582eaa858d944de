//! Queue API handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{Level, debug, warn};

use super::render::{self, CsvFormat};
use super::types::{DequeueQuery, HealthResponse, QueueIdQuery};
use super::{AppError, AppState};
use crate::constants;
use crate::queue::{Element, QueueSnapshot};

/// Pretty-print a payload at debug level.
fn log_json<T: Serialize + ?Sized>(action: &'static str, queue: &str, payload: &T) {
    if !tracing::enabled!(Level::DEBUG) {
        return;
    }
    match serde_json::to_string_pretty(payload) {
        Ok(json) => debug!(queue = %queue, action, "{json}"),
        Err(e) => warn!(queue = %queue, action, error = %e, "Error during json encoding for console"),
    }
}

/// POST /create - Create a queue named by the JSON string body.
pub(crate) async fn create_queue(
    State(state): State<AppState>,
    Json(name): Json<String>,
) -> Result<StatusCode, AppError> {
    if name.is_empty() {
        return Err(AppError::BadRequest("Queue name cannot be empty".to_string()));
    }
    state.container.ensure_exists(&name);
    Ok(StatusCode::CREATED)
}

/// POST /{queue}/enqueue - Append an element.
pub(crate) async fn enqueue_element(
    State(state): State<AppState>,
    Path(queue_name): Path<String>,
    Json(element): Json<Element>,
) -> StatusCode {
    log_json("enqueued", &queue_name, &element);
    state.container.enqueue(&queue_name, element);
    StatusCode::CREATED
}

/// GET /{queue}/dequeue - Long-poll for matching elements.
pub(crate) async fn dequeue_element(
    State(state): State<AppState>,
    Path(queue_name): Path<String>,
    Query(query): Query<DequeueQuery>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let filter = query.filter()?;
    let timeout = query.timeout(state.settings.max_dequeue_timeout);

    let elements = state
        .container
        .dequeue(
            &queue_name,
            timeout,
            filter,
            query.max_count(),
            query.lock_read(),
        )
        .await?;
    log_json("dequeued", &queue_name, &elements);

    if render::wants_csv(&headers) {
        let body = render::render_rows(&elements, &CsvFormat::from_headers(&headers));
        return Ok(([(CONTENT_TYPE, constants::CSV_MEDIA_TYPE)], body).into_response());
    }
    Ok(Json(elements).into_response())
}

/// POST /{queue}/unlock - Clear the read lock.
pub(crate) async fn unlock_read(
    State(state): State<AppState>,
    Path(queue_name): Path<String>,
) -> StatusCode {
    state.container.unlock_read(&queue_name);
    StatusCode::NO_CONTENT
}

/// GET /queues - All queues, or `{name: snapshot | null}` for `?queueId=`.
///
/// Never creates a queue.
pub(crate) async fn get_queues(
    State(state): State<AppState>,
    Query(query): Query<QueueIdQuery>,
) -> Json<BTreeMap<String, Option<QueueSnapshot>>> {
    let name = query.name();
    if name.is_empty() {
        let all = state
            .container
            .get_all()
            .into_iter()
            .map(|(name, queue)| (name, Some(queue.snapshot())))
            .collect();
        return Json(all);
    }

    let one = state.container.get_by_name(name).map(|q| q.snapshot());
    Json(BTreeMap::from([(name.to_string(), one)]))
}

/// GET /clear - Reset `?queueId=`, or every queue when absent.
pub(crate) async fn clear_queue(
    State(state): State<AppState>,
    Query(query): Query<QueueIdQuery>,
) -> StatusCode {
    state.container.clear(query.name());
    StatusCode::OK
}

/// GET /health - Liveness probe.
pub(crate) async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        queues: state.container.queue_count(),
    })
}
