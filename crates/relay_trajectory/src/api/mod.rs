//! HTTP query surface.
//!
//! ```text
//! GET /loops/{loop_id}?format=summary|json
//! GET /traces/{trace_id}?format=summary|json
//! GET /calls/{key}
//! GET /context-stats?trace_id=..&capability=..&format=summary|json
//! ```
//!
//! Errors are JSON objects of the form `{"error": "..."}`.

mod error;

pub use error::{HttpError, HttpErrorKind};

use crate::{ContextStats, Format, Reconstructor, Trajectory};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use relay_error::ValidationErrorKind;
use relay_storage::CallRecord;
use serde::Deserialize;
use std::str::FromStr;
use std::sync::Arc;
use tracing::instrument;

/// Shared state of the query handlers.
#[derive(Debug, Clone)]
pub struct ApiState {
    reconstructor: Arc<Reconstructor>,
}

impl ApiState {
    /// State over a reconstructor.
    pub fn new(reconstructor: Arc<Reconstructor>) -> Self {
        Self { reconstructor }
    }
}

/// Query parameters of the trajectory routes.
#[derive(Debug, Default, Deserialize)]
pub struct TrajectoryQuery {
    /// "summary" (default) or "json"
    pub format: Option<String>,
}

/// Query parameters of the context statistics route.
#[derive(Debug, Default, Deserialize)]
pub struct ContextStatsQuery {
    /// Trace to analyze; required
    pub trace_id: Option<String>,
    /// Restrict to one capability
    pub capability: Option<String>,
    /// "json" adds per-call details
    pub format: Option<String>,
}

/// Create the query router.
pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/loops", get(missing_loop_id))
        .route("/loops/", get(missing_loop_id))
        .route("/loops/:loop_id", get(get_loop_trajectory))
        .route("/traces", get(missing_trace_id))
        .route("/traces/", get(missing_trace_id))
        .route("/traces/:trace_id", get(get_trace_trajectory))
        .route("/calls", get(missing_call_key))
        .route("/calls/", get(missing_call_key))
        .route("/calls/:key", get(get_call))
        .route("/context-stats", get(get_context_stats))
        .with_state(state)
}

/// Create the query router mounted under `prefix`, e.g. `/trajectory-api`.
///
/// A trailing slash on the prefix is ignored; an empty prefix mounts at the root.
pub fn create_router_with_prefix(prefix: &str, state: ApiState) -> Router {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        create_router(state)
    } else if prefix.starts_with('/') {
        Router::new().nest(prefix, create_router(state))
    } else {
        Router::new().nest(&format!("/{}", prefix), create_router(state))
    }
}

fn parse_format(format: Option<&str>) -> Result<Format, HttpError> {
    match format.map(str::trim) {
        None | Some("") => Ok(Format::Summary),
        Some(value) => Format::from_str(value).map_err(|_| {
            HttpError::bad_request(ValidationErrorKind::InvalidValue {
                field: "format",
                value: value.to_string(),
            })
        }),
    }
}

fn required_id(value: &str, field: &'static str) -> Result<String, HttpError> {
    let value = value.trim();
    if value.is_empty() {
        Err(HttpError::bad_request(ValidationErrorKind::MissingId(field)))
    } else {
        Ok(value.to_string())
    }
}

async fn missing_loop_id() -> HttpError {
    HttpError::bad_request(ValidationErrorKind::MissingId("loop_id"))
}

async fn missing_trace_id() -> HttpError {
    HttpError::bad_request(ValidationErrorKind::MissingId("trace_id"))
}

async fn missing_call_key() -> HttpError {
    HttpError::bad_request(ValidationErrorKind::MissingId("key"))
}

#[instrument(skip(state, query))]
async fn get_loop_trajectory(
    State(state): State<ApiState>,
    Path(loop_id): Path<String>,
    Query(query): Query<TrajectoryQuery>,
) -> Result<Json<Trajectory>, HttpError> {
    let loop_id = required_id(&loop_id, "loop_id")?;
    let format = parse_format(query.format.as_deref())?;
    state
        .reconstructor
        .by_loop(&loop_id, format)
        .await
        .map_err(|e| HttpError::from_relay("failed to retrieve trajectory", &e))?
        .map(Json)
        .ok_or_else(|| HttpError::not_found("loop"))
}

#[instrument(skip(state, query))]
async fn get_trace_trajectory(
    State(state): State<ApiState>,
    Path(trace_id): Path<String>,
    Query(query): Query<TrajectoryQuery>,
) -> Result<Json<Trajectory>, HttpError> {
    let trace_id = required_id(&trace_id, "trace_id")?;
    let format = parse_format(query.format.as_deref())?;
    state
        .reconstructor
        .by_trace(&trace_id, format)
        .await
        .map_err(|e| HttpError::from_relay("failed to retrieve trajectory", &e))?
        .map(Json)
        .ok_or_else(|| HttpError::not_found("trace"))
}

#[instrument(skip(state))]
async fn get_call(
    State(state): State<ApiState>,
    Path(key): Path<String>,
) -> Result<Json<CallRecord>, HttpError> {
    let key = required_id(&key, "key")?;
    state
        .reconstructor
        .calls()
        .get(&key)
        .await
        .map_err(|e| HttpError::from_relay("failed to retrieve call", &e))?
        .map(Json)
        .ok_or_else(|| HttpError::not_found("call"))
}

#[instrument(skip(state, query))]
async fn get_context_stats(
    State(state): State<ApiState>,
    Query(query): Query<ContextStatsQuery>,
) -> Result<Json<ContextStats>, HttpError> {
    let trace_id = required_id(query.trace_id.as_deref().unwrap_or(""), "trace_id")?;
    let format = parse_format(query.format.as_deref())?;
    let calls = state
        .reconstructor
        .calls()
        .get_by_trace(&trace_id)
        .await
        .map_err(|e| HttpError::from_relay("failed to retrieve call data", &e))?;

    let capability = query.capability.as_deref().filter(|c| !c.is_empty());
    Ok(Json(ContextStats::from_calls(
        &calls,
        capability,
        format == Format::Json,
    )))
}
