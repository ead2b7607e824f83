//! One-shot assignment handlers.
//!
//! Each request builds its own roster, so nothing leaks between calls.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use fairgroup_core::GradeRecord;
use fairgroup_partition::{PartitionError, Roster, assign};
use tracing::debug;

use crate::ApiState;
use crate::roster_csv::parse_records;

pub const BANNER: &str = "This is the backend for FairGroupAssignment";

/// Response wrapper for consistent API format.
#[derive(serde::Serialize)]
pub(crate) struct ApiResponse<T: serde::Serialize> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: serde::Serialize> ApiResponse<T> {
    pub(crate) fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
        })
    }
}

pub(crate) fn error_response(msg: &str, status: StatusCode) -> Response {
    (
        status,
        Json(ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(msg.to_string()),
        }),
    )
        .into_response()
}

/// Run the full assignment over `roster` and shape the HTTP response.
/// Negative group counts are reported like any other invalid count.
pub(crate) fn assignment_response(state: &ApiState, roster: &Roster, group: i64) -> Response {
    let result = match usize::try_from(group) {
        Ok(k) => assign(roster, k, &state.balancer),
        Err(_) => Err(PartitionError::InvalidGroupCount {
            requested: group,
            available: roster.len(),
        }),
    };

    match result {
        Ok(assignment) => ApiResponse::ok(assignment.groups).into_response(),
        Err(e) => error_response(&e.to_string(), StatusCode::BAD_REQUEST),
    }
}

// ── Status ─────────────────────────────────────────────────────

/// GET /api
pub async fn banner() -> &'static str {
    BANNER
}

/// GET /healthz
pub async fn healthz() -> &'static str {
    "ok"
}

// ── Assignment ─────────────────────────────────────────────────

/// POST /api/assign/:group
pub async fn assign_json(
    State(state): State<ApiState>,
    Path(group): Path<i64>,
    Json(records): Json<Vec<GradeRecord>>,
) -> impl IntoResponse {
    let mut roster = Roster::with_range(state.range);
    let summary = roster.extend_records(records);
    debug!(?summary, group, "json roster received");

    assignment_response(&state, &roster, group)
}

/// POST /api/assign-csv/:group
pub async fn assign_csv(
    State(state): State<ApiState>,
    Path(group): Path<i64>,
    body: String,
) -> impl IntoResponse {
    let records = match parse_records(&body) {
        Ok(records) => records,
        Err(e) => return error_response(&e.to_string(), StatusCode::BAD_REQUEST),
    };

    let mut roster = Roster::with_range(state.range);
    let summary = roster.extend_records(records);
    debug!(?summary, group, "csv roster received");

    assignment_response(&state, &roster, group)
}
