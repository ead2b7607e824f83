//! Roster sessions — explicit open/add/assign/close lifecycle.
//!
//! A session accumulates records across several requests before one or
//! more assignments. Sessions are independent of each other and of the
//! one-shot endpoints.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use fairgroup_core::{GradeRecord, Individual};
use fairgroup_partition::{AddSummary, Roster};
use tokio::sync::RwLock;
use tracing::info;

use crate::ApiState;
use crate::handlers::{ApiResponse, assignment_response, error_response};
use crate::roster_csv::parse_records;

/// Open rosters keyed by session id.
#[derive(Debug, Default)]
pub struct SessionStore {
    next_id: AtomicU64,
    rosters: RwLock<HashMap<u64, Roster>>,
}

impl SessionStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub async fn open(&self, roster: Roster) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.rosters.write().await.insert(id, roster);
        id
    }

    pub async fn close(&self, id: u64) -> bool {
        self.rosters.write().await.remove(&id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.rosters.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rosters.read().await.is_empty()
    }
}

/// Serializable session status for API responses.
#[derive(Debug, serde::Serialize)]
pub struct SessionStatus {
    pub id: u64,
    pub size: usize,
    pub students: Vec<Individual>,
}

#[derive(Debug, serde::Serialize)]
pub struct OpenedSession {
    pub id: u64,
}

const NOT_FOUND: &str = "roster session not found";

/// POST /api/rosters
pub async fn open_roster(State(state): State<ApiState>) -> impl IntoResponse {
    let id = state.sessions.open(Roster::with_range(state.range)).await;
    info!(session = id, "roster session opened");
    (StatusCode::CREATED, ApiResponse::ok(OpenedSession { id })).into_response()
}

/// GET /api/rosters/:id
pub async fn get_roster(State(state): State<ApiState>, Path(id): Path<u64>) -> impl IntoResponse {
    let rosters = state.sessions.rosters.read().await;
    match rosters.get(&id) {
        Some(roster) => ApiResponse::ok(SessionStatus {
            id,
            size: roster.len(),
            students: roster.snapshot(),
        })
        .into_response(),
        None => error_response(NOT_FOUND, StatusCode::NOT_FOUND),
    }
}

async fn add_to_session(state: &ApiState, id: u64, records: Vec<GradeRecord>) -> Response {
    let mut rosters = state.sessions.rosters.write().await;
    let Some(roster) = rosters.get_mut(&id) else {
        return error_response(NOT_FOUND, StatusCode::NOT_FOUND);
    };
    let summary: AddSummary = roster.extend_records(records);
    info!(
        session = id,
        inserted = summary.inserted,
        duplicates = summary.duplicates,
        rejected = summary.rejected,
        size = roster.len(),
        "records added to roster session"
    );
    ApiResponse::ok(summary).into_response()
}

/// POST /api/rosters/:id/students
pub async fn add_students(
    State(state): State<ApiState>,
    Path(id): Path<u64>,
    Json(records): Json<Vec<GradeRecord>>,
) -> impl IntoResponse {
    add_to_session(&state, id, records).await
}

/// POST /api/rosters/:id/students-csv
pub async fn add_students_csv(
    State(state): State<ApiState>,
    Path(id): Path<u64>,
    body: String,
) -> impl IntoResponse {
    match parse_records(&body) {
        Ok(records) => add_to_session(&state, id, records).await,
        Err(e) => error_response(&e.to_string(), StatusCode::BAD_REQUEST),
    }
}

/// POST /api/rosters/:id/assign/:group
///
/// The session stays open, so the same roster can be re-split.
pub async fn assign_roster(
    State(state): State<ApiState>,
    Path((id, group)): Path<(u64, i64)>,
) -> impl IntoResponse {
    let rosters = state.sessions.rosters.read().await;
    match rosters.get(&id) {
        Some(roster) => assignment_response(&state, roster, group),
        None => error_response(NOT_FOUND, StatusCode::NOT_FOUND),
    }
}

/// DELETE /api/rosters/:id
pub async fn close_roster(State(state): State<ApiState>, Path(id): Path<u64>) -> impl IntoResponse {
    if state.sessions.close(id).await {
        info!(session = id, "roster session closed");
        ApiResponse::ok("closed").into_response()
    } else {
        error_response(NOT_FOUND, StatusCode::NOT_FOUND)
    }
}
