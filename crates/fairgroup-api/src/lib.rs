//! fairgroup-api — REST API for FairGroup.
//!
//! Accepts rosters as JSON or CSV and returns balanced groups. One-shot
//! endpoints build a fresh roster per request; roster sessions make
//! accumulation across requests explicit.
//!
//! # API Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/api` | Service banner |
//! | POST | `/api/assign/:group` | Assign a JSON roster |
//! | POST | `/api/assign-csv/:group` | Assign a CSV roster |
//! | POST | `/api/rosters` | Open a roster session |
//! | GET | `/api/rosters/:id` | Session contents |
//! | DELETE | `/api/rosters/:id` | Close a session |
//! | POST | `/api/rosters/:id/students` | Add JSON records |
//! | POST | `/api/rosters/:id/students-csv` | Add CSV records |
//! | POST | `/api/rosters/:id/assign/:group` | Assign the session roster |
//! | GET | `/healthz` | Liveness |

pub mod handlers;
pub mod roster_csv;
pub mod sessions;

use std::sync::Arc;

use axum::Router;
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use fairgroup_core::{FairGroupConfig, GradeRange};
use fairgroup_partition::Balancer;
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tracing::warn;

use crate::sessions::SessionStore;

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub range: GradeRange,
    pub balancer: Balancer,
    pub sessions: Arc<SessionStore>,
}

impl ApiState {
    pub fn from_config(config: &FairGroupConfig) -> Self {
        Self {
            range: config.grade_range(),
            balancer: Balancer::new(config.max_rounds()),
            sessions: SessionStore::new(),
        }
    }
}

/// An empty origin list mirrors the request origin.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(AllowHeaders::mirror_request());

    if origins.is_empty() {
        return cors.allow_origin(AllowOrigin::mirror_request());
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    cors.allow_origin(AllowOrigin::list(allowed))
}

/// Build the complete API router.
pub fn build_router(config: &FairGroupConfig) -> Router {
    let state = ApiState::from_config(config);

    Router::new()
        .route("/api", get(handlers::banner))
        .route("/api/", get(handlers::banner))
        .route("/api/assign/{group}", post(handlers::assign_json))
        .route("/api/assign-csv/{group}", post(handlers::assign_csv))
        .route("/api/rosters", post(sessions::open_roster))
        .route(
            "/api/rosters/{id}",
            get(sessions::get_roster).delete(sessions::close_roster),
        )
        .route("/api/rosters/{id}/students", post(sessions::add_students))
        .route("/api/rosters/{id}/students-csv", post(sessions::add_students_csv))
        .route("/api/rosters/{id}/assign/{group}", post(sessions::assign_roster))
        .with_state(state)
        .route("/healthz", get(handlers::healthz))
        .layer(cors_layer(&config.allowed_origins()))
}
