use std::sync::Arc;

use axum::{
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    middleware::{make_span_with_request_id, request_id_middleware},
    services::GroupService,
};

pub mod feedback;
pub mod groups;
pub mod preferences;
pub mod recommendations;

/// Shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub groups: Arc<GroupService>,
}

impl AppState {
    pub fn new(groups: GroupService) -> Self {
        Self {
            groups: Arc::new(groups),
        }
    }
}

/// Creates the application router with all routes and layers
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/groups", post(groups::create_group))
        .route("/groups/:group_id", get(groups::group_status))
        .route("/groups/:group_id/members", post(groups::join_group))
        .route(
            "/groups/:group_id/members/:user_id/preferences",
            post(preferences::submit_preferences),
        )
        .route(
            "/groups/:group_id/members/:user_id/recommendations",
            get(recommendations::group_recommendations),
        )
        .route(
            "/groups/:group_id/members/:user_id/ratings",
            post(feedback::submit_ratings),
        )
        .route(
            "/groups/:group_id/members/:user_id/review",
            post(feedback::submit_review),
        )
        .route("/groups/:group_id/top-rated", get(recommendations::top_rated))
}

async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
