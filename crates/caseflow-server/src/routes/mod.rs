//! HTTP routes.

pub mod audit;
pub mod cases;
pub mod vault;

use axum::Json;
use axum::Router;
use axum::routing::{get, patch, post};
use surrealdb::Connection;
use tower_http::trace::TraceLayer;

use crate::response::ApiResponse;
use crate::state::AppState;

async fn health() -> Json<ApiResponse<()>> {
    Json(ApiResponse::message("ok"))
}

/// Build the application router.
pub fn app<C: Connection>(state: AppState<C>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/cases/:id/status", patch(cases::update_status::<C>))
        .route("/cases/:id/transfer", post(cases::transfer::<C>))
        .route("/cases/:id/history", get(cases::history::<C>))
        .route("/vault/:case_id/unlock", post(vault::unlock::<C>))
        .route("/vault/:case_id/heartbeat", post(vault::heartbeat::<C>))
        .route("/vault/:case_id/lock", post(vault::lock::<C>))
        .route("/audit", get(audit::query::<C>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
