mod backup;
mod notifications;
mod orders;

pub use backup::*;
pub use notifications::*;
pub use orders::*;

use axum::{
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/orders", post(create_order))
        // The gateway delivers payment notifications here (at-least-once)
        .route("/webhook", post(receive_notification))
        .route("/backup/{reference}", get(backup_view))
}
