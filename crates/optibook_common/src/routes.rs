// --- File: crates/optibook_common/src/routes.rs ---
use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Routes shared by every deployment.
pub fn routes() -> Router {
    Router::new().route("/health", get(health))
}
