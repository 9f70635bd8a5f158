//! Represents the `/health` endpoint handler.

use axum::response::{IntoResponse, Json};
use serde_json::json;

/// Reports that the process is up and serving.
pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}
