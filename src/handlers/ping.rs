use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

/// Liveness probe; answers any method with 200 and an empty object.
pub async fn ping() -> Json<Value> {
    Json(json!({}))
}

/// Fallback for unmapped paths.
pub async fn not_found() -> (StatusCode, Json<Value>) {
    (StatusCode::NOT_FOUND, Json(json!({})))
}
