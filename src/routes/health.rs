use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::AppState;

#[axum::debug_handler]
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let body = json!({
        "status": "ok",
        "storage": state.storage,
        "notifications_in_flight": state.pipeline.notifications().in_flight(),
    });
    (StatusCode::OK, Json(body))
}
