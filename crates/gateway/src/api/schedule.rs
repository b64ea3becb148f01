//! Schedule builder API: synthesize a cron expression from form state
//! and serve the preset catalog.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};

use crate::runtime::schedule::{ScheduleForm, PRESETS};

/// JSON error body, same shape as the jobs API: `{ "error": "<message>" }`.
fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let body = Json(serde_json::json!({ "error": message.into() }));
    (status, body).into_response()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// GET /v1/schedule/presets
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn list_presets() -> impl IntoResponse {
    Json(serde_json::json!({ "count": PRESETS.len(), "presets": PRESETS }))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// POST /v1/schedule/build
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Synthesize `{ expression, description }` from a form snapshot.
///
/// The body is a [`ScheduleForm`] tagged by `mode`; validation failures
/// come back as 400 with the offending field named in the message. Job
/// forms call this on every change to preview what would be stored.
pub async fn build_schedule(Json(form): Json<ScheduleForm>) -> Response {
    match form.build() {
        Ok(built) => Json(built).into_response(),
        Err(e) => error_response(StatusCode::BAD_REQUEST, e.to_string()),
    }
}
