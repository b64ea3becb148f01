pub mod auth;
pub mod jobs;
pub mod schedule;

use axum::middleware;
use axum::response::IntoResponse;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};

use crate::state::AppState;

/// Build the full API router.
///
/// Routes are split into **public** (no auth required) and **protected**
/// (gated behind the `CF_API_TOKEN` bearer-token middleware).
///
/// `state` is needed to wire up the auth middleware at build time.
pub fn router(state: AppState) -> Router<AppState> {
    let public = Router::new()
        // Liveness (used by health probes)
        .route("/healthz", get(health))
        // Schedule building (the job form's backend)
        .route("/v1/schedule/presets", get(schedule::list_presets))
        .route("/v1/schedule/build", post(schedule::build_schedule));

    let protected = Router::new()
        // Jobs (cron-driven HTTP deliveries)
        .route("/v1/jobs", get(jobs::list_jobs))
        .route("/v1/jobs", post(jobs::create_job))
        .route("/v1/jobs/events", get(jobs::job_events_sse))
        .route("/v1/jobs/:id", get(jobs::get_job))
        .route("/v1/jobs/:id", put(jobs::update_job))
        .route("/v1/jobs/:id", delete(jobs::delete_job))
        .route("/v1/jobs/:id/toggle", post(jobs::toggle_job))
        .route("/v1/jobs/:id/run", post(jobs::run_job_now))
        .route("/v1/jobs/:id/runs", get(jobs::list_job_runs))
        // Run history (all jobs)
        .route("/v1/runs", get(jobs::list_runs))
        // Apply API auth middleware to all protected routes.
        .route_layer(middleware::from_fn_with_state(
            state,
            auth::require_api_token,
        ));

    public.merge(protected)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}
