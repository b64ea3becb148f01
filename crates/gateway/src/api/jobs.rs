//! Job CRUD + run-now + run history + SSE events API.

use std::convert::Infallible;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Json, Response};
use futures_util::stream::Stream;
use serde::Deserialize;
use tokio::sync::broadcast::error::RecvError;
use uuid::Uuid;

use crate::runtime::jobs::{HttpMethod, Job, JobEvent};
use crate::runtime::run_log::RunRecord;
use crate::runtime::schedule::{
    cron_next_n_tz, parse_tz, validate_cron, validate_timezone, validate_url, ScheduleForm,
};
use crate::state::AppState;

/// JSON error body in the shape every endpoint uses: `{ "error": "<message>" }`.
fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let body = Json(serde_json::json!({ "error": message.into() }));
    (status, body).into_response()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// GET /v1/jobs
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn list_jobs(State(state): State<AppState>) -> impl IntoResponse {
    let mut jobs = state.jobs.list().await;
    jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    let views: Vec<_> = jobs.iter().map(|j| j.to_view()).collect();
    Json(serde_json::json!({ "count": views.len(), "jobs": views }))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// GET /v1/jobs/:id
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn get_job(State(state): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    match state.jobs.get(&id).await {
        Some(job) => {
            let tz = parse_tz(&job.timezone);
            let upcoming = cron_next_n_tz(&job.expression, &chrono::Utc::now(), 5, tz);
            Json(serde_json::json!({
                "job": job.to_view(),
                // Edit forms open in custom mode seeded with the stored
                // expression, so an untouched save round-trips it.
                "schedule_form": ScheduleForm::seed_for_edit(&job.expression),
                "next_occurrences": upcoming,
            }))
            .into_response()
        }
        None => error_response(StatusCode::NOT_FOUND, "job not found"),
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// POST /v1/jobs
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Deserialize)]
pub struct CreateJobRequest {
    pub name: String,
    pub schedule: ScheduleForm,
    pub url: String,
    #[serde(default)]
    pub method: HttpMethod,
    #[serde(default)]
    pub payload: Option<String>,
    #[serde(default = "d_utc")]
    pub timezone: String,
    #[serde(default = "d_enabled")]
    pub enabled: bool,
}

fn d_utc() -> String {
    "UTC".into()
}
fn d_enabled() -> bool {
    true
}

/// Plain `Option<Option<T>>` collapses JSON `null` and an absent field
/// into the same outer `None`; this keeps them apart so a `null` can
/// mean "clear".
fn double_option<'de, D>(de: D) -> Result<Option<Option<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    serde::Deserialize::deserialize(de).map(Some)
}

pub async fn create_job(
    State(state): State<AppState>,
    Json(req): Json<CreateJobRequest>,
) -> impl IntoResponse {
    // Names are unique across jobs
    if state.jobs.name_exists(&req.name, None).await {
        return error_response(
            StatusCode::CONFLICT,
            format!("a job named '{}' already exists", req.name),
        );
    }

    // Synthesize the expression from the form snapshot
    let built = match req.schedule.build() {
        Ok(b) => b,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
    };

    // The builder passes custom text through verbatim; well-formedness
    // is enforced here, at the acceptance boundary.
    if let Err(reason) = validate_cron(&built.expression) {
        return error_response(
            StatusCode::BAD_REQUEST,
            format!("invalid cron expression: {}", reason),
        );
    }

    // Timezone must be a known IANA name
    if let Err(reason) = validate_timezone(&req.timezone) {
        return error_response(StatusCode::BAD_REQUEST, reason);
    }

    // Target URL gets the SSRF screen
    let allow_private = state.config.executor.allow_private_urls;
    if let Err(reason) = validate_url(&req.url, allow_private) {
        return error_response(
            StatusCode::BAD_REQUEST,
            format!("invalid url '{}': {}", req.url, reason),
        );
    }

    let created_at = chrono::Utc::now();
    let job = Job {
        id: Uuid::new_v4(),
        name: req.name,
        expression: built.expression,
        description: built.description,
        url: req.url,
        method: req.method,
        payload: req.payload,
        timezone: req.timezone,
        enabled: req.enabled,
        created_at,
        updated_at: created_at,
        last_run_at: None,
        last_status: None,
        next_run_at: None,
    };

    let created = state.jobs.insert(job).await;
    (StatusCode::CREATED, Json(serde_json::json!({ "job": created.to_view() }))).into_response()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// PUT /v1/jobs/:id
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Deserialize)]
pub struct UpdateJobRequest {
    pub name: Option<String>,
    pub schedule: Option<ScheduleForm>,
    pub url: Option<String>,
    pub method: Option<HttpMethod>,
    /// `null` clears the payload, absence leaves it untouched.
    #[serde(default, deserialize_with = "double_option")]
    pub payload: Option<Option<String>>,
    pub timezone: Option<String>,
    pub enabled: Option<bool>,
}

pub async fn update_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateJobRequest>,
) -> impl IntoResponse {
    // A renamed job must not collide with an existing one
    if let Some(ref name) = req.name {
        if state.jobs.name_exists(name, Some(&id)).await {
            return error_response(
                StatusCode::CONFLICT,
                format!("a job named '{}' already exists", name),
            );
        }
    }

    // Rebuild the schedule if a new form snapshot was provided
    let built = match req.schedule {
        Some(ref form) => match form.build() {
            Ok(b) => {
                if let Err(reason) = validate_cron(&b.expression) {
                    return error_response(
                        StatusCode::BAD_REQUEST,
                        format!("invalid cron expression: {}", reason),
                    );
                }
                Some(b)
            }
            Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
        },
        None => None,
    };

    // Check a replacement timezone before touching the job
    if let Some(ref timezone) = req.timezone {
        if let Err(reason) = validate_timezone(timezone) {
            return error_response(StatusCode::BAD_REQUEST, reason);
        }
    }

    // Replacement URL goes through the same SSRF screen as create
    if let Some(ref url) = req.url {
        let allow_private = state.config.executor.allow_private_urls;
        if let Err(reason) = validate_url(url, allow_private) {
            return error_response(
                StatusCode::BAD_REQUEST,
                format!("invalid url '{}': {}", url, reason),
            );
        }
    }

    match state
        .jobs
        .update(&id, |job| {
            if let Some(name) = req.name {
                job.name = name;
            }
            if let Some(b) = built {
                job.expression = b.expression;
                job.description = b.description;
            }
            if let Some(url) = req.url {
                job.url = url;
            }
            if let Some(method) = req.method {
                job.method = method;
            }
            if let Some(payload) = req.payload {
                job.payload = payload;
            }
            if let Some(timezone) = req.timezone {
                job.timezone = timezone;
            }
            if let Some(enabled) = req.enabled {
                job.enabled = enabled;
            }
        })
        .await
    {
        Some(job) => Json(serde_json::json!({ "job": job.to_view() })).into_response(),
        None => error_response(StatusCode::NOT_FOUND, "job not found"),
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// DELETE /v1/jobs/:id
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn delete_job(State(state): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    if state.jobs.delete(&id).await {
        StatusCode::NO_CONTENT.into_response()
    } else {
        error_response(StatusCode::NOT_FOUND, "job not found")
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// POST /v1/jobs/:id/toggle
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn toggle_job(State(state): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    match state.jobs.toggle(&id).await {
        Some(job) => Json(serde_json::json!({ "job": job.to_view() })).into_response(),
        None => error_response(StatusCode::NOT_FOUND, "job not found"),
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// POST /v1/jobs/:id/run
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn run_job_now(State(state): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    let job = match state.jobs.get(&id).await {
        Some(j) => j,
        None => return error_response(StatusCode::NOT_FOUND, "job not found"),
    };

    // Shared run path; the pending scheduled occurrence stays put.
    match state.runner.run_now(job).await {
        Some(run_id) => {
            let body = Json(serde_json::json!({ "job_id": id, "run_id": run_id }));
            (StatusCode::ACCEPTED, body).into_response()
        }
        None => error_response(StatusCode::CONFLICT, "a run is already in flight"),
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// GET /v1/jobs/:id/runs + GET /v1/runs
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

const PAGE_LIMIT_CAP: usize = 200;

#[derive(Debug, Deserialize)]
pub struct PageParams {
    #[serde(default = "d_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

impl PageParams {
    /// Requested page size, capped so one query cannot dump the world.
    pub fn capped_limit(&self) -> usize {
        self.limit.min(PAGE_LIMIT_CAP)
    }
}

fn d_limit() -> usize {
    50
}

/// Paged run-history envelope shared by the global and per-job lists.
fn runs_page(runs: Vec<RunRecord>, total: usize, limit: usize, offset: usize) -> Response {
    let body = serde_json::json!({
        "runs": runs,
        "total": total,
        "limit": limit,
        "offset": offset,
    });
    Json(body).into_response()
}

pub async fn list_job_runs(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(page): Query<PageParams>,
) -> impl IntoResponse {
    // 404 before paging
    if state.jobs.get(&id).await.is_none() {
        return error_response(StatusCode::NOT_FOUND, "job not found");
    }

    let limit = page.capped_limit();
    let (runs, total) = state.run_log.list_by_job(&id, limit, page.offset).await;
    runs_page(runs, total, limit, page.offset)
}

pub async fn list_runs(
    State(state): State<AppState>,
    Query(page): Query<PageParams>,
) -> impl IntoResponse {
    let limit = page.capped_limit();
    let (runs, total) = state.run_log.list(limit, page.offset).await;
    runs_page(runs, total, limit, page.offset)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// GET /v1/jobs/events (SSE)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn job_events_sse(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let mut rx = state.jobs.subscribe();

    let events = async_stream::stream! {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    let kind = match &event {
                        JobEvent::JobUpdated { .. } => "job.updated",
                        JobEvent::JobDeleted { .. } => "job.deleted",
                        JobEvent::RunStarted { .. } => "job.run_started",
                        JobEvent::RunCompleted { .. } => "job.run_completed",
                    };
                    if let Ok(body) = serde_json::to_string(&event) {
                        yield Ok(Event::default().event(kind).data(body));
                    }
                }
                // A lagged consumer only loses events, the stream stays up.
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
    };

    Sse::new(events)
}
