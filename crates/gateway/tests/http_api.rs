//! Black-box tests of the HTTP API: every request goes through the real
//! router via `tower::ServiceExt::oneshot`, auth middleware included.
//!
//! Covered here rather than in unit tests:
//! - route wiring (paths, methods, public vs. protected split)
//! - request/response JSON shapes, status codes, and error bodies
//! - the schedule-build endpoint end to end (all modes + failures)
//! - job CRUD against the real store, including validation rejects
//! - manual run-now through the API against a local canned endpoint
//! - bearer-token enforcement when a token hash is configured

use std::sync::Arc;
use std::time::Duration;

use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::Utc;
use serde_json::json;
use sha2::{Digest, Sha256};
use tempfile::TempDir;
use tower::util::ServiceExt;
use uuid::Uuid;

use cf_domain::config::Config;
use cf_gateway::runtime::executor::Executor;
use cf_gateway::runtime::jobs::{JobStore, RunStatus};
use cf_gateway::runtime::run_log::{RunLogStore, RunRecord};
use cf_gateway::runtime::runner::JobRunner;
use cf_gateway::state::AppState;

// ── Harness ─────────────────────────────────────────────────────────────

fn test_state_with(tweak: impl FnOnce(&mut Config)) -> (AppState, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    tweak(&mut config);
    let config = Arc::new(config);

    let jobs = Arc::new(JobStore::new(dir.path()));
    let run_log = Arc::new(RunLogStore::new(dir.path()));
    let executor = Arc::new(Executor::new(&config.executor).unwrap());
    let runner = Arc::new(JobRunner::new(jobs.clone(), run_log.clone(), executor));

    let state = AppState {
        config,
        jobs,
        run_log,
        runner,
        api_token_digest: None,
    };
    (state, dir)
}

fn test_state() -> (AppState, TempDir) {
    test_state_with(|_| {})
}

fn app(state: &AppState) -> Router {
    cf_gateway::api::router(state.clone()).with_state(state.clone())
}

/// Fire one request and decode the JSON body (204s come back as null).
async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        // Extractor rejections (e.g. a malformed :id) carry a plain-text
        // body; surface it as a JSON string so callers can still assert.
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            serde_json::Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, json)
}

async fn create_job(app: &Router, name: &str, expression: &str, url: &str) -> serde_json::Value {
    let (status, body) = send(
        app,
        "POST",
        "/v1/jobs",
        Some(json!({
            "name": name,
            "schedule": { "mode": "custom", "expression": expression },
            "url": url,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {body}");
    body["job"].clone()
}

/// Minimal local HTTP endpoint: answers every connection with a canned
/// response, optionally after a delay.
async fn canned_server(status_line: &'static str, body: &'static str, delay_ms: u64) -> String {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            tokio::spawn(async move {
                let mut buf = [0u8; 1024];
                let _ = socket.read(&mut buf).await;
                if delay_ms > 0 {
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                }
                let response = format!(
                    "HTTP/1.1 {}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    status_line,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });
    format!("http://{}/hook", addr)
}

/// Poll the job endpoint until its last run has a recorded outcome.
async fn wait_for_last_status(app: &Router, id: &str) -> serde_json::Value {
    for _ in 0..200 {
        let (status, body) = send(app, "GET", &format!("/v1/jobs/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        if !body["job"]["last_status"].is_null() {
            return body["job"].clone();
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("run did not complete in time");
}

// ── Public routes ───────────────────────────────────────────────────────

#[tokio::test]
async fn healthz_reports_ok() {
    let (state, _dir) = test_state();
    let app = app(&state);

    let (status, body) = send(&app, "GET", "/healthz", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn preset_catalog_is_served() {
    let (state, _dir) = test_state();
    let app = app(&state);

    let (status, body) = send(&app, "GET", "/v1/schedule/presets", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 8);

    let presets = body["presets"].as_array().unwrap();
    assert_eq!(presets.len(), 8);
    for p in presets {
        assert!(p["id"].is_string());
        assert!(p["expression"].is_string());
        assert!(p["label"].is_string());
    }
    let hourly = presets.iter().find(|p| p["id"] == "hourly").unwrap();
    assert_eq!(hourly["expression"], "0 0 * * * *");
    assert_eq!(hourly["label"], "Every hour");
}

// ── POST /v1/schedule/build ─────────────────────────────────────────────

#[tokio::test]
async fn build_synthesizes_each_simple_mode() {
    let (state, _dir) = test_state();
    let app = app(&state);

    let (status, body) = send(
        &app,
        "POST",
        "/v1/schedule/build",
        Some(json!({ "mode": "simple", "interval": "15", "unit": "minutes" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["expression"], "0 */15 * * * *");
    assert_eq!(body["description"], "Every 15 min");

    let (status, body) = send(
        &app,
        "POST",
        "/v1/schedule/build",
        Some(json!({ "mode": "simple", "interval": "1", "unit": "hours" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["expression"], "0 0 */1 * * *");
    assert_eq!(body["description"], "Every 1 hour");

    // Daily keeps the time substrings exactly as typed ("07" stays "07").
    let (status, body) = send(
        &app,
        "POST",
        "/v1/schedule/build",
        Some(json!({ "mode": "simple", "interval": "2", "unit": "days", "time": "07:30" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["expression"], "0 30 07 */2 * *");
    assert_eq!(body["description"], "Every 2 days at 07:30");
}

#[tokio::test]
async fn build_rejects_invalid_forms_with_field_errors() {
    let (state, _dir) = test_state();
    let app = app(&state);

    let cases: Vec<(serde_json::Value, &str)> = vec![
        (
            json!({ "mode": "simple", "interval": "  ", "unit": "minutes" }),
            "interval is required",
        ),
        (
            json!({ "mode": "simple", "interval": "abc", "unit": "minutes" }),
            "whole number",
        ),
        (
            json!({ "mode": "simple", "interval": "0", "unit": "hours" }),
            "at least 1",
        ),
        (
            json!({ "mode": "simple", "interval": "3", "unit": "days" }),
            "time of day is required",
        ),
        (
            json!({ "mode": "simple", "interval": "3", "unit": "days", "time": "25:00" }),
            "HH:MM",
        ),
        (json!({ "mode": "custom", "expression": "   " }), "empty"),
    ];

    for (form, expected) in cases {
        let (status, body) = send(&app, "POST", "/v1/schedule/build", Some(form.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "form {form} was accepted");
        let message = body["error"].as_str().unwrap();
        assert!(
            message.contains(expected),
            "form {form}: error {message:?} missing {expected:?}"
        );
    }
}

#[tokio::test]
async fn build_passes_custom_and_preset_text_through() {
    let (state, _dir) = test_state();
    let app = app(&state);

    // Custom text is not validated here, even legacy 5-field cron.
    let (status, body) = send(
        &app,
        "POST",
        "/v1/schedule/build",
        Some(json!({ "mode": "custom", "expression": "5 4 * * *" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["expression"], "5 4 * * *");
    assert_eq!(body["description"], "Custom");

    let (status, body) = send(
        &app,
        "POST",
        "/v1/schedule/build",
        Some(json!({ "mode": "preset", "expression": "0 0 * * * *", "label": "Every hour" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["expression"], "0 0 * * * *");
    assert_eq!(body["description"], "Every hour");
}

// ── Job CRUD ────────────────────────────────────────────────────────────

#[tokio::test]
async fn job_lifecycle_via_http_api() {
    let (state, _dir) = test_state();
    let app = app(&state);

    // Create
    let job = create_job(&app, "nightly-report", "0 */5 * * * *", "https://example.com/hook").await;
    assert_eq!(job["name"], "nightly-report");
    assert_eq!(job["expression"], "0 */5 * * * *");
    assert_eq!(job["description"], "Custom");
    assert_eq!(job["status"], "active");
    assert!(job["next_run_at"].is_string(), "enabled job gets scheduled");
    let id = job["id"].as_str().unwrap().to_string();

    // List
    let (status, body) = send(&app, "GET", "/v1/jobs", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["jobs"][0]["id"], id.as_str());

    // Get: edit form is seeded with the stored expression, custom mode
    let (status, body) = send(&app, "GET", &format!("/v1/jobs/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["schedule_form"]["mode"], "custom");
    assert_eq!(body["schedule_form"]["expression"], "0 */5 * * * *");
    assert_eq!(body["next_occurrences"].as_array().unwrap().len(), 5);

    // Update (partial)
    let (status, body) = send(
        &app,
        "PUT",
        &format!("/v1/jobs/{id}"),
        Some(json!({ "name": "weekly-report" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["job"]["name"], "weekly-report");
    assert_eq!(body["job"]["expression"], "0 */5 * * * *", "untouched fields survive");

    // Toggle off: job is parked, not deleted
    let (status, body) = send(&app, "POST", &format!("/v1/jobs/{id}/toggle"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["job"]["enabled"], false);
    assert_eq!(body["job"]["status"], "paused");
    assert!(body["job"]["next_run_at"].is_null());

    // Delete
    let (status, _) = send(&app, "DELETE", &format!("/v1/jobs/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "GET", &format!("/v1/jobs/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_fills_request_defaults() {
    let (state, _dir) = test_state();
    let app = app(&state);

    let job = create_job(&app, "defaults", "0 0 9 * * *", "https://example.com/ping").await;
    assert_eq!(job["method"], "GET");
    assert_eq!(job["timezone"], "UTC");
    assert_eq!(job["enabled"], true);
    assert!(job["payload"].is_null());
    assert!(job["last_run_at"].is_null());
    assert!(job["last_status"].is_null());
}

#[tokio::test]
async fn create_rejects_malformed_cron() {
    let (state, _dir) = test_state();
    let app = app(&state);

    // The build endpoint passes 5-field text through, but job acceptance
    // requires well-formed 6-field cron.
    let (status, body) = send(
        &app,
        "POST",
        "/v1/jobs",
        Some(json!({
            "name": "legacy",
            "schedule": { "mode": "custom", "expression": "5 4 * * *" },
            "url": "https://example.com/hook",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["error"].as_str().unwrap();
    assert!(message.contains("invalid cron expression"), "got {message:?}");
    assert!(message.contains("expected 6 fields"), "got {message:?}");
}

#[tokio::test]
async fn create_rejects_duplicate_names() {
    let (state, _dir) = test_state();
    let app = app(&state);

    create_job(&app, "daily", "0 0 0 * * *", "https://example.com/a").await;
    let (status, body) = send(
        &app,
        "POST",
        "/v1/jobs",
        Some(json!({
            "name": "daily",
            "schedule": { "mode": "custom", "expression": "0 0 12 * * *" },
            "url": "https://example.com/b",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("already exists"));
}

#[tokio::test]
async fn create_rejects_private_urls_and_unknown_timezones() {
    let (state, _dir) = test_state();
    let app = app(&state);

    let (status, body) = send(
        &app,
        "POST",
        "/v1/jobs",
        Some(json!({
            "name": "ssrf",
            "schedule": { "mode": "custom", "expression": "0 * * * * *" },
            "url": "http://127.0.0.1:9/x",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("invalid url"));

    let (status, body) = send(
        &app,
        "POST",
        "/v1/jobs",
        Some(json!({
            "name": "tz",
            "schedule": { "mode": "custom", "expression": "0 * * * * *" },
            "url": "https://example.com/hook",
            "timezone": "Mars/Olympus",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("invalid timezone"));
}

#[tokio::test]
async fn update_distinguishes_null_payload_from_absent() {
    let (state, _dir) = test_state();
    let app = app(&state);

    let (status, body) = send(
        &app,
        "POST",
        "/v1/jobs",
        Some(json!({
            "name": "hook",
            "schedule": { "mode": "custom", "expression": "0 0 * * * *" },
            "url": "https://example.com/h",
            "method": "POST",
            "payload": "ping",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["job"]["id"].as_str().unwrap().to_string();

    // Absent field leaves the payload untouched
    let (_, body) = send(
        &app,
        "PUT",
        &format!("/v1/jobs/{id}"),
        Some(json!({ "name": "renamed-hook" })),
    )
    .await;
    assert_eq!(body["job"]["payload"], "ping");

    // Explicit null clears it
    let (_, body) = send(
        &app,
        "PUT",
        &format!("/v1/jobs/{id}"),
        Some(json!({ "payload": null })),
    )
    .await;
    assert!(body["job"]["payload"].is_null());

    // And a new value replaces it
    let (_, body) = send(
        &app,
        "PUT",
        &format!("/v1/jobs/{id}"),
        Some(json!({ "payload": "pong" })),
    )
    .await;
    assert_eq!(body["job"]["payload"], "pong");
}

#[tokio::test]
async fn unknown_job_ids_return_not_found() {
    let (state, _dir) = test_state();
    let app = app(&state);
    let missing = Uuid::new_v4();

    let routes: Vec<(&str, String, Option<serde_json::Value>)> = vec![
        ("GET", format!("/v1/jobs/{missing}"), None),
        ("PUT", format!("/v1/jobs/{missing}"), Some(json!({}))),
        ("DELETE", format!("/v1/jobs/{missing}"), None),
        ("POST", format!("/v1/jobs/{missing}/toggle"), None),
        ("POST", format!("/v1/jobs/{missing}/run"), None),
        ("GET", format!("/v1/jobs/{missing}/runs"), None),
    ];
    for (method, uri, body) in routes {
        let (status, _) = send(&app, method, &uri, body).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{method} {uri}");
    }

    // Non-UUID path segments are rejected before the handler runs
    let (status, _) = send(&app, "GET", "/v1/jobs/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ── Run history ─────────────────────────────────────────────────────────

fn run_record(job_id: Uuid, n: u64) -> RunRecord {
    RunRecord {
        id: Uuid::new_v4(),
        job_id,
        job_name: "pager".into(),
        status: RunStatus::Success,
        http_status: Some(200),
        duration_ms: n,
        response_excerpt: Some(format!("r{n}")),
        error: None,
        started_at: Utc::now(),
    }
}

#[tokio::test]
async fn run_history_paginates_newest_first() {
    let (state, _dir) = test_state();
    let app = app(&state);

    let job = create_job(&app, "pager", "0 0 * * * *", "https://example.com/h").await;
    let job_id: Uuid = job["id"].as_str().unwrap().parse().unwrap();
    for n in 1..=5 {
        state.run_log.insert(run_record(job_id, n)).await;
    }

    let (status, body) = send(&app, "GET", "/v1/runs?limit=2&offset=1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 5);
    assert_eq!(body["limit"], 2);
    assert_eq!(body["offset"], 1);
    let runs = body["runs"].as_array().unwrap();
    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0]["response_excerpt"], "r4", "newest first, offset skips r5");
    assert_eq!(runs[1]["response_excerpt"], "r3");

    // Per-job view sees the same records
    let (status, body) = send(&app, "GET", &format!("/v1/jobs/{job_id}/runs"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 5);

    // A second job has an empty history
    let other = create_job(&app, "other", "0 0 * * * *", "https://example.com/o").await;
    let other_id = other["id"].as_str().unwrap();
    let (_, body) = send(&app, "GET", &format!("/v1/jobs/{other_id}/runs"), None).await;
    assert_eq!(body["total"], 0);

    // Oversized limits are clamped
    let (_, body) = send(&app, "GET", "/v1/runs?limit=9999", None).await;
    assert_eq!(body["limit"], 200);
}

// ── Manual runs ─────────────────────────────────────────────────────────

#[tokio::test]
async fn run_now_delivers_and_surfaces_the_record() {
    let (state, _dir) = test_state_with(|c| c.executor.allow_private_urls = true);
    let app = app(&state);
    let url = canned_server("200 OK", "pong", 0).await;

    // Far-future schedule so only the manual trigger fires.
    let job = create_job(&app, "pinger", "0 0 0 1 1 *", &url).await;
    let id = job["id"].as_str().unwrap().to_string();

    let (status, body) = send(&app, "POST", &format!("/v1/jobs/{id}/run"), None).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["job_id"], id.as_str());
    assert!(body["run_id"].is_string());

    let done = wait_for_last_status(&app, &id).await;
    assert_eq!(done["last_status"], "success");

    let (status, body) = send(&app, "GET", &format!("/v1/jobs/{id}/runs"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["runs"][0]["http_status"], 200);
    assert_eq!(body["runs"][0]["response_excerpt"], "pong");
    assert_eq!(body["runs"][0]["status"], "success");
}

#[tokio::test]
async fn run_now_conflicts_while_previous_run_is_in_flight() {
    let (state, _dir) = test_state_with(|c| c.executor.allow_private_urls = true);
    let app = app(&state);
    let url = canned_server("200 OK", "slow", 300).await;

    let job = create_job(&app, "slowpoke", "0 0 0 1 1 *", &url).await;
    let id = job["id"].as_str().unwrap().to_string();

    let (status, _) = send(&app, "POST", &format!("/v1/jobs/{id}/run"), None).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    let (status, body) = send(&app, "POST", &format!("/v1/jobs/{id}/run"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("already in flight"));

    wait_for_last_status(&app, &id).await;
}

// ── SSE events ──────────────────────────────────────────────────────────

/// Read one SSE frame off the response body, decoded as UTF-8.
async fn next_frame(frames: &mut axum::body::BodyDataStream) -> String {
    use futures_util::StreamExt;

    let chunk = tokio::time::timeout(Duration::from_secs(2), frames.next())
        .await
        .expect("no SSE frame arrived in time")
        .expect("stream ended")
        .unwrap();
    String::from_utf8(chunk.to_vec()).unwrap()
}

#[tokio::test]
async fn sse_stream_emits_job_events() {
    let (state, _dir) = test_state();
    let app = app(&state);

    // Open the stream first; the handler subscribes before any mutation.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/v1/jobs/events")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "text/event-stream"
    );
    let mut frames = response.into_body().into_data_stream();

    // Creating a job surfaces as job.updated with the full view attached.
    let job = create_job(&app, "watched", "0 0 * * * *", "https://example.com/h").await;
    let frame = next_frame(&mut frames).await;
    assert!(frame.starts_with("event: job.updated"), "got {frame:?}");
    let data = frame
        .lines()
        .find_map(|l| l.strip_prefix("data: "))
        .expect("frame carries a data line");
    let event: serde_json::Value = serde_json::from_str(data).unwrap();
    assert_eq!(event["type"], "job_updated");
    assert_eq!(event["job"]["id"], job["id"]);
    assert_eq!(event["job"]["name"], "watched");

    // Deleting it surfaces as job.deleted with just the id.
    let id = job["id"].as_str().unwrap();
    let (status, _) = send(&app, "DELETE", &format!("/v1/jobs/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let frame = next_frame(&mut frames).await;
    assert!(frame.starts_with("event: job.deleted"), "got {frame:?}");
    let data = frame.lines().find_map(|l| l.strip_prefix("data: ")).unwrap();
    let event: serde_json::Value = serde_json::from_str(data).unwrap();
    assert_eq!(event["job_id"], job["id"]);
}

// ── Auth ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn bearer_token_gates_protected_routes() {
    let (mut state, _dir) = test_state();
    state.api_token_digest = Some(Sha256::digest(b"test-token-123").to_vec());
    let app = app(&state);

    // No token
    let (status, body) = send(&app, "GET", "/v1/jobs", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid or missing API token");

    // Wrong token
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/v1/jobs")
                .header("authorization", "Bearer wrong")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Right token
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/v1/jobs")
                .header("authorization", "Bearer test-token-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Public routes stay open
    let (status, _) = send(&app, "GET", "/healthz", None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, "GET", "/v1/schedule/presets", None).await;
    assert_eq!(status, StatusCode::OK);
}
