//! Job data model: the persisted job, its delivery method, run status,
//! and the events the store broadcasts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Delivery method & run status
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// HTTP method used to deliver a job.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
        }
    }
}

impl Default for HttpMethod {
    fn default() -> Self {
        Self::Get
    }
}

/// Outcome of one delivery attempt.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// The endpoint answered with a status below 400.
    Success,
    /// The endpoint answered with 400 or above.
    Failed,
    /// No response at all (DNS, connect, TLS, timeout).
    Error,
}

impl RunStatus {
    /// Classify an HTTP status code the way the run log records it.
    pub fn from_http_status(code: u16) -> Self {
        if code < 400 {
            Self::Success
        } else {
            Self::Failed
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Job model
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn d_utc() -> String {
    "UTC".into()
}

/// Persisted job. `status` is NOT stored; it is derived from `enabled`
/// + `last_status` via [`Job::computed_status`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub name: String,
    /// Cron expression: "sec min hour dom month dow" (6-field)
    pub expression: String,
    /// Human-readable schedule description captured when the
    /// expression was built.
    #[serde(default)]
    pub description: String,
    pub url: String,
    #[serde(default)]
    pub method: HttpMethod,
    /// Optional body sent with the delivery as JSON.
    #[serde(default)]
    pub payload: Option<String>,
    #[serde(default = "d_utc")]
    pub timezone: String,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub last_run_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_status: Option<RunStatus>,
    #[serde(default)]
    pub next_run_at: Option<DateTime<Utc>>,
}

impl Job {
    /// Derive status from persisted state. Never stored.
    pub fn computed_status(&self) -> JobStatus {
        if !self.enabled {
            JobStatus::Paused
        } else if matches!(self.last_status, Some(RunStatus::Failed) | Some(RunStatus::Error)) {
            JobStatus::Failing
        } else {
            JobStatus::Active
        }
    }

    /// Build an API-facing view with the computed `status` field.
    pub fn to_view(&self) -> JobView {
        JobView {
            job: self.clone(),
            status: self.computed_status(),
        }
    }
}

/// API response wrapper that includes the computed `status` field.
#[derive(Clone, Debug, Serialize)]
pub struct JobView {
    #[serde(flatten)]
    pub job: Job,
    pub status: JobStatus,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Active,
    Paused,
    Failing,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Job events (for SSE)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JobEvent {
    JobUpdated { job: JobView },
    JobDeleted { job_id: Uuid },
    RunStarted { job_id: Uuid, run_id: Uuid },
    RunCompleted {
        job_id: Uuid,
        run_id: Uuid,
        status: RunStatus,
    },
}
