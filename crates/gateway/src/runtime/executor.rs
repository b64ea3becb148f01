//! Outbound HTTP delivery for jobs.
//!
//! One [`Executor`] is shared by the whole process; it owns the
//! `reqwest::Client` (connection pool, timeout, User-Agent) and turns a
//! single delivery attempt into a [`RunRecord`].

use std::time::{Duration, Instant};

use chrono::Utc;
use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use uuid::Uuid;

use cf_domain::config::ExecutorConfig;
use cf_domain::{Error, Result};

use super::jobs::{HttpMethod, Job, RunStatus};
use super::run_log::RunRecord;

pub struct Executor {
    client: reqwest::Client,
    max_response_bytes: usize,
}

impl Executor {
    pub fn new(config: &ExecutorConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| Error::Delivery(format!("build delivery client: {}", e)))?;

        Ok(Self {
            client,
            max_response_bytes: config.max_response_bytes,
        })
    }

    /// Fire the job's request once and record the outcome. Never fails:
    /// transport errors become a [`RunStatus::Error`] record.
    pub async fn execute(&self, job: &Job, run_id: Uuid) -> RunRecord {
        let started_at = Utc::now();
        let clock = Instant::now();

        tracing::debug!(
            job_id = %job.id,
            method = job.method.as_str(),
            url = %job.url,
            "dispatching job request"
        );

        let mut request = self.client.request(reqwest_method(job.method), &job.url);
        if matches!(
            job.method,
            HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch
        ) {
            if let Some(payload) = &job.payload {
                request = request
                    .header(CONTENT_TYPE, "application/json")
                    .body(payload.clone());
            }
        }

        match request.send().await {
            Ok(response) => {
                let http_status = response.status().as_u16();
                let excerpt = self.read_excerpt(response).await;
                let record = RunRecord {
                    id: run_id,
                    job_id: job.id,
                    job_name: job.name.clone(),
                    status: RunStatus::from_http_status(http_status),
                    http_status: Some(http_status),
                    duration_ms: clock.elapsed().as_millis() as u64,
                    response_excerpt: excerpt,
                    error: None,
                    started_at,
                };
                tracing::debug!(
                    job_id = %job.id,
                    http_status,
                    duration_ms = record.duration_ms,
                    "job request completed"
                );
                record
            }
            Err(e) => {
                tracing::warn!(job_id = %job.id, error = %e, "job request failed");
                RunRecord {
                    id: run_id,
                    job_id: job.id,
                    job_name: job.name.clone(),
                    status: RunStatus::Error,
                    http_status: None,
                    duration_ms: clock.elapsed().as_millis() as u64,
                    response_excerpt: None,
                    error: Some(e.to_string()),
                    started_at,
                }
            }
        }
    }

    /// Stream the body, keeping at most `max_response_bytes` of it.
    /// Reading stops once the cap is reached; the remainder is dropped.
    async fn read_excerpt(&self, response: reqwest::Response) -> Option<String> {
        let mut stream = response.bytes_stream();
        let mut buf: Vec<u8> = Vec::new();
        while let Some(chunk) = stream.next().await {
            let chunk = match chunk {
                Ok(c) => c,
                Err(_) => break,
            };
            let room = self.max_response_bytes.saturating_sub(buf.len());
            if room == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..chunk.len().min(room)]);
        }
        excerpt_from(&buf)
    }
}

fn reqwest_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Patch => reqwest::Method::PATCH,
        HttpMethod::Delete => reqwest::Method::DELETE,
        HttpMethod::Head => reqwest::Method::HEAD,
    }
}

fn excerpt_from(buf: &[u8]) -> Option<String> {
    if buf.is_empty() {
        return None;
    }
    Some(String::from_utf8_lossy(buf).to_string())
}
