//! Run log: bounded history of delivery attempts.
//!
//! Every execution writes one [`RunRecord`]. Records are persisted to
//! JSONL and kept in a bounded in-memory ring, newest last.

use std::collections::VecDeque;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use cf_domain::Result;

use super::jobs::RunStatus;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Run record model
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunRecord {
    pub id: Uuid,
    pub job_id: Uuid,
    pub job_name: String,
    pub status: RunStatus,
    /// HTTP status of the response, absent on transport errors.
    #[serde(default)]
    pub http_status: Option<u16>,
    pub duration_ms: u64,
    /// Response body truncated to the configured byte cap.
    #[serde(default)]
    pub response_excerpt: Option<String>,
    /// Transport error text when no response arrived.
    #[serde(default)]
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// RunLogStore
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

const MAX_RUN_RECORDS: usize = 1000;

pub struct RunLogStore {
    inner: RwLock<VecDeque<RunRecord>>,
    persist_path: PathBuf,
}

impl RunLogStore {
    pub fn new(data_dir: &std::path::Path) -> Self {
        let persist_path = data_dir.join("runs.jsonl");

        let mut store = Self {
            inner: RwLock::new(VecDeque::new()),
            persist_path,
        };
        store.load();
        store
    }

    fn load(&mut self) {
        let Ok(data) = std::fs::read_to_string(&self.persist_path) else {
            return;
        };

        let mut records: VecDeque<RunRecord> = data
            .lines()
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect();

        let parsed = records.len();
        while records.len() > MAX_RUN_RECORDS {
            records.pop_front();
        }
        // Trim the on-disk file when the ring overflowed between restarts.
        if records.len() < parsed {
            if let Err(e) = Self::rewrite_jsonl(&self.persist_path, &records) {
                tracing::warn!(error = %e, "run log trim failed");
            }
        }

        if !records.is_empty() {
            tracing::info!(count = records.len(), "loaded run history from disk");
        }
        self.inner = RwLock::new(records);
    }

    /// Rewrite the entire JSONL file from the in-memory ring. Writes to a
    /// temp file first so a failure never clobbers the existing log.
    fn rewrite_jsonl(path: &Path, records: &VecDeque<RunRecord>) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut body = String::new();
        for r in records {
            body.push_str(&serde_json::to_string(r)?);
            body.push('\n');
        }

        let tmp = path.with_extension("jsonl.tmp");
        match std::fs::write(&tmp, body).and_then(|_| std::fs::rename(&tmp, path)) {
            Ok(()) => Ok(()),
            Err(e) => {
                let _ = std::fs::remove_file(&tmp);
                Err(e.into())
            }
        }
    }

    fn persist_one(path: &Path, record: &RunRecord) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut line = serde_json::to_string(record)?;
        line.push('\n');
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?
            .write_all(line.as_bytes())?;
        Ok(())
    }

    pub async fn insert(&self, record: RunRecord) -> RunRecord {
        let r = record.clone();
        let mut inner = self.inner.write().await;
        inner.push_back(record);
        // Bound the ring
        while inner.len() > MAX_RUN_RECORDS {
            inner.pop_front();
        }
        drop(inner);

        if let Err(e) = Self::persist_one(&self.persist_path, &r) {
            tracing::warn!(error = %e, "run record persist failed");
        }
        r
    }

    /// Most recent first.
    pub async fn list(&self, limit: usize, offset: usize) -> (Vec<RunRecord>, usize) {
        let inner = self.inner.read().await;
        let total = inner.len();
        let items: Vec<RunRecord> = inner
            .iter()
            .rev()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();
        (items, total)
    }

    /// History scoped to a specific job, most recent first.
    pub async fn list_by_job(
        &self,
        job_id: &Uuid,
        limit: usize,
        offset: usize,
    ) -> (Vec<RunRecord>, usize) {
        let inner = self.inner.read().await;
        let matching: Vec<&RunRecord> = inner.iter().filter(|r| r.job_id == *job_id).collect();
        let total = matching.len();
        let items: Vec<RunRecord> = matching
            .into_iter()
            .rev()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();
        (items, total)
    }
}
