//! JobStore: persistent job storage with event broadcasting.

use std::collections::HashMap;
use std::path::PathBuf;

use chrono::Utc;
use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

use super::model::{Job, JobEvent, RunStatus};
use crate::runtime::schedule::cron::{cron_next_tz, parse_tz};

pub struct JobStore {
    inner: RwLock<HashMap<Uuid, Job>>,
    persist_path: PathBuf,
    event_tx: broadcast::Sender<JobEvent>,
}

impl JobStore {
    pub fn new(data_dir: &std::path::Path) -> Self {
        let persist_path = data_dir.join("jobs.json");
        let (event_tx, _) = broadcast::channel(64);

        let mut store = Self {
            inner: RwLock::new(HashMap::new()),
            persist_path,
            event_tx,
        };
        store.load();
        store
    }

    fn load(&mut self) {
        let Ok(data) = std::fs::read_to_string(&self.persist_path) else {
            return;
        };
        match serde_json::from_str::<Vec<Job>>(&data) {
            Ok(jobs) => {
                let now = Utc::now();
                let mut map = HashMap::new();
                for mut job in jobs {
                    // Windows missed while the process was down are
                    // skipped: every enabled job reschedules from the
                    // current instant, disabled jobs carry no next run.
                    job.next_run_at = if job.enabled {
                        let tz = parse_tz(&job.timezone);
                        cron_next_tz(&job.expression, &now, tz)
                    } else {
                        None
                    };
                    map.insert(job.id, job);
                }
                let count = map.len();
                self.inner = RwLock::new(map);
                tracing::info!(count, "loaded jobs from disk");
            }
            Err(e) => {
                tracing::warn!(error = %e, path = %self.persist_path.display(),
                    "failed to parse jobs file, starting empty");
            }
        }
    }

    async fn persist(&self) {
        let map = self.inner.read().await;
        let jobs: Vec<&Job> = map.values().collect();
        if let Ok(json) = serde_json::to_string_pretty(&jobs) {
            let path = self.persist_path.clone();
            // Spawn blocking to avoid blocking the Tokio executor.
            let _ = tokio::task::spawn_blocking(move || {
                if let Some(parent) = path.parent() {
                    let _ = std::fs::create_dir_all(parent);
                }
                if let Err(e) = std::fs::write(&path, json) {
                    tracing::warn!(error = %e, "failed to persist jobs");
                }
            })
            .await;
        }
    }

    pub async fn list(&self) -> Vec<Job> {
        self.inner.read().await.values().cloned().collect()
    }

    pub async fn get(&self, id: &Uuid) -> Option<Job> {
        self.inner.read().await.get(id).cloned()
    }

    /// Check if any job (other than `exclude_id`) has the given name.
    pub async fn name_exists(&self, name: &str, exclude_id: Option<&Uuid>) -> bool {
        let lower = name.to_lowercase();
        self.inner
            .read()
            .await
            .values()
            .any(|j| j.name.to_lowercase() == lower && exclude_id.map_or(true, |id| j.id != *id))
    }

    pub async fn insert(&self, mut job: Job) -> Job {
        // Compute initial next_run_at (timezone-aware)
        if job.enabled {
            let tz = parse_tz(&job.timezone);
            job.next_run_at = cron_next_tz(&job.expression, &Utc::now(), tz);
        }
        let id = job.id;
        self.inner.write().await.insert(id, job.clone());
        self.persist().await;
        let _ = self.event_tx.send(JobEvent::JobUpdated { job: job.to_view() });
        job
    }

    /// Apply an edit and reschedule. The edit may change the expression,
    /// timezone, or enabled flag, so next_run_at is recomputed from now.
    pub async fn update(&self, id: &Uuid, f: impl FnOnce(&mut Job)) -> Option<Job> {
        let mut map = self.inner.write().await;
        if let Some(job) = map.get_mut(id) {
            f(job);
            job.next_run_at = if job.enabled {
                let tz = parse_tz(&job.timezone);
                cron_next_tz(&job.expression, &Utc::now(), tz)
            } else {
                None
            };
            job.updated_at = Utc::now();
            let j = job.clone();
            drop(map);
            self.persist().await;
            let _ = self.event_tx.send(JobEvent::JobUpdated { job: j.to_view() });
            Some(j)
        } else {
            None
        }
    }

    /// Flip the enabled flag. Enabling schedules from now; disabling
    /// clears the pending occurrence.
    pub async fn toggle(&self, id: &Uuid) -> Option<Job> {
        self.update(id, |job| job.enabled = !job.enabled).await
    }

    pub async fn delete(&self, id: &Uuid) -> bool {
        let removed = self.inner.write().await.remove(id).is_some();
        if removed {
            self.persist().await;
            let _ = self.event_tx.send(JobEvent::JobDeleted { job_id: *id });
        }
        removed
    }

    pub fn subscribe(&self) -> broadcast::Receiver<JobEvent> {
        self.event_tx.subscribe()
    }

    /// Mark a job as having just started a run.
    ///
    /// Scheduled runs pass `advance = true` so the job moves to its next
    /// occurrence; manual run-now passes `false` and leaves the pending
    /// occurrence where it was.
    pub async fn begin_run(&self, id: &Uuid, run_id: Uuid, advance: bool) {
        let now = Utc::now();
        let mut map = self.inner.write().await;
        if let Some(job) = map.get_mut(id) {
            job.last_run_at = Some(now);
            if advance {
                let tz = parse_tz(&job.timezone);
                job.next_run_at = cron_next_tz(&job.expression, &now, tz);
            }
            job.updated_at = now;
            drop(map);
            self.persist().await;
            let _ = self.event_tx.send(JobEvent::RunStarted {
                job_id: *id,
                run_id,
            });
        }
    }

    /// Move an enabled job past a due window without running it. Used
    /// when a window is dropped because the previous run is still in
    /// flight.
    pub async fn advance_schedule(&self, id: &Uuid) {
        let mut map = self.inner.write().await;
        if let Some(job) = map.get_mut(id) {
            if job.enabled {
                let tz = parse_tz(&job.timezone);
                job.next_run_at = cron_next_tz(&job.expression, &Utc::now(), tz);
            }
            let view = job.to_view();
            drop(map);
            self.persist().await;
            let _ = self.event_tx.send(JobEvent::JobUpdated { job: view });
        }
    }

    /// Record the outcome of a completed run.
    pub async fn record_result(&self, id: &Uuid, run_id: Uuid, status: RunStatus) {
        let mut map = self.inner.write().await;
        if let Some(job) = map.get_mut(id) {
            job.last_status = Some(status);
            job.updated_at = Utc::now();
            drop(map);
            self.persist().await;
            let _ = self.event_tx.send(JobEvent::RunCompleted {
                job_id: *id,
                run_id,
                status,
            });
        }
    }

    /// Get all enabled jobs whose next occurrence has arrived.
    pub async fn due_jobs(&self) -> Vec<Job> {
        let now = Utc::now();
        self.inner
            .read()
            .await
            .values()
            .filter(|j| j.enabled && j.next_run_at.map_or(false, |next| next <= now))
            .cloned()
            .collect()
    }
}
