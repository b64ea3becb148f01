//! Job runner: evaluates due jobs on every scheduler tick, fires
//! deliveries, and records outcomes. At most one run per job is in
//! flight at a time; a window that comes due while the previous run is
//! still going is skipped, not queued.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use super::executor::Executor;
use super::jobs::{Job, JobStore};
use super::run_log::RunLogStore;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// ConcurrencyGuard
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Tracks in-flight run counts per job for single-flight locking.
pub struct ConcurrencyGuard {
    counts: RwLock<HashMap<Uuid, Arc<AtomicU32>>>,
}

impl ConcurrencyGuard {
    pub fn new() -> Self {
        Self {
            counts: RwLock::new(HashMap::new()),
        }
    }

    /// Try to acquire a slot. Returns `true` if under the limit.
    pub async fn try_acquire(&self, job_id: &Uuid, max: u32) -> bool {
        let counter = {
            let mut map = self.counts.write().await;
            map.entry(*job_id)
                .or_insert_with(|| Arc::new(AtomicU32::new(0)))
                .clone()
        };
        let current = counter.load(Ordering::SeqCst);
        if current >= max {
            return false;
        }
        counter.fetch_add(1, Ordering::SeqCst);
        true
    }

    /// Release a slot after a run completes.
    pub async fn release(&self, job_id: &Uuid) {
        let map = self.counts.read().await;
        if let Some(counter) = map.get(job_id) {
            counter.fetch_sub(1, Ordering::SeqCst);
        }
    }

    /// Current in-flight count for a job.
    pub async fn in_flight(&self, job_id: &Uuid) -> u32 {
        let map = self.counts.read().await;
        map.get(job_id)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// JobRunner
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Single-flight: one run per job at a time.
const MAX_IN_FLIGHT: u32 = 1;

pub struct JobRunner {
    jobs: Arc<JobStore>,
    run_log: Arc<RunLogStore>,
    executor: Arc<Executor>,
    concurrency: ConcurrencyGuard,
}

impl JobRunner {
    pub fn new(jobs: Arc<JobStore>, run_log: Arc<RunLogStore>, executor: Arc<Executor>) -> Self {
        Self {
            jobs,
            run_log,
            executor,
            concurrency: ConcurrencyGuard::new(),
        }
    }

    /// Called on every scheduler tick. Fires every job whose next
    /// occurrence has arrived.
    pub async fn tick(&self) {
        let due = self.jobs.due_jobs().await;
        for job in due {
            self.trigger(job, true).await;
        }
    }

    /// Manual "run now". Does not advance the pending occurrence, and
    /// works on paused jobs too.
    pub async fn run_now(&self, job: Job) -> Option<Uuid> {
        self.trigger(job, false).await
    }

    /// Start a single run. Returns the run id, or `None` when the job
    /// already has a run in flight.
    async fn trigger(&self, job: Job, advance: bool) -> Option<Uuid> {
        if !self.concurrency.try_acquire(&job.id, MAX_IN_FLIGHT).await {
            tracing::warn!(
                job_id = %job.id,
                name = %job.name,
                "previous run still in flight, skipping window"
            );
            if advance {
                // Still move past the window so the next tick does not
                // re-evaluate it.
                self.jobs.advance_schedule(&job.id).await;
            }
            return None;
        }

        let run_id = Uuid::new_v4();
        tracing::info!(
            job_id = %job.id,
            name = %job.name,
            run_id = %run_id,
            "triggering job run"
        );
        self.jobs.begin_run(&job.id, run_id, advance).await;

        let jobs = self.jobs.clone();
        let run_log = self.run_log.clone();
        let executor = self.executor.clone();
        // The spawned task must release the slot itself, so capture the
        // counter rather than borrowing &self into 'static.
        let slot = {
            let map = self.concurrency.counts.read().await;
            map.get(&job.id).cloned()
        };

        tokio::spawn(async move {
            let record = executor.execute(&job, run_id).await;
            let status = record.status;
            run_log.insert(record).await;
            jobs.record_result(&job.id, run_id, status).await;

            if let Some(counter) = slot {
                counter.fetch_sub(1, Ordering::SeqCst);
            }

            tracing::info!(
                job_id = %job.id,
                run_id = %run_id,
                status = ?status,
                "job run completed"
            );
        });

        Some(run_id)
    }
}
