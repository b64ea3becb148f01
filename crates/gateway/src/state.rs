use std::sync::Arc;

use cf_domain::config::Config;

use crate::runtime::jobs::JobStore;
use crate::runtime::run_log::RunLogStore;
use crate::runtime::runner::JobRunner;

/// Everything the API handlers and background loops share.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,

    /// Job store (persistent, event-broadcasting).
    pub jobs: Arc<JobStore>,
    /// Bounded run history.
    pub run_log: Arc<RunLogStore>,
    /// Fires due and manual runs; owns the per-job single-flight guard.
    pub runner: Arc<JobRunner>,

    /// SHA-256 digest of the API bearer token, computed once at startup.
    /// `None` means no token is configured and auth is skipped.
    pub api_token_digest: Option<Vec<u8>>,
}
