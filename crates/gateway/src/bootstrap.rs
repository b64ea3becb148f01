//! AppState construction and background-task spawning extracted from `main.rs`.
//!
//! `serve` uses both functions; the `config` one-shot subcommands never
//! boot the runtime.

use std::sync::Arc;

use anyhow::Context;
use sha2::{Digest, Sha256};

use cf_domain::config::{Config, ConfigSeverity, ServerConfig};

use crate::runtime::executor::Executor;
use crate::runtime::jobs::JobStore;
use crate::runtime::run_log::RunLogStore;
use crate::runtime::runner::JobRunner;
use crate::state::AppState;

/// Validate config, initialize every subsystem and return a fully-wired
/// [`AppState`].
pub async fn build_app_state(config: Arc<Config>) -> anyhow::Result<AppState> {
    // ── Config validation ────────────────────────────────────────────
    let mut config_errors = 0usize;
    for issue in config.validate() {
        match issue.severity {
            ConfigSeverity::Warning => tracing::warn!("config: {issue}"),
            ConfigSeverity::Error => {
                tracing::error!("config: {issue}");
                config_errors += 1;
            }
        }
    }
    if config_errors > 0 {
        anyhow::bail!("config validation failed with {config_errors} error(s)");
    }

    // ── Job store ────────────────────────────────────────────────────
    let data_dir = &config.storage.data_dir;
    let jobs = Arc::new(JobStore::new(data_dir));
    tracing::info!(
        jobs = jobs.list().await.len(),
        path = %data_dir.display(),
        "job store ready"
    );

    // ── Run log ──────────────────────────────────────────────────────
    let run_log = Arc::new(RunLogStore::new(data_dir));
    tracing::info!("run log ready");

    // ── HTTP executor ────────────────────────────────────────────────
    let executor = Arc::new(
        Executor::new(&config.executor).context("initializing HTTP executor")?,
    );
    tracing::info!(
        timeout_ms = config.executor.timeout_ms,
        user_agent = %config.executor.user_agent,
        "executor ready"
    );

    // ── Job runner ───────────────────────────────────────────────────
    let runner = Arc::new(JobRunner::new(jobs.clone(), run_log.clone(), executor));
    tracing::info!("job runner ready");

    // ── API token ────────────────────────────────────────────────────
    let api_token_digest = resolve_api_token(&config.server);

    Ok(AppState {
        config,
        jobs,
        run_log,
        runner,
        api_token_digest,
    })
}

/// Resolve the API token and reduce it to a SHA-256 digest.
///
/// An inline `server.api_token` wins over the env var named by
/// `server.api_token_env`. No token at all means dev mode: the auth
/// middleware lets every request through.
fn resolve_api_token(server: &ServerConfig) -> Option<Vec<u8>> {
    let inline = server.api_token.as_deref().filter(|t| !t.is_empty());
    let (source, token) = match inline {
        Some(t) => ("config".to_string(), t.to_string()),
        None => {
            let env_var = &server.api_token_env;
            match std::env::var(env_var).ok().filter(|t| !t.is_empty()) {
                Some(t) => (format!("env:{env_var}"), t),
                None => {
                    tracing::warn!(
                        "API bearer-token auth DISABLED: set server.api_token in config.toml \
                         or the {env_var} env var"
                    );
                    return None;
                }
            }
        }
    };

    tracing::info!(source = %source, "API bearer-token auth enabled");
    Some(Sha256::digest(token.as_bytes()).to_vec())
}

/// Spawn the long-running background tokio tasks (currently just the
/// scheduler tick loop).
///
/// Call this **after** [`build_app_state`] when running the HTTP server.
pub fn spawn_runtime_loops(state: &AppState) {
    // ── Scheduler tick (trigger due jobs) ───────────────────────────
    let runner = state.runner.clone();
    let tick_secs = state.config.scheduler.tick_interval_secs;
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(std::time::Duration::from_secs(tick_secs));
        loop {
            ticker.tick().await;
            runner.tick().await;
        }
    });

    tracing::info!(tick_secs, "runtime loops spawned");
}
