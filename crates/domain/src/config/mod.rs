mod executor;
mod observability;
mod scheduler;
mod server;
mod storage;

pub use executor::*;
pub use observability::*;
pub use scheduler::*;
pub use server::*;
pub use storage::*;

use serde::{Deserialize, Serialize};
use std::fmt;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Assembled config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub executor: ExecutorConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// How bad a reported config issue is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Error,
    Warning,
}

impl fmt::Display for ConfigSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Error => "ERROR",
            Self::Warning => "WARN",
        })
    }
}

/// One problem found while checking a [`Config`].
#[derive(Debug, Clone)]
pub struct ConfigError {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl ConfigError {
    fn error(field: &str, message: &str) -> Self {
        Self { severity: ConfigSeverity::Error, field: field.into(), message: message.into() }
    }

    fn warning(field: &str, message: &str) -> Self {
        Self { severity: ConfigSeverity::Warning, field: field.into(), message: message.into() }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.field, self.message)
    }
}

impl Config {
    /// Check the whole configuration, returning every issue found.
    ///
    /// An empty vec means the config is usable as-is.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut issues = Vec::new();

        if self.server.port == 0 {
            issues.push(ConfigError::error("server.port", "port must be greater than 0"));
        }

        if self.server.host.is_empty() {
            issues.push(ConfigError::error("server.host", "host must not be empty"));
        }

        // A zero tick interval would busy-loop the scheduler.
        if self.scheduler.tick_interval_secs == 0 {
            issues.push(ConfigError::error(
                "scheduler.tick_interval_secs",
                "tick interval must be greater than 0",
            ));
        }

        if self.executor.timeout_ms == 0 {
            issues.push(ConfigError::error(
                "executor.timeout_ms",
                "timeout must be greater than 0",
            ));
        }

        if self.executor.user_agent.is_empty() {
            issues.push(ConfigError::error("executor.user_agent", "user_agent must not be empty"));
        }

        // Sampling outside [0, 1] is silently clamped by the SDK; flag it.
        if !(0.0..=1.0).contains(&self.observability.sample_rate) {
            issues.push(ConfigError::error(
                "observability.sample_rate",
                "sample_rate must be between 0.0 and 1.0",
            ));
        }

        if self.executor.allow_private_urls {
            issues.push(ConfigError::warning(
                "executor.allow_private_urls",
                "jobs may target loopback and private-network addresses",
            ));
        }

        if self.server.cors.allowed_origins == ["*"] {
            issues.push(ConfigError::warning(
                "server.cors.allowed_origins",
                "wildcard \"*\" allows all origins (not recommended for production)",
            ));
        }

        issues
    }
}
