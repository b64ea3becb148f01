use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Executor (outbound HTTP)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Per-request timeout for job deliveries.
    #[serde(default = "d_10000")]
    pub timeout_ms: u64,
    /// `User-Agent` header sent with every delivery.
    #[serde(default = "d_user_agent")]
    pub user_agent: String,
    /// Response bodies are truncated to this many bytes before being
    /// stored in the run log.
    #[serde(default = "d_10240")]
    pub max_response_bytes: usize,
    /// Allow job URLs that resolve to loopback, private, or link-local
    /// addresses. Off by default; self-hosters probing internal
    /// services opt in.
    #[serde(default)]
    pub allow_private_urls: bool,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            user_agent: d_user_agent(),
            max_response_bytes: 10_240,
            allow_private_urls: false,
        }
    }
}

fn d_10000() -> u64 {
    10_000
}
fn d_user_agent() -> String {
    "CronForge/1.0".into()
}
fn d_10240() -> usize {
    10_240
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn executor_config_empty_toml_uses_all_defaults() {
        let cfg: ExecutorConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.timeout_ms, 10_000);
        assert_eq!(cfg.user_agent, "CronForge/1.0");
        assert_eq!(cfg.max_response_bytes, 10_240);
        assert!(!cfg.allow_private_urls);
    }

    #[test]
    fn executor_config_parses_overrides() {
        let toml_str = r#"
            timeout_ms = 30000
            allow_private_urls = true
        "#;
        let cfg: ExecutorConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.timeout_ms, 30_000);
        assert!(cfg.allow_private_urls);
        assert_eq!(cfg.max_response_bytes, 10_240, "unset fields keep defaults");
    }
}
