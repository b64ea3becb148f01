use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Server
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "d_8080")]
    pub port: u16,
    #[serde(default = "d_loopback")]
    pub host: String,
    #[serde(default)]
    pub cors: CorsConfig,
    /// Inline API bearer token for protected endpoints. Wins over the
    /// env var when both are set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    /// Name of the env var consulted for the API bearer token when no
    /// inline token is configured. With a token from either source, job
    /// endpoints demand `Authorization: Bearer <token>`; with neither,
    /// the server warns once and runs open (dev mode).
    #[serde(default = "d_api_token_env")]
    pub api_token_env: String,
    /// Maximum in-flight HTTP requests before new connections queue.
    #[serde(default = "d_256")]
    pub max_concurrent_requests: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: d_8080(),
            host: d_loopback(),
            cors: CorsConfig::default(),
            api_token: None,
            api_token_env: d_api_token_env(),
            max_concurrent_requests: d_256(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Origins browsers may call the API from. A trailing `:*` matches
    /// any port on that host; a lone `"*"` allows everything (not for
    /// production). Defaults cover local dev servers only.
    #[serde(default = "d_dev_origins")]
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: d_dev_origins(),
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_8080() -> u16 {
    8080
}
fn d_loopback() -> String {
    "127.0.0.1".into()
}
fn d_dev_origins() -> Vec<String> {
    vec!["http://localhost:*".into(), "http://127.0.0.1:*".into()]
}
fn d_api_token_env() -> String {
    "CF_API_TOKEN".into()
}
fn d_256() -> usize {
    256
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
