pub mod config;

use anyhow::Context;
use clap::{Parser, Subcommand};

use cf_domain::config::Config;

/// CronForge, a self-hosted cron job service.
#[derive(Debug, Parser)]
#[command(name = "cronforge", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the job server (default when no subcommand is given).
    Serve,
    /// Inspect or check the config file.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Print the gateway version.
    Version,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Check the config file and list every problem found.
    Validate,
    /// Print the effective configuration, defaults included, as TOML.
    Show,
}

// ── Shared config loading ─────────────────────────────────────────────

/// Load the configuration named by `CF_CONFIG` (default `config.toml`).
///
/// A missing file is not an error: the built-in defaults apply, so a
/// fresh checkout starts without any setup. Returns the config together
/// with the path that was consulted.
pub fn load_config() -> anyhow::Result<(Config, String)> {
    let path = std::env::var("CF_CONFIG").unwrap_or_else(|_| "config.toml".into());

    let config = match std::fs::read_to_string(&path) {
        Ok(raw) => toml::from_str(&raw).with_context(|| format!("parsing {path}"))?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Config::default(),
        Err(e) => return Err(anyhow::anyhow!("reading {path}: {e}")),
    };

    Ok((config, path))
}
