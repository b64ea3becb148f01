use cf_domain::config::{Config, ConfigSeverity};

/// Check the parsed config and print one line per issue.
///
/// Warnings alone still count as a pass; the caller turns a failed
/// check into exit code 1.
pub fn validate(config: &Config, config_path: &str) -> bool {
    let issues = config.validate();
    if issues.is_empty() {
        println!("Config OK ({config_path})");
        return true;
    }

    let mut errors = 0usize;
    let mut warnings = 0usize;
    for issue in &issues {
        println!("{issue}");
        match issue.severity {
            ConfigSeverity::Error => errors += 1,
            ConfigSeverity::Warning => warnings += 1,
        }
    }
    println!("\n{errors} error(s), {warnings} warning(s) in {config_path}");

    errors == 0
}

/// Print the effective configuration, defaults included, as TOML.
pub fn show(config: &Config) -> anyhow::Result<()> {
    let rendered = toml::to_string_pretty(config)
        .map_err(|e| anyhow::anyhow!("rendering config as TOML: {e}"))?;
    print!("{rendered}");
    Ok(())
}
