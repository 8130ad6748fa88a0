//! User-level configuration location
//!
//! `~/.config/netscore/config.toml` uses the same format as the project
//! `netscore.toml` and sits below it in priority.

use anyhow::Result;
use std::path::PathBuf;

const EXAMPLE_CONFIG: &str = r#"# netscore user configuration
#
# GITHUB_TOKEN is read from the environment only.

[scoring]
# weights = { ramp_up = 0.2, correctness = 0.3, bus_factor = 0.2, responsive_maintainer = 0.3 }
# min_contributors = 10
# max_contributors = 100
# extended_metrics = false

[batch]
# size = 5

[http]
# timeout_secs = 30
# max_retries = 2
# backoff_ms = 500
"#;

/// Get the user config file path
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("netscore").join("config.toml"))
}

/// Create the user config directory and an example config if missing
pub fn init_user_config() -> Result<PathBuf> {
    let config_path =
        user_config_path().ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !config_path.exists() {
        std::fs::write(&config_path, EXAMPLE_CONFIG)?;
    }

    Ok(config_path)
}
