//! Configuration module for netscore
//!
//! This module handles:
//! - Project-level configuration (netscore.toml)
//! - User-level configuration (~/.config/netscore/config.toml)
//! - Environment overrides (GITHUB_TOKEN, LOG_FILE, LOG_LEVEL)

mod project_config;
mod user_config;

pub use project_config::{
    load_config, parse_config, BatchConfig, ConfigError, HttpConfig, LogLevel, NetScoreConfig,
    ScoringConfig, ScoringWeights, PROJECT_CONFIG_FILE,
};
pub use user_config::{init_user_config, user_config_path};
