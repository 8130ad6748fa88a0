//! Scoring and registry configuration
//!
//! Loads configuration from `netscore.toml` (or an explicit `--config`
//! path), layered over the user config and built-in defaults.
//!
//! # Configuration Format
//!
//! ```toml
//! # netscore.toml
//!
//! [scoring]
//! weights = { ramp_up = 0.2, correctness = 0.3, bus_factor = 0.2, responsive_maintainer = 0.3 }
//! min_contributors = 10
//! max_contributors = 100
//! extended_metrics = false
//!
//! [batch]
//! size = 5
//!
//! [http]
//! timeout_secs = 30
//! max_retries = 2
//! backoff_ms = 500
//! ```

use crate::http::{Endpoints, RetryPolicy};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Project config file looked up in the working directory
pub const PROJECT_CONFIG_FILE: &str = "netscore.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Log verbosity in the 0/1/2 form accepted by `LOG_LEVEL`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Silent,
    Info,
    Debug,
}

impl LogLevel {
    /// Parse `LOG_LEVEL`; anything but 1 or 2 means silent
    pub fn from_env_value(value: &str) -> Self {
        match value.trim() {
            "2" => LogLevel::Debug,
            "1" => LogLevel::Info,
            _ => LogLevel::Silent,
        }
    }

    /// Equivalent `EnvFilter` directive
    pub fn directive(&self) -> &'static str {
        match self {
            LogLevel::Silent => "off",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        }
    }
}

/// Complete runtime configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NetScoreConfig {
    #[serde(default)]
    pub scoring: ScoringConfig,

    #[serde(default)]
    pub batch: BatchConfig,

    #[serde(default)]
    pub http: HttpConfig,

    /// GitHub token (`GITHUB_TOKEN`), never read from files
    #[serde(skip)]
    pub github_token: Option<String>,

    /// Log destination (`LOG_FILE`)
    #[serde(skip)]
    pub log_file: Option<PathBuf>,

    /// Log verbosity (`LOG_LEVEL`)
    #[serde(skip)]
    pub log_level: Option<LogLevel>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScoringConfig {
    #[serde(default)]
    pub weights: ScoringWeights,

    /// Contributor count at or below which bus factor scores 0
    #[serde(default = "default_min_contributors")]
    pub min_contributors: i64,

    /// Contributor count at or above which bus factor scores 1
    #[serde(default = "default_max_contributors")]
    pub max_contributors: i64,

    /// Also run PinningPractice and CodeReview (reported, not weighted)
    #[serde(default)]
    pub extended_metrics: bool,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            min_contributors: default_min_contributors(),
            max_contributors: default_max_contributors(),
            extended_metrics: false,
        }
    }
}

fn default_min_contributors() -> i64 {
    10
}
fn default_max_contributors() -> i64 {
    100
}

/// Weights of the four weighted metrics; license is a multiplicative gate
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct ScoringWeights {
    #[serde(default = "default_ramp_up_weight")]
    pub ramp_up: f64,
    #[serde(default = "default_correctness_weight")]
    pub correctness: f64,
    #[serde(default = "default_bus_factor_weight")]
    pub bus_factor: f64,
    #[serde(default = "default_responsive_maintainer_weight")]
    pub responsive_maintainer: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            ramp_up: default_ramp_up_weight(),
            correctness: default_correctness_weight(),
            bus_factor: default_bus_factor_weight(),
            responsive_maintainer: default_responsive_maintainer_weight(),
        }
    }
}

fn default_ramp_up_weight() -> f64 {
    0.20
}
fn default_correctness_weight() -> f64 {
    0.30
}
fn default_bus_factor_weight() -> f64 {
    0.20
}
fn default_responsive_maintainer_weight() -> f64 {
    0.30
}

impl ScoringWeights {
    fn sum(&self) -> f64 {
        self.ramp_up + self.correctness + self.bus_factor + self.responsive_maintainer
    }

    /// Validate that weights are non-negative and sum to 1.0 (with tolerance)
    pub fn is_valid(&self) -> bool {
        let all_non_negative = [
            self.ramp_up,
            self.correctness,
            self.bus_factor,
            self.responsive_maintainer,
        ]
        .iter()
        .all(|w| *w >= 0.0);
        all_non_negative && (self.sum() - 1.0).abs() < 0.001
    }

    /// Normalize weights to sum to 1.0
    pub fn normalize(&mut self) {
        let sum = self.sum();
        if sum > 0.0 {
            self.ramp_up /= sum;
            self.correctness /= sum;
            self.bus_factor /= sum;
            self.responsive_maintainer /= sum;
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchConfig {
    /// URLs per batch
    #[serde(default = "default_batch_size")]
    pub size: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            size: default_batch_size(),
        }
    }
}

fn default_batch_size() -> usize {
    5
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Per-call timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base backoff, doubled on every retry
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,

    #[serde(default)]
    pub github_api: Option<String>,
    #[serde(default)]
    pub github_graphql: Option<String>,
    #[serde(default)]
    pub raw_content: Option<String>,
    #[serde(default)]
    pub npm_registry: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            backoff_ms: default_backoff_ms(),
            github_api: None,
            github_graphql: None,
            raw_content: None,
            npm_registry: None,
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}
fn default_max_retries() -> u32 {
    2
}
fn default_backoff_ms() -> u64 {
    500
}

impl HttpConfig {
    /// Remote base URLs, with configured overrides applied
    pub fn endpoints(&self) -> Endpoints {
        let defaults = Endpoints::default();
        let pick = |value: &Option<String>, default: String| {
            value
                .as_deref()
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or(default)
        };
        Endpoints {
            github_api: pick(&self.github_api, defaults.github_api),
            github_graphql: pick(&self.github_graphql, defaults.github_graphql),
            raw_content: pick(&self.raw_content, defaults.raw_content),
            npm_registry: pick(&self.npm_registry, defaults.npm_registry),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            backoff: Duration::from_millis(self.backoff_ms),
        }
    }
}

impl NetScoreConfig {
    /// Apply environment overrides. `lookup` is `std::env::var` in
    /// production and a map in tests.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup("GITHUB_TOKEN").filter(|t| !t.trim().is_empty()) {
            self.github_token = Some(token.trim().to_string());
        }
        if let Some(path) = lookup("LOG_FILE").filter(|p| !p.trim().is_empty()) {
            self.log_file = Some(PathBuf::from(path));
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            self.log_level = Some(LogLevel::from_env_value(&level));
        }
        if let Some(size) = lookup("NETSCORE_BATCH_SIZE") {
            match size.trim().parse::<usize>() {
                Ok(n) if n > 0 => self.batch.size = n,
                _ => warn!("Ignoring invalid NETSCORE_BATCH_SIZE '{}'", size),
            }
        }
    }

    /// Repair values that would break scoring
    fn sanitize(&mut self) {
        if !self.scoring.weights.is_valid() {
            warn!(
                "Scoring weights {:?} do not sum to 1.0, normalizing",
                self.scoring.weights
            );
            self.scoring.weights.normalize();
            if !self.scoring.weights.is_valid() {
                warn!("Scoring weights unusable, falling back to defaults");
                self.scoring.weights = ScoringWeights::default();
            }
        }
        if self.batch.size == 0 {
            warn!("Batch size 0 is invalid, using {}", default_batch_size());
            self.batch.size = default_batch_size();
        }
    }
}

/// Load configuration with priority (lowest to highest):
/// 1. Built-in defaults
/// 2. User config (~/.config/netscore/config.toml)
/// 3. `explicit` path, or `netscore.toml` in the working directory
/// 4. Environment variables
///
/// An explicit path that cannot be read or parsed is an error; the implicit
/// files are skipped with a warning.
pub fn load_config(explicit: Option<&Path>) -> Result<NetScoreConfig, ConfigError> {
    let mut merged = toml::Value::Table(toml::value::Table::new());

    if let Some(user_path) = super::user_config::user_config_path().filter(|p| p.exists()) {
        match read_toml(&user_path) {
            Ok(value) => {
                debug!("Loaded user config from {}", user_path.display());
                merge_toml(&mut merged, value);
            }
            Err(e) => warn!("{}", e),
        }
    }

    match explicit {
        Some(path) => {
            let value = read_toml(path)?;
            debug!("Loaded config from {}", path.display());
            merge_toml(&mut merged, value);
        }
        None => {
            let project = Path::new(PROJECT_CONFIG_FILE);
            if project.exists() {
                match read_toml(project) {
                    Ok(value) => {
                        debug!("Loaded project config from {}", project.display());
                        merge_toml(&mut merged, value);
                    }
                    Err(e) => warn!("{}", e),
                }
            }
        }
    }

    let mut config: NetScoreConfig =
        merged
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::Parse {
                path: explicit
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| PathBuf::from(PROJECT_CONFIG_FILE)),
                message: e.to_string(),
            })?;

    config.apply_env(|key| std::env::var(key).ok());
    config.sanitize();
    Ok(config)
}

/// Parse a TOML string into a sanitized config (no files, no environment)
pub fn parse_config(content: &str) -> Result<NetScoreConfig, ConfigError> {
    let mut config: NetScoreConfig = toml::from_str(content).map_err(|e| ConfigError::Parse {
        path: PathBuf::from("<inline>"),
        message: e.to_string(),
    })?;
    config.sanitize();
    Ok(config)
}

fn read_toml(path: &Path) -> Result<toml::Value, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Deep-merge `overlay` into `base`; tables merge, everything else replaces
fn merge_toml(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base), toml::Value::Table(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_toml(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

#[cfg(test)]
mod tests;
