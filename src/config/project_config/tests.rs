use super::*;
use std::collections::HashMap;

#[test]
fn test_default_config() {
    let config = NetScoreConfig::default();
    assert_eq!(config.batch.size, 5);
    assert_eq!(config.scoring.min_contributors, 10);
    assert_eq!(config.scoring.max_contributors, 100);
    assert!(!config.scoring.extended_metrics);
    assert!(config.scoring.weights.is_valid());
    assert_eq!(config.http.timeout_secs, 30);
    assert!(config.github_token.is_none());
}

#[test]
fn test_scoring_weights_validation() {
    assert!(ScoringWeights::default().is_valid());

    let invalid = ScoringWeights {
        ramp_up: 0.5,
        correctness: 0.5,
        bus_factor: 0.5,
        responsive_maintainer: 0.5,
    };
    assert!(!invalid.is_valid());

    let negative = ScoringWeights {
        ramp_up: -0.2,
        correctness: 0.6,
        bus_factor: 0.3,
        responsive_maintainer: 0.3,
    };
    assert!(!negative.is_valid());
}

#[test]
fn test_scoring_weights_normalize() {
    let mut weights = ScoringWeights {
        ramp_up: 2.0,
        correctness: 1.0,
        bus_factor: 1.0,
        responsive_maintainer: 0.0,
    };
    weights.normalize();
    assert!((weights.ramp_up - 0.5).abs() < 0.001);
    assert!((weights.correctness - 0.25).abs() < 0.001);
    assert!(weights.is_valid());
}

#[test]
fn test_parse_partial_toml() {
    let config = parse_config(
        r#"
[batch]
size = 3

[http]
timeout_secs = 5
npm_registry = "http://localhost:4873/"
"#,
    )
    .unwrap();
    assert_eq!(config.batch.size, 3);
    assert_eq!(config.http.timeout_secs, 5);
    assert_eq!(config.http.max_retries, 2);
    assert_eq!(config.http.endpoints().npm_registry, "http://localhost:4873");
    assert_eq!(
        config.http.endpoints().github_api,
        "https://api.github.com"
    );
}

#[test]
fn test_parse_normalizes_bad_weights() {
    let config = parse_config(
        r#"
[scoring.weights]
ramp_up = 1.0
correctness = 1.0
bus_factor = 1.0
responsive_maintainer = 1.0
"#,
    )
    .unwrap();
    assert!(config.scoring.weights.is_valid());
    assert!((config.scoring.weights.ramp_up - 0.25).abs() < 0.001);
}

#[test]
fn test_parse_rejects_malformed() {
    assert!(matches!(
        parse_config("[batch\nsize = 3"),
        Err(ConfigError::Parse { .. })
    ));
}

#[test]
fn test_zero_batch_size_falls_back() {
    let config = parse_config("[batch]\nsize = 0\n").unwrap();
    assert_eq!(config.batch.size, 5);
}

#[test]
fn test_env_overrides() {
    let env: HashMap<&str, &str> = [
        ("GITHUB_TOKEN", " ghp_abc "),
        ("LOG_FILE", "/tmp/netscore.log"),
        ("LOG_LEVEL", "2"),
        ("NETSCORE_BATCH_SIZE", "7"),
    ]
    .into_iter()
    .collect();

    let mut config = NetScoreConfig::default();
    config.apply_env(|key| env.get(key).map(|v| v.to_string()));

    assert_eq!(config.github_token.as_deref(), Some("ghp_abc"));
    assert_eq!(config.log_file, Some(PathBuf::from("/tmp/netscore.log")));
    assert_eq!(config.log_level, Some(LogLevel::Debug));
    assert_eq!(config.batch.size, 7);
}

#[test]
fn test_env_ignores_blank_token_and_bad_batch_size() {
    let mut config = NetScoreConfig::default();
    config.apply_env(|key| match key {
        "GITHUB_TOKEN" => Some("   ".to_string()),
        "NETSCORE_BATCH_SIZE" => Some("many".to_string()),
        _ => None,
    });
    assert!(config.github_token.is_none());
    assert_eq!(config.batch.size, 5);
}

#[test]
fn test_log_level_values() {
    assert_eq!(LogLevel::from_env_value("0"), LogLevel::Silent);
    assert_eq!(LogLevel::from_env_value("1"), LogLevel::Info);
    assert_eq!(LogLevel::from_env_value("2"), LogLevel::Debug);
    assert_eq!(LogLevel::from_env_value("verbose"), LogLevel::Silent);
    assert_eq!(LogLevel::Debug.directive(), "debug");
}

#[test]
fn test_merge_toml_overlays_nested_tables() {
    let mut base: toml::Value = toml::from_str("[http]\ntimeout_secs = 10\nmax_retries = 4\n").unwrap();
    let overlay: toml::Value = toml::from_str("[http]\ntimeout_secs = 60\n").unwrap();
    merge_toml(&mut base, overlay);
    let config: NetScoreConfig = base.try_into().unwrap();
    assert_eq!(config.http.timeout_secs, 60);
    assert_eq!(config.http.max_retries, 4);
}

#[test]
fn test_load_explicit_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("custom.toml");
    std::fs::write(&path, "[scoring]\nextended_metrics = true\n").unwrap();

    let config = load_config(Some(&path)).unwrap();
    assert!(config.scoring.extended_metrics);
}

#[test]
fn test_load_missing_explicit_file_errors() {
    let dir = tempfile::tempdir().unwrap();
    let result = load_config(Some(&dir.path().join("absent.toml")));
    assert!(matches!(result, Err(ConfigError::Read { .. })));
}
