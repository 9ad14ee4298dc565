/*!
 * Tests for application configuration functionality
 */

use std::collections::HashMap;
use std::path::PathBuf;

use recimport::ImportError;
use recimport::app_config::{
    Config, ENV_DATABASE_PATH, ENV_LANGUAGE_TABLE, ENV_LOG_LEVEL, ENV_RECOMMENDATION_TABLE,
    LogLevel,
};
use crate::common;

fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key: &str| map.get(key).cloned()
}

/// Test default configuration values
#[test]
fn test_default_config_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.database.language_table, "language");
    assert_eq!(config.database.recommendation_table, "article_recommendation");
    assert!(config.database.create_schema);
    assert_eq!(config.database.busy_timeout_ms, 5000);
    assert!(config.database.path.ends_with("recommendations.db"));

    assert_eq!(config.import.language_header_lines, 0);
    assert_eq!(config.import.score_header_lines, 1);
    assert!(config.import.show_progress);

    assert_eq!(config.log_level, LogLevel::Info);
    assert!(config.validate().is_ok());
}

/// Test loading a partial config file
#[test]
fn test_load_withPartialFile_shouldFillDefaults() -> anyhow::Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "conf.json",
        r#"{ "database": { "path": "/tmp/x.db", "language_table": "lang" }, "log_level": "debug" }"#,
    )?;

    let config = Config::load(&path)?;

    assert_eq!(config.database.path, PathBuf::from("/tmp/x.db"));
    assert_eq!(config.database.language_table, "lang");
    assert_eq!(config.database.recommendation_table, "article_recommendation");
    assert_eq!(config.import.score_header_lines, 1);
    assert_eq!(config.log_level, LogLevel::Debug);

    Ok(())
}

/// Test that a missing config file yields defaults
#[test]
fn test_load_withMissingFile_shouldReturnDefaults() -> anyhow::Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let config = Config::load(temp_dir.path().join("absent.json"))?;

    assert_eq!(config.database.language_table, "language");
    Ok(())
}

/// Test that a malformed config file is reported
#[test]
fn test_load_withMalformedFile_shouldFail() -> anyhow::Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "conf.json", "{ not json")?;

    let err = Config::load(&path).unwrap_err();
    assert!(err.to_string().contains("Failed to parse config file"));
    Ok(())
}

/// Test environment overrides
#[test]
fn test_applyOverrides_withAllVariables_shouldOverrideFileValues() {
    let mut config = Config::default();
    let lookup = lookup_from(&[
        (ENV_DATABASE_PATH, "/data/rec.db"),
        (ENV_LANGUAGE_TABLE, "lang"),
        (ENV_RECOMMENDATION_TABLE, "rec"),
        (ENV_LOG_LEVEL, "warn"),
    ]);

    config.apply_overrides(lookup).unwrap();

    assert_eq!(config.database.path, PathBuf::from("/data/rec.db"));
    assert_eq!(config.database.language_table, "lang");
    assert_eq!(config.database.recommendation_table, "rec");
    assert_eq!(config.log_level, LogLevel::Warn);
}

#[test]
fn test_applyOverrides_withInvalidLogLevel_shouldFail() {
    let mut config = Config::default();
    let lookup = lookup_from(&[(ENV_LOG_LEVEL, "loud")]);

    assert!(config.apply_overrides(lookup).is_err());
}

/// Test configuration validation
#[test]
fn test_validate_withVariousConfigs_shouldValidateCorrectly() {
    let mut config = Config::default();
    assert!(config.validate().is_ok());

    config.database.language_table = "language; DROP TABLE language".to_string();
    assert!(matches!(
        config.validate(),
        Err(ImportError::InvalidIdentifier(_))
    ));
    config.database.language_table = "language".to_string();

    config.database.recommendation_table = "LANGUAGE".to_string();
    assert!(matches!(config.validate(), Err(ImportError::Config(_))));
    config.database.recommendation_table = "article_recommendation".to_string();

    config.database.path = PathBuf::new();
    assert!(matches!(config.validate(), Err(ImportError::Config(_))));
}

/// Test that a config survives a JSON round trip with the same field names
#[test]
fn test_serialize_shouldUseDocumentedFieldNames() {
    let json = serde_json::to_value(Config::default()).unwrap();

    assert!(json["database"]["language_table"].is_string());
    assert!(json["database"]["recommendation_table"].is_string());
    assert_eq!(json["import"]["score_header_lines"], 1);
    assert_eq!(json["log_level"], "info");
}
