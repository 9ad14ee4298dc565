use anyhow::{Context, Result, anyhow};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::database::schema::validate_identifier;
use crate::errors::ImportError;

// @module: Application configuration
// Settings come from a JSON file, then `RECIMPORT_*` environment overrides.

/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Database location and table names
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Bulk import settings
    #[serde(default)]
    pub import: ImportConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Database settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// Path of the SQLite database file
    #[serde(default = "default_database_path")]
    pub path: PathBuf,

    /// Name of the language table
    #[serde(default = "default_language_table")]
    pub language_table: String,

    /// Name of the article recommendation table
    #[serde(default = "default_recommendation_table")]
    pub recommendation_table: String,

    /// Create the tables when they are missing
    #[serde(default = "default_true")]
    pub create_schema: bool,

    /// How long a statement waits on a locked database, in milliseconds
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            language_table: default_language_table(),
            recommendation_table: default_recommendation_table(),
            create_schema: true,
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

/// Bulk import settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ImportConfig {
    /// Leading lines skipped in a languages file
    #[serde(default)]
    pub language_header_lines: usize,

    /// Leading lines skipped in a scores file
    #[serde(default = "default_score_header_lines")]
    pub score_header_lines: usize,

    /// Show a progress spinner while rows are inserted
    #[serde(default = "default_true")]
    pub show_progress: bool,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            language_header_lines: 0,
            score_header_lines: default_score_header_lines(),
            show_progress: true,
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl std::str::FromStr for LogLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            _ => Err(anyhow!("Invalid log level: {}", s)),
        }
    }
}

impl From<&LogLevel> for log::LevelFilter {
    fn from(level: &LogLevel) -> Self {
        match level {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Environment variable overriding `database.path`
pub const ENV_DATABASE_PATH: &str = "RECIMPORT_DATABASE_PATH";
/// Environment variable overriding `database.language_table`
pub const ENV_LANGUAGE_TABLE: &str = "RECIMPORT_LANGUAGE_TABLE";
/// Environment variable overriding `database.recommendation_table`
pub const ENV_RECOMMENDATION_TABLE: &str = "RECIMPORT_RECOMMENDATION_TABLE";
/// Environment variable overriding `log_level`
pub const ENV_LOG_LEVEL: &str = "RECIMPORT_LOG_LEVEL";

fn default_database_path() -> PathBuf {
    let base_dir = dirs::data_local_dir()
        .or_else(dirs::data_dir)
        .or_else(|| dirs::home_dir().map(|h| h.join(".local").join("share")));

    match base_dir {
        Some(dir) => dir.join("recimport").join("recommendations.db"),
        None => PathBuf::from("recommendations.db"),
    }
}

fn default_language_table() -> String {
    "language".to_string()
}

fn default_recommendation_table() -> String {
    "article_recommendation".to_string()
}

fn default_score_header_lines() -> usize {
    1
}

fn default_busy_timeout_ms() -> u64 {
    5000
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load the configuration file at `path`, or the defaults when it does not exist
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            debug!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {:?}", path))?;
        let reader = BufReader::new(file);

        serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Apply overrides from the process environment
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup
    ///
    /// Empty values are ignored so that an exported-but-blank variable
    /// does not wipe out the file setting.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(path) = get(ENV_DATABASE_PATH) {
            self.database.path = PathBuf::from(path);
        }

        if let Some(table) = get(ENV_LANGUAGE_TABLE) {
            self.database.language_table = table;
        }

        if let Some(table) = get(ENV_RECOMMENDATION_TABLE) {
            self.database.recommendation_table = table;
        }

        if let Some(level) = get(ENV_LOG_LEVEL) {
            self.log_level = level
                .parse()
                .with_context(|| format!("Invalid value for {}", ENV_LOG_LEVEL))?;
        }

        Ok(())
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<(), ImportError> {
        if self.database.path.as_os_str().is_empty() {
            return Err(ImportError::Config("database.path must not be empty".to_string()));
        }

        validate_identifier(&self.database.language_table)?;
        validate_identifier(&self.database.recommendation_table)?;

        if self
            .database
            .language_table
            .eq_ignore_ascii_case(&self.database.recommendation_table)
        {
            return Err(ImportError::Config(format!(
                "language_table and recommendation_table must differ (both '{}')",
                self.database.language_table
            )));
        }

        Ok(())
    }
}
