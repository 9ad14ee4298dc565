/*!
 * Database schema definitions.
 *
 * This module owns the SQL for the language and recommendation tables
 * and the identifier rules that make configurable table names safe to
 * splice into statements.
 */

use anyhow::{Context, Result};
use log::{debug, info};
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::Connection;

use crate::errors::ImportError;

static IDENTIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid")
});

/// Table names used by every statement the importer issues
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableNames {
    /// Language table: (id, code)
    pub language: String,
    /// Recommendation table: (id, wikidata_id, score, source_id, target_id)
    pub recommendation: String,
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            language: "language".to_string(),
            recommendation: "article_recommendation".to_string(),
        }
    }
}

impl TableNames {
    /// Build table names, rejecting anything that is not a plain identifier
    pub fn new(language: &str, recommendation: &str) -> Result<Self, ImportError> {
        validate_identifier(language)?;
        validate_identifier(recommendation)?;

        Ok(Self {
            language: language.to_string(),
            recommendation: recommendation.to_string(),
        })
    }
}

/// Check that `name` can be used as a table or column name
pub fn validate_identifier(name: &str) -> Result<(), ImportError> {
    if IDENTIFIER.is_match(name) {
        Ok(())
    } else {
        Err(ImportError::InvalidIdentifier(name.to_string()))
    }
}

/// Validate `name` and wrap it in double quotes for use in SQL text
pub fn quote_identifier(name: &str) -> Result<String, ImportError> {
    validate_identifier(name)?;
    Ok(format!("\"{}\"", name))
}

/// Create the language and recommendation tables if they do not exist
pub fn initialize_schema(conn: &Connection, tables: &TableNames) -> Result<()> {
    let language = quote_identifier(&tables.language)?;
    let recommendation = quote_identifier(&tables.recommendation)?;
    let index = quote_identifier(&format!("idx_{}_target", tables.recommendation))?;

    debug!(
        "Ensuring tables {} and {} exist",
        tables.language, tables.recommendation
    );

    conn.execute_batch(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {language} (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            code TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS {recommendation} (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            wikidata_id TEXT NOT NULL,
            score REAL NOT NULL CHECK (typeof(score) = 'real'),
            source_id INTEGER NOT NULL REFERENCES {language}(id),
            target_id INTEGER NOT NULL REFERENCES {language}(id)
        );

        CREATE INDEX IF NOT EXISTS {index} ON {recommendation}(target_id, wikidata_id);
        "#
    ))
    .context("Failed to create database schema")?;

    info!("Database schema ready");
    Ok(())
}

/// Check whether a table exists in the main database
pub fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
            [table],
            |row| row.get(0),
        )
        .with_context(|| format!("Failed to check existence of table {}", table))?;

    Ok(count > 0)
}
