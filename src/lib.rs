/*!
 * # recimport - article recommendation data importer
 *
 * Imports tab-separated language codes and article-recommendation scores
 * into the recommendation database.
 *
 * ## Features
 *
 * - Bulk load of language codes into the language table
 * - Bulk load of recommendation scores for a source/target language pair,
 *   with both language codes resolved to ids before anything is written
 * - One transaction per load: a failed batch leaves no rows behind
 * - Read-back of the best-scored recommendations for a target language
 * - JSON configuration with environment overrides
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `app_controller`: Runs import requests against the database
 * - `database`: SQLite persistence:
 *   - `database::connection`: Scoped connection and transactions
 *   - `database::schema`: Table definitions and identifier rules
 *   - `database::bulk_load`: Positional TSV-to-table inserts
 *   - `database::repository`: Language resolution, loads and queries
 *   - `database::models`: Records and request types
 * - `tsv`: Tab-separated record reader
 * - `language_utils`: ISO language code utilities
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod database;
pub mod errors;
pub mod language_utils;
pub mod tsv;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::Controller;
pub use database::models::{ImportRequest, LoadMode, LoadSummary};
pub use errors::ImportError;
