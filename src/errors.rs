/*!
 * Error types for the recimport application.
 *
 * Typed conditions the caller may want to inspect are defined here with
 * thiserror; everything else travels as `anyhow::Error` with context.
 */

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while interpreting a request or importing a file
#[derive(Error, Debug)]
pub enum ImportError {
    /// The `--load` value is neither "languages" nor "scores"
    #[error("Wrong --load option: '{0}' (expected 'languages' or 'scores')")]
    InvalidLoadMode(String),

    /// An option required by the selected load mode is absent
    #[error("Missing required option: --{0}")]
    MissingArgument(&'static str),

    /// One or more language codes have no row in the language table
    #[error("No such language: {}", .0.join(", "))]
    UnknownLanguages(Vec<String>),

    /// A table or column name that cannot be used as an SQL identifier
    #[error("Invalid SQL identifier: '{0}'")]
    InvalidIdentifier(String),

    /// The input file could not be opened
    #[error("Cannot open input file {path:?}: {source}")]
    InputFile {
        /// Path given on the command line
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// The input file could not be read as tab-separated records
    #[error("Malformed input at line {line}: {message}")]
    MalformedInput {
        /// 1-based line number of the offending record
        line: u64,
        /// Reader diagnostic
        message: String,
    },

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),
}
