/*!
 * Database entity models and request types.
 *
 * These structures map directly to database tables and to the requests
 * the command line turns into.
 */

use std::fmt;
use std::path::PathBuf;

use crate::errors::ImportError;

/// What a run loads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMode {
    /// Language codes into the language table
    Languages,
    /// Recommendation scores into the recommendation table
    Scores,
}

impl fmt::Display for LoadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadMode::Languages => write!(f, "languages"),
            LoadMode::Scores => write!(f, "scores"),
        }
    }
}

impl std::str::FromStr for LoadMode {
    type Err = ImportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "languages" => Ok(LoadMode::Languages),
            "scores" => Ok(LoadMode::Scores),
            _ => Err(ImportError::InvalidLoadMode(s.to_string())),
        }
    }
}

/// A fully validated import request
#[derive(Debug, Clone, PartialEq)]
pub enum ImportRequest {
    /// Load language codes from `tsv`
    Languages { tsv: PathBuf },
    /// Load scores from `tsv` for the `source` to `target` pair
    Scores {
        source: String,
        target: String,
        tsv: PathBuf,
    },
}

impl ImportRequest {
    /// Build a request from raw options, checking the ones `mode` requires
    pub fn new(
        mode: LoadMode,
        source: Option<String>,
        target: Option<String>,
        tsv: Option<PathBuf>,
    ) -> Result<Self, ImportError> {
        let tsv = tsv.ok_or(ImportError::MissingArgument("tsv"))?;

        match mode {
            LoadMode::Languages => Ok(ImportRequest::Languages { tsv }),
            LoadMode::Scores => Ok(ImportRequest::Scores {
                source: source.ok_or(ImportError::MissingArgument("source"))?,
                target: target.ok_or(ImportError::MissingArgument("target"))?,
                tsv,
            }),
        }
    }

    /// Mode this request was built for
    pub fn mode(&self) -> LoadMode {
        match self {
            ImportRequest::Languages { .. } => LoadMode::Languages,
            ImportRequest::Scores { .. } => LoadMode::Scores,
        }
    }

    /// Input file of this request
    pub fn tsv(&self) -> &PathBuf {
        match self {
            ImportRequest::Languages { tsv } | ImportRequest::Scores { tsv, .. } => tsv,
        }
    }
}

/// Row of the language table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageRecord {
    pub id: i64,
    pub code: String,
}

/// Row of the recommendation table
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationRecord {
    pub id: i64,
    pub wikidata_id: String,
    pub score: f64,
    pub source_id: i64,
    pub target_id: i64,
}

/// Wikidata item with its recommendation score
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredArticle {
    pub wikidata_id: String,
    pub score: f64,
}

/// Resolved ids of a source/target language pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguagePair {
    pub source_id: i64,
    pub target_id: i64,
}

/// Outcome of one bulk load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadSummary {
    /// Table the rows went into
    pub table: String,
    /// Number of rows inserted
    pub rows_inserted: u64,
}

impl fmt::Display for LoadSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} rows inserted into {}", self.rows_inserted, self.table)
    }
}

/// Row counts of both tables
#[derive(Debug, Clone)]
pub struct DatabaseStats {
    /// Number of language rows
    pub language_count: i64,
    /// Number of recommendation rows
    pub recommendation_count: i64,
    /// Number of distinct source/target pairs with recommendations
    pub pair_count: i64,
    /// Database file size in bytes
    pub file_size_bytes: u64,
}

impl fmt::Display for DatabaseStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Languages: {}, Recommendations: {}, Language pairs: {}, Size: {} KB",
            self.language_count,
            self.recommendation_count,
            self.pair_count,
            self.file_size_bytes / 1024
        )
    }
}
