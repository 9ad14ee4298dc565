/*!
 * Repository layer for database operations.
 *
 * This module provides the language resolver, the two bulk loads and the
 * read queries, keeping the SQL details out of the controller.
 */

use anyhow::{Context, Result};
use csv::StringRecord;
use log::{debug, error, info};
use rusqlite::{Connection, OptionalExtension, params_from_iter};
use rusqlite::types::Value;
use std::path::Path;

use super::bulk_load::BulkLoad;
use super::connection::DatabaseConnection;
use super::models::{
    DatabaseStats, LanguagePair, LanguageRecord, LoadSummary, RecommendationRecord,
    ScoredArticle,
};
use super::schema::{TableNames, quote_identifier};
use crate::errors::ImportError;
use crate::language_utils;

/// Header lines skipped by each kind of load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderLines {
    /// Leading lines of a languages file
    pub languages: usize,
    /// Leading lines of a scores file
    pub scores: usize,
}

impl Default for HeaderLines {
    fn default() -> Self {
        Self {
            languages: 0,
            scores: 1,
        }
    }
}

/// Repository for database operations
pub struct Repository {
    /// Database connection
    db: DatabaseConnection,
    /// Header lines to skip per load
    header_lines: HeaderLines,
}

impl Repository {
    /// Create a new repository with the given database connection
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            header_lines: HeaderLines::default(),
        }
    }

    /// Create a repository with an in-memory database (for testing)
    pub fn new_in_memory() -> Result<Self> {
        let db = DatabaseConnection::new_in_memory(TableNames::default())?;
        Ok(Self::new(db))
    }

    /// Override the number of header lines skipped per load
    pub fn with_header_lines(mut self, header_lines: HeaderLines) -> Self {
        self.header_lines = header_lines;
        self
    }

    /// Underlying connection
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Close the underlying connection
    pub fn close(self) -> Result<()> {
        self.db.close()
    }

    // =========================================================================
    // Language resolution
    // =========================================================================

    /// Look up the id of the language with exactly this `code`
    ///
    /// Absence is logged and reported as `None`; it is not an error.
    pub fn find_language_id(&self, code: &str) -> Result<Option<i64>> {
        self.db
            .execute(|conn, tables| Self::find_language_id_sync(conn, tables, code))
    }

    /// Look up a language id (synchronous version for use within transactions)
    fn find_language_id_sync(conn: &Connection, tables: &TableNames, code: &str) -> Result<Option<i64>> {
        let sql = format!(
            "SELECT id FROM {} WHERE code = ?1 LIMIT 1",
            quote_identifier(&tables.language)?
        );

        let id = conn
            .query_row(&sql, [code], |row| row.get::<_, i64>(0))
            .optional()
            .with_context(|| format!("Failed to look up language {}", code))?;

        match id {
            Some(id) => {
                match language_utils::get_language_name(code) {
                    Some(name) => debug!("Language {} ({}) has id {}", code, name, id),
                    None => debug!("Language {} has id {}", code, id),
                }
                Ok(Some(id))
            }
            None => {
                error!("No such language: {}", code);
                Ok(None)
            }
        }
    }

    /// Resolve both languages of a pair
    pub fn resolve_language_pair(&self, source: &str, target: &str) -> Result<LanguagePair> {
        self.db
            .execute(|conn, tables| Self::resolve_language_pair_sync(conn, tables, source, target))
    }

    /// Both codes are always looked up so every unknown one gets reported.
    fn resolve_language_pair_sync(
        conn: &Connection,
        tables: &TableNames,
        source: &str,
        target: &str,
    ) -> Result<LanguagePair> {
        let source_id = Self::find_language_id_sync(conn, tables, source)?;
        let target_id = Self::find_language_id_sync(conn, tables, target)?;

        match (source_id, target_id) {
            (Some(source_id), Some(target_id)) => Ok(LanguagePair {
                source_id,
                target_id,
            }),
            _ => {
                let missing = [(source, source_id), (target, target_id)]
                    .into_iter()
                    .filter(|(_, id)| id.is_none())
                    .map(|(code, _)| code.to_string())
                    .collect();
                Err(ImportError::UnknownLanguages(missing).into())
            }
        }
    }

    // =========================================================================
    // Bulk loads
    // =========================================================================

    /// Load language codes from a TSV file, one code per line
    pub fn load_languages<P, F>(&mut self, tsv: P, on_row: F) -> Result<LoadSummary>
    where
        P: AsRef<Path>,
        F: FnMut(u64, &StringRecord),
    {
        let tsv = tsv.as_ref();
        let header_lines = self.header_lines.languages;

        self.db.transaction(|tx, tables| {
            let load = BulkLoad::into_table(&tables.language)
                .columns(&["code"])
                .ignore_lines(header_lines);

            let rows_inserted = load.execute_file(tx, tsv, on_row)?;

            Ok(LoadSummary {
                table: load.table().to_string(),
                rows_inserted,
            })
        })
    }

    /// Load recommendation scores for the `source` to `target` pair
    ///
    /// Both codes are resolved inside the load transaction; if either is
    /// unknown nothing is written.
    pub fn load_scores<P, F>(
        &mut self,
        tsv: P,
        source: &str,
        target: &str,
        on_row: F,
    ) -> Result<LoadSummary>
    where
        P: AsRef<Path>,
        F: FnMut(u64, &StringRecord),
    {
        let tsv = tsv.as_ref();
        let header_lines = self.header_lines.scores;

        self.db.transaction(|tx, tables| {
            let pair = Self::resolve_language_pair_sync(tx, tables, source, target)?;
            info!(
                "Loading {} -> {} scores (source_id={}, target_id={})",
                source, target, pair.source_id, pair.target_id
            );

            let load = BulkLoad::into_table(&tables.recommendation)
                .columns(&["wikidata_id", "score"])
                .ignore_lines(header_lines)
                .set("source_id", pair.source_id)
                .set("target_id", pair.target_id);

            let rows_inserted = load.execute_file(tx, tsv, on_row)?;

            Ok(LoadSummary {
                table: load.table().to_string(),
                rows_inserted,
            })
        })
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// All languages ordered by id
    pub fn list_languages(&self) -> Result<Vec<LanguageRecord>> {
        self.db.execute(|conn, tables| {
            let sql = format!(
                "SELECT id, code FROM {} ORDER BY id",
                quote_identifier(&tables.language)?
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(LanguageRecord {
                        id: row.get(0)?,
                        code: row.get(1)?,
                    })
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            Ok(rows)
        })
    }

    /// Recommendations stored for one language pair, ordered by id
    pub fn recommendations_for_pair(&self, pair: LanguagePair) -> Result<Vec<RecommendationRecord>> {
        self.db.execute(|conn, tables| {
            let sql = format!(
                "SELECT id, wikidata_id, score, source_id, target_id FROM {}
                 WHERE source_id = ?1 AND target_id = ?2 ORDER BY id",
                quote_identifier(&tables.recommendation)?
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([pair.source_id, pair.target_id], |row| {
                    Ok(RecommendationRecord {
                        id: row.get(0)?,
                        wikidata_id: row.get(1)?,
                        score: row.get(2)?,
                        source_id: row.get(3)?,
                        target_id: row.get(4)?,
                    })
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            Ok(rows)
        })
    }

    /// Best-scored recommendations among `wikidata_ids` for the `target` language
    pub fn top_scores_for_target(
        &self,
        wikidata_ids: &[String],
        target: &str,
        limit: u32,
    ) -> Result<Vec<ScoredArticle>> {
        if wikidata_ids.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        self.db.execute(|conn, tables| {
            let rec = quote_identifier(&tables.recommendation)?;
            let lang = quote_identifier(&tables.language)?;
            let placeholders = (3..wikidata_ids.len() + 3)
                .map(|i| format!("?{}", i))
                .collect::<Vec<_>>()
                .join(", ");

            let sql = format!(
                "SELECT r.wikidata_id, r.score FROM {rec} r
                 INNER JOIN {lang} l ON r.target_id = l.id
                 WHERE l.code = ?1 AND r.wikidata_id IN ({placeholders})
                 ORDER BY r.score DESC, r.id
                 LIMIT ?2"
            );

            let params: Vec<Value> = [Value::Text(target.to_string()), Value::Integer(limit.into())]
                .into_iter()
                .chain(wikidata_ids.iter().map(|id| Value::Text(id.clone())))
                .collect();

            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(params_from_iter(params.iter()), |row| {
                    Ok(ScoredArticle {
                        wikidata_id: row.get(0)?,
                        score: row.get(1)?,
                    })
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            debug!("Found {} scored articles for {}", rows.len(), target);
            Ok(rows)
        })
    }

    /// Row counts of both tables
    pub fn stats(&self) -> Result<DatabaseStats> {
        let file_size_bytes = self.db.file_size();

        self.db.execute(|conn, tables| {
            let lang = quote_identifier(&tables.language)?;
            let rec = quote_identifier(&tables.recommendation)?;

            let language_count: i64 =
                conn.query_row(&format!("SELECT COUNT(*) FROM {lang}"), [], |row| row.get(0))?;
            let recommendation_count: i64 =
                conn.query_row(&format!("SELECT COUNT(*) FROM {rec}"), [], |row| row.get(0))?;
            let pair_count: i64 = conn.query_row(
                &format!("SELECT COUNT(*) FROM (SELECT DISTINCT source_id, target_id FROM {rec})"),
                [],
                |row| row.get(0),
            )?;

            Ok(DatabaseStats {
                language_count,
                recommendation_count,
                pair_count,
                file_size_bytes,
            })
        })
    }
}
