use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};
use std::path::Path;
use std::time::{Duration, Instant};

use crate::app_config::Config;
use crate::database::models::{DatabaseStats, ImportRequest, LoadSummary, ScoredArticle};
use crate::database::{DatabaseConnection, HeaderLines, Repository, TableNames};
use crate::language_utils;

// @module: Application controller for recommendation imports

/// Progress spinner redraws after this many rows
const PROGRESS_STEP: u64 = 1000;

/// Default number of results returned by `top_scores`
pub const DEFAULT_TOP_LIMIT: u32 = 10;

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Repository over the open database
    repository: Repository,
}

impl Controller {
    /// Create a controller over an in-memory database with default configuration
    pub fn new_for_test() -> Result<Self> {
        let mut config = Config::default();
        config.import.show_progress = false;

        let db = DatabaseConnection::new_in_memory(TableNames::default())?;
        Ok(Self::with_connection(config, db))
    }

    // @method: Open the configured database and create a controller over it
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;

        let db = DatabaseConnection::open(&config.database)?;
        Ok(Self::with_connection(config, db))
    }

    // @method: Create a controller over an already open database
    pub fn with_connection(config: Config, db: DatabaseConnection) -> Self {
        let repository = Repository::new(db).with_header_lines(HeaderLines {
            languages: config.import.language_header_lines,
            scores: config.import.score_header_lines,
        });

        Self { config, repository }
    }

    /// Run an import request
    pub fn run(&mut self, request: &ImportRequest) -> Result<LoadSummary> {
        match request {
            ImportRequest::Languages { tsv } => self.load_languages(tsv),
            ImportRequest::Scores {
                source,
                target,
                tsv,
            } => self.load_scores(tsv, source, target),
        }
    }

    /// Load language codes from `tsv`
    pub fn load_languages(&mut self, tsv: &Path) -> Result<LoadSummary> {
        info!("Loading languages from {:?}", tsv);
        let start_time = Instant::now();
        let progress_bar = self.progress_bar("languages");

        let pb = progress_bar.clone();
        let summary = self.repository.load_languages(tsv, move |count, record| {
            if let Some(code) = record.get(0) {
                if !language_utils::is_iso_code(code) {
                    debug!("'{}' is not an ISO 639 code", code);
                }
            }
            if count % PROGRESS_STEP == 0 {
                pb.set_position(count);
            }
        });

        Self::finish(&progress_bar, summary, start_time.elapsed())
    }

    /// Load scores for the `source` to `target` pair from `tsv`
    pub fn load_scores(&mut self, tsv: &Path, source: &str, target: &str) -> Result<LoadSummary> {
        info!("Loading {} -> {} scores from {:?}", source, target, tsv);
        let start_time = Instant::now();
        let progress_bar = self.progress_bar("scores");

        let pb = progress_bar.clone();
        let summary = self.repository.load_scores(tsv, source, target, move |count, _| {
            if count % PROGRESS_STEP == 0 {
                pb.set_position(count);
            }
        });

        Self::finish(&progress_bar, summary, start_time.elapsed())
    }

    /// Best-scored recommendations among `wikidata_ids` for the `target` language
    pub fn top_scores(
        &self,
        target: &str,
        wikidata_ids: &[String],
        limit: u32,
    ) -> Result<Vec<ScoredArticle>> {
        self.repository
            .top_scores_for_target(wikidata_ids, target, limit)
    }

    /// Row counts of both tables
    pub fn stats(&self) -> Result<DatabaseStats> {
        self.repository.stats()
    }

    /// Close the database
    pub fn close(self) -> Result<()> {
        self.repository.close()
    }

    fn progress_bar(&self, what: &str) -> ProgressBar {
        if !self.config.import.show_progress {
            return ProgressBar::hidden();
        }

        let progress_bar = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {pos} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        progress_bar.set_style(style);
        progress_bar.set_message(format!("{} rows", what));
        progress_bar.enable_steady_tick(Duration::from_millis(120));
        progress_bar
    }

    fn finish(
        progress_bar: &ProgressBar,
        summary: Result<LoadSummary>,
        elapsed: Duration,
    ) -> Result<LoadSummary> {
        match summary {
            Ok(summary) => {
                progress_bar.set_position(summary.rows_inserted);
                progress_bar.finish_and_clear();
                info!("{} in {:.2}s", summary, elapsed.as_secs_f64());
                Ok(summary)
            }
            Err(e) => {
                progress_bar.abandon();
                Err(e)
            }
        }
    }
}
