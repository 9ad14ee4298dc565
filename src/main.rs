// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, debug};
use std::io::Write;
use std::path::{Path, PathBuf};

use recimport::app_config::{self, Config};
use recimport::app_controller::{Controller, DEFAULT_TOP_LIMIT};
use recimport::{ImportError, ImportRequest, LoadMode};

/// CLI Wrapper for LoadMode to implement ValueEnum
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum CliLoadMode {
    Languages,
    Scores,
}

impl From<CliLoadMode> for LoadMode {
    fn from(cli_mode: CliLoadMode) -> Self {
        match cli_mode {
            CliLoadMode::Languages => LoadMode::Languages,
            CliLoadMode::Scores => LoadMode::Scores,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the best-scored recommendations for a target language
    Top(TopArgs),

    /// Show row counts of the recommendation database
    Stats,

    /// Generate shell completions for recimport
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct TopArgs {
    /// Target language code (e.g., 'fr')
    #[arg(long)]
    target: String,

    /// Maximum number of results
    #[arg(short = 'n', long, default_value_t = DEFAULT_TOP_LIMIT)]
    limit: u32,

    /// Wikidata ids to rank (e.g., Q42)
    #[arg(value_name = "WIKIDATA_ID", required = true)]
    wikidata_ids: Vec<String>,
}

/// recimport - article recommendation data importer
///
/// Imports tab-separated language codes and recommendation scores
/// into the recommendation database.
#[derive(Parser, Debug)]
#[command(name = "recimport")]
#[command(version)]
#[command(about = "Imports article recommendations into the recommendation database")]
#[command(subcommand_negates_reqs = true)]
#[command(long_about = "recimport bulk-loads tab-separated files into the recommendation database.

EXAMPLES:
    recimport --load languages --tsv langs.tsv
    recimport --load scores --source en --target fr --tsv en-fr.tsv
    recimport top --target fr Q42 Q64 Q90
    recimport stats
    recimport completions bash > recimport.bash

CONFIGURATION:
    Settings are read from recimport.json by default (see --config-path).
    A missing file means defaults. RECIMPORT_DATABASE_PATH,
    RECIMPORT_LANGUAGE_TABLE, RECIMPORT_RECOMMENDATION_TABLE and
    RECIMPORT_LOG_LEVEL override the file, also when set in a .env file.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// What to load
    #[arg(long, value_enum, required = true)]
    load: Option<CliLoadMode>,

    /// Source language code (required with --load scores)
    #[arg(long, required_if_eq("load", "scores"))]
    source: Option<String>,

    /// Target language code (required with --load scores)
    #[arg(long, required_if_eq("load", "scores"))]
    target: Option<String>,

    /// Tab-separated input file
    #[arg(long, value_name = "PATH", required = true)]
    tsv: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "recimport.json")]
    config_path: PathBuf,

    /// Set logging level
    #[arg(short, long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger;

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color and tag for a log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("1;31", "ERROR"),
            Level::Warn => ("1;33", "WARN "),
            Level::Info => ("1;32", "INFO "),
            Level::Debug => ("1;36", "DEBUG"),
            Level::Trace => ("1;35", "TRACE"),
        }
    }
}

impl Log for CustomLogger {
    // The max level is adjusted once the config has been read
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (color, tag) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "\x1B[{}m{} {} {}\x1B[0m",
                color,
                now,
                tag,
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // The level is updated after the config has been loaded
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "recimport", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Top(args)) => {
            let config = load_config(&cli.config_path, cli.log_level)?;
            let controller = Controller::with_config(config)?;

            let articles = controller.top_scores(&args.target, &args.wikidata_ids, args.limit)?;
            let mut stdout = std::io::stdout().lock();
            for article in &articles {
                writeln!(stdout, "{}\t{}", article.wikidata_id, article.score)?;
            }

            controller.close()
        }
        Some(Commands::Stats) => {
            let config = load_config(&cli.config_path, cli.log_level)?;
            let controller = Controller::with_config(config)?;

            println!("{}", controller.stats()?);

            controller.close()
        }
        None => {
            let mode = cli.load.ok_or(ImportError::MissingArgument("load"))?;
            let request = ImportRequest::new(mode.into(), cli.source, cli.target, cli.tsv)?;

            let config = load_config(&cli.config_path, cli.log_level)?;
            run_import(config, &request)
        }
    }
}

/// Read the config file, then apply `.env`/environment and CLI overrides
fn load_config(config_path: &Path, log_level: Option<CliLogLevel>) -> Result<Config> {
    if let Ok(path) = dotenvy::dotenv() {
        debug!("Loaded environment from {:?}", path);
    }

    let mut config = Config::load(config_path)?;
    config.apply_env_overrides()?;

    if let Some(level) = log_level {
        config.log_level = level.into();
    }

    config
        .validate()
        .context("Configuration validation failed")?;

    log::set_max_level(LevelFilter::from(&config.log_level));
    Ok(config)
}

fn run_import(config: Config, request: &ImportRequest) -> Result<()> {
    let mut controller = Controller::with_config(config)?;

    // On error the controller is dropped here: the load transaction has
    // already rolled back and dropping closes the connection.
    let summary = controller.run(request)?;
    println!("{}", summary);

    controller.close()
}
