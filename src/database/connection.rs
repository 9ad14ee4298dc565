/*!
 * Database connection management.
 *
 * This module opens the SQLite database, applies connection settings and
 * scopes every batch to a transaction that either commits or rolls back.
 */

use anyhow::{Context, Result, anyhow};
use log::{debug, info};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::schema::{self, TableNames};
use crate::app_config::DatabaseConfig;

/// Marker path reported by in-memory databases
const IN_MEMORY_PATH: &str = ":memory:";

/// Owned database session
///
/// Dropping the value closes the connection, so early returns release it
/// as well; `close` exists to surface close errors on the success path.
pub struct DatabaseConnection {
    /// Path to the database file
    db_path: PathBuf,
    /// Table names the schema was created with
    tables: TableNames,
    /// The underlying connection
    connection: Connection,
}

impl DatabaseConnection {
    /// Open the database described by `config`
    pub fn open(config: &DatabaseConfig) -> Result<Self> {
        let tables = TableNames::new(&config.language_table, &config.recommendation_table)?;
        let db_path = config.path.clone();

        // Ensure parent directory exists
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create database directory: {:?}", parent))?;
            }
        }

        info!("Opening database at: {:?}", db_path);

        let conn = Connection::open(&db_path)
            .with_context(|| format!("Failed to open database: {:?}", db_path))?;
        conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;

        Self::prepare(conn, db_path, tables, config.create_schema)
    }

    /// Create an in-memory database with the schema in place (for testing)
    pub fn new_in_memory(tables: TableNames) -> Result<Self> {
        debug!("Creating in-memory database");

        let conn =
            Connection::open_in_memory().context("Failed to create in-memory database")?;

        Self::prepare(conn, PathBuf::from(IN_MEMORY_PATH), tables, true)
    }

    fn prepare(
        conn: Connection,
        db_path: PathBuf,
        tables: TableNames,
        create_schema: bool,
    ) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;

        if create_schema {
            schema::initialize_schema(&conn, &tables)?;
        }

        Ok(Self {
            db_path,
            tables,
            connection: conn,
        })
    }

    /// Get the database file path
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Execute a read operation with the connection
    pub fn execute<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection, &TableNames) -> Result<T>,
    {
        f(&self.connection, &self.tables)
    }

    /// Run `f` inside a transaction
    ///
    /// The transaction commits when `f` returns `Ok`; on `Err` it is dropped
    /// uncommitted, which rolls it back.
    pub fn transaction<F, T>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&rusqlite::Transaction, &TableNames) -> Result<T>,
    {
        let tx = self
            .connection
            .transaction()
            .context("Failed to begin transaction")?;

        let result = f(&tx, &self.tables)?;
        tx.commit().context("Failed to commit transaction")?;
        debug!("Transaction committed");

        Ok(result)
    }

    /// Size of the database file in bytes, 0 for in-memory databases
    pub fn file_size(&self) -> u64 {
        if self.db_path.as_os_str() == IN_MEMORY_PATH {
            return 0;
        }

        std::fs::metadata(&self.db_path)
            .map(|m| m.len())
            .unwrap_or(0)
    }

    /// Close the connection, reporting any error from SQLite
    pub fn close(self) -> Result<()> {
        let Self {
            db_path,
            connection,
            ..
        } = self;

        connection
            .close()
            .map_err(|(_, e)| anyhow!("Failed to close database {:?}: {}", db_path, e))
    }
}
