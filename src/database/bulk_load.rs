/*!
 * Bulk loading of tab-separated files into a table.
 *
 * A `BulkLoad` describes where the fields of each record go: file columns
 * map positionally onto table columns, and constant assignments are applied
 * to every row. The primary key is never part of the column list, so the
 * database assigns it for each row whatever the file contains.
 */

use anyhow::{Context, Result};
use csv::{Reader, StringRecord};
use log::debug;
use rusqlite::types::Value;
use rusqlite::{Connection, params_from_iter};
use std::io::Read;
use std::path::Path;

use super::schema::quote_identifier;
use crate::errors::ImportError;
use crate::tsv;

/// Description of one bulk insert
#[derive(Debug, Clone)]
pub struct BulkLoad {
    table: String,
    columns: Vec<String>,
    ignore_lines: usize,
    constants: Vec<(String, Value)>,
}

impl BulkLoad {
    /// Start describing a load into `table`
    pub fn into_table(table: &str) -> Self {
        Self {
            table: table.to_string(),
            columns: Vec::new(),
            ignore_lines: 0,
            constants: Vec::new(),
        }
    }

    /// Table columns receiving the file fields, in file order
    pub fn columns(mut self, columns: &[&str]) -> Self {
        self.columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Number of leading lines to skip
    pub fn ignore_lines(mut self, lines: usize) -> Self {
        self.ignore_lines = lines;
        self
    }

    /// Assign `value` to `column` on every inserted row
    pub fn set<V: Into<Value>>(mut self, column: &str, value: V) -> Self {
        self.constants.push((column.to_string(), value.into()));
        self
    }

    /// Target table
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Parameterized INSERT statement for this load
    pub fn insert_sql(&self) -> Result<String, ImportError> {
        if self.columns.is_empty() {
            return Err(ImportError::Config(format!(
                "bulk load into {} maps no file columns",
                self.table
            )));
        }

        let names = self
            .columns
            .iter()
            .chain(self.constants.iter().map(|(column, _)| column))
            .map(|name| quote_identifier(name))
            .collect::<Result<Vec<_>, _>>()?;

        let placeholders = (1..=names.len())
            .map(|i| format!("?{}", i))
            .collect::<Vec<_>>();

        Ok(format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_identifier(&self.table)?,
            names.join(", "),
            placeholders.join(", ")
        ))
    }

    /// Load the file at `path`
    pub fn execute_file<P, F>(&self, conn: &Connection, path: P, on_row: F) -> Result<u64>
    where
        P: AsRef<Path>,
        F: FnMut(u64, &StringRecord),
    {
        let path = path.as_ref();
        debug!("Bulk loading {:?} into {}", path, self.table);

        let reader = tsv::open(path)?;
        self.execute(conn, reader, on_row)
    }

    /// Insert every record of `reader`, returning the number of rows inserted
    ///
    /// Fields are bound as text and take the affinity of their column. A
    /// record shorter than the column list binds NULL for the missing
    /// fields; extra fields are ignored.
    pub fn execute<R, F>(&self, conn: &Connection, mut reader: Reader<R>, mut on_row: F) -> Result<u64>
    where
        R: Read,
        F: FnMut(u64, &StringRecord),
    {
        let sql = self.insert_sql()?;
        let mut statement = conn
            .prepare(&sql)
            .with_context(|| format!("Failed to prepare bulk insert into {}", self.table))?;

        let mut inserted = 0u64;
        let mut values: Vec<Value> = Vec::with_capacity(self.columns.len() + self.constants.len());

        for record in tsv::records(&mut reader, self.ignore_lines) {
            let record = record?;

            values.clear();
            values.extend((0..self.columns.len()).map(|i| match record.get(i) {
                Some(field) => Value::Text(field.to_string()),
                None => Value::Null,
            }));
            values.extend(self.constants.iter().map(|(_, value)| value.clone()));

            statement.execute(params_from_iter(values.iter())).with_context(|| {
                format!(
                    "Failed to insert line {} into {}",
                    tsv::line_of(&record),
                    self.table
                )
            })?;

            inserted += 1;
            on_row(inserted, &record);
        }

        debug!("Inserted {} rows into {}", inserted, self.table);
        Ok(inserted)
    }
}
