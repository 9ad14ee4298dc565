/*!
 * Database module for the recommendation tables.
 *
 * This module provides SQLite-based persistence for:
 * - Language codes and their ids
 * - Article recommendation scores per language pair
 * - Bulk loading of tab-separated files into either table
 */

pub mod schema;
pub mod connection;
pub mod bulk_load;
pub mod repository;
pub mod models;

// Re-export main types
pub use bulk_load::BulkLoad;
pub use connection::DatabaseConnection;
pub use repository::{HeaderLines, Repository};
pub use schema::TableNames;
