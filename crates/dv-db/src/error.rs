//! Database error types for dv-db.

use thiserror::Error;

/// Errors from database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// A SQL query failed or returned data of an unexpected shape.
    #[error("Query failed: {0}")]
    Query(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// A table name outside the registry was requested.
    #[error("Unknown table: {0}")]
    UnknownTable(String),

    /// An update named a column the table does not have.
    #[error("Unknown column '{column}' on table {table}")]
    UnknownColumn { table: String, column: String },

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),
}
