//! Database migration runner.
//!
//! Embeds the SQL migration files at compile time and executes them on
//! database open. All statements use `IF NOT EXISTS` so an existing pipeline
//! database is left as it is.

use crate::DvDb;
use crate::error::DatabaseError;

/// The 17 reviewable tables.
const MIGRATION_001: &str = include_str!("../migrations/001_review_tables.sql");

impl DvDb {
    /// Run all embedded migrations in sequence.
    pub(crate) async fn run_migrations(&self) -> Result<(), DatabaseError> {
        self.conn
            .execute_batch(MIGRATION_001)
            .await
            .map_err(|e| DatabaseError::Migration(format!("001_review_tables: {e}")))?;
        Ok(())
    }
}
