//! # dv-db
//!
//! Storage side of the dataview review workflow.
//!
//! - [`DvDb`]: libSQL handle over the pipeline database, with migrations
//! - [`store::RowStore`]: the read-all / read-row / update-fields seam the
//!   applier writes through
//! - [`snapshot`]: whole-database entity snapshots for validation and status
//! - [`edit_log`]: the append-only JSONL log of accepted edits
//! - [`apply`]: replays the log into the database
//! - [`related`]: rows linked to an entity through the registry's foreign keys

pub mod apply;
pub mod edit_log;
pub mod error;
pub mod helpers;
mod migrations;
pub mod related;
pub mod snapshot;
pub mod store;

#[cfg(test)]
mod test_support;

use error::DatabaseError;
use libsql::Builder;

/// Handle to the pipeline database.
pub struct DvDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
}

impl DvDb {
    /// Open a local database file (`:memory:` for a throwaway one).
    ///
    /// Runs migrations on open; existing tables are left untouched.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        let dv_db = Self { db, conn };
        dv_db.run_migrations().await?;
        Ok(dv_db)
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }
}
