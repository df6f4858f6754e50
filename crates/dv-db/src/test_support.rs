//! Shared test utilities for dv-db unit tests.

#[cfg(test)]
pub(crate) mod helpers {
    use chrono::{DateTime, TimeZone, Utc};
    use dv_core::edit::{Edit, EditRecord, NormalizedEdit};
    use dv_core::tables::EntityTable;

    use crate::DvDb;

    /// In-memory database with every review table created.
    pub async fn test_db() -> DvDb {
        DvDb::open_local(":memory:").await.unwrap()
    }

    pub async fn seed_timestamp(db: &DvDb, id: i64, when: &str, normalized: Option<&str>) {
        db.conn()
            .execute(
                "INSERT INTO \"timestamp\" (id, \"when\", normalized_datetime) VALUES (?1, ?2, ?3)",
                libsql::params![id, when, normalized],
            )
            .await
            .unwrap();
    }

    pub async fn seed_actor(db: &DvDb, id: i64, name: &str) {
        db.conn()
            .execute(
                "INSERT INTO actor (id, name) VALUES (?1, ?2)",
                libsql::params![id, name],
            )
            .await
            .unwrap();
    }

    /// `2026-10-16T09:00:00Z` plus `minutes`.
    pub fn at(minutes: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 9, minutes, 0).unwrap()
    }

    pub fn edit(table: EntityTable, id: i64, edit: Edit, minutes: u32) -> NormalizedEdit {
        NormalizedEdit {
            record: EditRecord {
                table,
                id,
                edit,
                reviewer: None,
            },
            submitted_at: at(minutes),
        }
    }
}
