//! Entity snapshot reader.
//!
//! Loads every row of the reviewable tables so the validator can answer
//! existence checks without touching storage, and so `dataview status` /
//! `dataview list` can derive display state.

use std::collections::{BTreeMap, HashSet};

use dv_core::entity::Entity;
use dv_core::navigation::RecordNav;
use dv_core::responses::{StatusResponse, TableStatus};
use dv_core::status::StatusCounts;
use dv_core::tables::EntityTable;
use dv_core::validate::EntityLookup;

use crate::error::DatabaseError;
use crate::store::RowStore;

/// Match tables whose index counts are per parent row rather than per match.
const GROUPED_COUNTS: [(EntityTable, &str); 1] =
    [(EntityTable::SplitLocationMatch, "split_location_id")];

/// Reads entity records out of a [`RowStore`].
pub struct SnapshotReader<'a, S> {
    store: &'a S,
}

impl<'a, S: RowStore> SnapshotReader<'a, S> {
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Every row of the named table.
    ///
    /// # Errors
    ///
    /// `DatabaseError::UnknownTable` if `name` is not in the registry, or any
    /// storage error.
    pub async fn read_table(&self, name: &str) -> Result<Vec<Entity>, DatabaseError> {
        let table =
            EntityTable::parse(name).ok_or_else(|| DatabaseError::UnknownTable(name.to_string()))?;
        self.store.read_all(table).await
    }

    /// Rows of the named table that get a list page. Tables with a listing
    /// filter keep only the rows some row of the filtering table points at.
    ///
    /// # Errors
    ///
    /// As [`Self::read_table`].
    pub async fn read_listed(&self, name: &str) -> Result<Vec<Entity>, DatabaseError> {
        let table =
            EntityTable::parse(name).ok_or_else(|| DatabaseError::UnknownTable(name.to_string()))?;
        let mut rows = self.store.read_all(table).await?;
        if let Some(filter) = table.listing_filter() {
            let sources = self.store.read_all(filter.table).await?;
            let keep = filter.target_ids(&sources);
            rows.retain(|e| keep.contains(&e.id));
            tracing::debug!(%table, rows = rows.len(), via = %filter.table, "listing filtered");
        }
        Ok(rows)
    }

    /// Read every registry table.
    ///
    /// # Errors
    ///
    /// Any storage error.
    pub async fn load(&self) -> Result<EntitySnapshot, DatabaseError> {
        let mut tables = BTreeMap::new();
        for table in EntityTable::ALL {
            let rows = self.store.read_all(table).await?;
            tracing::debug!(%table, rows = rows.len(), "snapshot table loaded");
            tables.insert(table, rows);
        }
        Ok(EntitySnapshot::from_tables(tables))
    }
}

/// All entities at one point in time.
#[derive(Debug, Clone, Default)]
pub struct EntitySnapshot {
    tables: BTreeMap<EntityTable, Vec<Entity>>,
    keys: HashSet<(EntityTable, i64)>,
}

impl EntitySnapshot {
    #[must_use]
    pub fn from_tables(tables: BTreeMap<EntityTable, Vec<Entity>>) -> Self {
        let keys = tables
            .iter()
            .flat_map(|(table, rows)| rows.iter().map(move |e| (*table, e.id)))
            .collect();
        Self { tables, keys }
    }

    /// Rows of one table in id order; empty if the table was not loaded.
    #[must_use]
    pub fn rows(&self, table: EntityTable) -> &[Entity] {
        self.tables.get(&table).map(Vec::as_slice).unwrap_or_default()
    }

    #[must_use]
    pub fn get(&self, table: EntityTable, id: i64) -> Option<&Entity> {
        self.rows(table).iter().find(|e| e.id == id)
    }

    /// Total rows across all tables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Rows of one table that get a list page; see
    /// [`SnapshotReader::read_listed`].
    #[must_use]
    pub fn listed(&self, table: EntityTable) -> Vec<&Entity> {
        let rows = self.rows(table);
        match table.listing_filter() {
            Some(filter) => {
                let keep = filter.target_ids(self.rows(filter.table));
                rows.iter().filter(|e| keep.contains(&e.id)).collect()
            }
            None => rows.iter().collect(),
        }
    }

    /// First/prev/next/last ids around one entity, among the listed rows.
    #[must_use]
    pub fn navigation(&self, table: EntityTable, id: i64) -> Option<RecordNav> {
        let ids: Vec<i64> = self.listed(table).iter().map(|e| e.id).collect();
        RecordNav::for_id(&ids, id)
    }

    /// Per-table status counts plus an overall total.
    #[must_use]
    pub fn status(&self) -> StatusResponse {
        let mut totals = StatusCounts::default();
        let tables = EntityTable::ALL
            .into_iter()
            .map(|table| {
                let rows = self.listed(table);
                let grouped_by = GROUPED_COUNTS
                    .iter()
                    .find(|(t, _)| *t == table)
                    .map(|(_, key)| *key);
                let counts = grouped_by.map_or_else(
                    || StatusCounts::from_entities(rows.iter().copied()),
                    |key| StatusCounts::grouped_by(rows.iter().copied(), key),
                );
                totals.total += counts.total;
                totals.valid += counts.valid;
                totals.invalid += counts.invalid;
                totals.blocked += counts.blocked;
                totals.unknown += counts.unknown;
                TableStatus {
                    table,
                    display_name: table.spec().display_name.to_string(),
                    grouped_by: grouped_by.map(String::from),
                    counts,
                }
            })
            .collect();
        StatusResponse { tables, totals }
    }
}

impl EntityLookup for EntitySnapshot {
    fn contains(&self, table: EntityTable, id: i64) -> bool {
        self.keys.contains(&(table, id))
    }
}
