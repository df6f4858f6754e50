//! CLI response types returned as JSON by `dataview` commands.
//!
//! These structs define the shape of JSON output for `dataview validate`,
//! `dataview submit`, `dataview apply`, `dataview status`, `dataview list` and
//! `dataview links`.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::edit::{EditAction, NormalizedEdit};
use crate::entity::Entity;
use crate::errors::ValidationFailure;
use crate::navigation::{ListPage, RecordNav};
use crate::status::{EntityStatus, StatusCounts};
use crate::tables::EntityTable;

/// Response from `dataview validate` and `dataview submit`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SubmitResponse {
    /// Accepted; `appended` is false for `validate` (nothing written).
    Accepted {
        edit: NormalizedEdit,
        appended: bool,
    },
    Rejected { failure: ValidationFailure },
}

/// An edit the applier could not apply.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct SkippedEdit {
    pub table: EntityTable,
    pub id: i64,
    pub action: EditAction,
    pub submitted_at: DateTime<Utc>,
    pub failure: ValidationFailure,
}

/// A `report` action, carried into the audit trail instead of the database.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ReportNote {
    pub table: EntityTable,
    pub id: i64,
    pub description: String,
    pub reviewer: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

/// Response from `dataview apply`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ApplyReport {
    /// Edits read from the log.
    pub total: u32,
    /// Edits that wrote at least one column.
    pub applied: u32,
    /// Edits whose target already held the requested values.
    pub unchanged: u32,
    /// `report` edits, carried into `notes`.
    pub noted: u32,
    pub skipped: u32,
    pub dry_run: bool,
    pub skipped_edits: Vec<SkippedEdit>,
    pub notes: Vec<ReportNote>,
    pub duration_ms: u64,
}

/// One row of `dataview status`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct TableStatus {
    pub table: EntityTable,
    pub display_name: String,
    /// Set when counts are per parent row rather than per match row.
    pub grouped_by: Option<String>,
    pub counts: StatusCounts,
}

/// Response from `dataview status`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct StatusResponse {
    pub tables: Vec<TableStatus>,
    pub totals: StatusCounts,
}

/// One entity line of `dataview list`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ListRow {
    pub id: i64,
    pub label: String,
    pub secondary: Option<serde_json::Value>,
    pub status: EntityStatus,
    pub reason: Option<String>,
}

impl ListRow {
    #[must_use]
    pub fn from_entity(entity: &Entity) -> Self {
        Self {
            id: entity.id,
            label: entity.label(),
            secondary: entity
                .table
                .spec()
                .secondary_field
                .map(|field| entity.column_value(field)),
            status: entity.status(),
            reason: entity.status_reason().map(String::from),
        }
    }
}

/// Response from `dataview list`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ListResponse {
    pub table: EntityTable,
    pub display_name: String,
    pub page: ListPage,
    pub pages: Vec<ListPage>,
    pub rows: Vec<ListRow>,
}

/// A pre-filled issue link for one review action.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ReviewLink {
    pub action: EditAction,
    pub title: String,
    pub url: String,
}

/// Which way a foreign key runs relative to the entity on the page.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RelationDirection {
    /// The entity's own column points at these rows.
    References,
    /// These rows point at the entity.
    ReferencedBy,
}

/// Rows of one table linked to the entity through one foreign key.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct RelatedRows {
    pub table: EntityTable,
    /// Foreign-key column, on whichever side holds it.
    pub via: String,
    pub direction: RelationDirection,
    pub rows: Vec<ListRow>,
}

/// Response from `dataview links`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct LinksResponse {
    pub table: EntityTable,
    pub id: i64,
    pub page_path: String,
    pub status: EntityStatus,
    pub navigation: RecordNav,
    pub links: Vec<ReviewLink>,
    /// Context rows shown beside the entity. Empty groups are left out.
    pub related: Vec<RelatedRows>,
}
