//! Validation failure taxonomy.
//!
//! A submitted correction is either accepted or rejected with exactly one of
//! these failures. They are returned as values so the issue-processing
//! workflow can tell the submitter why; they never abort a run. Storage and
//! log errors live in `dv-db`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::edit::EditAction;

/// Why a submitted edit was rejected (or skipped at apply time).
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationFailure {
    /// The record is not shaped like an edit: unknown action, missing or
    /// mistyped structural field, forbidden or unknown key.
    #[error("Malformed record: {}", .problems.join("; "))]
    MalformedRecord { problems: Vec<String> },

    /// `table` names something outside the registry.
    #[error("Unknown table: {table}")]
    UnknownTable { table: String },

    /// `(table, id)` does not resolve to an existing row.
    #[error("Entity not found: {table} {id}")]
    EntityNotFound { table: String, id: i64 },

    /// `field` is not correctable on `table`.
    #[error("Field '{field}' cannot be corrected on {table}")]
    IneligibleField { table: String, field: String },

    /// `new_value` does not fit the column's declared type.
    #[error("Type mismatch for {table}.{field}: expected {expected}, got {found}")]
    TypeMismatch {
        table: String,
        field: String,
        expected: String,
        found: String,
    },

    /// The action needs an explanation and none was given.
    #[error("Action {action} requires a non-empty '{field}'")]
    MissingReason { action: EditAction, field: String },
}

impl ValidationFailure {
    /// Stable snake-case name of the failure kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::MalformedRecord { .. } => "malformed_record",
            Self::UnknownTable { .. } => "unknown_table",
            Self::EntityNotFound { .. } => "entity_not_found",
            Self::IneligibleField { .. } => "ineligible_field",
            Self::TypeMismatch { .. } => "type_mismatch",
            Self::MissingReason { .. } => "missing_reason",
        }
    }

    pub(crate) fn malformed(problem: impl Into<String>) -> Self {
        Self::MalformedRecord {
            problems: vec![problem.into()],
        }
    }
}
