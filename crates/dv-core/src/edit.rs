//! Edit record model.
//!
//! An edit is one reviewer correction against one entity. The action decides
//! which parameters exist, so [`Edit`] is a tagged union with one variant per
//! action. Persisted log lines are the flat JSON form of [`NormalizedEdit`]:
//!
//! ```json
//! {"table":"timestamp","id":789,"action":"correct_field","field":"normalized_datetime",
//!  "new_value":"1895-03-15T14:00:00","reason":"off by one day",
//!  "submitted_at":"2026-10-16T09:12:44.120Z"}
//! ```

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tables::EntityTable;

// ---------------------------------------------------------------------------
// EditAction
// ---------------------------------------------------------------------------

/// The five review actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EditAction {
    MarkValid,
    MarkUnusable,
    MarkBlocked,
    CorrectField,
    Report,
}

impl EditAction {
    pub const ALL: [Self; 5] = [
        Self::MarkValid,
        Self::MarkUnusable,
        Self::MarkBlocked,
        Self::CorrectField,
        Self::Report,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MarkValid => "mark_valid",
            Self::MarkUnusable => "mark_unusable",
            Self::MarkBlocked => "mark_blocked",
            Self::CorrectField => "correct_field",
            Self::Report => "report",
        }
    }

    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|action| action.as_str() == name)
    }

    /// Whether the action is rejected without an explanation.
    #[must_use]
    pub const fn requires_reason(self) -> bool {
        matches!(self, Self::MarkUnusable | Self::MarkBlocked | Self::Report)
    }

    /// Key the explanation is submitted under.
    #[must_use]
    pub const fn reason_key(self) -> &'static str {
        match self {
            Self::Report => "description",
            _ => "reason",
        }
    }

    /// Issue title prefix used by the review links.
    #[must_use]
    pub const fn title_prefix(self) -> &'static str {
        match self {
            Self::MarkValid => "[Valid]",
            Self::MarkUnusable => "[Invalid]",
            Self::MarkBlocked => "[Block]",
            Self::CorrectField => "[Correct]",
            Self::Report => "[Report]",
        }
    }
}

impl fmt::Display for EditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Edit
// ---------------------------------------------------------------------------

/// Action plus the parameters that action carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Edit {
    /// `use = true`, `blocked = false`.
    MarkValid {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    /// `use = false`, `reason = reason`.
    MarkUnusable { reason: String },
    /// `blocked = true`, `reason = reason`. Leaves `use` alone.
    MarkBlocked { reason: String },
    /// Overwrite one correctable data column.
    CorrectField {
        field: String,
        new_value: serde_json::Value,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    /// Free-form note for the audit trail. Never mutates the entity.
    Report { description: String },
}

/// Column name → new value, as written by the applier.
pub type FieldChanges = BTreeMap<String, serde_json::Value>;

impl Edit {
    #[must_use]
    pub const fn action(&self) -> EditAction {
        match self {
            Self::MarkValid { .. } => EditAction::MarkValid,
            Self::MarkUnusable { .. } => EditAction::MarkUnusable,
            Self::MarkBlocked { .. } => EditAction::MarkBlocked,
            Self::CorrectField { .. } => EditAction::CorrectField,
            Self::Report { .. } => EditAction::Report,
        }
    }

    /// The reviewer's explanation, whatever key it was submitted under.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::MarkValid { reason } | Self::CorrectField { reason, .. } => reason.as_deref(),
            Self::MarkUnusable { reason } | Self::MarkBlocked { reason } => Some(reason),
            Self::Report { description } => Some(description),
        }
    }

    /// Exactly the columns this edit sets, and nothing else.
    #[must_use]
    pub fn changes(&self) -> FieldChanges {
        let mut changes = FieldChanges::new();
        match self {
            Self::MarkValid { .. } => {
                changes.insert("use".into(), serde_json::Value::Bool(true));
                changes.insert("blocked".into(), serde_json::Value::Bool(false));
            }
            Self::MarkUnusable { reason } => {
                changes.insert("use".into(), serde_json::Value::Bool(false));
                changes.insert("reason".into(), serde_json::Value::String(reason.clone()));
            }
            Self::MarkBlocked { reason } => {
                changes.insert("blocked".into(), serde_json::Value::Bool(true));
                changes.insert("reason".into(), serde_json::Value::String(reason.clone()));
            }
            Self::CorrectField {
                field, new_value, ..
            } => {
                changes.insert(field.clone(), new_value.clone());
            }
            Self::Report { .. } => {}
        }
        changes
    }
}

// ---------------------------------------------------------------------------
// EditRecord / NormalizedEdit
// ---------------------------------------------------------------------------

/// A canonical correction: which entity, and what to do to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct EditRecord {
    pub table: EntityTable,
    pub id: i64,
    #[serde(flatten)]
    pub edit: Edit,
    /// Free-text reviewer handle, carried for audit only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewer: Option<String>,
}

impl EditRecord {
    #[must_use]
    pub const fn action(&self) -> EditAction {
        self.edit.action()
    }
}

/// An accepted edit, stamped with its acceptance time. One log line each.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct NormalizedEdit {
    #[serde(flatten)]
    pub record: EditRecord,
    /// Assigned when the validator accepted the edit. Never submitter-supplied.
    pub submitted_at: DateTime<Utc>,
}

impl NormalizedEdit {
    #[must_use]
    pub const fn table(&self) -> EntityTable {
        self.record.table
    }

    #[must_use]
    pub const fn id(&self) -> i64 {
        self.record.id
    }

    #[must_use]
    pub const fn action(&self) -> EditAction {
        self.record.edit.action()
    }
}
