//! Entity records as read from the pipeline database.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::status::EntityStatus;
use crate::tables::EntityTable;

/// One row of a reviewable table.
///
/// `use` and `blocked` are independent: an entity may be both unusable and
/// blocked for expert review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Entity {
    pub table: EntityTable,
    pub id: i64,
    /// Tri-state validity: `None` until someone has reviewed the row.
    #[serde(rename = "use")]
    pub use_flag: Option<bool>,
    pub blocked: bool,
    pub reason: Option<String>,
    /// Data columns keyed by column name.
    pub fields: BTreeMap<String, serde_json::Value>,
}

impl Entity {
    /// An unreviewed entity with no data columns filled in.
    #[must_use]
    pub fn new(table: EntityTable, id: i64) -> Self {
        Self {
            table,
            id,
            use_flag: None,
            blocked: false,
            reason: None,
            fields: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_field(mut self, name: &str, value: serde_json::Value) -> Self {
        self.fields.insert(name.to_string(), value);
        self
    }

    /// Current value of any column, flags included, in the JSON form the
    /// applier compares against.
    #[must_use]
    pub fn column_value(&self, column: &str) -> serde_json::Value {
        match column {
            "id" => serde_json::Value::from(self.id),
            "use" => self
                .use_flag
                .map_or(serde_json::Value::Null, serde_json::Value::Bool),
            "blocked" => serde_json::Value::Bool(self.blocked),
            "reason" => self
                .reason
                .clone()
                .map_or(serde_json::Value::Null, serde_json::Value::String),
            other => self
                .fields
                .get(other)
                .cloned()
                .unwrap_or(serde_json::Value::Null),
        }
    }

    /// Set any column from its JSON form. Unknown flag shapes are ignored.
    pub fn set_column(&mut self, column: &str, value: serde_json::Value) {
        match column {
            "use" => self.use_flag = value.as_bool(),
            "blocked" => self.blocked = value.as_bool().unwrap_or(false),
            "reason" => self.reason = value.as_str().map(String::from),
            "id" => {}
            other => {
                self.fields.insert(other.to_string(), value);
            }
        }
    }

    #[must_use]
    pub const fn status(&self) -> EntityStatus {
        EntityStatus::of(self.use_flag, self.blocked)
    }

    /// Reason behind the current status, when the status carries one.
    #[must_use]
    pub fn status_reason(&self) -> Option<&str> {
        match self.status() {
            EntityStatus::Blocked | EntityStatus::Invalid => self.reason.as_deref(),
            EntityStatus::Valid | EntityStatus::Unknown => None,
        }
    }

    /// Text of the table's primary display column, for list pages.
    #[must_use]
    pub fn label(&self) -> String {
        match self.fields.get(self.table.spec().primary_field) {
            None | Some(serde_json::Value::Null) => format!("{} {}", self.table, self.id),
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }
}
