//! Review status derived from the `use`/`blocked` flags.
//!
//! ```text
//! blocked = true            → blocked   (wins over use)
//! use = true                → valid
//! use = false               → invalid
//! use unset                 → unknown
//! ```

use std::collections::BTreeMap;
use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entity::Entity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EntityStatus {
    Valid,
    Invalid,
    Blocked,
    Unknown,
}

impl EntityStatus {
    #[must_use]
    pub const fn of(use_flag: Option<bool>, blocked: bool) -> Self {
        if blocked {
            return Self::Blocked;
        }
        match use_flag {
            Some(true) => Self::Valid,
            Some(false) => Self::Invalid,
            None => Self::Unknown,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::Invalid => "invalid",
            Self::Blocked => "blocked",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for EntityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-table status tally shown on the index page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StatusCounts {
    pub total: u32,
    pub valid: u32,
    pub invalid: u32,
    pub blocked: u32,
    pub unknown: u32,
}

impl StatusCounts {
    pub fn record(&mut self, status: EntityStatus) {
        self.total += 1;
        match status {
            EntityStatus::Valid => self.valid += 1,
            EntityStatus::Invalid => self.invalid += 1,
            EntityStatus::Blocked => self.blocked += 1,
            EntityStatus::Unknown => self.unknown += 1,
        }
    }

    #[must_use]
    pub fn from_entities<'a>(entities: impl IntoIterator<Item = &'a Entity>) -> Self {
        let mut counts = Self::default();
        for entity in entities {
            counts.record(entity.status());
        }
        counts
    }

    /// Count match rows grouped by a parent key column, one entry per parent.
    ///
    /// A group is valid if any member is valid, invalid if every member is
    /// invalid, blocked if any member is blocked, unknown otherwise. Rows with
    /// no parent key are grouped together.
    #[must_use]
    pub fn grouped_by<'a>(entities: impl IntoIterator<Item = &'a Entity>, key: &str) -> Self {
        let mut groups: BTreeMap<String, Vec<EntityStatus>> = BTreeMap::new();
        for entity in entities {
            groups
                .entry(entity.column_value(key).to_string())
                .or_default()
                .push(entity.status());
        }

        let mut counts = Self::default();
        for statuses in groups.values() {
            let status = if statuses.contains(&EntityStatus::Valid) {
                EntityStatus::Valid
            } else if statuses.iter().all(|s| *s == EntityStatus::Invalid) {
                EntityStatus::Invalid
            } else if statuses.contains(&EntityStatus::Blocked) {
                EntityStatus::Blocked
            } else {
                EntityStatus::Unknown
            };
            counts.record(status);
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::EntityTable;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(None, false, EntityStatus::Unknown)]
    #[case(Some(true), false, EntityStatus::Valid)]
    #[case(Some(false), false, EntityStatus::Invalid)]
    #[case(Some(true), true, EntityStatus::Blocked)]
    #[case(Some(false), true, EntityStatus::Blocked)]
    #[case(None, true, EntityStatus::Blocked)]
    fn status_from_flags(
        #[case] use_flag: Option<bool>,
        #[case] blocked: bool,
        #[case] expected: EntityStatus,
    ) {
        assert_eq!(EntityStatus::of(use_flag, blocked), expected);
    }

    fn entity(id: i64, use_flag: Option<bool>, blocked: bool) -> Entity {
        let mut e = Entity::new(EntityTable::Actor, id);
        e.use_flag = use_flag;
        e.blocked = blocked;
        e
    }

    #[test]
    fn counts_tally_each_status() {
        let rows = [
            entity(1, Some(true), false),
            entity(2, Some(false), false),
            entity(3, None, true),
            entity(4, None, false),
            entity(5, Some(true), false),
        ];
        let counts = StatusCounts::from_entities(&rows);
        assert_eq!(
            counts,
            StatusCounts {
                total: 5,
                valid: 2,
                invalid: 1,
                blocked: 1,
                unknown: 1,
            }
        );
    }

    #[test]
    fn grouped_counts_collapse_suggestions_per_parent() {
        let matches = |id: i64, parent: i64, use_flag: Option<bool>| {
            let mut e = Entity::new(EntityTable::SplitLocationMatch, id)
                .with_field("split_location_id", json!(parent));
            e.use_flag = use_flag;
            e
        };
        let rows = [
            // parent 10: one accepted suggestion among rejected ones
            matches(1, 10, Some(false)),
            matches(2, 10, Some(true)),
            // parent 11: every suggestion rejected
            matches(3, 11, Some(false)),
            matches(4, 11, Some(false)),
            // parent 12: nothing decided yet
            matches(5, 12, None),
            matches(6, 12, Some(false)),
        ];
        let counts = StatusCounts::grouped_by(&rows, "split_location_id");
        assert_eq!(counts.total, 3);
        assert_eq!(counts.valid, 1);
        assert_eq!(counts.invalid, 1);
        assert_eq!(counts.unknown, 1);
    }
}
