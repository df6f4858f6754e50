//! Edit validator.
//!
//! Turns a raw submission into a [`NormalizedEdit`] or exactly one
//! [`ValidationFailure`]. Checks run in a fixed order and the first failure
//! wins:
//!
//! 1. structure (`malformed_record`)
//! 2. table name (`unknown_table`)
//! 3. entity existence (`entity_not_found`)
//! 4. field eligibility and value type, `correct_field` only
//!    (`ineligible_field`, `type_mismatch`)
//! 5. reason presence (`missing_reason`)
//!
//! The validator never touches storage. Existence is answered by an
//! [`EntityLookup`] and the acceptance time is supplied by the caller.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::edit::{Edit, EditRecord, NormalizedEdit};
use crate::errors::ValidationFailure;
use crate::normalize::normalize;
use crate::tables::EntityTable;

/// Answers "does this row exist?" for the validator.
pub trait EntityLookup {
    fn contains(&self, table: EntityTable, id: i64) -> bool;
}

impl EntityLookup for HashSet<(EntityTable, i64)> {
    fn contains(&self, table: EntityTable, id: i64) -> bool {
        HashSet::contains(self, &(table, id))
    }
}

impl<T: EntityLookup + ?Sized> EntityLookup for &T {
    fn contains(&self, table: EntityTable, id: i64) -> bool {
        (**self).contains(table, id)
    }
}

/// Validate a raw submission against the current entity set.
///
/// # Errors
///
/// Returns the first [`ValidationFailure`] in check order.
pub fn validate(
    raw: &Value,
    lookup: &impl EntityLookup,
    accepted_at: DateTime<Utc>,
) -> Result<NormalizedEdit, ValidationFailure> {
    let record = resolve(raw, lookup)?;
    Ok(NormalizedEdit {
        record,
        submitted_at: accepted_at,
    })
}

/// Checks 1-5 without stamping a time. Used by `validate` and by dry checks
/// that never reach the log.
///
/// # Errors
///
/// Returns the first [`ValidationFailure`] in check order.
pub fn resolve(raw: &Value, lookup: &impl EntityLookup) -> Result<EditRecord, ValidationFailure> {
    let draft = normalize(raw)?;

    let table: EntityTable = draft.table.parse()?;

    if !lookup.contains(table, draft.id) {
        return Err(ValidationFailure::EntityNotFound {
            table: table.to_string(),
            id: draft.id,
        });
    }

    if let Some((field, new_value)) = &draft.correction {
        table.spec().check_correction(field, new_value)?;
    }

    let id = draft.id;
    let reviewer = draft.reviewer.clone();
    let edit = draft.into_edit()?;

    Ok(EditRecord {
        table,
        id,
        edit,
        reviewer,
    })
}

impl EditRecord {
    /// Re-run the checks that depend only on the registry, for edits read
    /// back from the log.
    ///
    /// # Errors
    ///
    /// `IneligibleField` or `TypeMismatch` if the column was made read-only or
    /// its type changed since the edit was accepted.
    pub fn recheck(&self) -> Result<(), ValidationFailure> {
        if let Edit::CorrectField {
            field, new_value, ..
        } = &self.edit
        {
            self.table.spec().check_correction(field, new_value)?;
        }
        Ok(())
    }
}
