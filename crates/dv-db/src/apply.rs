//! Replays the edit log into the database.
//!
//! Edits are ordered by acceptance time (ties keep log order) and applied one
//! at a time, so later edits overwrite earlier ones per column. Every edit is
//! re-checked against the current rows: a target that no longer exists or a
//! column that is no longer correctable is skipped and reported, never fatal.
//! Columns that already hold the requested value are not rewritten, and a
//! second replay of the same log ends in the same database state.

use std::collections::HashMap;
use std::time::Instant;

use dv_core::edit::{Edit, FieldChanges, NormalizedEdit};
use dv_core::entity::Entity;
use dv_core::errors::ValidationFailure;
use dv_core::responses::{ApplyReport, ReportNote, SkippedEdit};
use dv_core::tables::EntityTable;

use crate::error::DatabaseError;
use crate::store::RowStore;

#[derive(Debug, Clone, Copy, Default)]
pub struct ApplyOptions {
    /// Compute the report without writing anything.
    pub dry_run: bool,
}

/// What happened to one edit.
enum Outcome {
    Applied,
    Unchanged,
    Noted(ReportNote),
    Skipped(ValidationFailure),
}

pub struct EditApplier;

impl EditApplier {
    /// Apply `edits` to `store`.
    ///
    /// # Errors
    ///
    /// Only storage failures are errors. Edits that cannot be applied are
    /// listed in the report's `skipped_edits`.
    pub async fn apply<S: RowStore>(
        store: &S,
        edits: impl IntoIterator<Item = NormalizedEdit>,
        options: ApplyOptions,
    ) -> Result<ApplyReport, DatabaseError> {
        let start = Instant::now();

        let mut edits: Vec<NormalizedEdit> = edits.into_iter().collect();
        edits.sort_by_key(|edit| edit.submitted_at);

        let mut report = ApplyReport {
            dry_run: options.dry_run,
            ..ApplyReport::default()
        };
        // Current row state as this run sees it, including its own writes.
        let mut rows: HashMap<(EntityTable, i64), Option<Entity>> = HashMap::new();

        for edit in &edits {
            report.total += 1;
            let key = (edit.table(), edit.id());
            if !rows.contains_key(&key) {
                let row = store.read_row(edit.table(), edit.id()).await?;
                rows.insert(key, row);
            }
            let current = rows.get_mut(&key).and_then(Option::as_mut);

            match apply_one(store, edit, current, options).await? {
                Outcome::Applied => report.applied += 1,
                Outcome::Unchanged => report.unchanged += 1,
                Outcome::Noted(note) => {
                    report.noted += 1;
                    report.notes.push(note);
                }
                Outcome::Skipped(failure) => {
                    tracing::warn!(
                        table = %edit.table(),
                        id = edit.id(),
                        action = %edit.action(),
                        %failure,
                        "edit skipped"
                    );
                    if matches!(failure, ValidationFailure::EntityNotFound { .. }) {
                        rows.insert(key, None);
                    }
                    report.skipped += 1;
                    report.skipped_edits.push(SkippedEdit {
                        table: edit.table(),
                        id: edit.id(),
                        action: edit.action(),
                        submitted_at: edit.submitted_at,
                        failure,
                    });
                }
            }
        }

        report.duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        tracing::info!(
            total = report.total,
            applied = report.applied,
            unchanged = report.unchanged,
            noted = report.noted,
            skipped = report.skipped,
            dry_run = report.dry_run,
            "edit log applied"
        );
        Ok(report)
    }
}

async fn apply_one<S: RowStore>(
    store: &S,
    edit: &NormalizedEdit,
    current: Option<&mut Entity>,
    options: ApplyOptions,
) -> Result<Outcome, DatabaseError> {
    let Some(entity) = current else {
        return Ok(Outcome::Skipped(ValidationFailure::EntityNotFound {
            table: edit.table().to_string(),
            id: edit.id(),
        }));
    };

    if let Err(failure) = edit.record.recheck() {
        return Ok(Outcome::Skipped(failure));
    }

    if let Edit::Report { description } = &edit.record.edit {
        return Ok(Outcome::Noted(ReportNote {
            table: edit.table(),
            id: edit.id(),
            description: description.clone(),
            reviewer: edit.record.reviewer.clone(),
            submitted_at: edit.submitted_at,
        }));
    }

    let changes: FieldChanges = edit
        .record
        .edit
        .changes()
        .into_iter()
        .filter(|(column, value)| entity.column_value(column) != *value)
        .collect();

    if changes.is_empty() {
        tracing::debug!(table = %edit.table(), id = edit.id(), action = %edit.action(), "already applied");
        return Ok(Outcome::Unchanged);
    }

    if !options.dry_run && !store.update_fields(edit.table(), edit.id(), &changes).await? {
        return Ok(Outcome::Skipped(ValidationFailure::EntityNotFound {
            table: edit.table().to_string(),
            id: edit.id(),
        }));
    }

    tracing::debug!(
        table = %edit.table(),
        id = edit.id(),
        action = %edit.action(),
        columns = ?changes.keys().collect::<Vec<_>>(),
        dry_run = options.dry_run,
        "edit applied"
    );
    for (column, value) in changes {
        entity.set_column(&column, value);
    }
    Ok(Outcome::Applied)
}
