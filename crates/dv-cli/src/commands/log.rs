use anyhow::Context;
use dv_core::edit::{Edit, NormalizedEdit};
use dv_core::tables::EntityTable;
use dv_schema::SchemaRegistry;
use serde::Serialize;

use crate::cli::root_commands::LogArgs;
use crate::cli::{GlobalFlags, OutputFormat};
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct LogCheckResponse {
    path: String,
    ok: bool,
    problems: Vec<LogProblem>,
}

#[derive(Debug, Serialize)]
struct LogProblem {
    line: usize,
    message: String,
}

/// Flat line of `dataview log --format table`.
#[derive(Debug, Serialize)]
struct LogRow {
    submitted_at: String,
    table: EntityTable,
    id: i64,
    action: String,
    detail: Option<String>,
    reviewer: Option<String>,
}

impl LogRow {
    fn from_edit(edit: &NormalizedEdit) -> Self {
        let detail = match &edit.record.edit {
            Edit::CorrectField {
                field, new_value, ..
            } => Some(format!("{field} = {new_value}")),
            other => other.reason().map(String::from),
        };
        Self {
            submitted_at: edit.submitted_at.to_rfc3339(),
            table: edit.table(),
            id: edit.id(),
            action: edit.action().to_string(),
            detail,
            reviewer: edit.record.reviewer.clone(),
        }
    }
}

/// Handle `dataview log`.
pub fn handle(args: &LogArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    if args.check {
        return check(ctx, flags);
    }

    let table = args
        .table
        .as_deref()
        .map(str::parse::<EntityTable>)
        .transpose()?;

    let mut edits = Vec::new();
    for edit in ctx.log.read_all()? {
        let edit = edit?;
        if table.is_some_and(|t| t != edit.table()) || args.id.is_some_and(|id| id != edit.id()) {
            continue;
        }
        edits.push(edit);
    }

    // --limit keeps the most recent entries.
    if let Some(limit) = flags.limit {
        let keep = usize::try_from(limit).unwrap_or(usize::MAX);
        let skip = edits.len().saturating_sub(keep);
        edits.drain(..skip);
    }

    if flags.format == OutputFormat::Table {
        let rows: Vec<LogRow> = edits.iter().map(LogRow::from_edit).collect();
        return output(&rows, flags.format);
    }
    output(&edits, flags.format)
}

fn check(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let registry = SchemaRegistry::new();
    let problems = ctx
        .log
        .check(&registry)
        .with_context(|| format!("failed to read edit log {}", ctx.log.path().display()))?;

    let response = LogCheckResponse {
        path: ctx.log.path().display().to_string(),
        ok: problems.is_empty(),
        problems: problems
            .into_iter()
            .map(|(line, message)| LogProblem { line, message })
            .collect(),
    };
    output(&response, flags.format)?;

    if !response.ok {
        anyhow::bail!(
            "{} line(s) of {} do not match the log schema",
            response.problems.len(),
            response.path
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use dv_core::edit::{Edit, EditRecord, NormalizedEdit};
    use dv_core::tables::EntityTable;
    use serde_json::json;

    use super::LogRow;

    fn logged(edit: Edit) -> NormalizedEdit {
        NormalizedEdit {
            record: EditRecord {
                table: EntityTable::Timestamp,
                id: 789,
                edit,
                reviewer: Some("kh".into()),
            },
            submitted_at: Utc.with_ymd_and_hms(2026, 10, 16, 9, 0, 0).unwrap(),
        }
    }

    #[test]
    fn correction_detail_shows_field_and_value() {
        let row = LogRow::from_edit(&logged(Edit::CorrectField {
            field: "normalized_datetime".into(),
            new_value: json!("1895-03-15T14:00:00"),
            reason: Some("off by one day".into()),
        }));
        assert_eq!(row.action, "correct_field");
        assert_eq!(
            row.detail.as_deref(),
            Some("normalized_datetime = \"1895-03-15T14:00:00\"")
        );
        assert_eq!(row.submitted_at, "2026-10-16T09:00:00+00:00");
    }

    #[test]
    fn flag_detail_shows_reason() {
        let row = LogRow::from_edit(&logged(Edit::MarkBlocked {
            reason: "duplicate".into(),
        }));
        assert_eq!(row.detail.as_deref(), Some("duplicate"));
        assert_eq!(row.reviewer.as_deref(), Some("kh"));
    }
}
