use dv_core::status::StatusCounts;
use serde::Serialize;

use crate::cli::{GlobalFlags, OutputFormat};
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct StatusRow {
    table: String,
    total: u32,
    valid: u32,
    invalid: u32,
    blocked: u32,
    unknown: u32,
}

impl StatusRow {
    fn new(table: String, counts: &StatusCounts) -> Self {
        Self {
            table,
            total: counts.total,
            valid: counts.valid,
            invalid: counts.invalid,
            blocked: counts.blocked,
            unknown: counts.unknown,
        }
    }
}

/// Handle `dataview status`.
pub async fn handle(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let status = ctx.snapshot().await?.status();

    if flags.format == OutputFormat::Table {
        let mut rows: Vec<StatusRow> = status
            .tables
            .iter()
            .map(|t| {
                let name = t.grouped_by.as_ref().map_or_else(
                    || t.table.to_string(),
                    |key| format!("{} (by {key})", t.table),
                );
                StatusRow::new(name, &t.counts)
            })
            .collect();
        rows.push(StatusRow::new("all".into(), &status.totals));
        return output(&rows, flags.format);
    }

    output(&status, flags.format)
}
