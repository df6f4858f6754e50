use anyhow::Context;
use dv_core::navigation::paginate;
use dv_core::responses::{ListResponse, ListRow};
use dv_core::tables::EntityTable;
use dv_db::snapshot::SnapshotReader;

use crate::cli::root_commands::ListArgs;
use crate::cli::{GlobalFlags, OutputFormat};
use crate::context::AppContext;
use crate::output::output;

/// Handle `dataview list`.
pub async fn handle(
    args: &ListArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let table: EntityTable = args.table.parse()?;
    let entities = SnapshotReader::new(&ctx.db)
        .read_listed(table.as_str())
        .await
        .with_context(|| format!("failed to read {table}"))?;

    let pages = paginate(table, entities.len(), ctx.config.general.page_size);
    let page = args
        .page
        .checked_sub(1)
        .and_then(|index| pages.get(index))
        .cloned()
        .with_context(|| {
            format!(
                "page {} out of range: {table} has {} page(s)",
                args.page,
                pages.len()
            )
        })?;

    let rows: Vec<ListRow> = entities[page.range()]
        .iter()
        .map(ListRow::from_entity)
        .collect();

    if flags.format == OutputFormat::Table {
        return output(&rows, flags.format);
    }

    output(
        &ListResponse {
            table,
            display_name: table.spec().display_name.to_string(),
            page,
            pages,
            rows,
        },
        flags.format,
    )
}
