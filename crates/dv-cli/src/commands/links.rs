use anyhow::Context;
use chrono::Utc;
use dv_core::errors::ValidationFailure;
use dv_core::navigation::{RecordNav, entity_path};
use dv_core::responses::LinksResponse;
use dv_core::tables::EntityTable;
use dv_db::related::related_rows;
use dv_db::snapshot::SnapshotReader;

use crate::cli::root_commands::LinksArgs;
use crate::cli::{GlobalFlags, OutputFormat};
use crate::context::AppContext;
use crate::issue::IssueLinks;
use crate::output::output;

/// Handle `dataview links`.
///
/// Only rows with a list page have links; a row a listing filter hides is
/// reported as not found.
pub async fn handle(
    args: &LinksArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let table: EntityTable = args.table.parse()?;
    let entities = SnapshotReader::new(&ctx.db)
        .read_listed(table.as_str())
        .await
        .with_context(|| format!("failed to read {table}"))?;

    let ids: Vec<i64> = entities.iter().map(|e| e.id).collect();
    let position = ids
        .iter()
        .position(|&id| id == args.id)
        .ok_or_else(|| ValidationFailure::EntityNotFound {
            table: table.to_string(),
            id: args.id,
        })?;
    let entity = &entities[position];
    let navigation = RecordNav::for_position(&ids, position)
        .with_context(|| format!("no navigation for {table}/{}", args.id))?;

    let links = IssueLinks::new(&ctx.config.review.repo, Utc::now()).review_links(entity)?;

    if flags.format == OutputFormat::Table {
        return output(&links, flags.format);
    }

    let related = related_rows(&ctx.db, entity)
        .await
        .with_context(|| format!("failed to read rows related to {table}/{}", entity.id))?;

    output(
        &LinksResponse {
            table,
            id: entity.id,
            page_path: format!("{}{}", ctx.config.review.base_url(), entity_path(table, entity.id)),
            status: entity.status(),
            navigation,
            links,
            related,
        },
        flags.format,
    )
}
