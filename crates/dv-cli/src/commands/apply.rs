use anyhow::Context;
use dv_db::apply::{ApplyOptions, EditApplier};

use crate::cli::GlobalFlags;
use crate::cli::root_commands::ApplyArgs;
use crate::context::AppContext;
use crate::output::output;

/// Handle `dataview apply`. Skipped edits are reported, not fatal.
pub async fn handle(
    args: &ApplyArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let edits = ctx
        .log
        .load_all()
        .with_context(|| format!("failed to read edit log {}", ctx.log.path().display()))?;

    let report = EditApplier::apply(
        &ctx.db,
        edits,
        ApplyOptions {
            dry_run: args.dry_run,
        },
    )
    .await
    .context("failed to apply edit log")?;

    output(&report, flags.format)
}
