use anyhow::Context;
use chrono::Utc;
use dv_core::responses::SubmitResponse;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::SubmissionArgs;
use crate::commands::submission;
use crate::context::AppContext;
use crate::output::output;

/// Handle `dataview submit`: validate, then append to the edit log.
///
/// Runs under the project write lock, so the acceptance stamp taken from the
/// log stays ahead of every edit already in it.
pub async fn handle(
    args: &SubmissionArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let raw = submission::read_raw(args)?;
    let snapshot = ctx.snapshot().await?;

    let accepted_at = ctx
        .log
        .next_stamp(Utc::now())
        .with_context(|| format!("failed to read {}", ctx.log.path().display()))?;

    let edit = match submission::accept(&raw, &snapshot, args, accepted_at) {
        Ok(edit) => edit,
        Err(failure) => return submission::reject(failure, flags),
    };

    ctx.log
        .append(&edit)
        .with_context(|| format!("failed to append to {}", ctx.log.path().display()))?;
    tracing::info!(
        table = %edit.table(),
        id = edit.id(),
        action = %edit.action(),
        "edit accepted and logged"
    );

    output(
        &SubmitResponse::Accepted {
            edit,
            appended: true,
        },
        flags.format,
    )
}
