use chrono::Utc;
use dv_core::responses::SubmitResponse;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::SubmissionArgs;
use crate::commands::submission;
use crate::context::AppContext;
use crate::output::output;

/// Handle `dataview validate`. Nothing is written.
pub async fn handle(
    args: &SubmissionArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let raw = submission::read_raw(args)?;
    let snapshot = ctx.snapshot().await?;

    match submission::accept(&raw, &snapshot, args, Utc::now()) {
        Ok(edit) => output(
            &SubmitResponse::Accepted {
                edit,
                appended: false,
            },
            flags.format,
        ),
        Err(failure) => submission::reject(failure, flags),
    }
}
