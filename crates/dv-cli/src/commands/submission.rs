//! Shared steps of `validate` and `submit`.

use anyhow::Context;
use chrono::{DateTime, Utc};
use dv_core::edit::NormalizedEdit;
use dv_core::errors::ValidationFailure;
use dv_core::responses::SubmitResponse;
use dv_core::validate::{EntityLookup, validate};

use crate::cli::GlobalFlags;
use crate::cli::root_commands::SubmissionArgs;
use crate::commands::Rejected;
use crate::issue::submission_from_text;
use crate::output::output;

/// Read the submission text from the named file, or stdin.
pub fn read_raw(args: &SubmissionArgs) -> anyhow::Result<serde_json::Value> {
    let text = match args.input.as_deref() {
        None | Some("-") => std::io::read_to_string(std::io::stdin())
            .context("failed to read submission from stdin")?,
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read submission file {path}"))?,
    };
    submission_from_text(&text).context("submission is not a JSON object or issue body")
}

/// Validate against `lookup`, stamping `accepted_at` on acceptance.
///
/// `--reviewer` fills in a reviewer the submission left blank.
pub fn accept(
    raw: &serde_json::Value,
    lookup: &impl EntityLookup,
    args: &SubmissionArgs,
    accepted_at: DateTime<Utc>,
) -> Result<NormalizedEdit, ValidationFailure> {
    let mut edit = validate(raw, lookup, accepted_at)?;
    if edit.record.reviewer.is_none() {
        edit.record.reviewer = args
            .reviewer
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(String::from);
    }
    Ok(edit)
}

/// Print the rejection, then fail with [`Rejected`].
pub fn reject(failure: ValidationFailure, flags: &GlobalFlags) -> anyhow::Result<()> {
    tracing::info!(kind = failure.kind(), %failure, "submission rejected");
    output(
        &SubmitResponse::Rejected {
            failure: failure.clone(),
        },
        flags.format,
    )?;
    Err(Rejected(failure).into())
}
