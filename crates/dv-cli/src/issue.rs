//! Pre-filled review issues.
//!
//! Each review action on an entity page links to a new issue whose body holds
//! an editable ```json block. When the issue comes back, the block is pulled
//! out again and handed to the validator as the raw submission.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use dv_core::edit::EditAction;
use dv_core::entity::Entity;
use dv_core::navigation::entity_path;
use dv_core::responses::ReviewLink;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Issue bodies are cut here to stay under the tracker's URL length limit.
pub const MAX_BODY_CHARS: usize = 1800;
const MAX_CONTEXT_CHARS: usize = 200;
const FENCE: &str = "```";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IssueBodyError {
    #[error("no ```json block found in issue body")]
    MissingJsonBlock,
    #[error("```json block is never closed")]
    UnclosedJsonBlock,
}

/// Contents of the first fenced json block in `body`.
///
/// # Errors
///
/// `MissingJsonBlock` when there is no such fence, `UnclosedJsonBlock` when
/// it has no closing fence.
pub fn extract_json_block(body: &str) -> Result<&str, IssueBodyError> {
    let open = body
        .find("```json")
        .ok_or(IssueBodyError::MissingJsonBlock)?;
    let after_tag = &body[open + "```json".len()..];
    let content_start = after_tag.find('\n').map_or(after_tag.len(), |nl| nl + 1);
    let content = &after_tag[content_start..];
    let close = content
        .find(FENCE)
        .ok_or(IssueBodyError::UnclosedJsonBlock)?;
    Ok(content[..close].trim())
}

/// Parse a submission given either as a bare JSON object or as an issue body.
///
/// # Errors
///
/// Fails when no JSON can be located or it does not parse.
pub fn submission_from_text(text: &str) -> anyhow::Result<Value> {
    let trimmed = text.trim_start();
    let json = if trimmed.starts_with('{') {
        trimmed
    } else {
        extract_json_block(text)?
    };
    Ok(serde_json::from_str(json)?)
}

#[derive(Serialize)]
struct IssueTemplate<'a> {
    table: &'a str,
    id: i64,
    action: EditAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    new_value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    reviewer: &'a str,
}

impl<'a> IssueTemplate<'a> {
    /// `None` for `correct_field` on a table with nothing correctable.
    fn for_action(entity: &'a Entity, action: EditAction) -> Option<Self> {
        let mut template = Self {
            table: entity.table.as_str(),
            id: entity.id,
            action,
            field: None,
            new_value: None,
            reason: None,
            description: None,
            reviewer: "",
        };
        match action {
            EditAction::MarkValid => {}
            EditAction::MarkUnusable => {
                template.reason = Some("EDIT THIS: Describe why this should be removed");
            }
            EditAction::MarkBlocked => {
                template.reason = Some("EDIT THIS: Describe why this is blocked");
            }
            EditAction::CorrectField => {
                let spec = entity.table.spec();
                let field = spec
                    .field(spec.primary_field)
                    .filter(|f| f.correctable)
                    .or_else(|| spec.correctable_fields().next())?;
                template.field = Some(field.name);
                template.new_value = Some(entity.column_value(field.name));
                template.reason = Some("EDIT THIS: Describe the correction");
            }
            EditAction::Report => {
                template.description = Some("EDIT THIS: Describe the problem");
            }
        }
        Some(template)
    }
}

/// Builds review links for one site generation.
pub struct IssueLinks<'a> {
    repo: &'a str,
    generated_at: String,
}

impl<'a> IssueLinks<'a> {
    #[must_use]
    pub fn new(repo: &'a str, generated_at: DateTime<Utc>) -> Self {
        Self {
            repo,
            generated_at: generated_at.format("%Y-%m-%d %H:%M UTC").to_string(),
        }
    }

    /// One link per action the entity supports.
    pub fn review_links(&self, entity: &Entity) -> anyhow::Result<Vec<ReviewLink>> {
        let mut links = Vec::with_capacity(EditAction::ALL.len());
        for action in EditAction::ALL {
            if let Some(link) = self.link(entity, action)? {
                links.push(link);
            }
        }
        Ok(links)
    }

    pub fn link(&self, entity: &Entity, action: EditAction) -> anyhow::Result<Option<ReviewLink>> {
        let Some(body) = self.body(entity, action)? else {
            return Ok(None);
        };
        let title = format!("{} {}/{}", action.title_prefix(), entity.table, entity.id);
        let url = format!(
            "https://github.com/{}/issues/new?title={}&body={}",
            self.repo,
            urlencoding::encode(&title),
            urlencoding::encode(&body)
        );
        Ok(Some(ReviewLink { action, title, url }))
    }

    /// Issue body, already truncated.
    pub fn body(&self, entity: &Entity, action: EditAction) -> anyhow::Result<Option<String>> {
        let Some(template) = IssueTemplate::for_action(entity, action) else {
            return Ok(None);
        };
        let json_block = serde_json::to_string_pretty(&template)?;

        let mut body = String::from("<!-- EDIT JSON BELOW - Keep the code fence markers -->\n");
        let _ = write!(body, "```json\n{json_block}\n```\n\n");
        if action != EditAction::Report {
            body.push_str("### Reference (do not edit below this line)\n");
            body.push_str(&reference_context(entity));
            body.push_str("\n\n");
        }
        let _ = write!(
            body,
            "---\n*Page: {}*\n*Site generated: {}*\n*Submit this issue to log your correction.*\n",
            entity_path(entity.table, entity.id),
            self.generated_at
        );

        Ok(Some(truncate_body(body)))
    }
}

/// `- **column:** value` for each non-null data column.
fn reference_context(entity: &Entity) -> String {
    entity
        .table
        .spec()
        .column_names()
        .filter_map(|column| {
            let value = match entity.column_value(column) {
                Value::Null => return None,
                Value::String(text) => text,
                other => other.to_string(),
            };
            Some(format!("- **{column}:** {}", clip(&value, MAX_CONTEXT_CHARS, "...")))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn truncate_body(body: String) -> String {
    if body.chars().count() > MAX_BODY_CHARS {
        clip(&body, MAX_BODY_CHARS, "\n\n(truncated)")
    } else {
        body
    }
}

fn clip(text: &str, max_chars: usize, marker: &str) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{marker}", &text[..cut]),
        None => text.to_string(),
    }
}
