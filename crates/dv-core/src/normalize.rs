//! Structural normalization of raw submissions.
//!
//! Reviewers submit a JSON object pasted into an issue body. This module turns
//! that untrusted mapping into an [`EditDraft`] without looking at any data:
//! table names are kept as text (resolving them is a separate validation step)
//! and explanations are kept optional (their absence is reported after the
//! entity checks, so the submitter hears about the more fundamental problem
//! first).

use serde_json::{Map, Value};

use crate::edit::{Edit, EditAction};
use crate::errors::ValidationFailure;

/// Keys a submission may contain at all.
const KNOWN_KEYS: [&str; 8] = [
    "table",
    "id",
    "action",
    "reason",
    "description",
    "field",
    "new_value",
    "reviewer",
];

/// Reasons copied from the issue template without being edited.
const TEMPLATE_PLACEHOLDER: &str = "EDIT THIS";

/// A structurally valid submission, not yet checked against the registry or
/// the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditDraft {
    pub table: String,
    pub id: i64,
    pub action: EditAction,
    /// Trimmed explanation; `None` when absent, blank, or an untouched template.
    pub reason: Option<String>,
    /// `(field, new_value)`, present exactly when the action is `correct_field`.
    pub correction: Option<(String, Value)>,
    pub reviewer: Option<String>,
}

impl EditDraft {
    /// Build the tagged edit, enforcing the reason requirement.
    ///
    /// # Errors
    ///
    /// Returns `MissingReason` when the action requires an explanation and
    /// none was given.
    pub fn into_edit(self) -> Result<Edit, ValidationFailure> {
        let action = self.action;
        let require = |reason: Option<String>| {
            reason.ok_or_else(|| ValidationFailure::MissingReason {
                action,
                field: action.reason_key().to_string(),
            })
        };

        match action {
            EditAction::MarkValid => Ok(Edit::MarkValid {
                reason: self.reason,
            }),
            EditAction::MarkUnusable => Ok(Edit::MarkUnusable {
                reason: require(self.reason)?,
            }),
            EditAction::MarkBlocked => Ok(Edit::MarkBlocked {
                reason: require(self.reason)?,
            }),
            EditAction::Report => Ok(Edit::Report {
                description: require(self.reason)?,
            }),
            EditAction::CorrectField => {
                let (field, new_value) = self.correction.ok_or_else(|| {
                    ValidationFailure::malformed("correct_field requires 'field' and 'new_value'")
                })?;
                Ok(Edit::CorrectField {
                    field,
                    new_value,
                    reason: self.reason,
                })
            }
        }
    }
}

/// Normalize a raw submission.
///
/// Every structural problem is collected into one `MalformedRecord` failure.
///
/// # Errors
///
/// Returns `MalformedRecord` when the value is not an object, a structural key
/// is missing or mistyped, the action is unknown, or a key is unknown or not
/// allowed for the action.
pub fn normalize(raw: &Value) -> Result<EditDraft, ValidationFailure> {
    let Some(map) = raw.as_object() else {
        return Err(ValidationFailure::malformed(format!(
            "submission must be a JSON object, got {}",
            crate::tables::json_type_name(raw)
        )));
    };

    let mut problems = Vec::new();

    for key in map.keys() {
        if !KNOWN_KEYS.contains(&key.as_str()) {
            problems.push(format!("unknown key '{key}'"));
        }
    }

    let table = match map.get("table") {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::String(_)) => {
            problems.push("'table' must not be empty".into());
            None
        }
        Some(other) => {
            problems.push(format!(
                "'table' must be a string, got {}",
                crate::tables::json_type_name(other)
            ));
            None
        }
        None => {
            problems.push("missing 'table'".into());
            None
        }
    };

    let id = match map.get("id") {
        Some(Value::Number(n)) => match n.as_i64() {
            Some(id) if id >= 0 => Some(id),
            _ => {
                problems.push(format!("'id' must be a non-negative integer, got {n}"));
                None
            }
        },
        Some(other) => {
            problems.push(format!(
                "'id' must be an integer, got {}",
                crate::tables::json_type_name(other)
            ));
            None
        }
        None => {
            problems.push("missing 'id'".into());
            None
        }
    };

    let action = match map.get("action") {
        Some(Value::String(s)) => EditAction::parse(s.trim()).or_else(|| {
            problems.push(format!("unknown action '{s}'"));
            None
        }),
        Some(other) => {
            problems.push(format!(
                "'action' must be a string, got {}",
                crate::tables::json_type_name(other)
            ));
            None
        }
        None => {
            problems.push("missing 'action'".into());
            None
        }
    };

    let reviewer = optional_text(map, "reviewer", &mut problems);
    let reason = optional_text(map, "reason", &mut problems);
    let description = optional_text(map, "description", &mut problems);

    let mut correction = None;
    if let Some(action) = action {
        if action == EditAction::CorrectField {
            let field = match map.get("field") {
                Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
                Some(Value::String(_)) => {
                    problems.push("'field' must not be empty".into());
                    None
                }
                Some(other) => {
                    problems.push(format!(
                        "'field' must be a string, got {}",
                        crate::tables::json_type_name(other)
                    ));
                    None
                }
                None => {
                    problems.push("correct_field requires 'field'".into());
                    None
                }
            };
            let new_value = map.get("new_value").cloned();
            if new_value.is_none() {
                problems.push("correct_field requires 'new_value'".into());
            }
            correction = field.zip(new_value);
        } else {
            for key in ["field", "new_value"] {
                if map.contains_key(key) {
                    problems.push(format!("'{key}' is not allowed for {action}"));
                }
            }
        }

        if action != EditAction::Report && map.contains_key("description") {
            problems.push(format!("'description' is not allowed for {action}"));
        }
        if action == EditAction::Report && map.contains_key("description") && map.contains_key("reason") {
            problems.push("report takes 'description'; do not also give 'reason'".into());
        }
    }

    if !problems.is_empty() {
        return Err(ValidationFailure::MalformedRecord { problems });
    }

    // Every `None` below has pushed a problem above.
    let (Some(table), Some(id), Some(action)) = (table, id, action) else {
        return Err(ValidationFailure::malformed("incomplete record"));
    };

    let reason = if action == EditAction::Report {
        description.or(reason)
    } else {
        reason
    };

    Ok(EditDraft {
        table,
        id,
        action,
        reason: reason.and_then(meaningful_reason),
        correction,
        reviewer: reviewer.filter(|r| !r.is_empty()),
    })
}

/// Read an optional string-or-null key, trimmed.
fn optional_text(map: &Map<String, Value>, key: &str, problems: &mut Vec<String>) -> Option<String> {
    match map.get(key) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.trim().to_string()),
        Some(other) => {
            problems.push(format!(
                "'{key}' must be a string, got {}",
                crate::tables::json_type_name(other)
            ));
            None
        }
    }
}

fn meaningful_reason(reason: String) -> Option<String> {
    if reason.is_empty() || reason.starts_with(TEMPLATE_PLACEHOLDER) {
        None
    } else {
        Some(reason)
    }
}
