//! Review workflow settings: edit log location and issue-link targets.

use serde::{Deserialize, Serialize};

fn default_log_path() -> String {
    ".dataview/edits.jsonl".to_string()
}

fn default_repo() -> String {
    "ContentiousGatherings/data-view".to_string()
}

fn default_base_url() -> String {
    "/data-view".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReviewConfig {
    /// Append-only edit log, relative to the project root unless absolute.
    #[serde(default = "default_log_path")]
    pub log_path: String,

    /// `owner/name` of the repository review issues are filed against.
    #[serde(default = "default_repo")]
    pub repo: String,

    /// Path prefix the site is served under.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            log_path: default_log_path(),
            repo: default_repo(),
            base_url: default_base_url(),
        }
    }
}

impl ReviewConfig {
    /// `base_url` without a trailing slash; empty when served from the root.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Whether `repo` has the `owner/name` shape.
    #[must_use]
    pub fn has_valid_repo(&self) -> bool {
        matches!(
            self.repo.split_once('/'),
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/')
        )
    }
}
