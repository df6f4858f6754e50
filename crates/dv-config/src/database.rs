//! Pipeline database location.

use serde::{Deserialize, Serialize};

fn default_path() -> String {
    ".dataview/dataview.db".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Path of the libSQL/SQLite file, relative to the project root unless
    /// absolute. `:memory:` opens a throwaway database.
    #[serde(default = "default_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
        }
    }
}

impl DatabaseConfig {
    #[must_use]
    pub fn is_in_memory(&self) -> bool {
        self.path == ":memory:"
    }
}
