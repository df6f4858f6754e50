//! General application configuration.

use serde::{Deserialize, Serialize};

/// Rows per list page.
const fn default_page_size() -> usize {
    200
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// Rows per page for `dataview list`.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        assert_eq!(GeneralConfig::default().page_size, 200);
    }
}
