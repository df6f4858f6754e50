//! # dv-config
//!
//! Layered configuration loading for dataview using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`DATAVIEW_*` prefix, `__` as separator)
//! 2. Project-level `.dataview/config.toml`
//! 3. User-level `~/.config/dataview/config.toml`
//! 4. Built-in defaults
//!
//! `DATAVIEW_REVIEW__LOG_PATH` maps to `review.log_path`,
//! `DATAVIEW_GENERAL__PAGE_SIZE` to `general.page_size`, and so on.

mod database;
mod error;
mod general;
mod review;

pub use database::DatabaseConfig;
pub use error::ConfigError;
pub use general::GeneralConfig;
pub use review::ReviewConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DataViewConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub review: ReviewConfig,
    #[serde(default)]
    pub general: GeneralConfig,
}

impl DataViewConfig {
    /// Load configuration from TOML files and environment variables.
    ///
    /// Does NOT read `.env`; use [`Self::load_with_dotenv`] for that.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Figment` when a source cannot be parsed, or
    /// `ConfigError::InvalidValue` when a loaded value is out of range.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new("."))
    }

    /// Like [`Self::load`], reading the project file under `project_root`.
    ///
    /// # Errors
    ///
    /// Same as [`Self::load`].
    pub fn load_from(project_root: &Path) -> Result<Self, ConfigError> {
        let config: Self = Self::figment_at(project_root).extract()?;
        config.check()?;
        Ok(config)
    }

    /// Load `.env` from `project_root` (if present), then [`Self::load_from`].
    ///
    /// # Errors
    ///
    /// Same as [`Self::load`].
    pub fn load_with_dotenv(project_root: &Path) -> Result<Self, ConfigError> {
        let _ = dotenvy::from_path(project_root.join(".env"));
        Self::load_from(project_root)
    }

    /// Build the figment provider chain.
    #[must_use]
    pub fn figment() -> Figment {
        Self::figment_at(Path::new("."))
    }

    /// Provider chain with the project layer read from `project_root`.
    #[must_use]
    pub fn figment_at(project_root: &Path) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = project_root.join(".dataview").join("config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("DATAVIEW_").split("__"))
    }

    /// Reject values figment accepts but dataview cannot use.
    ///
    /// # Errors
    ///
    /// `ConfigError::InvalidValue` naming the first offending field.
    pub fn check(&self) -> Result<(), ConfigError> {
        if self.general.page_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "general.page_size".into(),
                reason: "must be at least 1".into(),
            });
        }
        if !self.review.has_valid_repo() {
            return Err(ConfigError::InvalidValue {
                field: "review.repo".into(),
                reason: format!("expected owner/name, got '{}'", self.review.repo),
            });
        }
        if self.review.log_path.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "review.log_path".into(),
                reason: "must not be empty".into(),
            });
        }
        Ok(())
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("dataview").join("config.toml"))
    }
}
