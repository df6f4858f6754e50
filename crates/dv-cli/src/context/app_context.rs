use std::path::{Path, PathBuf};

use anyhow::Context;
use dv_config::DataViewConfig;
use dv_db::DvDb;
use dv_db::edit_log::EditLog;
use dv_db::snapshot::{EntitySnapshot, SnapshotReader};

/// Shared application resources initialized once at startup.
pub struct AppContext {
    pub db: DvDb,
    pub log: EditLog,
    pub config: DataViewConfig,
}

impl AppContext {
    /// Open the database and edit log named by `config`, relative to
    /// `project_root` unless absolute.
    pub async fn init(project_root: &Path, config: DataViewConfig) -> anyhow::Result<Self> {
        let db_path = if config.database.is_in_memory() {
            PathBuf::from(&config.database.path)
        } else {
            resolve(project_root, &config.database.path)
        };
        let log_path = resolve(project_root, &config.review.log_path);

        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let db = DvDb::open_local(&db_path.to_string_lossy())
            .await
            .with_context(|| format!("failed to open database {}", db_path.display()))?;
        tracing::debug!(db = %db_path.display(), log = %log_path.display(), "context ready");

        Ok(Self {
            db,
            log: EditLog::new(log_path),
            config,
        })
    }

    /// Current state of every entity table.
    pub async fn snapshot(&self) -> anyhow::Result<EntitySnapshot> {
        SnapshotReader::new(&self.db)
            .load()
            .await
            .context("failed to read entity snapshot")
    }
}

fn resolve(root: &Path, configured: &str) -> PathBuf {
    let path = Path::new(configured);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}
