//! Locating the project a command runs against.
//!
//! A project is any directory holding `.dataview/`. That is where the
//! database, edit log, config and write lock live by default.

use std::path::{Path, PathBuf};

use anyhow::Context;

const PROJECT_DIR: &str = ".dataview";

/// Resolve `--project`, or search upward from `cwd` when it is absent.
///
/// `--project` may name the project directory or its `.dataview` directory,
/// and need not contain `.dataview` yet.
pub fn resolve_project_root(project_override: Option<&str>, cwd: &Path) -> anyhow::Result<PathBuf> {
    let Some(path) = project_override else {
        return find_project_root(cwd).with_context(|| {
            format!(
                "not a dataview project (no {PROJECT_DIR} directory above {}); pass --project",
                cwd.display()
            )
        });
    };

    let explicit = PathBuf::from(path);
    if explicit.file_name().is_some_and(|name| name == PROJECT_DIR) {
        return explicit
            .parent()
            .map(Path::to_path_buf)
            .with_context(|| format!("invalid --project '{path}': {PROJECT_DIR} has no parent"));
    }
    if explicit.is_dir() {
        return Ok(explicit);
    }
    anyhow::bail!("invalid --project '{path}': directory does not exist")
}

/// Nearest ancestor of `start` (inclusive) that holds `.dataview/`.
#[must_use]
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(PROJECT_DIR).is_dir())
        .map(Path::to_path_buf)
}
