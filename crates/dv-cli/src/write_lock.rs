//! Project-wide lock serializing `submit` and `apply`.
//!
//! An advisory exclusive lock on `.dataview/review.write.lock`. The OS drops
//! it when the holding process exits, so a crashed run never leaves the
//! project locked. The file itself is left in place.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Context;
use fs2::FileExt;

const LOCK_WAIT_TIMEOUT: Duration = Duration::from_secs(120);
const LOCK_RETRY_DELAY: Duration = Duration::from_millis(250);

/// Held while `submit` or `apply` runs; unlocks on drop.
#[derive(Debug)]
pub struct WriteLockGuard {
    file: File,
    path: PathBuf,
}

impl Drop for WriteLockGuard {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to release write lock");
        }
    }
}

/// Lock path for a project root.
pub fn lock_path(project_root: &Path) -> PathBuf {
    project_root.join(".dataview").join("review.write.lock")
}

/// Take the project write lock, waiting up to two minutes for another
/// `submit` or `apply` to finish.
pub async fn acquire_for_project(project_root: &Path) -> anyhow::Result<WriteLockGuard> {
    acquire(&lock_path(project_root), LOCK_WAIT_TIMEOUT).await
}

async fn acquire(path: &Path, timeout: Duration) -> anyhow::Result<WriteLockGuard> {
    let started = Instant::now();
    loop {
        if let Some(guard) = try_acquire(path)? {
            tracing::debug!(path = %path.display(), "review write lock acquired");
            return Ok(guard);
        }
        if started.elapsed() >= timeout {
            anyhow::bail!(
                "another submit/apply holds {}; try again after it finishes",
                path.display()
            );
        }
        tracing::debug!(path = %path.display(), "waiting for review write lock");
        tokio::time::sleep(LOCK_RETRY_DELAY).await;
    }
}

/// `Ok(None)` when another handle holds the lock.
fn try_acquire(path: &Path) -> anyhow::Result<Option<WriteLockGuard>> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(path)
        .with_context(|| format!("failed to open lock file {}", path.display()))?;

    match FileExt::try_lock_exclusive(&file) {
        Ok(()) => Ok(Some(WriteLockGuard {
            file,
            path: path.to_path_buf(),
        })),
        Err(e) if e.raw_os_error() == fs2::lock_contended_error().raw_os_error() => Ok(None),
        Err(e) => Err(e).with_context(|| format!("failed to lock {}", path.display())),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{acquire, acquire_for_project, lock_path, try_acquire};

    #[test]
    fn second_handle_cannot_lock_while_held() {
        let temp = tempfile::tempdir().expect("tempdir should create");
        let path = lock_path(temp.path());

        let guard = try_acquire(&path)
            .expect("lock should open")
            .expect("lock should be free");
        assert!(path.is_file());
        assert!(try_acquire(&path).expect("lock should open").is_none());

        drop(guard);
        assert!(try_acquire(&path).expect("lock should open").is_some());
    }

    #[tokio::test]
    async fn waiting_gives_up_after_timeout() {
        let temp = tempfile::tempdir().expect("tempdir should create");
        let _held = acquire_for_project(temp.path())
            .await
            .expect("first lock should acquire");

        let error = acquire(&lock_path(temp.path()), Duration::ZERO)
            .await
            .expect_err("second lock should time out");
        assert!(error.to_string().contains("another submit/apply"));
    }

    #[tokio::test]
    async fn leftover_lock_file_does_not_block() {
        let temp = tempfile::tempdir().expect("tempdir should create");
        let path = lock_path(temp.path());
        std::fs::create_dir_all(path.parent().expect("lock has a parent")).expect("dir");
        std::fs::write(&path, "4194303999\n").expect("lock file should write");

        let guard = acquire_for_project(temp.path())
            .await
            .expect("unlocked file should be taken");
        drop(guard);
        assert!(path.is_file());
    }
}
