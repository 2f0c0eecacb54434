//! Cross-process install lock.
//!
//! Every launcher on a machine shares one artifact path. The remove,
//! download and replace sequence runs under an exclusive advisory lock on
//! `<home>/bin/.clw.lock` so concurrent invocations take turns instead of
//! overwriting each other's download.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fs4::fs_std::FileExt;

/// Holds the exclusive lock until dropped.
#[derive(Debug)]
pub struct InstallLock {
    file: File,
    path: PathBuf,
    contended: bool,
}

impl InstallLock {
    /// Block until the lock at `path` is ours. Creates the file if needed.
    ///
    /// Tries once without waiting first, so the holder can tell whether
    /// another process had it in the meantime.
    ///
    /// # Errors
    ///
    /// Fails if the lock file cannot be opened or locked.
    pub fn acquire(path: &Path) -> std::io::Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        let contended = !FileExt::try_lock_exclusive(&file)?;
        if contended {
            tracing::debug!(path = %path.display(), "waiting for install lock");
            FileExt::lock_exclusive(&file)?;
        }
        tracing::debug!(path = %path.display(), contended, "install lock acquired");

        Ok(Self {
            file,
            path: path.to_path_buf(),
            contended,
        })
    }

    /// Path of the lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether another holder had to release the lock before we got it.
    pub fn was_contended(&self) -> bool {
        self.contended
    }
}

impl Drop for InstallLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            tracing::warn!(path = %self.path.display(), "failed to release install lock: {e}");
        }
    }
}
