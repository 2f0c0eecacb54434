//! On-disk location of the cached artifact.

use std::path::{Path, PathBuf};

use tempfile::TempPath;

use crate::paths;

/// Owns `<home>/bin/clw` and the staging files written next to it.
///
/// Staging files live in the same directory as the canonical path so the
/// final rename never crosses a filesystem boundary.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    bin_dir: PathBuf,
    path: PathBuf,
    lock_path: PathBuf,
}

impl ArtifactStore {
    /// Layout for a launcher installed in `home`.
    pub fn new(home: &Path) -> Self {
        let bin_dir = paths::bin_path(home);
        Self {
            path: bin_dir.join(paths::binary_file_name()),
            lock_path: paths::lock_path(home),
            bin_dir,
        }
    }

    /// Where the installed artifact lives. Pure; touches nothing on disk.
    pub fn canonical_path(&self) -> &Path {
        &self.path
    }

    /// Directory holding the artifact and its lock.
    pub fn bin_dir(&self) -> &Path {
        &self.bin_dir
    }

    /// Path of the install lock file.
    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }

    /// Create the artifact directory if it is missing.
    ///
    /// # Errors
    ///
    /// Propagates the underlying filesystem error.
    pub fn ensure_dir(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.bin_dir)
    }

    /// Whether a regular file sits at the canonical path.
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Delete the installed artifact. Succeeds if it is already gone.
    ///
    /// # Errors
    ///
    /// Propagates any failure other than the file being absent.
    pub fn remove(&self) -> std::io::Result<()> {
        match std::fs::remove_file(&self.path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }

    /// Reserve a uniquely named, empty staging file in the artifact directory.
    ///
    /// The returned path deletes the file when dropped unless it is handed to
    /// [`ArtifactStore::install_from`].
    ///
    /// # Errors
    ///
    /// Fails if the directory is missing or not writable.
    pub fn staging_file(&self) -> std::io::Result<TempPath> {
        tempfile::Builder::new()
            .prefix(".clw-")
            .suffix(".partial")
            .tempfile_in(&self.bin_dir)
            .map(tempfile::NamedTempFile::into_temp_path)
    }

    /// Atomically rename a fully written staging file over the canonical path.
    ///
    /// # Errors
    ///
    /// On failure the staging file is removed and the error returned.
    pub fn install_from(&self, staged: TempPath) -> std::io::Result<()> {
        staged.persist(&self.path).map_err(|e| e.error)
    }
}

/// Add the owner-execute bit, keeping every existing permission bit.
///
/// No-op on non-unix targets.
///
/// # Errors
///
/// Propagates metadata or permission errors.
#[cfg(unix)]
pub fn mark_executable(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = std::fs::metadata(path)?.permissions();
    perms.set_mode(perms.mode() | 0o100);
    std::fs::set_permissions(path, perms)
}

/// Windows decides executability by extension.
///
/// # Errors
///
/// Never fails.
#[cfg(not(unix))]
#[allow(clippy::unnecessary_wraps)]
pub fn mark_executable(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
