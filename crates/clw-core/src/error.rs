//! Errors that end an `ensure()` call.

use std::path::PathBuf;

use clw_schema::UnsupportedPlatform;
use thiserror::Error;

use crate::io::download::DownloadError;

/// Why the artifact could not be made available.
#[derive(Error, Debug)]
pub enum InstallError {
    /// No prebuilt asset exists for this platform.
    #[error(transparent)]
    UnsupportedPlatform(#[from] UnsupportedPlatform),

    /// The download failed; nothing partial was kept.
    #[error("Failed to download binary: {0}")]
    Download(#[from] DownloadError),

    /// The install step succeeded but no file is at the canonical path.
    #[error("clw binary not found at {} after installation", .0.display())]
    ArtifactNotFound(PathBuf),

    /// The install lock could not be taken.
    #[error("Failed to lock {}: {source}", path.display())]
    Lock {
        /// Lock file path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A local filesystem step failed.
    #[error("{context}: {source}")]
    Io {
        /// What was being attempted.
        context: &'static str,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

impl InstallError {
    /// Wrap a filesystem error with what was being attempted.
    pub fn io(context: &'static str, source: std::io::Error) -> Self {
        Self::Io { context, source }
    }
}
