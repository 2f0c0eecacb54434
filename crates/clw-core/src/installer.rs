//! Installation flow.
//!
//! ```text
//! CheckExisting --[current]--> UpToDate ---------------------------> path
//!       |
//!       +--[missing | outdated | probe failed | forced]--> NeedsDownload
//!                                                              |
//!                         Downloading --[ok]--> Installed -----> path
//!                              |
//!                              +--[err]--> Failed (staging removed) -> error
//! ```
//!
//! The platform asset is resolved before anything touches the disk, so an
//! unsupported host fails without side effects. The cached artifact is never
//! written in place: the download goes to a staging file in the same
//! directory and is renamed over the canonical path once complete.

use std::path::PathBuf;
use std::sync::Arc;

use clw_schema::{ReleaseAsset, release_url};
use reqwest::Client;

use crate::io::download::{Downloader, build_client};
use crate::io::lock::InstallLock;
use crate::store::{self, ArtifactStore};
use crate::{InstallError, LauncherConfig, ProbeError, Reporter, VersionOracle};

/// What the cached artifact looks like right now.
#[derive(Debug)]
enum Check {
    UpToDate,
    Missing,
    Outdated(String),
    Unreadable(ProbeError),
}

/// Makes sure the right `clw` binary is installed and returns its path.
pub struct Installer {
    config: LauncherConfig,
    store: ArtifactStore,
    oracle: VersionOracle,
    downloader: Downloader,
    reporter: Arc<dyn Reporter>,
}

impl std::fmt::Debug for Installer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Installer")
            .field("config", &self.config)
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl Installer {
    /// Build an installer whose messages go to `reporter`.
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be built.
    pub fn new(config: LauncherConfig, reporter: Arc<dyn Reporter>) -> Result<Self, InstallError> {
        let client = build_client(config.download_timeout).map_err(InstallError::Download)?;
        Ok(Self::with_client(config, client, reporter))
    }

    /// Like [`Installer::new`], with a caller-supplied HTTP client.
    pub fn with_client(config: LauncherConfig, client: Client, reporter: Arc<dyn Reporter>) -> Self {
        Self {
            store: ArtifactStore::new(&config.home),
            oracle: VersionOracle::new(config.wanted_version.clone(), config.probe_timeout),
            downloader: Downloader::new(client, reporter.clone()),
            reporter,
            config,
        }
    }

    /// Where the artifact is kept.
    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// The version check used by [`Installer::ensure`].
    pub fn oracle(&self) -> &VersionOracle {
        &self.oracle
    }

    /// Download URL of the artifact for the configured platform.
    ///
    /// # Errors
    ///
    /// Returns [`InstallError::UnsupportedPlatform`] if no asset exists.
    pub fn release_url(&self) -> Result<String, InstallError> {
        let asset = self.config.platform.resolve()?;
        Ok(self.url_for(asset))
    }

    /// Return the path of an installed artifact reporting the wanted version,
    /// downloading it first if needed.
    ///
    /// With `force`, the cached artifact is replaced unconditionally.
    ///
    /// # Errors
    ///
    /// - [`InstallError::UnsupportedPlatform`] before any filesystem or
    ///   network access.
    /// - [`InstallError::Download`] after the partial download is removed.
    /// - [`InstallError::Lock`] / [`InstallError::Io`] for local failures.
    pub async fn ensure(&self, force: bool) -> Result<PathBuf, InstallError> {
        let asset = self.config.platform.resolve()?;
        let wanted = self.oracle.wanted();

        if force {
            self.reporter
                .info(&format!("Forcing fresh download of clw binary v{wanted}..."));
        } else {
            match self.check().await {
                Check::UpToDate => {
                    let path = self.store.canonical_path().to_path_buf();
                    tracing::debug!(path = %path.display(), "artifact up to date");
                    self.reporter.up_to_date(&format!(
                        "clw binary v{wanted} already installed at {}",
                        path.display()
                    ));
                    return Ok(path);
                }
                stale => self.report_stale(&stale),
            }
        }

        self.store
            .ensure_dir()
            .map_err(|e| InstallError::io("Failed to create install directory", e))?;
        let lock = self.lock().await?;

        // Another launcher may have finished the install while we waited.
        // Re-check only if we actually had to wait.
        if !force && lock.was_contended() && matches!(self.check().await, Check::UpToDate) {
            tracing::info!("artifact was installed by a concurrent launcher");
            return Ok(self.store.canonical_path().to_path_buf());
        }

        self.store
            .remove()
            .map_err(|e| InstallError::io("Failed to remove stale binary", e))?;

        self.download(asset).await
    }

    async fn check(&self) -> Check {
        if !self.store.exists() {
            return Check::Missing;
        }

        let oracle = self.oracle.clone();
        let path = self.store.canonical_path().to_path_buf();
        let probed = tokio::task::spawn_blocking(move || oracle.installed_version(&path))
            .await
            .unwrap_or_else(|e| Err(ProbeError::Io(std::io::Error::other(e))));

        match probed {
            Ok(reported) if self.oracle.is_current(&reported) => Check::UpToDate,
            Ok(reported) => Check::Outdated(reported),
            Err(e) => Check::Unreadable(e),
        }
    }

    fn report_stale(&self, check: &Check) {
        match check {
            Check::UpToDate => {}
            Check::Missing => tracing::debug!("no cached artifact"),
            Check::Outdated(reported) => self.reporter.warning(&format!(
                "Outdated or corrupted binary found (current: {reported}), updating..."
            )),
            Check::Unreadable(e) => {
                tracing::debug!(error = ?e, "version probe failed");
                self.reporter
                    .warning(&format!("Binary check failed ({e}), re-downloading..."));
            }
        }
    }

    async fn lock(&self) -> Result<InstallLock, InstallError> {
        let path = self.store.lock_path().to_path_buf();
        let lock_path = path.clone();

        tokio::task::spawn_blocking(move || InstallLock::acquire(&lock_path))
            .await
            .map_err(std::io::Error::other)
            .and_then(|acquired| acquired)
            .map_err(|source| InstallError::Lock { path, source })
    }

    async fn download(&self, asset: ReleaseAsset) -> Result<PathBuf, InstallError> {
        let url = self.url_for(asset);
        self.reporter
            .info(&format!("Downloading clw binary from {url}..."));

        let staged = self
            .store
            .staging_file()
            .map_err(|e| InstallError::io("Failed to create download file", e))?;

        if let Err(e) = self.downloader.fetch(&url, &staged).await {
            tracing::warn!(url, "download failed: {e}");
            if let Err(cleanup) = staged.close() {
                tracing::warn!("failed to remove partial download: {cleanup}");
            }
            return Err(e.into());
        }

        store::mark_executable(&staged)
            .map_err(|e| InstallError::io("Failed to make binary executable", e))?;
        self.store
            .install_from(staged)
            .map_err(|e| InstallError::io("Failed to move binary into place", e))?;

        let path = self.store.canonical_path().to_path_buf();
        if !self.store.exists() {
            return Err(InstallError::ArtifactNotFound(path));
        }

        self.reporter.success(&format!(
            "Successfully installed clw binary to {}",
            path.display()
        ));
        Ok(path)
    }

    fn url_for(&self, asset: ReleaseAsset) -> String {
        release_url(&self.config.release_base_url, self.oracle.wanted(), &asset)
    }
}
