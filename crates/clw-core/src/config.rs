//! Launcher configuration.
//!
//! Every tunable has a compiled-in default. The binaries call
//! [`LauncherConfig::from_env`]; the installer never reads the environment.

use std::path::PathBuf;
use std::time::Duration;

use clw_schema::{DEFAULT_RELEASE_BASE_URL, PlatformKey, WantedVersion};
use thiserror::Error;

use crate::paths;

/// Overrides the release download base URL.
pub const RELEASE_URL_ENV: &str = "CLW_RELEASE_URL";

/// Overrides the overall download deadline, in seconds. `0` disables it.
pub const DOWNLOAD_TIMEOUT_ENV: &str = "CLW_DOWNLOAD_TIMEOUT_SECS";

/// How long `clw --version` may run before the probe gives up.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Default overall deadline for a single artifact download.
pub const DEFAULT_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(600);

/// Deadline for establishing the download connection.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Invalid or unavailable launcher settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The install directory could not be located.
    #[error("Could not determine launcher install directory: {0}")]
    Home(#[source] std::io::Error),

    /// The download timeout override is not a whole number of seconds.
    #[error("Invalid {DOWNLOAD_TIMEOUT_ENV} value '{0}': expected whole seconds")]
    Timeout(String),
}

/// Everything the installer needs to know about where and what to install.
#[derive(Debug, Clone)]
pub struct LauncherConfig {
    /// Launcher install directory; the artifact lives in `<home>/bin`.
    pub home: PathBuf,
    /// Prefix of release download URLs, without the `v<version>` segment.
    pub release_base_url: String,
    /// Version the cached artifact must report.
    pub wanted_version: WantedVersion,
    /// Platform whose asset is downloaded.
    pub platform: PlatformKey,
    /// How long `clw --version` may take.
    pub probe_timeout: Duration,
    /// `None` lets a download run for as long as the transport allows.
    pub download_timeout: Option<Duration>,
}

impl LauncherConfig {
    /// Defaults for a launcher installed in `home`.
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self {
            home: home.into(),
            release_base_url: DEFAULT_RELEASE_BASE_URL.to_string(),
            wanted_version: WantedVersion::from(crate::LAUNCHER_VERSION),
            platform: PlatformKey::host(),
            probe_timeout: PROBE_TIMEOUT,
            download_timeout: Some(DEFAULT_DOWNLOAD_TIMEOUT),
        }
    }

    /// Defaults, with `CLW_LAUNCHER_HOME`, `CLW_RELEASE_URL` and
    /// `CLW_DOWNLOAD_TIMEOUT_SECS` applied when set.
    ///
    /// # Errors
    ///
    /// Fails if the install directory cannot be determined or the timeout
    /// override is not a number.
    pub fn from_env() -> Result<Self, ConfigError> {
        let home = paths::launcher_home().map_err(ConfigError::Home)?;
        let mut config = Self::new(home);

        if let Some(url) = std::env::var(RELEASE_URL_ENV)
            .ok()
            .filter(|u| !u.trim().is_empty())
        {
            config.release_base_url = url.trim().to_string();
        }

        if let Ok(raw) = std::env::var(DOWNLOAD_TIMEOUT_ENV) {
            config.download_timeout = parse_timeout(&raw)?;
        }

        Ok(config)
    }

    /// Fetch releases from `url` instead of the default host.
    pub fn with_release_base_url(mut self, url: impl Into<String>) -> Self {
        self.release_base_url = url.into();
        self
    }

    /// Expect the artifact to report `version`.
    pub fn with_wanted_version(mut self, version: impl Into<WantedVersion>) -> Self {
        self.wanted_version = version.into();
        self
    }

    /// Install the asset for `platform` rather than the host.
    pub fn with_platform(mut self, platform: PlatformKey) -> Self {
        self.platform = platform;
        self
    }

    /// Overall download deadline; `None` disables it.
    pub fn with_download_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.download_timeout = timeout;
        self
    }
}

fn parse_timeout(raw: &str) -> Result<Option<Duration>, ConfigError> {
    let secs: u64 = raw
        .trim()
        .parse()
        .map_err(|_| ConfigError::Timeout(raw.to_string()))?;
    Ok((secs > 0).then(|| Duration::from_secs(secs)))
}
