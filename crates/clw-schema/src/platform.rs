//! Host platform detection and the static release asset table.
//!
//! One prebuilt artifact is published per supported (OS, architecture)
//! pair. Toolchains disagree on architecture names (`amd64` vs `x86_64`,
//! `arm64` vs `aarch64`), so [`PlatformKey`] normalizes them before the
//! lookup.
//!
//! # Example
//!
//! ```
//! use clw_schema::PlatformKey;
//!
//! let key = PlatformKey::new("linux", "amd64");
//! assert_eq!(key.arch(), "x86_64");
//! assert_eq!(key.resolve().unwrap().as_str(), "clw-linux-x86_64-musl");
//! ```

use std::fmt;

/// Project page users are pointed at when no prebuilt asset exists.
pub const SOURCE_URL: &str = "https://github.com/sshu2017/clw";

/// `(os, arch, asset)` for every platform with a published artifact.
const RELEASE_ASSETS: &[(&str, &str, &str)] = &[
    ("linux", "x86_64", "clw-linux-x86_64-musl"),
    ("linux", "aarch64", "clw-linux-aarch64-musl"),
    ("macos", "x86_64", "clw-macos-x86_64"),
    ("macos", "aarch64", "clw-macos-aarch64"),
    ("windows", "x86_64", "clw-windows-x86_64.exe"),
];

/// An operating system paired with a normalized CPU architecture.
///
/// Values are lowercased on construction. Unknown names are kept verbatim
/// so they can be reported back to the user.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlatformKey {
    os: String,
    arch: String,
}

impl PlatformKey {
    /// Build a key from raw OS and architecture names.
    pub fn new(os: impl AsRef<str>, arch: impl AsRef<str>) -> Self {
        Self {
            os: os.as_ref().to_lowercase(),
            arch: normalize_arch(arch.as_ref()),
        }
    }

    /// The platform this binary was compiled for.
    pub fn host() -> Self {
        Self::new(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Operating system identifier (e.g. `linux`, `macos`, `windows`).
    pub fn os(&self) -> &str {
        &self.os
    }

    /// Normalized architecture identifier (e.g. `x86_64`, `aarch64`).
    pub fn arch(&self) -> &str {
        &self.arch
    }

    /// Look up the release asset published for this platform.
    ///
    /// # Errors
    ///
    /// Returns [`UnsupportedPlatform`] when the pair is not in the table.
    pub fn resolve(&self) -> Result<ReleaseAsset, UnsupportedPlatform> {
        RELEASE_ASSETS
            .iter()
            .find(|(os, arch, _)| *os == self.os && *arch == self.arch)
            .map(|(_, _, asset)| ReleaseAsset(asset))
            .ok_or_else(|| UnsupportedPlatform { key: self.clone() })
    }
}

impl fmt::Display for PlatformKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os, self.arch)
    }
}

fn normalize_arch(arch: &str) -> String {
    match arch.to_lowercase().as_str() {
        "amd64" => "x86_64".to_string(),
        "arm64" => "aarch64".to_string(),
        other => other.to_string(),
    }
}

/// File name of a published artifact, e.g. `clw-macos-aarch64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReleaseAsset(&'static str);

impl ReleaseAsset {
    /// The asset name as it appears in release download URLs.
    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for ReleaseAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// No artifact is published for the detected platform.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unsupported platform: {key}. Please build from source: {url}", url = SOURCE_URL)]
pub struct UnsupportedPlatform {
    /// The platform that failed the lookup.
    pub key: PlatformKey,
}
