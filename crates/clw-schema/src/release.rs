//! Release download URL layout.

use crate::{ReleaseAsset, WantedVersion};

/// Where tagged release assets are published.
pub const DEFAULT_RELEASE_BASE_URL: &str = "https://github.com/sshu2017/clw/releases/download";

/// Build `<base>/v<version>/<asset>`.
///
/// # Example
///
/// ```
/// use clw_schema::{PlatformKey, WantedVersion, release_url, DEFAULT_RELEASE_BASE_URL};
///
/// let asset = PlatformKey::new("macos", "arm64").resolve().unwrap();
/// let url = release_url(DEFAULT_RELEASE_BASE_URL, &WantedVersion::from("0.1.3"), &asset);
/// assert_eq!(
///     url,
///     "https://github.com/sshu2017/clw/releases/download/v0.1.3/clw-macos-aarch64"
/// );
/// ```
pub fn release_url(base: &str, version: &WantedVersion, asset: &ReleaseAsset) -> String {
    format!("{}/v{version}/{asset}", base.trim_end_matches('/'))
}
