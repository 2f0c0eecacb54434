//! The version a launcher build expects its artifact to report.

use std::fmt;

/// Version string taken from the launcher's own package metadata.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WantedVersion(String);

impl WantedVersion {
    /// The bare version, without a leading `v`.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether an artifact's `--version` output satisfies this version.
    ///
    /// This is a substring test: `clw 0.1.3 (abc123)` matches `0.1.3`.
    /// It is deliberately loose, so `0.1.30` also matches `0.1.3`.
    pub fn matches(&self, reported: &str) -> bool {
        !self.0.is_empty() && reported.contains(self.0.as_str())
    }
}

impl From<&str> for WantedVersion {
    fn from(s: &str) -> Self {
        Self(s.trim().trim_start_matches('v').to_string())
    }
}

impl From<String> for WantedVersion {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl fmt::Display for WantedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
