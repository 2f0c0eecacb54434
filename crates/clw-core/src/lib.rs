//! Core of the clw launcher: keeps a platform-specific `clw` binary present,
//! current and executable next to the launcher.
//!
//! # Directory Layout
//!
//! ```text
//! <launcher-install-dir>/
//! ├── clw               # the launcher itself
//! └── bin/
//!     ├── clw           # cached artifact (clw.exe on Windows)
//!     └── .clw.lock     # advisory lock held while installing
//! ```

pub mod config;
pub mod error;
pub mod installer;
pub mod io;
pub mod paths;
pub mod probe;
pub mod reporter;
pub mod store;

pub use config::{ConfigError, LauncherConfig};
pub use error::InstallError;
pub use installer::Installer;
pub use probe::{ProbeError, VersionOracle};
pub use reporter::{NullReporter, Reporter};
pub use store::ArtifactStore;

/// Version of this launcher build, and therefore of the artifact it installs.
pub const LAUNCHER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// User Agent string for release downloads
pub const USER_AGENT: &str = concat!("clw-launcher/", env!("CARGO_PKG_VERSION"));
