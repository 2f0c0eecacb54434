//! clw launcher
#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
//!
//! Thin front end over `clw-core`. The `clw` binary takes no flags of its
//! own: it makes sure the platform artifact in `<home>/bin` reports the
//! launcher's version and then hands the whole argument vector to it.
//! `clw-install` runs only the install step, for packaging hooks.
//!
//! # Exit codes
//!
//! | Code | Meaning                                         |
//! |------|-------------------------------------------------|
//! | 0    | artifact ran and exited 0                       |
//! | n    | artifact's own exit code, passed through        |
//! | 1    | install, resolution or handoff failure          |
//! | 130  | interrupted before handoff                      |

pub mod handoff;
pub mod launch;
pub mod ui;

pub use launch::{EXIT_FAILURE, EXIT_INTERRUPTED, LaunchError, ensure_installed};
pub use ui::TerminalReporter;

use tracing_subscriber::EnvFilter;

/// Install the `RUST_LOG`-driven subscriber. Logs go to stderr so the
/// artifact's stdout stays clean.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}
