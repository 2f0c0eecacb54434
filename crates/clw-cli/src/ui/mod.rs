//! Terminal output for the launcher and installer.

pub mod progress;
pub mod reporter;

pub use progress::{format_progress, format_size};
pub use reporter::TerminalReporter;
