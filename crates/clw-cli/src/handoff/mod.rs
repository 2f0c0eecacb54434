//! Hand process control to the installed artifact.
//!
//! Both backends share one contract: run `path` with `args`, and yield the
//! exit code the launcher should report. Unix replaces the launcher's
//! process image, so a successful call never returns there. Targets without
//! `exec` run the artifact as a child and pass its exit code through.

#[cfg(unix)]
mod exec;
pub mod spawn;

#[cfg(unix)]
pub use exec::handoff;
#[cfg(not(unix))]
pub use spawn::handoff;
