//! Launcher entry point and exit-code policy.
//!
//! This is the only place that turns failures into user-facing messages and
//! process exit codes. Everything below it returns typed errors.

use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::Arc;

use clw_core::{ConfigError, InstallError, Installer, LauncherConfig, Reporter};
use thiserror::Error;

use crate::handoff;
use crate::ui::TerminalReporter;

/// Install, resolution or handoff failure.
pub const EXIT_FAILURE: i32 = 1;

/// Interrupted by the user before the artifact took over.
pub const EXIT_INTERRUPTED: i32 = 130;

#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("Invalid launcher configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to get clw binary: {0}")]
    Install(#[from] InstallError),

    #[error("Interrupted")]
    Interrupted,

    #[error("Failed to run clw at {}: {source}", path.display())]
    Handoff {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to start runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

impl LaunchError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Interrupted => EXIT_INTERRUPTED,
            _ => EXIT_FAILURE,
        }
    }
}

/// Run the launcher with the user's arguments (program name excluded).
///
/// On unix a successful handoff never returns. Otherwise the result is the
/// artifact's exit code, or the launcher's own code on failure.
pub fn run(args: &[OsString]) -> i32 {
    let reporter = Arc::new(TerminalReporter::new());

    match launch(args, reporter.clone()) {
        Ok(code) => code,
        Err(LaunchError::Interrupted) => {
            reporter.interrupted();
            EXIT_INTERRUPTED
        }
        Err(e) => {
            tracing::debug!(error = ?e, "launch failed");
            reporter.error(&e.to_string());
            e.exit_code()
        }
    }
}

fn launch(args: &[OsString], reporter: Arc<TerminalReporter>) -> Result<i32, LaunchError> {
    let config = LauncherConfig::from_env()?;
    let path = ensure_installed(config, reporter, false)?;

    tracing::debug!(path = %path.display(), args = args.len(), "handing off");
    handoff::handoff(&path, args).map_err(|source| LaunchError::Handoff { path, source })
}

/// Drive [`Installer::ensure`] to completion on a single-threaded runtime,
/// aborting with [`LaunchError::Interrupted`] on Ctrl-C.
///
/// The install lock and runtime are released before this returns.
pub fn ensure_installed(
    config: LauncherConfig,
    reporter: Arc<dyn Reporter>,
    force: bool,
) -> Result<PathBuf, LaunchError> {
    let installer = Installer::new(config, reporter)?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(LaunchError::Runtime)?;

    let outcome = runtime.block_on(async {
        tokio::select! {
            result = installer.ensure(force) => result.map_err(LaunchError::from),
            Ok(()) = tokio::signal::ctrl_c() => Err(LaunchError::Interrupted),
        }
    });

    // A lock wait may still be parked on the blocking pool.
    runtime.shutdown_background();
    outcome
}
