//! clw-install - install the clw binary for this platform without running it

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use clw_cli::{EXIT_FAILURE, LaunchError, TerminalReporter, ensure_installed};
use clw_core::LauncherConfig;

#[derive(Debug, Parser)]
#[command(name = "clw-install")]
#[command(version, about = "Download and install the clw binary for this platform")]
struct Cli {
    /// Re-download even if the installed binary is current
    #[arg(long)]
    force: bool,

    /// Only print errors and the installed path
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    clw_cli::init_tracing();
    let cli = Cli::parse();

    let reporter = Arc::new(
        TerminalReporter::new()
            .quiet(cli.quiet)
            .announce_up_to_date(true),
    );

    match install(&cli, reporter.clone()) {
        Ok(path) => {
            println!("{}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            let launch_error = e.downcast_ref::<LaunchError>();
            match launch_error {
                Some(LaunchError::Interrupted) => reporter.interrupted(),
                // Already carries its cause in the message.
                Some(le) => reporter.error(&le.to_string()),
                None => reporter.error(&format!("{e:#}")),
            }
            let code = launch_error.map_or(EXIT_FAILURE, LaunchError::exit_code);
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}

fn install(cli: &Cli, reporter: Arc<TerminalReporter>) -> Result<PathBuf> {
    let config = LauncherConfig::from_env().context("Invalid launcher configuration")?;
    tracing::debug!(?config, force = cli.force, "installing");
    Ok(ensure_installed(config, reporter, cli.force)?)
}
