//! Child-process handoff for targets that cannot replace the process image.

use std::ffi::OsString;
use std::path::Path;
use std::process::{Command, ExitStatus};

use crate::launch::EXIT_FAILURE;

/// Run `path` as a child with inherited stdio, wait for it, and return its
/// exit code.
pub fn handoff(path: &Path, args: &[OsString]) -> std::io::Result<i32> {
    let status = Command::new(path).args(args).status()?;
    tracing::debug!(%status, "artifact exited");
    Ok(exit_code(status))
}

/// Exit code to report for a finished child. A unix child killed by a
/// signal maps to `128 + signal`, the shell convention.
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    EXIT_FAILURE
}
