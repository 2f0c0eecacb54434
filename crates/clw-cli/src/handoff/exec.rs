use std::ffi::OsString;
use std::os::unix::process::CommandExt;
use std::path::Path;
use std::process::Command;

/// Replace this process with `path`. Stdio, environment and working
/// directory are inherited unchanged.
///
/// Returns only if `exec` failed.
pub fn handoff(path: &Path, args: &[OsString]) -> std::io::Result<i32> {
    Err(Command::new(path).args(args).exec())
}
