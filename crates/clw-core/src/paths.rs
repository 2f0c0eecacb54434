//! Launcher directory layout.

use std::path::{Path, PathBuf};

/// Overrides the launcher install directory.
pub const HOME_ENV: &str = "CLW_LAUNCHER_HOME";

/// Base name of the cached artifact.
pub const BINARY_NAME: &str = "clw";

/// Returns the launcher install directory.
///
/// `CLW_LAUNCHER_HOME` wins when set; otherwise this is the directory that
/// contains the running launcher executable.
///
/// # Errors
///
/// Fails if the running executable cannot be located.
pub fn launcher_home() -> std::io::Result<PathBuf> {
    if let Some(val) = std::env::var_os(HOME_ENV) {
        return Ok(PathBuf::from(val));
    }
    let exe = std::env::current_exe()?;
    exe.parent().map(Path::to_path_buf).ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} has no parent directory", exe.display()),
        )
    })
}

/// Artifact directory: `<home>/bin`
pub fn bin_path(home: &Path) -> PathBuf {
    home.join("bin")
}

/// `clw`, or `clw.exe` on Windows.
pub fn binary_file_name() -> String {
    format!("{BINARY_NAME}{}", std::env::consts::EXE_SUFFIX)
}

/// Install lock: `<home>/bin/.clw.lock`
pub fn lock_path(home: &Path) -> PathBuf {
    bin_path(home).join(format!(".{BINARY_NAME}.lock"))
}
