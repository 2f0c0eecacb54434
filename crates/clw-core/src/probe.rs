//! Asking an installed artifact which version it is.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{ChildStdout, Command, ExitStatus, Stdio};
use std::sync::mpsc;
use std::time::{Duration, Instant};

use clw_schema::WantedVersion;
use thiserror::Error;
use wait_timeout::ChildExt;

/// Flag passed to the artifact to make it print its version.
pub const VERSION_FLAG: &str = "--version";

/// Why a version probe produced no usable answer.
#[derive(Error, Debug)]
pub enum ProbeError {
    /// The artifact could not be started at all.
    #[error("failed to start {}: {source}", path.display())]
    Spawn {
        /// Artifact that was run.
        path: PathBuf,
        /// Error from the OS.
        #[source]
        source: std::io::Error,
    },

    /// No exit, or no complete output, before the deadline.
    #[error("no answer within {0:?}")]
    Timeout(Duration),

    /// The artifact exited unsuccessfully.
    #[error("exited with {0}")]
    Failed(ExitStatus),

    /// Standard output was not UTF-8.
    #[error("version output is not valid UTF-8")]
    NotUtf8,

    /// Waiting on or reading from the child failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Knows the wanted version and how to read the installed one.
#[derive(Debug, Clone)]
pub struct VersionOracle {
    wanted: WantedVersion,
    timeout: Duration,
}

impl VersionOracle {
    /// An oracle wanting `wanted`, giving each probe `timeout` to answer.
    pub fn new(wanted: WantedVersion, timeout: Duration) -> Self {
        Self { wanted, timeout }
    }

    /// Version the installed artifact must report.
    pub fn wanted(&self) -> &WantedVersion {
        &self.wanted
    }

    /// Run `<path> --version` and return its trimmed standard output.
    ///
    /// Blocks for at most the configured timeout, covering both the exit
    /// and the read of its output. A child that overruns it is killed.
    ///
    /// # Errors
    ///
    /// Returns a [`ProbeError`] if the process cannot start, times out,
    /// exits non-zero or prints something other than UTF-8.
    pub fn installed_version(&self, path: &Path) -> Result<String, ProbeError> {
        let started = Instant::now();
        let mut child = Command::new(path)
            .arg(VERSION_FLAG)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| ProbeError::Spawn {
                path: path.to_path_buf(),
                source,
            })?;

        // Drain concurrently so a chatty child never blocks on a full pipe.
        let output = match child.stdout.take().map(drain).transpose() {
            Ok(output) => output,
            Err(e) => {
                child.kill().ok();
                child.wait().ok();
                return Err(ProbeError::Io(e));
            }
        };

        let Some(status) = child.wait_timeout(self.timeout)? else {
            child.kill().ok();
            child.wait().ok();
            return Err(ProbeError::Timeout(self.timeout));
        };

        if !status.success() {
            return Err(ProbeError::Failed(status));
        }

        // A background process spawned by the artifact may still hold the
        // pipe open; give up on the output when the deadline passes.
        let stdout = match output {
            Some(rx) => {
                let remaining = self.timeout.saturating_sub(started.elapsed());
                match rx.recv_timeout(remaining) {
                    Ok(read) => read?,
                    Err(mpsc::RecvTimeoutError::Timeout) => {
                        return Err(ProbeError::Timeout(self.timeout));
                    }
                    Err(mpsc::RecvTimeoutError::Disconnected) => {
                        return Err(ProbeError::Io(std::io::Error::other(
                            "version output reader exited early",
                        )));
                    }
                }
            }
            None => Vec::new(),
        };

        let text = String::from_utf8(stdout).map_err(|_| ProbeError::NotUtf8)?;
        Ok(text.trim().to_string())
    }

    /// Whether a probe answer satisfies the wanted version.
    pub fn is_current(&self, reported: &str) -> bool {
        self.wanted.matches(reported)
    }
}

/// Read `pipe` to the end on its own thread; the result arrives on the
/// returned channel.
fn drain(mut pipe: ChildStdout) -> std::io::Result<mpsc::Receiver<std::io::Result<Vec<u8>>>> {
    let (tx, rx) = mpsc::channel();
    std::thread::Builder::new()
        .name("clw-probe-stdout".to_string())
        .spawn(move || {
            let mut buf = Vec::new();
            let read = pipe.read_to_end(&mut buf).map(|_| buf);
            // The probe may have given up already.
            tx.send(read).ok();
        })?;
    Ok(rx)
}
