//! Reporter trait for dependency injection
//!
//! This trait allows the installer to report progress and status without
//! being coupled to a specific terminal implementation.

/// Receives user-facing messages and download progress from the installer.
pub trait Reporter: Send + Sync {
    /// Log an informational message.
    fn info(&self, msg: &str);

    /// Log a success message.
    fn success(&self, msg: &str);

    /// Log a warning message.
    fn warning(&self, msg: &str);

    /// The cached artifact already reports the wanted version.
    fn up_to_date(&self, msg: &str);

    /// Bytes written so far, after each block. `total` is `None` when the
    /// server sent no content length.
    fn downloading(&self, current: u64, total: Option<u64>);

    /// The download stream ended cleanly after `total` bytes.
    fn download_finished(&self, total: u64);
}

impl<T: Reporter + ?Sized> Reporter for std::sync::Arc<T> {
    fn info(&self, msg: &str) {
        (**self).info(msg);
    }
    fn success(&self, msg: &str) {
        (**self).success(msg);
    }
    fn warning(&self, msg: &str) {
        (**self).warning(msg);
    }
    fn up_to_date(&self, msg: &str) {
        (**self).up_to_date(msg);
    }
    fn downloading(&self, current: u64, total: Option<u64>) {
        (**self).downloading(current, total);
    }
    fn download_finished(&self, total: u64) {
        (**self).download_finished(total);
    }
}

/// A no-op reporter for silent operations (e.g., testing).
#[derive(Debug, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn info(&self, _: &str) {}
    fn success(&self, _: &str) {}
    fn warning(&self, _: &str) {}
    fn up_to_date(&self, _: &str) {}
    fn downloading(&self, _: u64, _: Option<u64>) {}
    fn download_finished(&self, _: u64) {}
}
