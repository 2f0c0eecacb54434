//! Streaming artifact download with progress reporting.
//!
//! The response body is copied to disk in fixed-size blocks so memory stays
//! bounded no matter how large the artifact is. The downloader never deletes
//! what it wrote: cleanup of a failed download belongs to the installer.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use futures::TryStreamExt;
use reqwest::Client;
use thiserror::Error;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio_util::io::StreamReader;

use crate::Reporter;
use crate::config::CONNECT_TIMEOUT;

/// Size of each block read from the network and written to disk.
pub const BLOCK_SIZE: usize = 8 * 1024;

/// A failed artifact download.
#[derive(Error, Debug)]
pub enum DownloadError {
    /// Transport failure or non-success status.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Reading the body or writing the file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Build the HTTP client used for release downloads.
///
/// # Errors
///
/// Fails if the TLS backend cannot be initialised.
pub fn build_client(timeout: Option<Duration>) -> Result<Client, DownloadError> {
    let mut builder = Client::builder()
        .user_agent(crate::USER_AGENT)
        .connect_timeout(CONNECT_TIMEOUT);
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    Ok(builder.build()?)
}

/// Fetches a URL into a file, one block at a time.
#[derive(Clone)]
pub struct Downloader {
    client: Client,
    reporter: Arc<dyn Reporter>,
}

impl std::fmt::Debug for Downloader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Downloader").finish_non_exhaustive()
    }
}

impl Downloader {
    /// Download with `client`, reporting progress to `reporter`.
    pub fn new(client: Client, reporter: Arc<dyn Reporter>) -> Self {
        Self { client, reporter }
    }

    /// GET `url` and write the body to `dest`, truncating it first.
    ///
    /// Returns the number of bytes written. The file handle is flushed and
    /// closed before this returns, on success and on failure alike.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError`] for transport failures, non-2xx statuses,
    /// truncated bodies and write errors. `dest` may then hold a partial file.
    pub async fn fetch(&self, url: &str, dest: &Path) -> Result<u64, DownloadError> {
        let response = self.client.get(url).send().await?.error_for_status()?;

        let total = response.content_length().filter(|&len| len > 0);
        tracing::debug!(url, ?total, dest = %dest.display(), "download started");
        self.reporter.downloading(0, total);

        let body = response.bytes_stream().map_err(std::io::Error::other);
        let mut reader = StreamReader::new(body);

        let mut file = File::create(dest).await?;
        let copied = copy_blocks(&mut reader, &mut file, total, self.reporter.as_ref()).await;
        // Waits for any in-flight write, so the handle is idle when dropped.
        let flushed = file.flush().await;
        drop(file);

        let written = copied?;
        flushed?;

        tracing::debug!(url, written, "download finished");
        self.reporter.download_finished(written);
        Ok(written)
    }
}

async fn copy_blocks<R, W>(
    reader: &mut R,
    writer: &mut W,
    total: Option<u64>,
    reporter: &dyn Reporter,
) -> std::io::Result<u64>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut block = vec![0u8; BLOCK_SIZE];
    let mut written: u64 = 0;

    loop {
        let n = reader.read(&mut block).await?;
        if n == 0 {
            break;
        }
        writer.write_all(&block[..n]).await?;
        written += n as u64;
        reporter.downloading(written, total);
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::TempDir;

    #[derive(Default)]
    struct RecordingReporter {
        progress: Mutex<Vec<(u64, Option<u64>)>>,
        finished: Mutex<Option<u64>>,
    }

    impl Reporter for RecordingReporter {
        fn info(&self, _: &str) {}
        fn success(&self, _: &str) {}
        fn warning(&self, _: &str) {}
        fn up_to_date(&self, _: &str) {}
        fn downloading(&self, current: u64, total: Option<u64>) {
            self.progress.lock().unwrap().push((current, total));
        }
        fn download_finished(&self, total: u64) {
            *self.finished.lock().unwrap() = Some(total);
        }
    }

    fn downloader(reporter: Arc<RecordingReporter>) -> Downloader {
        Downloader::new(build_client(None).unwrap(), reporter)
    }

    #[tokio::test]
    async fn test_fetch_writes_body_and_reports_percentage() {
        let mut server = Server::new_async().await;
        let body = vec![7u8; BLOCK_SIZE * 3 + 100];
        let _m = server
            .mock("GET", "/v0.1.3/clw-linux-x86_64-musl")
            .with_status(200)
            .with_body(body.clone())
            .create_async()
            .await;

        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("clw.partial");
        let reporter = Arc::new(RecordingReporter::default());

        let url = format!("{}/v0.1.3/clw-linux-x86_64-musl", server.url());
        let written = downloader(reporter.clone()).fetch(&url, &dest).await.unwrap();

        assert_eq!(written, body.len() as u64);
        assert_eq!(std::fs::read(&dest).unwrap(), body);

        let progress = reporter.progress.lock().unwrap();
        assert_eq!(progress.first(), Some(&(0, Some(body.len() as u64))));
        assert_eq!(progress.last(), Some(&(body.len() as u64, Some(body.len() as u64))));
        assert!(progress.len() >= 5, "expected one event per block");
        assert!(progress.windows(2).all(|w| w[0].0 <= w[1].0));
        assert_eq!(*reporter.finished.lock().unwrap(), Some(body.len() as u64));
    }

    #[tokio::test]
    async fn test_fetch_without_content_length() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/asset")
            .with_status(200)
            .with_chunked_body(|w| w.write_all(b"chunked artifact body"))
            .create_async()
            .await;

        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("clw.partial");
        let reporter = Arc::new(RecordingReporter::default());

        let url = format!("{}/asset", server.url());
        let written = downloader(reporter.clone()).fetch(&url, &dest).await.unwrap();

        assert_eq!(written, 21);
        assert_eq!(std::fs::read(&dest).unwrap(), b"chunked artifact body");
        let progress = reporter.progress.lock().unwrap();
        assert!(progress.iter().all(|(_, total)| total.is_none()));
    }

    #[tokio::test]
    async fn test_fetch_rejects_error_status() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/missing")
            .with_status(404)
            .with_body("Not Found")
            .create_async()
            .await;

        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("clw.partial");
        let reporter = Arc::new(RecordingReporter::default());

        let url = format!("{}/missing", server.url());
        let err = downloader(reporter.clone()).fetch(&url, &dest).await.unwrap_err();

        assert!(matches!(err, DownloadError::Http(ref e) if e.status().map(|s| s.as_u16()) == Some(404)));
        assert!(!dest.exists(), "no file is created before the status is checked");
        assert!(reporter.finished.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_copy_blocks_bounds_each_read() {
        let data = vec![1u8; BLOCK_SIZE * 2 + 1];
        let mut reader = std::io::Cursor::new(data.clone());
        let mut out = Vec::new();
        let reporter = RecordingReporter::default();

        let written = copy_blocks(&mut reader, &mut out, None, &reporter).await.unwrap();

        assert_eq!(written, data.len() as u64);
        assert_eq!(out, data);
        let progress = reporter.progress.lock().unwrap();
        assert_eq!(progress.len(), 3);
        assert_eq!(progress[0].0, BLOCK_SIZE as u64);
    }
}
