//! End-to-end tests for the install flow against a local HTTP server.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::path::Path;
use std::sync::Arc;

use clw_core::io::download::DownloadError;
use clw_core::{InstallError, Installer, LauncherConfig, NullReporter};
use clw_schema::PlatformKey;
use mockito::Server;
use serial_test::serial;
use tempfile::TempDir;

const WANTED: &str = "0.1.3";
const ASSET_PATH: &str = "/v0.1.3/clw-linux-x86_64-musl";

fn installer(home: &Path, base_url: &str) -> Installer {
    let config = LauncherConfig::new(home)
        .with_release_base_url(base_url)
        .with_wanted_version(WANTED)
        .with_platform(PlatformKey::new("linux", "x86_64"));
    Installer::new(config, Arc::new(NullReporter)).expect("failed to build installer")
}

/// Entries left in the artifact directory, ignoring the lock file.
fn leftovers(installer: &Installer) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(installer.store().bin_dir()) else {
        return Vec::new();
    };
    entries
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name != ".clw.lock")
        .collect()
}

#[tokio::test]
#[serial]
async fn test_unsupported_platform_fails_before_any_io() {
    let mut server = Server::new_async().await;
    let mock = server.mock("GET", mockito::Matcher::Any).expect(0).create_async().await;

    let tmp = TempDir::new().unwrap();
    let config = LauncherConfig::new(tmp.path())
        .with_release_base_url(server.url())
        .with_platform(PlatformKey::new("plan9", "risc-v"));
    let installer = Installer::new(config, Arc::new(NullReporter)).unwrap();

    let err = installer.ensure(false).await.unwrap_err();

    assert!(matches!(err, InstallError::UnsupportedPlatform(ref e) if e.key.os() == "plan9"));
    assert!(!tmp.path().join("bin").exists(), "nothing may be created");
    mock.assert_async().await;
}

#[tokio::test]
#[serial]
async fn test_http_error_leaves_no_file() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", ASSET_PATH)
        .with_status(404)
        .with_body("Not Found")
        .expect(1)
        .create_async()
        .await;

    let tmp = TempDir::new().unwrap();
    let installer = installer(tmp.path(), &server.url());

    let err = installer.ensure(false).await.unwrap_err();

    assert!(matches!(err, InstallError::Download(DownloadError::Http(_))));
    assert!(!installer.store().exists());
    assert!(leftovers(&installer).is_empty(), "left: {:?}", leftovers(&installer));
    mock.assert_async().await;
}

#[tokio::test]
#[serial]
async fn test_truncated_stream_leaves_no_file() {
    // Promise far more bytes than are sent, then hang up.
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let server = std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }
        stream
            .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 100000\r\nConnection: close\r\n\r\n")
            .unwrap();
        stream.write_all(&[0u8; 10_000]).unwrap();
        stream.flush().unwrap();
    });

    let tmp = TempDir::new().unwrap();
    let installer = installer(tmp.path(), &format!("http://{addr}"));

    let err = installer.ensure(false).await.unwrap_err();
    server.join().unwrap();

    assert!(matches!(err, InstallError::Download(_)), "got {err:?}");
    assert!(!installer.store().exists());
    assert!(leftovers(&installer).is_empty(), "left: {:?}", leftovers(&installer));
}

#[test]
fn test_release_url_for_configured_platform() {
    let tmp = TempDir::new().unwrap();
    let installer = installer(tmp.path(), "https://github.com/sshu2017/clw/releases/download");
    assert_eq!(
        installer.release_url().unwrap(),
        "https://github.com/sshu2017/clw/releases/download/v0.1.3/clw-linux-x86_64-musl"
    );
}

#[cfg(unix)]
mod unix {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    fn fake_artifact(version: &str) -> String {
        format!("#!/bin/sh\necho \"clw {version} (abc123)\"\n")
    }

    fn place_artifact(installer: &Installer, script: &str) {
        installer.store().ensure_dir().unwrap();
        let path = installer.store().canonical_path();
        std::fs::write(path, script).unwrap();
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[tokio::test]
    #[serial]
    async fn test_fresh_install_then_fast_path() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", ASSET_PATH)
            .with_status(200)
            .with_body(fake_artifact(WANTED))
            .expect(1)
            .create_async()
            .await;

        let tmp = TempDir::new().unwrap();
        let installer = installer(tmp.path(), &server.url());

        let first = installer.ensure(false).await.unwrap();
        let second = installer.ensure(false).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first, installer.store().canonical_path());
        mock.assert_async().await;

        let mode = std::fs::metadata(&first).unwrap().permissions().mode();
        assert_ne!(mode & 0o100, 0, "owner execute bit must be set");

        let reported = installer.oracle().installed_version(&first).unwrap();
        assert!(reported.contains(WANTED));
        assert!(leftovers(&installer).iter().all(|name| name == "clw"));
    }

    #[tokio::test]
    #[serial]
    async fn test_current_artifact_needs_no_network() {
        let mut server = Server::new_async().await;
        let mock = server.mock("GET", mockito::Matcher::Any).expect(0).create_async().await;

        let tmp = TempDir::new().unwrap();
        let installer = installer(tmp.path(), &server.url());
        place_artifact(&installer, "#!/bin/sh\necho 'clw 0.1.3 (abc123)'\n");

        let path = installer.ensure(false).await.unwrap();

        assert_eq!(path, installer.store().canonical_path());
        mock.assert_async().await;
    }

    #[tokio::test]
    #[serial]
    async fn test_version_mismatch_refetches() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", ASSET_PATH)
            .with_status(200)
            .with_body(fake_artifact(WANTED))
            .expect(1)
            .create_async()
            .await;

        let tmp = TempDir::new().unwrap();
        let installer = installer(tmp.path(), &server.url());
        place_artifact(&installer, &fake_artifact("0.1.2"));

        let path = installer.ensure(false).await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), fake_artifact(WANTED));
        mock.assert_async().await;
    }

    #[tokio::test]
    #[serial]
    async fn test_failing_probe_refetches() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", ASSET_PATH)
            .with_status(200)
            .with_body(fake_artifact(WANTED))
            .expect(1)
            .create_async()
            .await;

        let tmp = TempDir::new().unwrap();
        let installer = installer(tmp.path(), &server.url());
        place_artifact(&installer, "#!/bin/sh\necho 'clw 0.1.3'\nexit 1\n");

        let path = installer.ensure(false).await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), fake_artifact(WANTED));
        mock.assert_async().await;
    }

    #[tokio::test]
    #[serial]
    async fn test_force_replaces_current_artifact() {
        let mut server = Server::new_async().await;
        let fresh = format!("{}# fresh\n", fake_artifact(WANTED));
        let mock = server
            .mock("GET", ASSET_PATH)
            .with_status(200)
            .with_body(fresh.clone())
            .expect(1)
            .create_async()
            .await;

        let tmp = TempDir::new().unwrap();
        let installer = installer(tmp.path(), &server.url());
        place_artifact(&installer, &fake_artifact(WANTED));

        let path = installer.ensure(true).await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), fresh);
        mock.assert_async().await;
    }

    #[tokio::test]
    #[serial]
    async fn test_concurrent_installs_download_once() {
        let mut server = Server::new_async().await;
        let body = fake_artifact(WANTED);
        let mock = server
            .mock("GET", ASSET_PATH)
            .with_status(200)
            .with_chunked_body(move |w| {
                // Hold the install lock long enough for the other side to queue.
                std::thread::sleep(std::time::Duration::from_millis(300));
                w.write_all(body.as_bytes())
            })
            .expect(1)
            .create_async()
            .await;

        let tmp = TempDir::new().unwrap();
        let first = installer(tmp.path(), &server.url());
        let second = installer(tmp.path(), &server.url());

        let (a, b) = tokio::join!(first.ensure(false), second.ensure(false));

        let canonical = first.store().canonical_path();
        assert_eq!(a.unwrap(), canonical);
        assert_eq!(b.unwrap(), canonical);
        assert_eq!(std::fs::read_to_string(canonical).unwrap(), fake_artifact(WANTED));
        mock.assert_async().await;
    }

    #[tokio::test]
    #[serial]
    async fn test_failed_refetch_removes_stale_artifact() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", ASSET_PATH)
            .with_status(500)
            .create_async()
            .await;

        let tmp = TempDir::new().unwrap();
        let installer = installer(tmp.path(), &server.url());
        place_artifact(&installer, &fake_artifact("0.0.9"));

        assert!(installer.ensure(false).await.is_err());
        assert!(!installer.store().exists(), "stale artifact must not survive");
        assert!(leftovers(&installer).is_empty());
    }
}
