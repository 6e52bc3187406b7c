use std::io::{Cursor, Write};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use bytes::Bytes;
use portal_fetch::{HttpClient, RawResponse};
use portal_provision::{ErrorKind, ProvisionConfig, Provisioner};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use url::Url;
use zip::write::SimpleFileOptions;

const URL: &str = "https://download2.interactivebrokers.com/portal/clientportal.gw.zip";

/// Serves the same canned response to every request.
struct StaticClient {
    status:       u16,
    content_type: &'static str,
    body:         Bytes,
    delay:        Duration,
    requests:     AtomicUsize,
}

impl StaticClient {
    fn new(status: u16, content_type: &'static str, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            content_type,
            body: body.into(),
            delay: Duration::ZERO,
            requests: AtomicUsize::new(0),
        }
    }

    /// Sleep before answering, so concurrent runs interleave.
    fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn zip(entries: &[(&str, &str)]) -> Self {
        Self::new(200, "application/zip", build_zip(entries))
    }
}

impl HttpClient for StaticClient {
    async fn get(&self, url: &Url, _timeout: Option<Duration>) -> portal_fetch::Result<RawResponse> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(RawResponse::new(url.as_str(), self.status, self.body.clone())
            .with_header("content-type", self.content_type))
    }
}

fn build_zip(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in entries {
        writer.start_file(*name, SimpleFileOptions::default()).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Every file below `root`, as sorted relative paths.
fn files_under(root: &Path) -> Vec<String> {
    fn walk(root: &Path, dir: &Path, out: &mut Vec<String>) {
        for entry in std::fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                walk(root, &path, out);
            } else {
                let rel = path.strip_prefix(root).unwrap();
                out.push(rel.to_string_lossy().replace('\\', "/"));
            }
        }
    }

    let mut out = Vec::new();
    if root.exists() {
        walk(root, root, &mut out);
    }
    out.sort();
    out
}

fn config_in(dir: &Path) -> ProvisionConfig {
    ProvisionConfig::default()
        .source_url(URL)
        .destination_dir(dir.join("clientportal.gw"))
}

#[tokio::test]
async fn provisions_two_file_archive() {
    let dir = tempfile::tempdir().unwrap();
    let client = StaticClient::zip(&[("a.txt", "hello"), ("sub/b.txt", "world")]);
    let provisioner = Provisioner::new(config_in(dir.path()), client);

    let report = provisioner.download_and_extract().await.unwrap();

    assert!(report.created);
    assert_eq!(report.status, 200);
    assert_eq!(report.extracted.files, 2);
    assert_eq!(files_under(provisioner.destination()), ["a.txt", "sub/b.txt"]);
    assert_eq!(
        std::fs::read_to_string(provisioner.destination().join("sub/b.txt")).unwrap(),
        "world"
    );
}

#[tokio::test]
async fn second_run_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let client = StaticClient::zip(&[("a.txt", "hello")]);
    let provisioner = Provisioner::new(config_in(dir.path()), client);

    let first = provisioner.download_and_extract().await.unwrap();
    let second = provisioner.download_and_extract().await.unwrap();

    assert!(first.created);
    assert!(!second.created);
    assert!(provisioner.exists());
    assert_eq!(files_under(provisioner.destination()), ["a.txt"]);
}

#[tokio::test]
async fn ensure_directory_twice_never_fails() {
    let dir = tempfile::tempdir().unwrap();
    let provisioner = Provisioner::new(config_in(dir.path()), StaticClient::zip(&[]));

    assert!(!provisioner.exists());
    assert!(provisioner.ensure_directory().unwrap());
    assert!(!provisioner.ensure_directory().unwrap());
    assert!(provisioner.exists());
}

#[tokio::test]
async fn error_statuses_stop_before_extraction() {
    for status in [404, 500] {
        let dir = tempfile::tempdir().unwrap();
        let client = StaticClient::new(status, "text/html", "<html>nope</html>");
        let provisioner = Provisioner::new(config_in(dir.path()), client);

        let err = provisioner.download_and_extract().await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Fetch, "{err}");
        assert!(files_under(provisioner.destination()).is_empty());
    }
}

#[tokio::test]
async fn html_body_without_content_type_is_corrupt() {
    let dir = tempfile::tempdir().unwrap();
    let client = StaticClient::new(200, "application/octet-stream", "<!DOCTYPE html><html></html>");
    let provisioner = Provisioner::new(config_in(dir.path()), client);

    let err = provisioner.download_and_extract().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::CorruptArchive, "{err}");
    assert!(files_under(provisioner.destination()).is_empty());
}

#[tokio::test]
async fn traversal_archive_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let client = StaticClient::zip(&[("ok.txt", "fine"), ("../../evil.txt", "pwned")]);
    let provisioner = Provisioner::new(config_in(dir.path()), client);

    let err = provisioner.download_and_extract().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::UnsafeArchiveEntry, "{err}");
    assert!(files_under(provisioner.destination()).is_empty());
    assert!(!dir.path().join("evil.txt").exists());
    assert!(!dir.path().parent().unwrap().join("evil.txt").exists());
}

#[tokio::test]
async fn file_in_the_way_is_a_directory_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    std::fs::write(config.destination(), "occupied").unwrap();
    let provisioner = Provisioner::new(config, StaticClient::zip(&[("a.txt", "hello")]));

    let err = provisioner.download_and_extract().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::DirectoryCreation, "{err}");
    assert_eq!(provisioner.client().requests.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn lock_file_sits_beside_destination() {
    let dir = tempfile::tempdir().unwrap();
    let provisioner = Provisioner::new(config_in(dir.path()), StaticClient::zip(&[("a.txt", "hello")]));

    provisioner.download_and_extract().await.unwrap();

    assert!(dir.path().join("clientportal.gw.lock").is_file());
    assert_eq!(files_under(provisioner.destination()), ["a.txt"]);
}

#[tokio::test]
async fn concurrent_runs_on_one_destination_are_serialized() {
    let dir = tempfile::tempdir().unwrap();
    let entries = [("a.txt", "hello"), ("sub/b.txt", "world")];
    let first = Provisioner::new(
        config_in(dir.path()),
        StaticClient::zip(&entries).delayed(Duration::from_millis(50)),
    );
    let second = Provisioner::new(
        config_in(dir.path()),
        StaticClient::zip(&entries).delayed(Duration::from_millis(50)),
    );

    let (a, b) = tokio::time::timeout(Duration::from_secs(10), async {
        tokio::join!(first.download_and_extract(), second.download_and_extract())
    })
    .await
    .expect("concurrent runs on one destination never finished");
    let (a, b) = (a.unwrap(), b.unwrap());

    // Whoever ran second found the directory already made by the first.
    assert!(a.created ^ b.created, "created: {} / {}", a.created, b.created);
    assert_eq!(files_under(first.destination()), ["a.txt", "sub/b.txt"]);
    assert_eq!(first.client().requests.load(Ordering::SeqCst), 1);
    assert_eq!(second.client().requests.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn concurrent_runs_on_separate_destinations_both_finish() {
    let dir = tempfile::tempdir().unwrap();
    let first = Provisioner::new(
        config_in(dir.path().join("one").as_path()),
        StaticClient::zip(&[("a.txt", "one")]).delayed(Duration::from_millis(20)),
    );
    let second = Provisioner::new(
        config_in(dir.path().join("two").as_path()),
        StaticClient::zip(&[("a.txt", "two")]).delayed(Duration::from_millis(20)),
    );

    let (a, b) = tokio::join!(first.download_and_extract(), second.download_and_extract());

    assert!(a.unwrap().created);
    assert!(b.unwrap().created);
    assert_eq!(std::fs::read_to_string(second.destination().join("a.txt")).unwrap(), "two");
}

#[tokio::test]
async fn lock_can_be_disabled() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path()).lock(false);
    let provisioner = Provisioner::new(config, StaticClient::zip(&[("a.txt", "hello")]));

    provisioner.download_and_extract().await.unwrap();

    assert!(!dir.path().join("clientportal.gw.lock").exists());
}

/// Answer exactly one connection with `response`.
async fn serve_once(response: Vec<u8>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                return;
            }
            request.extend_from_slice(&buf[..n]);
        }
        let _ = socket.write_all(&response).await;
        let _ = socket.shutdown().await;
    });

    format!("http://{addr}/portal/clientportal.gw.zip")
}

fn http_response(status: &str, content_type: &str, body: &[u8]) -> Vec<u8> {
    let mut out = format!(
        "HTTP/1.1 {status}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        body.len()
    )
    .into_bytes();
    out.extend_from_slice(body);
    out
}

#[tokio::test]
async fn end_to_end_against_local_server() {
    let archive = build_zip(&[("a.txt", "hello"), ("sub/b.txt", "world")]);
    let url = serve_once(http_response("200 OK", "application/zip", &archive)).await;

    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path())
        .source_url(url)
        .http_timeout(Some(Duration::from_secs(10)));
    let provisioner = Provisioner::with_default_client(config).unwrap();

    let report = provisioner.download_and_extract().await.unwrap();

    assert_eq!(report.downloaded_bytes, archive.len() as u64);
    assert_eq!(files_under(provisioner.destination()), ["a.txt", "sub/b.txt"]);
    assert_eq!(std::fs::read_to_string(provisioner.destination().join("a.txt")).unwrap(), "hello");
}

#[tokio::test]
async fn end_to_end_not_found() {
    let url = serve_once(http_response("404 Not Found", "text/html", b"<h1>404</h1>")).await;

    let dir = tempfile::tempdir().unwrap();
    let provisioner = Provisioner::with_default_client(config_in(dir.path()).source_url(url)).unwrap();

    let err = provisioner.download_and_extract().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Fetch, "{err}");
    assert!(files_under(provisioner.destination()).is_empty());
}
