//! Exercises `ReqwestClient` against a throwaway local HTTP server.

use std::time::Duration;

use portal_fetch::{FetchError, FetchOptions, Fetcher, ReqwestClient};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Answer exactly one connection with `response`, after `delay`.
async fn serve_once(response: Vec<u8>, delay: Duration) -> String {
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
        tokio::time::sleep(delay).await;
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

fn fetcher() -> Fetcher<ReqwestClient> {
    Fetcher::new(ReqwestClient::new().expect("client builds"))
}

#[tokio::test]
async fn ok_response_is_returned_in_full() {
    let body = b"PK\x03\x04not-really-a-zip-but-the-fetcher-does-not-care";
    let url = serve_once(http_response("200 OK", "application/zip", body), Duration::ZERO).await;

    let response = fetcher().fetch(&url, &FetchOptions::default()).await.unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.content_type(), Some("application/zip"));
    assert_eq!(response.body.as_ref(), body);
}

#[tokio::test]
async fn not_found_is_rejected() {
    let page = b"<html><body>Not Found</body></html>";
    let url = serve_once(http_response("404 Not Found", "text/html", page), Duration::ZERO).await;

    let err = fetcher().fetch(&url, &FetchOptions::default()).await.unwrap_err();

    assert!(matches!(err, FetchError::Status { status: 404, .. }), "{err:?}");
}

#[tokio::test]
async fn server_error_is_rejected() {
    let url = serve_once(
        http_response("500 Internal Server Error", "text/plain", b"boom"),
        Duration::ZERO,
    )
    .await;

    let err = fetcher().fetch(&url, &FetchOptions::default()).await.unwrap_err();

    assert_eq!(err.status(), Some(500));
}

#[tokio::test]
async fn html_page_with_ok_status_is_rejected() {
    let page = b"<!doctype html><title>Maintenance</title>";
    let url = serve_once(http_response("200 OK", "text/html; charset=utf-8", page), Duration::ZERO).await;

    let err = fetcher().fetch(&url, &FetchOptions::default()).await.unwrap_err();

    assert!(matches!(err, FetchError::UnexpectedContentType { .. }), "{err:?}");
}

#[tokio::test]
async fn slow_server_hits_timeout() {
    let url = serve_once(
        http_response("200 OK", "application/zip", b"PK\x03\x04"),
        Duration::from_secs(10),
    )
    .await;

    let options = FetchOptions::default().timeout(Duration::from_millis(200));
    let err = fetcher().fetch(&url, &options).await.unwrap_err();

    assert!(matches!(err, FetchError::Timeout { timeout: Some(_), .. }), "{err:?}");
}

#[tokio::test]
async fn refused_connection_is_a_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let url = format!("http://{addr}/clientportal.gw.zip");
    let err = fetcher().fetch(&url, &FetchOptions::default()).await.unwrap_err();

    assert!(matches!(err, FetchError::Network { .. }), "{err:?}");
}
