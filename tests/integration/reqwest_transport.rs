//! End-to-end tests of ReqwestTransport against a local HTTP listener

use asana_poller::fetcher::{
    ApiHttpClient, HttpRequest, HttpTransport, ReqwestTransport, RetryErrorType,
};
use asana_poller::{ShutdownCoordinator, Workspace};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use url::Url;

fn http_response(status: &str, extra_headers: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n{extra_headers}\r\n{body}",
        body.len()
    )
}

/// Serve `responses` one per connection, recording each raw request head
async fn serve(responses: Vec<String>) -> (SocketAddr, Arc<Mutex<Vec<String>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));

    tokio::spawn({
        let seen = seen.clone();
        async move {
            for response in responses {
                let (mut socket, _) = listener.accept().await.unwrap();
                let mut buf = vec![0u8; 16 * 1024];
                let mut read = 0;
                loop {
                    let n = socket.read(&mut buf[read..]).await.unwrap();
                    read += n;
                    if n == 0 || buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                        break;
                    }
                }
                seen.lock()
                    .unwrap()
                    .push(String::from_utf8_lossy(&buf[..read]).into_owned());
                socket.write_all(response.as_bytes()).await.unwrap();
                let _ = socket.shutdown().await;
            }
        }
    });

    (addr, seen)
}

#[tokio::test]
async fn test_transport_reads_status_retry_after_and_body() {
    let (addr, seen) = serve(vec![http_response(
        "429 Too Many Requests",
        "Retry-After: 7\r\n",
        r#"{"errors":[]}"#,
    )])
    .await;

    let transport = ReqwestTransport::new(Duration::from_secs(5)).unwrap();
    let request = HttpRequest {
        url: Url::parse(&format!("http://{addr}/api/1.0/workspaces?limit=100")).unwrap(),
        headers: vec![("Authorization", "Bearer test-token".to_string())],
    };

    let response = transport.execute(&request).await.unwrap();

    assert_eq!(response.status.as_u16(), 429);
    assert_eq!(response.retry_after.as_deref(), Some("7"));
    assert_eq!(response.body, br#"{"errors":[]}"#.to_vec());

    let head = seen.lock().unwrap()[0].to_lowercase();
    assert!(head.starts_with("get /api/1.0/workspaces?limit=100 http/1.1"));
    assert!(head.contains("authorization: bearer test-token"));
}

#[tokio::test]
async fn test_client_waits_for_retry_after_then_succeeds() {
    let (addr, seen) = serve(vec![
        http_response("429 Too Many Requests", "Retry-After: 1\r\n", "{}"),
        http_response(
            "200 OK",
            "",
            r#"{"data":[{"gid":"w1","name":"Acme"}],"next_page":null}"#,
        ),
    ])
    .await;

    let transport = ReqwestTransport::new(Duration::from_secs(5)).unwrap();
    let http_client = ApiHttpClient::new(
        Arc::new(transport),
        &format!("http://{addr}/api/1.0"),
        "test-token",
    )
    .unwrap();
    let shutdown = ShutdownCoordinator::new();
    let url = http_client.endpoint_url("/workspaces", &[("limit", "100")]).unwrap();
    let start = Instant::now();

    let page: asana_poller::fetcher::Page<Workspace> =
        http_client.get(&url, &shutdown).await.unwrap();

    assert!(start.elapsed() >= Duration::from_millis(900));
    assert_eq!(page.data[0].name, "Acme");
    assert!(page.next_cursor().is_none());

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    let first_line = |head: &String| head.lines().next().unwrap_or_default().to_string();
    assert_eq!(first_line(&seen[0]), first_line(&seen[1]));
}

#[tokio::test]
async fn test_connection_refused_is_classified() {
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();

    let transport = ReqwestTransport::new(Duration::from_secs(5)).unwrap();
    let request = HttpRequest {
        url: Url::parse(&format!("http://{addr}/api/1.0/workspaces")).unwrap(),
        headers: Vec::new(),
    };

    let err = transport.execute(&request).await.unwrap_err();
    assert_eq!(err.kind, RetryErrorType::NetworkOffline);
}
