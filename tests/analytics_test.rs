use gather_rs::analytics::{AnalyticsClient, AnalyticsHandle, AnalyticsSettings};
use serde_json::json;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use url::Url;

fn settings() -> AnalyticsSettings {
    AnalyticsSettings {
        key: "phc_test".to_string(),
        // Port 9 (discard) on loopback: nothing listens, so sends fail fast.
        host: Url::parse("http://127.0.0.1:9").unwrap(),
    }
}

#[test]
fn handle_reuses_one_client() {
    let handle = AnalyticsHandle::new(settings());
    assert!(!handle.is_active());

    let a = handle.client();
    let b = handle.client();
    assert!(Arc::ptr_eq(&a, &b));
    assert!(handle.is_active());
}

#[test]
fn concurrent_first_access_creates_one_client() {
    let handle = Arc::new(AnalyticsHandle::new(settings()));
    let clients: Vec<_> = (0..8)
        .map(|_| {
            let handle = handle.clone();
            std::thread::spawn(move || handle.client())
        })
        .map(|t| t.join().unwrap())
        .collect();
    assert!(clients.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
}

#[tokio::test]
async fn shutdown_clears_and_next_access_recreates() {
    let handle = AnalyticsHandle::new(settings());
    let first = handle.client();

    handle.shutdown().await.unwrap();
    assert!(!handle.is_active());

    let second = handle.client();
    assert!(!Arc::ptr_eq(&first, &second));
}

#[tokio::test]
async fn shutdown_without_client_is_noop() {
    let handle = AnalyticsHandle::new(settings());
    handle.shutdown().await.unwrap();
    assert!(!handle.is_active());
}

#[tokio::test]
async fn empty_flush_sends_nothing() {
    let client = AnalyticsClient::new(settings());
    assert_eq!(client.flush().await.unwrap(), 0);
}

#[tokio::test]
async fn failed_flush_keeps_captures() {
    let client = AnalyticsClient::new(settings());
    client.capture("event_created", "a@example.com", json!({"n": 1}));
    client.capture("event_viewed", "b@example.com", json!({}));
    assert_eq!(client.pending(), 2);

    assert!(client.flush().await.is_err());
    assert_eq!(client.pending(), 2);
}

/// Accept one HTTP request, answer 200, and return its request line and JSON body.
async fn accept_one(listener: TcpListener) -> (String, serde_json::Value) {
    let (mut sock, _) = listener.accept().await.unwrap();
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let (head_len, body_len) = loop {
        let n = sock.read(&mut chunk).await.unwrap();
        assert!(n > 0, "connection closed before headers");
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..pos]).to_string();
            let len = head
                .lines()
                .filter_map(|l| l.split_once(':'))
                .find(|(k, _)| k.trim().eq_ignore_ascii_case("content-length"))
                .map(|(_, v)| v.trim().parse::<usize>().unwrap())
                .unwrap_or(0);
            break (pos + 4, len);
        }
    };
    while buf.len() < head_len + body_len {
        let n = sock.read(&mut chunk).await.unwrap();
        assert!(n > 0, "connection closed before body");
        buf.extend_from_slice(&chunk[..n]);
    }

    sock.write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 0\r\nconnection: close\r\n\r\n")
        .await
        .unwrap();
    sock.shutdown().await.ok();

    let head = String::from_utf8_lossy(&buf[..head_len]).to_string();
    let request_line = head.lines().next().unwrap_or_default().to_string();
    let body = serde_json::from_slice(&buf[head_len..head_len + body_len]).unwrap();
    (request_line, body)
}

#[tokio::test]
async fn flush_posts_one_batch_to_host_path() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let server = tokio::spawn(accept_one(listener));

    let client = AnalyticsClient::new(AnalyticsSettings {
        key: "phc_test".to_string(),
        host: Url::parse(&format!("http://127.0.0.1:{port}/ingest")).unwrap(),
    });
    client.capture("event_created", "a@example.com", json!({"n": 1}));
    client.capture("event_viewed", "b@example.com", json!({}));

    assert_eq!(client.flush().await.unwrap(), 2);
    assert_eq!(client.pending(), 0);

    let (request_line, body) = server.await.unwrap();
    assert_eq!(request_line, "POST /ingest/batch/ HTTP/1.1");
    assert_eq!(body["api_key"], "phc_test");

    let batch = body["batch"].as_array().unwrap();
    assert_eq!(batch.len(), 2);
    assert_eq!(batch[0]["event"], "event_created");
    assert_eq!(batch[0]["distinct_id"], "a@example.com");
    assert_eq!(batch[0]["properties"], json!({"n": 1}));
    assert!(batch[0]["timestamp"].is_string());
    assert_eq!(batch[1]["event"], "event_viewed");
    assert_eq!(batch[1]["distinct_id"], "b@example.com");
}

#[tokio::test]
async fn client_held_across_shutdown_is_closed() {
    let handle = AnalyticsHandle::new(settings());
    let stale = handle.client();

    handle.shutdown().await.unwrap();
    assert!(stale.is_closed());

    stale.capture("late", "a@example.com", json!({}));
    assert_eq!(stale.pending(), 0);

    let fresh = handle.client();
    assert!(!fresh.is_closed());
    fresh.capture("late", "a@example.com", json!({}));
    assert_eq!(fresh.pending(), 1);
}
