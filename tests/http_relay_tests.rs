//! HTTP relays against a local canned server

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use site_inspector_lib::infrastructure::config::{FetchConfig, RelayConfig, RelayEnvelope};
use site_inspector_lib::infrastructure::fetch_error::{FetchError, RelayError};
use site_inspector_lib::infrastructure::http_client::RelayHttpClient;
use site_inspector_lib::infrastructure::proxy_fetch::{HttpRelay, ProxyFetchChain, RelayStrategy};

const TARGET: &str = "https://example.com/a b";

/// Paths requested so far, in arrival order
type RequestLog = Arc<Mutex<Vec<String>>>;

async fn start_server() -> (SocketAddr, RequestLog) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let log = RequestLog::default();

    let server_log = Arc::clone(&log);
    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            tokio::spawn(respond(socket, Arc::clone(&server_log)));
        }
    });

    (addr, log)
}

async fn respond(mut socket: TcpStream, log: RequestLog) {
    let mut buffer = vec![0_u8; 8192];
    let mut read = 0;
    while read < buffer.len() {
        let n = socket.read(&mut buffer[read..]).await.unwrap_or(0);
        if n == 0 {
            break;
        }
        read += n;
        if buffer[..read].windows(4).any(|window| window == b"\r\n\r\n") {
            break;
        }
    }

    let request = String::from_utf8_lossy(&buffer[..read]).to_string();
    let path = request.split_whitespace().nth(1).unwrap_or("/").to_string();
    log.lock().unwrap().push(path.clone());

    let (status, body) = if path.starts_with("/ok") {
        ("200 OK", r#"{"contents":"<h1>hi</h1>"}"#)
    } else if path.starts_with("/blank") {
        ("200 OK", r#"{"contents":""}"#)
    } else {
        ("503 Service Unavailable", "relay busy")
    };

    let response = format!(
        "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
}

fn relay(name: &str, template: String, envelope: RelayEnvelope) -> Arc<HttpRelay> {
    let client = Arc::new(RelayHttpClient::new(&FetchConfig::default()).unwrap());
    Arc::new(HttpRelay::new(RelayConfig::new(name, &template, envelope), client))
}

fn chain(relays: Vec<Arc<HttpRelay>>) -> ProxyFetchChain {
    ProxyFetchChain::new(
        relays
            .into_iter()
            .map(|relay| relay as Arc<dyn RelayStrategy>)
            .collect(),
        Duration::from_secs(5),
    )
}

#[tokio::test]
async fn falls_back_from_failing_status_to_json_envelope() {
    let (addr, log) = start_server().await;
    let busy = relay("busy", format!("http://{addr}/busy?q={{url}}"), RelayEnvelope::RawText);
    let ok = relay("ok", format!("http://{addr}/ok?q={{url}}"), RelayEnvelope::JsonContents);

    let body = chain(vec![busy, ok]).fetch_html(TARGET).await.unwrap();

    assert_eq!(body, "<h1>hi</h1>");
    assert_eq!(
        *log.lock().unwrap(),
        vec![
            "/busy?q=https%3A%2F%2Fexample.com%2Fa%20b".to_string(),
            "/ok?q=https%3A%2F%2Fexample.com%2Fa%20b".to_string(),
        ]
    );
}

#[tokio::test]
async fn failing_status_alone_exhausts_the_chain() {
    let (addr, _log) = start_server().await;
    let busy = relay("busy", format!("http://{addr}/busy?q={{url}}"), RelayEnvelope::RawText);

    let error = chain(vec![busy]).fetch_html(TARGET).await.unwrap_err();

    assert_eq!(error, FetchError::AllStrategiesExhausted { attempted: 1 });
}

#[tokio::test]
async fn non_success_status_is_reported() {
    let (addr, _log) = start_server().await;
    let busy = relay("busy", format!("http://{addr}/busy?q={{url}}"), RelayEnvelope::RawText);

    let error = busy.attempt(TARGET).await.unwrap_err();

    assert!(matches!(error, RelayError::HttpStatus { status: 503, .. }));
    assert_eq!(error.relay(), "busy");
}

#[tokio::test]
async fn envelope_without_contents_is_malformed() {
    let (addr, _log) = start_server().await;
    let blank = relay("blank", format!("http://{addr}/blank?q={{url}}"), RelayEnvelope::JsonContents);

    let error = blank.attempt(TARGET).await.unwrap_err();

    assert!(matches!(error, RelayError::MalformedEnvelope { .. }));
}

#[tokio::test]
async fn refused_connection_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let closed = relay("closed", format!("http://{addr}/?q={{url}}"), RelayEnvelope::RawText);
    let error = closed.attempt(TARGET).await.unwrap_err();

    assert!(matches!(error, RelayError::Transport { .. }));
}
