//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use glasscoder_pad::lifecycle::Shutdown;
use glasscoder_pad::pad::{PadLog, Receiver, ReceiverError, Severity};
use glasscoder_pad::{Profile, UpdateProcessor};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

/// A request as seen by the mock encoder.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub method: String,
    pub path: String,
    /// Header names lowercased.
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("request body is valid JSON")
    }
}

/// Log sink that keeps every message.
#[derive(Debug, Default)]
pub struct MemoryLog {
    entries: Mutex<Vec<(Severity, String)>>,
}

impl MemoryLog {
    pub fn entries(&self) -> Vec<(Severity, String)> {
        self.entries.lock().unwrap().clone()
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|(s, _)| *s == severity)
            .count()
    }
}

impl PadLog for MemoryLog {
    fn log(&self, severity: Severity, message: &str) {
        self.entries
            .lock()
            .unwrap()
            .push((severity, message.to_string()));
    }
}

/// Start a mock encoder that answers every request with `status`.
///
/// Each request is reported on the returned channel before it is answered.
pub async fn start_mock_encoder(status: u16) -> (SocketAddr, mpsc::UnboundedReceiver<CapturedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let tx = tx.clone();
                    tokio::spawn(async move {
                        if let Some(request) = read_request(&mut socket).await {
                            let _ = tx.send(request);
                        }
                        let status_text = match status {
                            200 => "200 OK",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            _ => "200 OK",
                        };
                        let response = format!(
                            "HTTP/1.1 {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                            status_text
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, rx)
}

async fn read_request(socket: &mut TcpStream) -> Option<CapturedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];

    let header_end = loop {
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos;
        }
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
        .collect();

    let content_length = headers
        .iter()
        .find(|(k, _)| k == "content-length")
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);

    let mut body = buf[header_end + 4..].to_vec();
    while body.len() < content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }

    Some(CapturedRequest {
        method,
        path,
        headers,
        body: String::from_utf8_lossy(&body).to_string(),
    })
}

/// Start a PAD source that sends `documents` to the first client, then closes.
pub async fn start_pad_source(documents: Vec<String>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        if let Ok((mut socket, _)) = listener.accept().await {
            for document in documents {
                let _ = socket.write_all(document.as_bytes()).await;
                let _ = socket.write_all(b"\r\n\r\n").await;
            }
            let _ = socket.shutdown().await;
        }
    });

    addr
}

/// A PAD document for log machine 1 with the given now-playing title.
pub fn pad_document(title: &str) -> String {
    serde_json::json!({
        "padUpdate": {
            "dateTime": "2019-06-05T14:03:22-0400",
            "hostName": "air.example.com",
            "shortHostName": "air",
            "machine": 1,
            "onairFlag": true,
            "mode": "Automatic",
            "service": { "name": "WXYZ" },
            "log": { "name": "WXYZ_0605" },
            "now": {
                "cartNumber": 10123,
                "title": title,
                "artist": "Artist Name",
                "album": "Album Name"
            },
            "next": null
        }
    })
    .to_string()
}

/// Run a receiver against a scripted PAD source until the source hangs up.
pub async fn run_relay(config: &str, documents: Vec<String>) -> Arc<MemoryLog> {
    let profile = Profile::parse(config).unwrap();
    let pad_addr = start_pad_source(documents).await;
    let log = Arc::new(MemoryLog::default());

    let receiver = Receiver::new(profile).with_log(log.clone());
    let processor = UpdateProcessor::with_client(
        reqwest::Client::builder().no_proxy().build().unwrap(),
    );
    let shutdown = Shutdown::new();

    let result = receiver
        .start("127.0.0.1", pad_addr.port(), &processor, shutdown.subscribe())
        .await;
    assert!(
        matches!(result, Err(ReceiverError::Disconnected { .. })),
        "receiver should run until the source hangs up, got {:?}",
        result
    );

    log
}

/// An address with nothing listening on it.
pub fn closed_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}
