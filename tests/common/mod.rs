//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// What the mock answers with.
#[derive(Debug, Clone)]
pub struct MockReply {
    pub status: u16,
    pub body: String,
    pub delay: Duration,
}

impl MockReply {
    pub fn json(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            delay: Duration::ZERO,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// A request captured by the mock.
#[derive(Debug, Clone)]
pub struct Captured {
    pub head: String,
    pub body: String,
}

impl Captured {
    /// Header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<String> {
        self.head.lines().skip(1).find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim()
                .eq_ignore_ascii_case(name)
                .then(|| value.trim().to_string())
        })
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

/// Handle on a running mock backend.
#[derive(Clone)]
pub struct MockBackend {
    pub addr: SocketAddr,
    calls: Arc<AtomicU32>,
    aborted: Arc<AtomicBool>,
    captured: Arc<Mutex<Vec<Captured>>>,
}

impl MockBackend {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    /// True once a client hung up before its delayed reply was sent.
    pub fn saw_abort(&self) -> bool {
        self.aborted.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<Captured> {
        self.captured.lock().unwrap().last().cloned()
    }
}

/// Start a mock backend on an ephemeral port answering every request with `reply`.
pub async fn start_mock_backend(reply: MockReply) -> MockBackend {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let backend = MockBackend {
        addr: listener.local_addr().unwrap(),
        calls: Arc::new(AtomicU32::new(0)),
        aborted: Arc::new(AtomicBool::new(false)),
        captured: Arc::new(Mutex::new(Vec::new())),
    };

    let handle = backend.clone();
    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            let handle = handle.clone();
            let reply = reply.clone();
            tokio::spawn(async move {
                serve_one(socket, handle, reply).await;
            });
        }
    });

    backend
}

async fn serve_one(mut socket: TcpStream, backend: MockBackend, reply: MockReply) {
    let Some(captured) = read_request(&mut socket).await else {
        return;
    };
    backend.calls.fetch_add(1, Ordering::SeqCst);
    backend.captured.lock().unwrap().push(captured);

    if !reply.delay.is_zero() {
        let mut peek = [0u8; 64];
        tokio::select! {
            _ = tokio::time::sleep(reply.delay) => {}
            read = socket.read(&mut peek) => {
                if matches!(read, Ok(0) | Err(_)) {
                    backend.aborted.store(true, Ordering::SeqCst);
                    return;
                }
            }
        }
    }

    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        reply.status,
        reason(reply.status),
        reply.body.len(),
        reply.body
    );
    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
}

async fn read_request(socket: &mut TcpStream) -> Option<Captured> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let head_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
    let length = head
        .lines()
        .find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim()
                .eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())
                .flatten()
        })
        .unwrap_or(0);

    while buf.len() < head_end + length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let body = String::from_utf8_lossy(&buf[head_end..]).to_string();
    Some(Captured { head, body })
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        401 => "Unauthorized",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

/// An address nothing listens on.
pub async fn unused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}
