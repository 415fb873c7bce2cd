#![allow(dead_code)]

use async_trait::async_trait;
use email_report::{MailError, MailTransport};
use lettre::Message;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Address nothing listens on; connecting fails immediately.
pub const UNREACHABLE: &str = "http://127.0.0.1:1";

static TRACING: Once = Once::new();

pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init();
    });
}

/// One canned HTTP answer.
#[derive(Debug, Clone)]
pub struct Route {
    pub status: u16,
    pub body: String,
    pub content_type: &'static str,
    pub delay: Duration,
}

impl Route {
    pub fn rss(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
            content_type: "application/rss+xml",
            delay: Duration::ZERO,
        }
    }

    pub fn json(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
            content_type: "application/json",
            delay: Duration::ZERO,
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: String::new(),
            content_type: "text/plain",
            delay: Duration::ZERO,
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// A request as the server saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub target: String,
    /// Raw request head, header names lower-cased.
    pub head: String,
    pub body: String,
}

#[derive(Default)]
struct ServerState {
    routes: HashMap<String, Vec<Route>>,
    hits: HashMap<String, usize>,
    requests: Vec<RecordedRequest>,
}

/// Minimal HTTP/1.1 server on a random local port. Each path answers with
/// its routes in order and then keeps repeating the last one; unknown paths
/// get a 404.
pub struct TestServer {
    addr: SocketAddr,
    state: Arc<Mutex<ServerState>>,
}

impl TestServer {
    pub async fn start(routes: Vec<(&str, Vec<Route>)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind test server");
        let addr = listener.local_addr().expect("local addr");
        let state = Arc::new(Mutex::new(ServerState {
            routes: routes.into_iter().map(|(path, seq)| (path.to_string(), seq)).collect(),
            ..Default::default()
        }));

        let accept_state = state.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let state = accept_state.clone();
                tokio::spawn(async move {
                    let _ = handle_connection(stream, state).await;
                });
            }
        });

        Self { addr, state }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }

    pub fn hits(&self, path: &str) -> usize {
        self.state.lock().unwrap().hits.get(path).copied().unwrap_or(0)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }
}

fn find_header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n").map(|pos| pos + 4)
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        _ => "Status",
    }
}

async fn handle_connection(mut stream: TcpStream, state: Arc<Mutex<ServerState>>) -> std::io::Result<()> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(end) = find_header_end(&buf) {
            break end;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_lowercase();
    let content_length = head
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|value| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let original_head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let target = original_head.split_whitespace().nth(1).unwrap_or("/").to_string();
    let path = target.split('?').next().unwrap_or("/").to_string();
    let body = String::from_utf8_lossy(&buf[header_end..]).to_string();

    let route = {
        let mut state = state.lock().unwrap();
        let hit = state.hits.entry(path.clone()).or_insert(0);
        let index = *hit;
        *hit += 1;
        state.requests.push(RecordedRequest { target, head, body });
        state
            .routes
            .get(&path)
            .and_then(|seq| seq.get(index).or_else(|| seq.last()))
            .cloned()
            .unwrap_or_else(|| Route::status(404))
    };

    if !route.delay.is_zero() {
        tokio::time::sleep(route.delay).await;
    }

    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        route.status,
        reason(route.status),
        route.content_type,
        route.body.len(),
        route.body
    );
    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await
}

/// An RSS 2.0 document with `count` well-formed items.
pub fn rss_feed(title: &str, count: usize) -> String {
    let items: String = (1..=count)
        .map(|i| {
            format!(
                "<item><title>{title} headline {i}</title>\
                 <link>https://example.com/{i}</link>\
                 <description>Story {i} from {title}.</description>\
                 <pubDate>Mon, 06 Oct 2025 0{h}:00:00 GMT</pubDate></item>",
                h = i % 10
            )
        })
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0"><channel><title>{title}</title><link>https://example.com</link><description>test</description>{items}</channel></rss>"#
    )
}

/// Captures outgoing mail instead of talking SMTP.
#[derive(Clone, Default)]
pub struct RecordingTransport {
    pub delivered: Arc<Mutex<Vec<Message>>>,
}

impl RecordingTransport {
    pub fn count(&self) -> usize {
        self.delivered.lock().unwrap().len()
    }
}

#[async_trait]
impl MailTransport for RecordingTransport {
    async fn deliver(&self, message: Message) -> Result<(), MailError> {
        self.delivered.lock().unwrap().push(message);
        Ok(())
    }
}

pub struct FailingTransport;

#[async_trait]
impl MailTransport for FailingTransport {
    async fn deliver(&self, _message: Message) -> Result<(), MailError> {
        Err(MailError::Authentication("535 5.7.8 Username and Password not accepted".to_string()))
    }
}
