#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub body: String,
}

impl RecordedRequest {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("request body is not JSON")
    }
}

#[derive(Clone)]
struct Route {
    method: &'static str,
    path: String,
    status: u16,
    body: String,
    delay: Option<Duration>,
    /// Advertise a longer Content-Length than is sent, then close.
    truncated: bool,
}

/// A minimal HTTP/1.1 server that answers canned JSON bodies per route and
/// records every request it receives. Unknown routes answer 404.
pub struct StubServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    handle: JoinHandle<()>,
}

pub struct StubServerBuilder {
    routes: Vec<Route>,
}

impl StubServerBuilder {
    pub fn route(mut self, method: &'static str, path: &str, status: u16, body: impl Into<String>) -> Self {
        self.routes.push(Route {
            method,
            path: path.to_string(),
            status,
            body: body.into(),
            delay: None,
            truncated: false,
        });
        self
    }

    pub fn truncated_route(mut self, method: &'static str, path: &str, status: u16, body: impl Into<String>) -> Self {
        self.routes.push(Route {
            method,
            path: path.to_string(),
            status,
            body: body.into(),
            delay: None,
            truncated: true,
        });
        self
    }

    pub fn slow_route(mut self, method: &'static str, path: &str, delay: Duration) -> Self {
        self.routes.push(Route {
            method,
            path: path.to_string(),
            status: 200,
            body: "{}".to_string(),
            delay: Some(delay),
            truncated: false,
        });
        self
    }

    pub async fn start(self) -> StubServer {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let routes = Arc::new(self.routes);

        let recorded = requests.clone();
        let handle = tokio::spawn(async move {
            loop {
                let (stream, _) = match listener.accept().await {
                    Ok(conn) => conn,
                    Err(_) => return,
                };
                let routes = routes.clone();
                let recorded = recorded.clone();
                tokio::spawn(async move {
                    let _ = serve(stream, &routes, &recorded).await;
                });
            }
        });

        StubServer {
            base_url: format!("http://{}", addr),
            requests,
            handle,
        }
    }
}

impl StubServer {
    pub fn builder() -> StubServerBuilder {
        StubServerBuilder { routes: Vec::new() }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Stops accepting connections; later requests fail at the transport level.
    pub async fn shutdown(self) -> String {
        self.handle.abort();
        let _ = self.handle.await;
        self.base_url
    }
}

/// Base URL of a port nothing is listening on.
pub async fn unreachable_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

async fn serve(
    mut stream: TcpStream,
    routes: &[Route],
    recorded: &Mutex<Vec<RecordedRequest>>,
) -> std::io::Result<()> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.lines();
    let mut request_line = lines.next().unwrap_or_default().split_whitespace();
    let method = request_line.next().unwrap_or_default().to_string();
    let path = request_line.next().unwrap_or_default().to_string();
    let content_length = lines
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let body_end = buf.len().min(header_end + content_length);
    let body = String::from_utf8_lossy(&buf[header_end..body_end]).to_string();

    recorded.lock().unwrap().push(RecordedRequest {
        method: method.clone(),
        path: path.clone(),
        body,
    });

    let route = routes
        .iter()
        .find(|route| route.method == method && route.path == path)
        .cloned();
    let (status, body, truncated) = match route {
        Some(route) => {
            if let Some(delay) = route.delay {
                tokio::time::sleep(delay).await;
            }
            (route.status, route.body, route.truncated)
        }
        None => (404, r#"{"detail":"Not Found"}"#.to_string(), false),
    };
    let content_length = if truncated { body.len() + 96 } else { body.len() };

    let response = format!(
        "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        content_length,
        body
    );
    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await
}

pub fn analysis_json(sender: &str, receiver: &str, amount: &str) -> serde_json::Value {
    serde_json::json!({
        "sender": sender,
        "receiver": receiver,
        "amount": amount,
        "currency": "USD",
        "transactionType": "payment",
        "transactionDate": "2024-05-01",
        "riskScore": 15,
        "riskLevel": "low",
        "confidenceScore": 0.92,
        "category": "Housing",
        "notes": ["Regular monthly payment", "Known counterparty"]
    })
}
