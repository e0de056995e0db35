//! Shared utilities for integration testing.
#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// What a mock service answers to one request.
pub struct Reply {
    pub status: u16,
    pub version_header: Option<&'static str>,
    pub body: String,
}

impl Reply {
    pub fn status(status: u16) -> Self {
        Self {
            status,
            version_header: None,
            body: String::new(),
        }
    }

    pub fn with_version(mut self, version: &'static str) -> Self {
        self.version_header = Some(version);
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }
}

fn status_line(status: u16) -> &'static str {
    match status {
        200 => "200 OK",
        404 => "404 Not Found",
        500 => "500 Internal Server Error",
        502 => "502 Bad Gateway",
        503 => "503 Service Unavailable",
        _ => "200 OK",
    }
}

/// Start a programmable mock service on an ephemeral loopback port.
pub async fn start_programmable_service<F, Fut>(f: F) -> SocketAddr
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Reply> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        // Drain the request head before answering.
                        let mut buf = [0u8; 1024];
                        let _ = socket.read(&mut buf).await;

                        let reply = f().await;
                        let version = reply
                            .version_header
                            .map(|v| format!("x-service-version: {}\r\n", v))
                            .unwrap_or_default();
                        let response = format!(
                            "HTTP/1.1 {}\r\n{}Content-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_line(reply.status),
                            version,
                            reply.body.len(),
                            reply.body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Start a mock service that always gives the same reply.
pub async fn start_fixed_service(status: u16, version: Option<&'static str>) -> SocketAddr {
    start_programmable_service(move || async move {
        let reply = Reply::status(status);
        match version {
            Some(v) => reply.with_version(v),
            None => reply,
        }
    })
    .await
}

/// Start a mock service that accepts connections but answers after `delay`.
pub async fn start_slow_service(delay: Duration) -> SocketAddr {
    start_programmable_service(move || async move {
        tokio::time::sleep(delay).await;
        Reply::status(200)
    })
    .await
}
