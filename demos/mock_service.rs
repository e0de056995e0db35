//! A target service for trying the monitor locally.
//!
//! `/health` alternates between healthy and failing every few requests and
//! reports its version in the `x-service-version` header.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Router};

#[tokio::main]
async fn main() {
    let hits = Arc::new(AtomicU64::new(0));
    let app = Router::new()
        .route("/health", get(health))
        .with_state(hits);

    let addr = SocketAddr::from(([127, 0, 0, 1], 9001));
    println!("Mock service is listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

async fn health(State(hits): State<Arc<AtomicU64>>) -> (StatusCode, [(&'static str, &'static str); 1], &'static str) {
    let n = hits.fetch_add(1, Ordering::Relaxed);
    let status = if (n / 5) % 2 == 0 {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, [("x-service-version", "1.0.0")], "ok")
}
