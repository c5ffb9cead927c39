//! Shared test helpers: an in-process backend on an ephemeral port

use axum::Router;
use pitwall_client::{FetchClient, ReqwestTransport, RetryPolicy};
use pitwall_common::SessionContext;
use std::time::Duration;
use tokio::net::TcpListener;

/// Serve `app` on 127.0.0.1 and return its base URL
pub async fn spawn_backend(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}/api", addr)
}

/// Base URL of a port nothing is listening on
pub async fn unreachable_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/api", addr)
}

/// Real reqwest client with a millisecond backoff table
pub fn fast_client(base_url: &str, api_key: Option<&str>, retries: usize) -> FetchClient {
    let transport = ReqwestTransport::new(Duration::from_secs(5)).unwrap();
    let session = SessionContext::new(api_key.map(str::to_string));
    FetchClient::new(transport, session, base_url)
        .with_policy(RetryPolicy::new(vec![Duration::from_millis(10); retries]))
}
