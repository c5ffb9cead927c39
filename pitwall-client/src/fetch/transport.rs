//! Network primitive under the fetch client
//!
//! [`Transport`] sends one request and returns one response. It never looks
//! at the status code; only failures to get a response at all are errors.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use super::request::{ApiRequest, ApiResponse};
use crate::error::{FetchError, FetchResult};

/// User-Agent header sent with every request
const USER_AGENT: &str = concat!("pitwall/", env!("CARGO_PKG_VERSION"));

/// One-shot HTTP send
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> FetchResult<ApiResponse>;
}

/// reqwest-backed transport
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http_client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> FetchResult<Self> {
        let http_client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        Ok(Self { http_client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> FetchResult<ApiResponse> {
        let mut builder = self
            .http_client
            .request(request.method, &request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(classify)?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(classify)?.to_vec();

        Ok(ApiResponse::new(status, headers, body))
    }
}

/// Builder errors (malformed URL) can never succeed on retry
fn classify(err: reqwest::Error) -> FetchError {
    if err.is_builder() {
        FetchError::InvalidRequest(err.to_string())
    } else {
        FetchError::Transport(err.to_string())
    }
}
