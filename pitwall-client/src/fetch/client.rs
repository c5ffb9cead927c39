//! Authenticated, retrying fetch client
//!
//! Two layers:
//! - [`FetchClient::authenticated_request`]: one send with `X-API-Key`
//!   attached when the session has a key. No retry, no interpretation.
//! - [`FetchClient::resilient_request`]: the same, retried on 502/503/504
//!   and on transport errors using the [`RetryPolicy`] backoff table.

use pitwall_common::config::PitwallConfig;
use pitwall_common::{RetryNotice, SessionContext};
use reqwest::header::{HeaderName, HeaderValue};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error, warn};

use super::policy::RetryPolicy;
use super::request::{ApiRequest, ApiResponse};
use super::transport::{ReqwestTransport, Transport};
use crate::error::{FetchError, FetchResult};

/// Header carrying the session API key
pub const API_KEY_HEADER: &str = "x-api-key";

/// Receives one call per retry, before the backoff sleep
pub trait RetryObserver: Send + Sync {
    fn on_retry(&self, notice: RetryNotice);
}

/// Closures taking `(attempt_one_based, delay)` are observers
impl<F> RetryObserver for F
where
    F: Fn(u32, Duration) + Send + Sync,
{
    fn on_retry(&self, notice: RetryNotice) {
        self(notice.attempt, notice.delay)
    }
}

/// HTTP client bound to a backend base URL and a session
pub struct FetchClient<T: Transport = ReqwestTransport> {
    transport: T,
    session: SessionContext,
    policy: RetryPolicy,
    base_url: String,
}

impl FetchClient<ReqwestTransport> {
    /// Production client using reqwest with the configured timeout
    pub fn from_config(config: &PitwallConfig, session: SessionContext) -> FetchResult<Self> {
        let transport = ReqwestTransport::new(config.request_timeout)?;
        Ok(Self::new(transport, session, &config.base_url))
    }
}

impl<T: Transport> FetchClient<T> {
    pub fn new(transport: T, session: SessionContext, base_url: &str) -> Self {
        Self {
            transport,
            session,
            policy: RetryPolicy::default(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Replace the default backoff table
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Resolve `path` against the base URL
    ///
    /// Absolute `http://` / `https://` targets are used as given.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Send once, attaching `X-API-Key` if the session has a key
    ///
    /// Without a key the header is left out entirely. With a key it replaces
    /// any caller-supplied value. HTTP error statuses come back as `Ok`;
    /// only transport failures and unbuildable requests are `Err`.
    pub async fn authenticated_request(&self, mut request: ApiRequest) -> FetchResult<ApiResponse> {
        if let Some(key) = self.session.api_key().await {
            let value = HeaderValue::from_str(&key)
                .map_err(|e| FetchError::InvalidRequest(format!("API key header: {}", e)))?;
            request
                .headers
                .insert(HeaderName::from_static(API_KEY_HEADER), value);
        }

        debug!(method = %request.method, url = %request.url, "Sending request");
        let response = self.transport.send(request).await?;
        debug!(status = response.status().as_u16(), "Received response");

        Ok(response)
    }

    /// Send with retry on transient failure
    ///
    /// **Algorithm:**
    /// 1. Send via [`Self::authenticated_request`]
    /// 2. Non-retryable response or error: return it
    /// 3. Retryable (502/503/504 or transport error) with budget left:
    ///    notify `observer`, sleep the table delay, go to 1
    /// 4. Budget spent: return the final outcome as-is. A final 503 is
    ///    returned as `Ok`; a final transport error is returned as `Err`,
    ///    even if an earlier attempt did produce a response.
    pub async fn resilient_request(
        &self,
        request: ApiRequest,
        observer: Option<&dyn RetryObserver>,
    ) -> FetchResult<ApiResponse> {
        let mut attempt = 0usize;

        loop {
            let outcome = self.authenticated_request(request.clone()).await;

            let retryable = match &outcome {
                Ok(response) => response.is_retryable(),
                Err(err) => err.is_retryable(),
            };
            if !retryable {
                if attempt > 0 {
                    debug!(url = %request.url, attempt, "Request settled after retry");
                }
                return outcome;
            }

            let Some(delay) = self.policy.delay_for(attempt) else {
                match &outcome {
                    Ok(response) => error!(
                        url = %request.url,
                        attempts = attempt + 1,
                        status = response.status().as_u16(),
                        "Retries exhausted, returning last response"
                    ),
                    Err(err) => error!(
                        url = %request.url,
                        attempts = attempt + 1,
                        error = %err,
                        "Retries exhausted, backend unreachable"
                    ),
                }
                return outcome;
            };

            let notice = RetryNotice {
                attempt: attempt as u32 + 1,
                delay,
            };
            match &outcome {
                Ok(response) => warn!(
                    url = %request.url,
                    attempt = notice.attempt,
                    delay_ms = notice.delay_ms(),
                    status = response.status().as_u16(),
                    "Backend unavailable, will retry after backoff"
                ),
                Err(err) => warn!(
                    url = %request.url,
                    attempt = notice.attempt,
                    delay_ms = notice.delay_ms(),
                    error = %err,
                    "Transport error, will retry after backoff"
                ),
            }
            if let Some(observer) = observer {
                observer.on_retry(notice);
            }

            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    /// Resilient GET of `path`
    pub async fn get(&self, path: &str) -> FetchResult<ApiResponse> {
        self.resilient_request(ApiRequest::get(self.url(path)), None)
            .await
    }

    /// Resilient GET decoded as JSON; non-2xx statuses become errors
    pub async fn get_json<R: DeserializeOwned>(&self, path: &str) -> FetchResult<R> {
        self.get(path).await?.error_for_status()?.json()
    }

    /// POST a JSON body. Sent once, never retried.
    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> FetchResult<ApiResponse> {
        let request = ApiRequest::post(self.url(path)).json(body)?;
        self.authenticated_request(request).await
    }
}
