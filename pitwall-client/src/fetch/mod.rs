//! Resilient fetch client
//!
//! Attaches the session API key to outbound requests and retries transient
//! failures (502/503/504, transport errors) on a fixed backoff table.

pub mod client;
pub mod policy;
pub mod request;
pub mod transport;

pub use client::{FetchClient, RetryObserver, API_KEY_HEADER};
pub use policy::{is_retryable_status, RetryPolicy};
pub use request::{ApiRequest, ApiResponse};
pub use transport::{ReqwestTransport, Transport};
