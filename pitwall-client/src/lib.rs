//! pitwall-client library interface
//!
//! Exposes the fetch client, readiness aggregator and readiness loaders for
//! the `pitwall` binary and for integration testing.

pub mod error;
pub mod fetch;
pub mod loaders;
pub mod readiness;

pub use crate::error::{FetchError, FetchResult};
pub use crate::fetch::{
    ApiRequest, ApiResponse, FetchClient, ReqwestTransport, RetryObserver, RetryPolicy, Transport,
};
pub use crate::loaders::ReadinessLoader;
pub use crate::readiness::{compute_readiness, ReadinessNote, ReadinessView};
