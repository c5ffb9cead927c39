//! # Pitwall Common Library
//!
//! Shared code for the Pitwall client crates including:
//! - Error and result types
//! - Configuration loading (CLI → ENV → TOML → defaults)
//! - Session state (API key and readiness inputs)
//! - Retry notices emitted by the resilient fetch client

pub mod config;
pub mod error;
pub mod retry;
pub mod session;

pub use error::{Error, Result};
pub use retry::{RetryNotice, MAX_RETRIES, RETRY_DELAYS_MS};
pub use session::{ReadinessInputs, Session, SessionContext};
