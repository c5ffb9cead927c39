//! Session state passed explicitly to the fetch client and aggregator
//!
//! One logical session per client. The fetch client only reads the API key;
//! the readiness loaders are the only writers of [`ReadinessInputs`].
//! Nothing here is persisted.

use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::is_valid_key;

/// Inputs to the readiness score, refreshed after each data load
#[derive(Debug, Clone, PartialEq)]
pub struct ReadinessInputs {
    /// Competitive Rating Score from the backend. Not guaranteed to be in 0-100.
    pub crs_score: f64,
    /// Profile completion percentage (0-100)
    pub profile_completion: f64,
    pub tasks_completed: u32,
    pub tasks_total: u32,
    /// Whether the user has created a driver profile
    pub has_driver: bool,
}

impl Default for ReadinessInputs {
    fn default() -> Self {
        Self {
            crs_score: 0.0,
            profile_completion: 0.0,
            tasks_completed: 0,
            tasks_total: 0,
            has_driver: false,
        }
    }
}

/// Point-in-time view of the session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    /// `None` means unauthenticated. Always trimmed and non-blank.
    api_key: Option<String>,
    pub readiness: ReadinessInputs,
}

impl Session {
    /// Build a session, treating a blank key as no key
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key: normalize_key(api_key),
            readiness: ReadinessInputs::default(),
        }
    }

    pub fn with_readiness(mut self, readiness: ReadinessInputs) -> Self {
        self.readiness = readiness;
        self
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// Replace the API key; blank keys log the session out
    pub fn set_api_key(&mut self, api_key: Option<String>) {
        self.api_key = normalize_key(api_key);
    }

    pub fn is_authenticated(&self) -> bool {
        self.api_key.as_deref().is_some_and(is_valid_key)
    }
}

/// Shared handle to the session
///
/// Cheap to clone. Concurrent requests read the key while a loader writes
/// readiness fields.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    inner: Arc<RwLock<Session>>,
}

impl SessionContext {
    pub fn new(api_key: Option<String>) -> Self {
        Self::from_session(Session::new(api_key))
    }

    pub fn from_session(session: Session) -> Self {
        Self {
            inner: Arc::new(RwLock::new(session)),
        }
    }

    /// Current API key, if any
    pub async fn api_key(&self) -> Option<String> {
        self.inner.read().await.api_key.clone()
    }

    /// Replace the API key. A blank key logs the session out.
    pub async fn set_api_key(&self, api_key: Option<String>) {
        let api_key = normalize_key(api_key);
        match &api_key {
            Some(key) => tracing::debug!(key_len = key.len(), "Session API key set"),
            None => tracing::debug!("Session API key cleared"),
        }
        self.inner.write().await.api_key = api_key;
    }

    pub async fn is_authenticated(&self) -> bool {
        self.inner.read().await.is_authenticated()
    }

    /// Copy of the whole session for the aggregator
    pub async fn snapshot(&self) -> Session {
        self.inner.read().await.clone()
    }

    pub async fn readiness(&self) -> ReadinessInputs {
        self.inner.read().await.readiness.clone()
    }

    /// Mutate the readiness record under the write lock
    pub async fn update_readiness<F>(&self, update: F)
    where
        F: FnOnce(&mut ReadinessInputs),
    {
        let mut session = self.inner.write().await;
        update(&mut session.readiness);
    }

    /// Put readiness back to its empty state
    pub async fn reset_readiness(&self) {
        self.inner.write().await.readiness = ReadinessInputs::default();
    }
}

/// Trim surrounding whitespace and drop blank keys, matching config resolution
fn normalize_key(api_key: Option<String>) -> Option<String> {
    api_key
        .map(|key| key.trim().to_string())
        .filter(|key| is_valid_key(key))
}
