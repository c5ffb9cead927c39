//! Readiness loaders
//!
//! The only writers of the session's readiness record. Each loader fetches
//! one backend resource through the resilient client and updates its own
//! fields:
//!
//! | Loader         | Endpoint          | Fields                              |
//! |----------------|-------------------|-------------------------------------|
//! | `load_driver`  | `GET /drivers/me` | `has_driver`, `crs_score`           |
//! | `load_profile` | `GET /profile/me` | `profile_completion`                |
//! | `load_tasks`   | `GET /tasks/me`   | `tasks_completed`, `tasks_total`    |

use pitwall_common::ReadinessInputs;
use reqwest::StatusCode;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::FetchResult;
use crate::fetch::{ApiRequest, ApiResponse, FetchClient, RetryObserver, Transport};

pub const DRIVER_PATH: &str = "drivers/me";
pub const PROFILE_PATH: &str = "profile/me";
pub const TASKS_PATH: &str = "tasks/me";

/// `GET /drivers/me`
#[derive(Debug, Clone, Deserialize)]
pub struct DriverRecord {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub name: Option<String>,
    pub crs_score: f64,
}

/// `GET /profile/me`
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileRecord {
    /// Percentage of core fields filled in (0-100)
    pub completion: f64,
}

/// One entry of `GET /tasks/me`
#[derive(Debug, Clone, Deserialize)]
pub struct TaskRecord {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub completed: bool,
}

/// Fetches readiness inputs and writes them into the client's session
pub struct ReadinessLoader<'a, T: Transport> {
    client: &'a FetchClient<T>,
    observer: Option<Arc<dyn RetryObserver>>,
}

impl<'a, T: Transport> ReadinessLoader<'a, T> {
    pub fn new(client: &'a FetchClient<T>) -> Self {
        Self {
            client,
            observer: None,
        }
    }

    /// Forward retry notices from every load to `observer`
    pub fn with_observer(mut self, observer: Arc<dyn RetryObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Driver record; a 404 means the user has no driver yet
    pub async fn load_driver(&self) -> FetchResult<()> {
        if !self.ensure_authenticated().await {
            return Ok(());
        }

        let response = self.fetch(DRIVER_PATH).await?;
        if response.status() == StatusCode::NOT_FOUND {
            info!("No driver profile yet");
            self.client
                .session()
                .update_readiness(|r| {
                    r.has_driver = false;
                    r.crs_score = 0.0;
                })
                .await;
            return Ok(());
        }

        let driver: DriverRecord = response.error_for_status()?.json()?;
        debug!(crs_score = driver.crs_score, "Loaded driver");
        self.client
            .session()
            .update_readiness(|r| {
                r.has_driver = true;
                r.crs_score = driver.crs_score;
            })
            .await;
        Ok(())
    }

    pub async fn load_profile(&self) -> FetchResult<()> {
        if !self.ensure_authenticated().await {
            return Ok(());
        }

        let profile: ProfileRecord = self.fetch(PROFILE_PATH).await?.error_for_status()?.json()?;
        debug!(completion = profile.completion, "Loaded profile");
        self.client
            .session()
            .update_readiness(|r| r.profile_completion = profile.completion)
            .await;
        Ok(())
    }

    pub async fn load_tasks(&self) -> FetchResult<()> {
        if !self.ensure_authenticated().await {
            return Ok(());
        }

        let tasks: Vec<TaskRecord> = self.fetch(TASKS_PATH).await?.error_for_status()?.json()?;
        let total = tasks.len() as u32;
        let completed = tasks.iter().filter(|t| t.completed).count() as u32;
        debug!(completed, total, "Loaded tasks");
        self.client
            .session()
            .update_readiness(|r| {
                r.tasks_completed = completed;
                r.tasks_total = total;
            })
            .await;
        Ok(())
    }

    /// Run every loader in order and return the resulting inputs
    ///
    /// Stops at the first failure; fields written before it stay written.
    pub async fn refresh_all(&self) -> FetchResult<ReadinessInputs> {
        self.load_driver().await?;
        self.load_profile().await?;
        self.load_tasks().await?;

        let readiness = self.client.session().readiness().await;
        info!(
            has_driver = readiness.has_driver,
            crs_score = readiness.crs_score,
            profile_completion = readiness.profile_completion,
            tasks_completed = readiness.tasks_completed,
            tasks_total = readiness.tasks_total,
            "Readiness inputs refreshed"
        );
        Ok(readiness)
    }

    /// Without a key there is nothing to load; clear stale inputs instead
    async fn ensure_authenticated(&self) -> bool {
        let session = self.client.session();
        if session.is_authenticated().await {
            return true;
        }
        debug!("Not authenticated, resetting readiness inputs");
        session.reset_readiness().await;
        false
    }

    async fn fetch(&self, path: &str) -> FetchResult<ApiResponse> {
        let request = ApiRequest::get(self.client.url(path));
        self.client
            .resilient_request(request, self.observer.as_deref())
            .await
    }
}
