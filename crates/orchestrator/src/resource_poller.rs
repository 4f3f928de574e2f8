use std::time::Duration;
use tokio::time::{sleep, sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use okteto::PreviewApi;
use preview_core::Readiness;

use crate::error::{PreviewError, Result};

const INITIAL_INTERVAL: Duration = Duration::from_secs(2);
const MAX_INTERVAL: Duration = Duration::from_secs(30);
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15 * 60);

#[derive(Debug, Clone)]
pub struct ResourcePollConfig {
    pub initial_interval: Duration,
    pub max_interval: Duration,
    pub timeout: Duration,
}

impl Default for ResourcePollConfig {
    fn default() -> Self {
        Self {
            initial_interval: INITIAL_INTERVAL,
            max_interval: MAX_INTERVAL,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ResourcePollConfig {
    pub fn with_initial_interval(mut self, interval: Duration) -> Self {
        self.initial_interval = interval;
        self.max_interval = self.max_interval.max(interval);
        self
    }

    pub fn with_max_interval(mut self, interval: Duration) -> Self {
        self.max_interval = interval;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Polls the resources of a preview environment until all of them run.
pub struct ResourcePoller<'a> {
    api: &'a dyn PreviewApi,
    config: ResourcePollConfig,
}

impl<'a> ResourcePoller<'a> {
    pub fn new(api: &'a dyn PreviewApi, config: ResourcePollConfig) -> Self {
        Self { api, config }
    }

    /// Returns the number of status queries it took to see every resource running.
    ///
    /// Fails as soon as one resource reports an error, even while others are
    /// still converging.
    pub async fn wait_until_running(
        &self,
        environment: &str,
        cancel: &CancellationToken,
    ) -> Result<u32> {
        let deadline = Instant::now() + self.config.timeout;
        let mut interval = self.config.initial_interval;
        let mut polls = 0;

        loop {
            polls += 1;

            let statuses = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(PreviewError::Cancelled),
                _ = sleep_until(deadline) => return Err(self.timed_out(environment)),
                result = self.api.get_resource_statuses(environment) => {
                    result.map_err(|source| PreviewError::StatusQueryError {
                        environment: environment.to_string(),
                        source,
                    })?
                }
            };

            match Readiness::evaluate(&statuses) {
                Readiness::Ready => {
                    if statuses.is_empty() {
                        warn!(environment = %environment, "Preview environment reports no resources");
                    }
                    info!(
                        environment = %environment,
                        resources = statuses.len(),
                        polls = polls,
                        "All resources running"
                    );
                    return Ok(polls);
                }
                Readiness::Failed { errored } => {
                    error!(environment = %environment, resources = ?errored, "Resources reported errors");
                    return Err(PreviewError::ResourceError {
                        environment: environment.to_string(),
                        resources: errored,
                    });
                }
                Readiness::Pending { waiting } => {
                    debug!(
                        environment = %environment,
                        waiting = ?waiting,
                        next_poll = ?interval,
                        "Resources not running yet"
                    );
                }
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(PreviewError::Cancelled),
                _ = sleep_until(deadline) => return Err(self.timed_out(environment)),
                _ = sleep(interval) => {}
            }
            interval = interval.saturating_mul(2).min(self.config.max_interval);
        }
    }

    fn timed_out(&self, environment: &str) -> PreviewError {
        PreviewError::ResourceTimeout {
            environment: environment.to_string(),
            timeout: self.config.timeout,
        }
    }
}
