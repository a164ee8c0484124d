//! Startup reachability probe.
//!
//! The agent does not start sending until the data store has answered once.
//! If it stays silent for the whole budget the probe returns
//! `AgentError::StartupTimeout` and the process exits non-zero so its
//! supervisor can restart it.

use std::{
    sync::Mutex,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use tracing::{error, info};

use crate::{
    config::Config,
    error::{AgentError, Result},
    upload::build_client,
};

pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);
pub const RETRY_INTERVAL: Duration = Duration::from_secs(60);

/// Source of time for the probe loop.
#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;

    async fn sleep(&self, duration: Duration);
}

pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Virtual clock for tests: `sleep` returns immediately and moves time
/// forward. Not meant for use outside tests.
pub struct ManualClock {
    start: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    pub fn elapsed(&self) -> Duration {
        *self.offset.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn advance(&self, by: Duration) {
        *self.offset.lock().unwrap_or_else(|e| e.into_inner()) += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.start + self.elapsed()
    }

    async fn sleep(&self, duration: Duration) {
        self.advance(duration);
    }
}

#[async_trait]
pub trait Reachability: Send + Sync {
    /// One attempt. `true` if the remote answered at all.
    async fn check(&self) -> bool;
}

/// GETs the store's base URL. Any HTTP status counts as reachable.
pub struct HttpProbe {
    client: reqwest::Client,
    base_url: String,
}

impl HttpProbe {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            client: build_client(PROBE_TIMEOUT, config.insecure_skip_verify)?,
            base_url: config.base_url.clone(),
        })
    }
}

#[async_trait]
impl Reachability for HttpProbe {
    async fn check(&self) -> bool {
        let status = match self.client.get(&self.base_url).send().await {
            Ok(response) => response.status(),
            Err(e) => {
                error!("Cannot reach PostgREST at {}: {}", self.base_url, e);
                return false;
            }
        };
        info!(
            "PostgREST is reachable at {} (HTTP {})",
            self.base_url,
            status.as_u16()
        );

        // Best effort: the root lists the exposed tables.
        let root = format!("{}/", self.base_url.trim_end_matches('/'));
        if let Ok(response) = self.client.get(&root).send().await {
            info!("PostgREST OpenAPI available (HTTP {})", response.status().as_u16());
        }

        true
    }
}

/// Polls `target` every `retry` until it answers or `budget` has passed.
/// Returns the number of attempts it took.
pub async fn wait_until_reachable<R, C>(
    target: &R,
    clock: &C,
    budget: Duration,
    retry: Duration,
) -> Result<u32>
where
    R: Reachability + ?Sized,
    C: Clock + ?Sized,
{
    // Compare elapsed time rather than building a deadline instant, so any
    // budget is safe.
    let start = clock.now();
    let mut attempts = 0;

    while clock.now().saturating_duration_since(start) < budget {
        attempts += 1;
        if target.check().await {
            return Ok(attempts);
        }
        info!("Retrying in {}s...", retry.as_secs());
        clock.sleep(retry).await;
    }

    Err(AgentError::StartupTimeout {
        minutes: budget.as_secs() / 60,
    })
}
