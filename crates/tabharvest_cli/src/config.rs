//! Optional RON settings file.
//!
//! Every field is optional; unset fields keep the engine defaults.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tabharvest_engine::{HarvestSettings, RetryPolicy};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarvestConfig {
    pub base_url: Option<String>,
    pub connect_timeout_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    pub redirect_limit: Option<usize>,
    pub max_attempts: Option<u32>,
    pub backoff_secs: Option<u64>,
    pub workers: Option<usize>,
    pub chunk_size: Option<usize>,
    pub user_agent: Option<String>,
    pub login_markers: Option<Vec<String>>,
}

impl HarvestConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        ron::from_str(&content).with_context(|| format!("parsing config file {}", path.display()))
    }

    /// Overlays the configured values onto `settings`.
    pub fn apply(&self, settings: &mut HarvestSettings) {
        if let Some(base_url) = &self.base_url {
            settings.fetch.base_url = base_url.clone();
        }
        if let Some(secs) = self.connect_timeout_secs {
            settings.fetch.connect_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = self.request_timeout_secs {
            settings.fetch.request_timeout = Duration::from_secs(secs);
        }
        if let Some(limit) = self.redirect_limit {
            settings.fetch.redirect_limit = limit;
        }
        if let Some(user_agent) = &self.user_agent {
            settings.fetch.user_agent = user_agent.clone();
        }
        if let Some(markers) = &self.login_markers {
            settings.fetch.login_markers = markers.clone();
        }
        if self.max_attempts.is_some() || self.backoff_secs.is_some() {
            settings.retry = RetryPolicy::new(
                self.max_attempts.unwrap_or(settings.retry.max_attempts),
                self.backoff_secs
                    .map(Duration::from_secs)
                    .unwrap_or(settings.retry.base_delay),
            );
        }
        if let Some(workers) = self.workers {
            settings.scheduler.workers = workers;
        }
        if let Some(chunk_size) = self.chunk_size {
            settings.scheduler.chunk_size = chunk_size;
        }
    }
}
