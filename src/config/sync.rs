use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use crate::constants::DEFAULT_BACKOFF_UNIT_MS;
use crate::constants::DEFAULT_EVENT_BUFFER;
use crate::constants::DEFAULT_INSTANCE;
use crate::constants::DEFAULT_MAX_BACKOFF_MS;
use crate::Error;
use crate::Result;

/// Tuning of the background watch loop
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SyncConfig {
    /// Sleep added per consecutive failure of one watch stream (unit: milliseconds)
    /// Default: 500
    #[serde(default = "default_backoff_unit_ms")]
    pub backoff_unit_ms: u64,

    /// Upper bound of a single backoff sleep (unit: milliseconds)
    /// Default: 0, meaning the sleep keeps growing with the failure count
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,

    /// Capacity of the sync event broadcast channel.
    /// Subscribers lagging further behind lose the oldest events.
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,

    /// `instance` label on the cache gauges.
    /// Give each engine of a process its own name.
    #[serde(default = "default_instance")]
    pub instance: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            backoff_unit_ms: default_backoff_unit_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            event_buffer: default_event_buffer(),
            instance: default_instance(),
        }
    }
}

impl SyncConfig {
    pub fn validate(&self) -> Result<()> {
        if self.backoff_unit_ms == 0 {
            return Err(Error::InvalidConfig("sync.backoff_unit_ms must be greater than 0".into()));
        }

        if self.max_backoff_ms != 0 && self.max_backoff_ms < self.backoff_unit_ms {
            return Err(Error::InvalidConfig(format!(
                "sync.max_backoff_ms ({}) cannot be smaller than sync.backoff_unit_ms ({})",
                self.max_backoff_ms, self.backoff_unit_ms
            )));
        }

        if self.event_buffer == 0 {
            return Err(Error::InvalidConfig("sync.event_buffer must be greater than 0".into()));
        }

        if self.instance.trim().is_empty() {
            return Err(Error::InvalidConfig("sync.instance cannot be empty".into()));
        }

        Ok(())
    }

    pub fn backoff_unit(&self) -> Duration {
        Duration::from_millis(self.backoff_unit_ms)
    }

    /// `None` when unbounded
    pub fn max_backoff(&self) -> Option<Duration> {
        (self.max_backoff_ms > 0).then(|| Duration::from_millis(self.max_backoff_ms))
    }
}

fn default_backoff_unit_ms() -> u64 {
    DEFAULT_BACKOFF_UNIT_MS
}
fn default_max_backoff_ms() -> u64 {
    DEFAULT_MAX_BACKOFF_MS
}
fn default_event_buffer() -> usize {
    DEFAULT_EVENT_BUFFER
}
fn default_instance() -> String {
    DEFAULT_INSTANCE.to_string()
}
