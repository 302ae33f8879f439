//! Engine configuration: default condition type and wait timing.
//!
//! A configuration value is passed explicitly to the parser and the search
//! engine. Each operation reads it once when it starts, so changing a
//! configuration never affects an operation already in flight.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::condition_type::{condition_types, is_condition_type};
use crate::errors::Result;

/// Condition type used for terms without a `method:` prefix
pub const DEFAULT_CONDITION_TYPE: &str = "Name";

/// Default global timeout (3 seconds)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

/// Default polling interval for waits (50ms)
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Smallest accepted timeout; non-positive input maps here
pub const MIN_TIMEOUT: Duration = Duration::from_millis(100);

/// Largest accepted timeout: 24 days
pub const MAX_TIMEOUT: Duration = Duration::from_secs(24 * 24 * 3600);

/// Environment variable overriding the default condition type
pub const ENV_DEFAULT_CONDITION_TYPE: &str = "UIQUERY_DEFAULT_CONDITION_TYPE";

/// Environment variable overriding the timeout, in (fractional) seconds
pub const ENV_TIMEOUT_SECONDS: &str = "UIQUERY_TIMEOUT_SECONDS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    default_condition_type: String,
    timeout: Duration,
    poll_interval: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_condition_type: DEFAULT_CONDITION_TYPE.to_string(),
            timeout: DEFAULT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// On-disk shape; every field optional and validated through the setters
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ConfigFile {
    default_condition_type: Option<String>,
    timeout_seconds: Option<f64>,
    poll_interval_ms: Option<u64>,
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn default_condition_type(&self) -> &str {
        &self.default_condition_type
    }

    /// Sets the condition type used for terms without a method.
    ///
    /// Names that are not condition-type keys are rejected and the previous
    /// value is kept. Returns whether the value was accepted.
    pub fn set_default_condition_type(&mut self, name: &str) -> bool {
        if !is_condition_type(name) {
            warn!(
                "Ignoring unknown default condition type '{}'; keeping '{}'. Known types: {:?}",
                name,
                self.default_condition_type,
                condition_types().names()
            );
            return false;
        }
        self.default_condition_type = name.trim().to_string();
        true
    }

    #[must_use]
    pub fn with_default_condition_type(mut self, name: &str) -> Self {
        self.set_default_condition_type(name);
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Sets the global timeout, clamped to `[0.1s, 24 days]`.
    /// Non-positive and NaN input maps to the 0.1s floor.
    pub fn set_timeout_seconds(&mut self, seconds: f64) {
        let clamped = clamp_timeout(seconds);
        if clamped.as_secs_f64() != seconds {
            debug!("Timeout {}s clamped to {:?}", seconds, clamped);
        }
        self.timeout = clamped;
    }

    #[must_use]
    pub fn with_timeout_seconds(mut self, seconds: f64) -> Self {
        self.set_timeout_seconds(seconds);
        self
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Sets the wait polling interval; zero is raised to 1ms so waits never spin
    pub fn set_poll_interval(&mut self, interval: Duration) {
        self.poll_interval = interval.max(Duration::from_millis(1));
    }

    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.set_poll_interval(interval);
        self
    }

    /// Defaults overridden by `UIQUERY_DEFAULT_CONDITION_TYPE` and
    /// `UIQUERY_TIMEOUT_SECONDS`. Unparseable values are logged and ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(name) = std::env::var(ENV_DEFAULT_CONDITION_TYPE) {
            config.set_default_condition_type(&name);
        }
        if let Ok(raw) = std::env::var(ENV_TIMEOUT_SECONDS) {
            match raw.trim().parse::<f64>() {
                Ok(seconds) => config.set_timeout_seconds(seconds),
                Err(e) => warn!("Ignoring {}='{}': {}", ENV_TIMEOUT_SECONDS, raw, e),
            }
        }
        config
    }

    /// Reads `{"defaultConditionType": .., "timeoutSeconds": .., "pollIntervalMs": ..}`.
    /// Missing fields keep their defaults; present ones go through the setters.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let file: ConfigFile = serde_json::from_str(json)?;
        let mut config = Self::default();
        if let Some(name) = file.default_condition_type {
            config.set_default_condition_type(&name);
        }
        if let Some(seconds) = file.timeout_seconds {
            config.set_timeout_seconds(seconds);
        }
        if let Some(ms) = file.poll_interval_ms {
            config.set_poll_interval(Duration::from_millis(ms));
        }
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&contents)
    }
}

fn clamp_timeout(seconds: f64) -> Duration {
    if seconds.is_nan() || seconds <= MIN_TIMEOUT.as_secs_f64() {
        MIN_TIMEOUT
    } else if seconds >= MAX_TIMEOUT.as_secs_f64() {
        MAX_TIMEOUT
    } else {
        Duration::from_secs_f64(seconds)
    }
}
