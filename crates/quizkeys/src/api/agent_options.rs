// Agent options
//
// Knobs for a frame agent: diagnostic output, the poll trigger interval and
// how many labels feed the detection-log fingerprint. All optional; unset
// fields resolve to the defaults below.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default interval of the periodic detection poll
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

/// Default number of leading labels used for the detection fingerprint
pub const DEFAULT_FINGERPRINT_LABELS: usize = 20;

/// Options for a frame agent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentOptions {
    /// Emit diagnostic log lines (default: true)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<bool>,

    /// Poll trigger interval in milliseconds (default: DEFAULT_POLL_INTERVAL_MS)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poll_interval_ms: Option<u64>,

    /// Labels included in the detection fingerprint (default: DEFAULT_FINGERPRINT_LABELS)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint_labels: Option<usize>,
}

impl AgentOptions {
    /// Creates a new AgentOptions with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads `QUIZKEYS_DEBUG`, `QUIZKEYS_POLL_INTERVAL_MS` and
    /// `QUIZKEYS_FINGERPRINT_LABELS` from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
            .map_err(|e| e.context("Failed to read agent options from environment"))
    }

    /// Same as [`AgentOptions::from_env`] over an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut opts = Self::default();

        if let Some(raw) = lookup("QUIZKEYS_DEBUG") {
            opts.debug = Some(parse_flag("QUIZKEYS_DEBUG", &raw)?);
        }
        if let Some(raw) = lookup("QUIZKEYS_POLL_INTERVAL_MS") {
            let ms: u64 = raw.trim().parse().map_err(|_| {
                Error::InvalidArgument(format!("QUIZKEYS_POLL_INTERVAL_MS='{}' is not a number", raw))
            })?;
            if ms == 0 {
                return Err(Error::InvalidArgument(
                    "QUIZKEYS_POLL_INTERVAL_MS must be greater than zero".to_string(),
                ));
            }
            opts.poll_interval_ms = Some(ms);
        }
        if let Some(raw) = lookup("QUIZKEYS_FINGERPRINT_LABELS") {
            let count: usize = raw.trim().parse().map_err(|_| {
                Error::InvalidArgument(format!(
                    "QUIZKEYS_FINGERPRINT_LABELS='{}' is not a number",
                    raw
                ))
            })?;
            if count == 0 {
                return Err(Error::InvalidArgument(
                    "QUIZKEYS_FINGERPRINT_LABELS must be greater than zero".to_string(),
                ));
            }
            opts.fingerprint_labels = Some(count);
        }

        Ok(opts)
    }

    /// Enable or disable diagnostic log lines
    pub fn debug(mut self, enabled: bool) -> Self {
        self.debug = Some(enabled);
        self
    }

    /// Set the poll trigger interval
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        let ms = u64::try_from(interval.as_millis().max(1)).unwrap_or(u64::MAX);
        self.poll_interval_ms = Some(ms);
        self
    }

    /// Set how many leading labels feed the detection fingerprint (at least one)
    pub fn fingerprint_labels(mut self, count: usize) -> Self {
        self.fingerprint_labels = Some(count.max(1));
        self
    }

    pub fn debug_enabled(&self) -> bool {
        self.debug.unwrap_or(true)
    }

    pub fn poll_interval_duration(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.unwrap_or(DEFAULT_POLL_INTERVAL_MS))
    }

    pub fn fingerprint_len(&self) -> usize {
        self.fingerprint_labels.unwrap_or(DEFAULT_FINGERPRINT_LABELS)
    }
}

fn parse_flag(name: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(Error::InvalidArgument(format!(
            "{}='{}' is not a boolean",
            name, raw
        ))),
    }
}
