use super::limiter::{DEFAULT_RETENTION_MS, DEFAULT_WINDOW_MS};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How many actions a key may take per window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LimitRule {
    pub limit: usize,
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,
}

fn default_window_ms() -> u64 {
    DEFAULT_WINDOW_MS
}

impl LimitRule {
    pub const fn per_minute(limit: usize) -> Self {
        Self {
            limit,
            window_ms: DEFAULT_WINDOW_MS,
        }
    }
}

/// Limits for each action category plus maintenance cadence.
///
/// # Defaults
///
/// - `message`: 10 per minute
/// - `upload`: 5 per minute
/// - `general`: 30 per minute (outbound API calls and anything else)
/// - `retention_ms`: 1 hour
/// - `cleanup_interval_ms`: 5 minutes; `None` disables scheduled cleanup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RateLimitSettings {
    pub message: LimitRule,
    pub upload: LimitRule,
    pub general: LimitRule,
    pub retention_ms: u64,
    pub cleanup_interval_ms: Option<u64>,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            message: LimitRule::per_minute(10),
            upload: LimitRule::per_minute(5),
            general: LimitRule::per_minute(30),
            retention_ms: DEFAULT_RETENTION_MS,
            cleanup_interval_ms: Some(5 * 60 * 1000),
        }
    }
}

impl RateLimitSettings {
    /// Scheduled cleanup period, if enabled. A zero interval counts as disabled.
    pub fn cleanup_interval(&self) -> Option<Duration> {
        self.cleanup_interval_ms
            .filter(|&ms| ms > 0)
            .map(Duration::from_millis)
    }
}
