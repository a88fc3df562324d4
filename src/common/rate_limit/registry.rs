use super::limiter::RateLimiter;
use super::settings::{LimitRule, RateLimitSettings};
use crate::common::clock::{system_clock, Clock};
use crate::common::security::{audit_logger, AuditLogger};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Action categories with their own limiter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LimitCategory {
    /// User message sends
    Message,
    /// File uploads
    Upload,
    /// Outbound API calls and other actions
    General,
}

impl LimitCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            LimitCategory::Message => "message",
            LimitCategory::Upload => "upload",
            LimitCategory::General => "general",
        }
    }
}

/// Named rate limiters shared by every widget instance wired to it.
///
/// Built once at application wiring time and passed by reference (or
/// cloned: clones share the same limiter instances) to each consumer, so
/// tests can create isolated registries.
///
/// # Example
///
/// ```
/// use chat_widget_core::common::rate_limit::{LimitCategory, LimiterRegistry};
///
/// let limiters = LimiterRegistry::default();
/// let per_widget = limiters.clone();
///
/// assert!(limiters.check(LimitCategory::Message, "session-1"));
/// assert_eq!(per_widget.remaining(LimitCategory::Message, "session-1"), 9);
/// ```
#[derive(Clone, Debug)]
pub struct LimiterRegistry {
    /// Limiter for message sends
    pub message: Arc<RateLimiter>,

    /// Limiter for file uploads
    pub upload: Arc<RateLimiter>,

    /// Limiter for outbound calls and generic actions
    pub general: Arc<RateLimiter>,

    settings: RateLimitSettings,
}

impl LimiterRegistry {
    /// Create a registry reading time from `clock`, auditing to the global
    /// logger
    pub fn new(settings: RateLimitSettings, clock: Arc<dyn Clock>) -> Self {
        Self::with_audit(settings, clock, audit_logger())
    }

    /// Create a registry whose limiters all report to `audit`
    pub fn with_audit(
        settings: RateLimitSettings,
        clock: Arc<dyn Clock>,
        audit: Arc<AuditLogger>,
    ) -> Self {
        let build = |category: LimitCategory| {
            Arc::new(
                RateLimiter::new(category.as_str(), Arc::clone(&clock))
                    .with_retention_ms(settings.retention_ms)
                    .with_audit(Arc::clone(&audit)),
            )
        };

        Self {
            message: build(LimitCategory::Message),
            upload: build(LimitCategory::Upload),
            general: build(LimitCategory::General),
            settings,
        }
    }

    pub fn settings(&self) -> &RateLimitSettings {
        &self.settings
    }

    pub fn limiter(&self, category: LimitCategory) -> &Arc<RateLimiter> {
        match category {
            LimitCategory::Message => &self.message,
            LimitCategory::Upload => &self.upload,
            LimitCategory::General => &self.general,
        }
    }

    pub fn rule(&self, category: LimitCategory) -> LimitRule {
        match category {
            LimitCategory::Message => self.settings.message,
            LimitCategory::Upload => self.settings.upload,
            LimitCategory::General => self.settings.general,
        }
    }

    /// Admission check against the configured rule for `category`
    pub fn check(&self, category: LimitCategory, key: &str) -> bool {
        let rule = self.rule(category);
        self.limiter(category)
            .check_limit(key, rule.limit, rule.window_ms)
    }

    pub fn remaining(&self, category: LimitCategory, key: &str) -> usize {
        let rule = self.rule(category);
        self.limiter(category)
            .remaining(key, rule.limit, rule.window_ms)
    }

    /// Run maintenance on every limiter. Returns the total keys removed.
    pub fn cleanup_all(&self) -> usize {
        [&self.message, &self.upload, &self.general]
            .iter()
            .map(|limiter| limiter.cleanup())
            .sum()
    }

    /// Start periodic maintenance on the current tokio runtime.
    ///
    /// Returns `None` when no cleanup interval is configured or when called
    /// outside a runtime; callers without a runtime can drive
    /// [`cleanup_all`](Self::cleanup_all) from their own tick instead. The
    /// task stops when `token` is cancelled.
    pub fn spawn_cleanup(&self, token: CancellationToken) -> Option<JoinHandle<()>> {
        let period = self.settings.cleanup_interval()?;
        let runtime = tokio::runtime::Handle::try_current().ok()?;
        let registry = self.clone();

        tracing::info!(period_ms = period.as_millis() as u64, "starting rate limiter cleanup task");

        Some(runtime.spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        let removed = registry.cleanup_all();
                        tracing::debug!(removed, "rate limiter cleanup pass finished");
                    }
                }
            }

            tracing::info!("rate limiter cleanup task stopped");
        }))
    }
}

impl Default for LimiterRegistry {
    fn default() -> Self {
        Self::new(RateLimitSettings::default(), system_clock())
    }
}
