use crate::common::clock::Clock;
use crate::common::security::{audit_logger, AuditLogger};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Default window for [`RateLimiter::check_limit`] callers without a preference
pub const DEFAULT_WINDOW_MS: u64 = 60_000;

/// Default horizon past which [`RateLimiter::cleanup`] forgets timestamps
pub const DEFAULT_RETENTION_MS: u64 = 60 * 60 * 1000;

/// Keyed sliding-window rate limiter.
///
/// Each key owns an ascending list of admitted action timestamps. An
/// admission check evicts that key's timestamps older than the window, then
/// admits only if fewer than `limit` remain. Denied attempts are not
/// recorded, so hammering a throttled key does not extend its penalty.
///
/// Keys never share budget. A constant key turns the limiter into a single
/// global budget.
///
/// Every operation holds the internal lock for its whole duration, so checks
/// and [`cleanup`](Self::cleanup) never interleave on the same key.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use chat_widget_core::common::clock::ManualClock;
/// use chat_widget_core::common::rate_limit::RateLimiter;
///
/// let clock = ManualClock::new(0);
/// let limiter = RateLimiter::new("message", Arc::new(clock.clone()));
///
/// assert!(limiter.check_limit("session-1", 2, 1_000));
/// assert!(limiter.check_limit("session-1", 2, 1_000));
/// assert!(!limiter.check_limit("session-1", 2, 1_000));
///
/// clock.advance(1_001);
/// assert!(limiter.check_limit("session-1", 2, 1_000));
/// ```
pub struct RateLimiter {
    name: String,
    entries: Mutex<HashMap<String, Vec<u64>>>,
    retention_ms: u64,
    clock: Arc<dyn Clock>,
    audit: Arc<AuditLogger>,
}

impl RateLimiter {
    /// Create an empty limiter. `name` identifies it in logs.
    pub fn new(name: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        Self {
            name: name.into(),
            entries: Mutex::new(HashMap::new()),
            retention_ms: DEFAULT_RETENTION_MS,
            clock,
            audit: audit_logger(),
        }
    }

    /// Override the cleanup retention horizon
    pub fn with_retention_ms(mut self, retention_ms: u64) -> Self {
        self.retention_ms = retention_ms;
        self
    }

    /// Use a specific audit logger instead of the global one
    pub fn with_audit(mut self, audit: Arc<AuditLogger>) -> Self {
        self.audit = audit;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn retention_ms(&self) -> u64 {
        self.retention_ms
    }

    pub fn audit(&self) -> &Arc<AuditLogger> {
        &self.audit
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<u64>>> {
        // The map holds plain timestamps; a panic elsewhere can't leave it
        // half-updated in a way that matters.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Admission check: record and admit one action for `key` if fewer than
    /// `limit` actions were admitted in the trailing `window_ms`.
    pub fn check_limit(&self, key: &str, limit: usize, window_ms: u64) -> bool {
        let mut entries = self.lock();
        let now = self.clock.now_ms();

        let admitted = {
            let timestamps = entries.entry(key.to_string()).or_default();
            timestamps.retain(|&t| now.saturating_sub(t) < window_ms);

            if timestamps.len() >= limit {
                false
            } else {
                timestamps.push(now);
                true
            }
        };

        if !admitted {
            if entries.get(key).is_some_and(Vec::is_empty) {
                entries.remove(key);
            }
            drop(entries);

            tracing::debug!(limiter = %self.name, limit, window_ms, "action denied");
            self.audit
                .log_rate_limit_exceeded(&self.name, key, limit, window_ms);
        }

        admitted
    }

    /// Actions `key` could still take in the current window. No side effects.
    pub fn remaining(&self, key: &str, limit: usize, window_ms: u64) -> usize {
        let entries = self.lock();
        let now = self.clock.now_ms();

        let used = entries.get(key).map_or(0, |timestamps| {
            timestamps
                .iter()
                .filter(|&&t| now.saturating_sub(t) < window_ms)
                .count()
        });
        limit.saturating_sub(used)
    }

    /// Forget all history for `key`
    pub fn reset(&self, key: &str) {
        self.lock().remove(key);
    }

    /// Number of keys currently holding timestamps
    pub fn tracked_keys(&self) -> usize {
        self.lock().len()
    }

    /// Periodic maintenance.
    ///
    /// Drops timestamps older than the retention horizon for every key and
    /// removes keys left empty. Returns the number of keys removed.
    pub fn cleanup(&self) -> usize {
        let mut entries = self.lock();
        let now = self.clock.now_ms();
        let before = entries.len();

        entries.retain(|_, timestamps| {
            timestamps.retain(|&t| now.saturating_sub(t) < self.retention_ms);
            !timestamps.is_empty()
        });

        let remaining = entries.len();
        drop(entries);

        let removed = before - remaining;
        if removed > 0 {
            self.audit.log_cleanup(&self.name, removed, remaining);
        } else {
            tracing::debug!(limiter = %self.name, keys_remaining = remaining, "cleanup found nothing to remove");
        }
        removed
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("name", &self.name)
            .field("retention_ms", &self.retention_ms)
            .field("tracked_keys", &self.tracked_keys())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::clock::ManualClock;

    fn limiter_at(start_ms: u64) -> (RateLimiter, ManualClock) {
        let clock = ManualClock::new(start_ms);
        (RateLimiter::new("test", Arc::new(clock.clone())), clock)
    }

    #[test]
    fn test_limit_then_window_slides() {
        let (limiter, clock) = limiter_at(1_000_000);

        assert!(limiter.check_limit("k", 3, 1000));
        clock.advance(100);
        assert!(limiter.check_limit("k", 3, 1000));
        clock.advance(100);
        assert!(limiter.check_limit("k", 3, 1000));
        assert!(!limiter.check_limit("k", 3, 1000));

        // First admission falls out of the window
        clock.advance(801);
        assert!(limiter.check_limit("k", 3, 1000));
        assert!(!limiter.check_limit("k", 3, 1000));
    }

    #[test]
    fn test_timestamp_exactly_window_old_is_evicted() {
        let (limiter, clock) = limiter_at(0);

        assert!(limiter.check_limit("k", 1, 1000));
        clock.advance(999);
        assert!(!limiter.check_limit("k", 1, 1000));
        clock.advance(1);
        assert!(limiter.check_limit("k", 1, 1000));
    }

    #[test]
    fn test_keys_are_independent() {
        let (limiter, _clock) = limiter_at(0);

        assert!(limiter.check_limit("a", 1, 1000));
        assert!(!limiter.check_limit("a", 1, 1000));
        assert!(limiter.check_limit("b", 1, 1000));
        assert!(!limiter.check_limit("b", 1, 1000));
    }

    #[test]
    fn test_denied_attempts_not_recorded() {
        let (limiter, clock) = limiter_at(0);

        assert!(limiter.check_limit("k", 1, 1000));
        for _ in 0..50 {
            clock.advance(10);
            assert!(!limiter.check_limit("k", 1, 1000));
        }
        // 500ms of denials didn't push the window forward
        clock.advance(500);
        assert!(limiter.check_limit("k", 1, 1000));
    }

    #[test]
    fn test_zero_limit_always_denies_without_tracking() {
        let (limiter, _clock) = limiter_at(0);

        assert!(!limiter.check_limit("k", 0, 1000));
        assert_eq!(limiter.tracked_keys(), 0);
    }

    #[test]
    fn test_remaining_has_no_side_effect() {
        let (limiter, clock) = limiter_at(0);

        assert_eq!(limiter.remaining("k", 3, 1000), 3);
        limiter.check_limit("k", 3, 1000);
        assert_eq!(limiter.remaining("k", 3, 1000), 2);
        assert_eq!(limiter.remaining("k", 3, 1000), 2);

        clock.advance(1000);
        assert_eq!(limiter.remaining("k", 3, 1000), 3);
    }

    #[test]
    fn test_reset() {
        let (limiter, _clock) = limiter_at(0);

        assert!(limiter.check_limit("k", 1, 1000));
        limiter.reset("k");
        assert!(limiter.check_limit("k", 1, 1000));
    }

    #[test]
    fn test_cleanup_drops_stale_keys() {
        let (limiter, clock) = limiter_at(0);

        limiter.check_limit("old", 10, DEFAULT_WINDOW_MS);
        clock.advance(DEFAULT_RETENTION_MS - 1000);
        limiter.check_limit("recent", 10, DEFAULT_WINDOW_MS);
        assert_eq!(limiter.tracked_keys(), 2);

        clock.advance(1000);
        assert_eq!(limiter.cleanup(), 1);
        assert_eq!(limiter.tracked_keys(), 1);
        assert_eq!(limiter.remaining("recent", 10, DEFAULT_RETENTION_MS), 9);
    }

    /// Counts info-level events, which is where cleanup results are audited
    #[derive(Clone, Default)]
    struct InfoCounter(Arc<std::sync::atomic::AtomicUsize>);

    impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for InfoCounter {
        fn on_event(
            &self,
            event: &tracing::Event<'_>,
            _ctx: tracing_subscriber::layer::Context<'_, S>,
        ) {
            if *event.metadata().level() == tracing::Level::INFO {
                self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            }
        }
    }

    #[test]
    fn test_cleanup_audits_only_when_keys_removed() {
        use tracing_subscriber::layer::SubscriberExt;

        let counter = InfoCounter::default();
        let subscriber = tracing_subscriber::registry().with(counter.clone());
        let (limiter, clock) = limiter_at(0);

        tracing::subscriber::with_default(subscriber, || {
            assert_eq!(limiter.cleanup(), 0);
            limiter.check_limit("k", 10, DEFAULT_WINDOW_MS);
            assert_eq!(limiter.cleanup(), 0);
            assert_eq!(counter.0.load(std::sync::atomic::Ordering::SeqCst), 0);

            clock.advance(DEFAULT_RETENTION_MS);
            assert_eq!(limiter.cleanup(), 1);
            assert_eq!(counter.0.load(std::sync::atomic::Ordering::SeqCst), 1);
        });
    }

    #[test]
    fn test_cleanup_keeps_partially_stale_keys() {
        let clock = ManualClock::new(0);
        let limiter = RateLimiter::new("test", Arc::new(clock.clone())).with_retention_ms(1000);

        limiter.check_limit("k", 10, 10_000);
        clock.advance(600);
        limiter.check_limit("k", 10, 10_000);
        clock.advance(600);

        assert_eq!(limiter.cleanup(), 0);
        assert_eq!(limiter.remaining("k", 10, 10_000), 9);
    }

    #[test]
    fn test_check_does_not_touch_other_keys() {
        let (limiter, clock) = limiter_at(0);

        limiter.check_limit("idle", 5, 1000);
        clock.advance(5000);
        limiter.check_limit("busy", 5, 1000);

        // "idle" is stale but only cleanup or its own check reclaims it
        assert_eq!(limiter.tracked_keys(), 2);
    }

    #[test]
    fn test_shared_across_threads() {
        let (limiter, _clock) = limiter_at(0);
        let limiter = Arc::new(limiter);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                std::thread::spawn(move || {
                    (0..50)
                        .filter(|_| limiter.check_limit("shared", 100, 1000))
                        .count()
                })
            })
            .collect();

        let admitted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(admitted, 100);
    }
}
