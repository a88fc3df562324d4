//! Sliding-window admission control.
//!
//! A [`RateLimiter`] bounds admitted actions per key within a trailing
//! window. The [`LimiterRegistry`] holds one limiter per action category
//! (messages, uploads, general/API) and owns the optional cleanup task that
//! keeps long-lived processes from accumulating stale keys.
//!
//! Callers consult the registry *before* any side effect and turn a `false`
//! into a throttling notice. Choosing the key (session, user, connection) is
//! the caller's decision.
//!
//! ```text
//! LimiterRegistry
//!   ├── message  (RateLimiter)
//!   ├── upload   (RateLimiter)
//!   ├── general  (RateLimiter)
//!   └── spawn_cleanup() -> periodic cleanup_all()
//! ```

pub mod limiter;
pub mod registry;
pub mod settings;

pub use limiter::{RateLimiter, DEFAULT_RETENTION_MS, DEFAULT_WINDOW_MS};
pub use registry::{LimitCategory, LimiterRegistry};
pub use settings::{LimitRule, RateLimitSettings};
