//! Common infrastructure shared by every widget instance.
//!
//! # Modules
//!
//! - [`security`] - Sanitization, URL/file validation, secure ids, config
//!   sanitization and audit logging
//! - [`rate_limit`] - Sliding-window limiters and their registry
//! - [`clock`] - Injectable time source
//! - [`logging`] - Tracing subscriber setup for host applications
//!
//! # Architecture
//!
//! ```text
//! ChatSession (widget)
//!   ├── WidgetConfig  <- sanitize_config / validate_url
//!   ├── Arc<LimiterRegistry> (shared across sessions)
//!   │   └── message / upload / general RateLimiter
//!   └── Arc<AuditLogger> (security event logging)
//! ```

pub mod clock;
pub mod logging;
pub mod rate_limit;
pub mod security;
