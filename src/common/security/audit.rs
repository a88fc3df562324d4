/// Audit logging for security-relevant widget events
/// Emits structured JSON events through tracing
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Longest attacker-controlled value copied into an audit event
const MAX_LOGGED_VALUE_LEN: usize = 64;

/// Security levels for audit events
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SecurityLevel {
    /// Informational security event (normal operation)
    Info,
    /// Warning - suspicious but handled
    Warning,
    /// Error - security violation
    Error,
    /// Critical - serious abuse attempt
    Critical,
}

/// Audit event types
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event_type")]
pub enum AuditEvent {
    /// Action denied by a rate limiter
    RateLimitExceeded {
        limiter: String,
        key: String,
        limit: usize,
        window_ms: u64,
    },

    /// Input validation failure
    ValidationFailed {
        field: String,
        value: String,
        reason: String,
    },

    /// URL rejected by the validator
    UrlRejected { url: String, reason: String },

    /// Widget configuration ingested through the config sanitizer
    ConfigSanitized { keys: usize },

    /// Periodic limiter maintenance finished
    CleanupCompleted {
        limiter: String,
        keys_removed: usize,
        keys_remaining: usize,
    },

    /// Outbound response source failed or timed out
    ResponseSourceFailed { session_id: String, reason: String },
}

/// Shorten a value for logging, on a character boundary
fn preview(value: &str) -> String {
    if value.chars().count() <= MAX_LOGGED_VALUE_LEN {
        value.to_string()
    } else {
        let mut short: String = value.chars().take(MAX_LOGGED_VALUE_LEN).collect();
        short.push('…');
        short
    }
}

/// Audit logger implementation
#[derive(Clone, Debug, Default)]
pub struct AuditLogger {
    _marker: std::marker::PhantomData<()>,
}

impl AuditLogger {
    /// Create a new audit logger
    pub fn new() -> Self {
        Self {
            _marker: std::marker::PhantomData,
        }
    }

    /// Log an audit event with security level
    pub fn log(&self, level: SecurityLevel, event: AuditEvent) {
        let event_json = serde_json::to_string(&event)
            .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize event: {}\"}}", e));

        match level {
            SecurityLevel::Info => {
                info!(
                    security_level = "info",
                    event = %event_json,
                    "Security audit event"
                );
            }
            SecurityLevel::Warning => {
                warn!(
                    security_level = "warning",
                    event = %event_json,
                    "Security audit warning"
                );
            }
            SecurityLevel::Error => {
                error!(
                    security_level = "error",
                    event = %event_json,
                    "Security audit error"
                );
            }
            SecurityLevel::Critical => {
                error!(
                    security_level = "critical",
                    event = %event_json,
                    "CRITICAL security audit event"
                );
            }
        }
    }

    /// Log rate limit exceeded
    pub fn log_rate_limit_exceeded(&self, limiter: &str, key: &str, limit: usize, window_ms: u64) {
        let event = AuditEvent::RateLimitExceeded {
            limiter: limiter.to_string(),
            key: preview(key),
            limit,
            window_ms,
        };

        self.log(SecurityLevel::Warning, event);
    }

    /// Log validation failure
    pub fn log_validation_failure(&self, field: &str, value: &str, reason: &str) {
        let event = AuditEvent::ValidationFailed {
            field: field.to_string(),
            value: preview(value),
            reason: reason.to_string(),
        };

        self.log(SecurityLevel::Warning, event);
    }

    /// Log rejected URL
    pub fn log_url_rejected(&self, url: &str, reason: &str) {
        let event = AuditEvent::UrlRejected {
            url: preview(url),
            reason: reason.to_string(),
        };

        self.log(SecurityLevel::Error, event);
    }

    /// Log configuration ingestion
    pub fn log_config_sanitized(&self, keys: usize) {
        self.log(SecurityLevel::Info, AuditEvent::ConfigSanitized { keys });
    }

    /// Log limiter maintenance
    pub fn log_cleanup(&self, limiter: &str, keys_removed: usize, keys_remaining: usize) {
        let event = AuditEvent::CleanupCompleted {
            limiter: limiter.to_string(),
            keys_removed,
            keys_remaining,
        };

        self.log(SecurityLevel::Info, event);
    }

    /// Log response source failure
    pub fn log_response_source_failure(&self, session_id: &str, reason: &str) {
        let event = AuditEvent::ResponseSourceFailed {
            session_id: session_id.to_string(),
            reason: preview(reason),
        };

        self.log(SecurityLevel::Warning, event);
    }
}

/// Global audit logger instance
static AUDIT_LOGGER: once_cell::sync::Lazy<Arc<AuditLogger>> =
    once_cell::sync::Lazy::new(|| Arc::new(AuditLogger::new()));

/// Get global audit logger
pub fn audit_logger() -> Arc<AuditLogger> {
    Arc::clone(&AUDIT_LOGGER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_logger_creation() {
        let logger = AuditLogger::new();
        logger.log_rate_limit_exceeded("message", "session-1", 10, 60_000);
        logger.log_cleanup("upload", 3, 1);
    }

    #[test]
    fn test_global_audit_logger() {
        let logger = audit_logger();
        logger.log_validation_failure("message", "x", "too long");
        assert!(Arc::ptr_eq(&logger, &audit_logger()));
    }

    #[test]
    fn test_event_serialization_tagged() {
        let event = AuditEvent::UrlRejected {
            url: "javascript:alert(1)".to_string(),
            reason: "scheme".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event_type"], "UrlRejected");
        assert_eq!(json["url"], "javascript:alert(1)");
    }

    #[test]
    fn test_preview_truncates_long_values() {
        let long = "<".repeat(500);
        let short = preview(&long);
        assert_eq!(short.chars().count(), MAX_LOGGED_VALUE_LEN + 1);
        assert!(short.ends_with('…'));
        assert_eq!(preview("short"), "short");
    }
}
