//! Security layer for the chat widget.
//!
//! Everything a widget renders or sends passes through this module first.
//! None of the public checks panic or return errors for bad input: sanitizers
//! fall back to a safe value and validators return `false`. The `check_*`
//! variants return a [`ValidationError`] for callers that need the reason.
//!
//! # Modules
//!
//! - [`sanitize`] - HTML text, attribute and filename sanitization
//! - [`url_validation`] - http(s) scheme and domain allow-list checks
//! - [`input_validation`] - message length and upload checks
//! - [`secure_id`] - alphanumeric ids for messages and sessions
//! - [`config_sanitizer`] - recursive escaping of widget configuration
//! - [`audit`] - security event logging
//!
//! # Examples
//!
//! ```
//! use chat_widget_core::common::security::{sanitize_text, validate_url};
//!
//! assert_eq!(sanitize_text("<b>hi</b>"), "&lt;b&gt;hi&lt;/b&gt;");
//! assert!(!validate_url("javascript:alert(1)", &[]));
//! assert!(validate_url("https://api.example.com", &["example.com".to_string()]));
//! ```
//!
//! # Threat Model
//!
//! - **XSS**: element and attribute escaping, config sanitization
//! - **Open redirect / script URLs**: scheme allow-list, anchored domain match
//! - **Path Traversal**: filename sanitization and upload checks
//! - **Abuse amplification**: see [`crate::common::rate_limit`]

pub mod audit;
pub mod config_sanitizer;
pub mod input_validation;
pub mod sanitize;
pub mod secure_id;
pub mod url_validation;

pub use audit::{audit_logger, AuditEvent, AuditLogger, SecurityLevel};
pub use config_sanitizer::{sanitize_config, sanitize_config_deep};
pub use input_validation::{
    check_file, check_message, validate_file, validate_length, FileRules, ValidationError,
};
pub use sanitize::{
    sanitize_attribute, sanitize_file_name, sanitize_text, RenderContext, Sanitizer,
};
pub use secure_id::{generate_secure_id, EntropySource, IdGenerator, DEFAULT_ID_LENGTH};
pub use url_validation::{check_url, validate_url};
