//! Typed widget configuration.

use crate::common::rate_limit::RateLimitSettings;
use crate::common::security::{
    audit_logger, check_url, input_validation::DEFAULT_MAX_FILE_SIZE, sanitize_config, FileRules,
    ValidationError,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Keys whose values are URLs. These are validated rather than escaped, since
/// entity-escaping would corrupt query strings.
const URL_KEYS: &[&str] = &["apiEndpoint"];

/// Optional settings an explicit `null` switches off. Paths are key
/// sequences from the top-level object.
const NULLABLE_PATHS: &[&[&str]] = &[
    &["greeting"],
    &["companyName"],
    &["apiEndpoint"],
    &["rateLimits", "cleanupIntervalMs"],
];

const DEFAULT_PRIMARY_COLOR: &str = "#007bff";

/// CSS hex colours only; anything else could break out of a style rule
static COLOR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#(?:[0-9a-fA-F]{3,4}|[0-9a-fA-F]{6}|[0-9a-fA-F]{8})$").unwrap());

/// Errors from configuration ingestion
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// The configuration was neither an object nor null
    InvalidShape { found: &'static str },
    /// A value had the wrong type
    Invalid { reason: String },
    /// The API endpoint failed URL validation
    Endpoint(ValidationError),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidShape { found } => {
                write!(f, "Widget configuration must be an object, got {}", found)
            }
            ConfigError::Invalid { reason } => {
                write!(f, "Invalid widget configuration: {}", reason)
            }
            ConfigError::Endpoint(err) => write!(f, "Invalid API endpoint: {}", err),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Endpoint(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for ConfigError {
    fn from(err: ValidationError) -> Self {
        ConfigError::Endpoint(err)
    }
}

/// Corner the launcher is anchored to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Position {
    #[default]
    BottomRight,
    BottomLeft,
}

/// Widget options after sanitization.
///
/// Build it with [`WidgetConfig::from_value`] when the options come from an
/// untrusted source; every text field is then already escaped.
///
/// # Examples
///
/// ```
/// use chat_widget_core::widget::WidgetConfig;
/// use serde_json::json;
///
/// let config = WidgetConfig::from_value(&json!({
///     "title": "<b>Support</b>",
///     "apiEndpoint": "https://api.example.com/chat?lang=en&v=2",
///     "allowedDomains": ["example.com"],
/// }))
/// .unwrap();
///
/// assert_eq!(config.title, "&lt;b&gt;Support&lt;/b&gt;");
/// assert_eq!(
///     config.api_endpoint.as_deref(),
///     Some("https://api.example.com/chat?lang=en&v=2")
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WidgetConfig {
    pub title: String,
    pub subtitle: String,
    /// Bot message shown when a session opens
    pub greeting: Option<String>,
    pub placeholder: String,
    pub company_name: Option<String>,
    pub primary_color: String,
    pub position: Position,
    /// Endpoint the response source posts to
    pub api_endpoint: Option<String>,
    /// Hosts (and their subdomains) the endpoint may point at; empty allows any
    pub allowed_domains: Vec<String>,
    pub max_message_length: usize,
    pub allow_file_upload: bool,
    pub max_file_size: u64,
    pub allowed_file_types: Vec<String>,
    pub quick_replies: Vec<String>,
    pub request_timeout_ms: u64,
    pub rate_limits: RateLimitSettings,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        let file_rules = FileRules::default();
        Self {
            title: "Chat with us".to_string(),
            subtitle: "We typically reply in a few minutes".to_string(),
            greeting: Some("Hi! How can we help you today?".to_string()),
            placeholder: "Type your message...".to_string(),
            company_name: None,
            primary_color: DEFAULT_PRIMARY_COLOR.to_string(),
            position: Position::default(),
            api_endpoint: None,
            allowed_domains: Vec::new(),
            max_message_length: 1000,
            allow_file_upload: false,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            allowed_file_types: file_rules.allowed_types,
            quick_replies: Vec::new(),
            request_timeout_ms: 30_000,
            rate_limits: RateLimitSettings::default(),
        }
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// The sanitizer drops nulls, which would let serde fill the default back
/// in. Put them back for the optional settings so `null` means `None`.
fn restore_nulls(raw: &Value, sanitized: &mut Map<String, Value>) {
    'paths: for path in NULLABLE_PATHS {
        let Some((last, parents)) = path.split_last() else {
            continue;
        };

        let pointer = format!("/{}", path.join("/"));
        if !matches!(raw.pointer(&pointer), Some(Value::Null)) {
            continue;
        }

        let mut target = &mut *sanitized;
        for key in parents {
            target = match target
                .entry(key.to_string())
                .or_insert_with(|| Value::Object(Map::new()))
            {
                Value::Object(map) => map,
                _ => continue 'paths,
            };
        }
        target.insert(last.to_string(), Value::Null);
    }
}

impl WidgetConfig {
    /// Ingest untrusted configuration.
    ///
    /// Runs the config sanitizer over `raw`, then deserializes the result.
    /// URL-valued keys bypass escaping and must instead pass
    /// [`check_url`] against `allowedDomains`. A `primaryColor` that isn't a
    /// hex colour falls back to the default. `null` yields the defaults, and
    /// an explicit `null` for an optional setting (greeting, company name,
    /// endpoint, cleanup interval) turns it off.
    pub fn from_value(raw: &Value) -> Result<Self, ConfigError> {
        let audit = audit_logger();

        let raw_object = match raw {
            Value::Object(map) => map,
            Value::Null => return Ok(Self::default()),
            other => {
                return Err(ConfigError::InvalidShape {
                    found: value_kind(other),
                })
            }
        };

        let mut sanitized = sanitize_config(raw);
        for &key in URL_KEYS {
            match raw_object.get(key) {
                Some(original @ Value::String(_)) => {
                    sanitized.insert(key.to_string(), original.clone());
                }
                _ => {
                    sanitized.remove(key);
                }
            }
        }
        restore_nulls(raw, &mut sanitized);
        audit.log_config_sanitized(sanitized.len());

        let mut config: WidgetConfig = serde_json::from_value(Value::Object(sanitized))
            .map_err(|e| ConfigError::Invalid {
                reason: e.to_string(),
            })?;

        if let Some(endpoint) = &config.api_endpoint {
            if let Err(err) = check_url(endpoint, &config.allowed_domains) {
                audit.log_url_rejected(endpoint, &err.to_string());
                return Err(err.into());
            }
        }

        if !COLOR_PATTERN.is_match(&config.primary_color) {
            tracing::warn!(
                color = %config.primary_color,
                "primaryColor is not a hex colour, using default"
            );
            config.primary_color = DEFAULT_PRIMARY_COLOR.to_string();
        }

        Ok(config)
    }

    /// Upload constraints derived from this configuration
    pub fn file_rules(&self) -> FileRules {
        FileRules {
            max_size: self.max_file_size,
            allowed_types: self.allowed_file_types.clone(),
        }
    }
}
