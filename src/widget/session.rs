use super::config::WidgetConfig;
use super::source::{ResponseSource, SourceError};
use super::types::{ChatRequest, Message, MessageKind, Sender};
use crate::common::clock::{system_clock, Clock};
use crate::common::rate_limit::{LimitCategory, LimiterRegistry};
use crate::common::security::{
    check_file, check_message, sanitize_file_name, AuditLogger, IdGenerator, ValidationError,
    DEFAULT_ID_LENGTH,
};
use std::sync::Arc;
use std::time::Duration;

/// Why a user action was not carried out
#[derive(Debug, Clone)]
pub enum SendError {
    /// Input failed validation
    Validation(ValidationError),
    /// A rate limiter denied the action
    RateLimited { category: LimitCategory },
    /// The response source failed
    Source(SourceError),
    /// The response source didn't answer in time
    Timeout { timeout_ms: u64 },
    /// Uploads are switched off in the configuration
    UploadsDisabled,
    /// The session was closed
    Closed,
}

impl SendError {
    /// Fixed text safe to show in the conversation. Never includes internal
    /// error detail.
    pub fn user_message(&self) -> &'static str {
        match self {
            SendError::Validation(ValidationError::TooLong { .. }) => {
                "Your message is too long. Please shorten it and try again."
            }
            SendError::Validation(_) => "That input can't be sent. Please check it and try again.",
            SendError::RateLimited { .. } => {
                "You're sending messages too quickly. Please wait a moment."
            }
            SendError::Source(_) | SendError::Timeout { .. } => {
                "Sorry, something went wrong. Please try again."
            }
            SendError::UploadsDisabled => "File uploads are not available.",
            SendError::Closed => "This conversation has ended.",
        }
    }
}

impl std::fmt::Display for SendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SendError::Validation(err) => write!(f, "validation failed: {}", err),
            SendError::RateLimited { category } => {
                write!(f, "rate limit exceeded for {}", category.as_str())
            }
            SendError::Source(err) => write!(f, "response source failed: {}", err),
            SendError::Timeout { timeout_ms } => {
                write!(f, "response source timed out after {} ms", timeout_ms)
            }
            SendError::UploadsDisabled => write!(f, "file uploads are disabled"),
            SendError::Closed => write!(f, "session is closed"),
        }
    }
}

impl std::error::Error for SendError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SendError::Validation(err) => Some(err),
            SendError::Source(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for SendError {
    fn from(err: ValidationError) -> Self {
        SendError::Validation(err)
    }
}

/// One open conversation: its history plus the gates every user action goes
/// through.
///
/// A send runs: validate → `message` limiter → sanitize → store → `general`
/// limiter → response source (with timeout) → sanitize reply → store.
/// Limiters are keyed by user id when set, otherwise by session id.
pub struct ChatSession<S> {
    id: String,
    user_id: Option<String>,
    config: WidgetConfig,
    limiters: Arc<LimiterRegistry>,
    audit: Arc<AuditLogger>,
    clock: Arc<dyn Clock>,
    ids: IdGenerator,
    source: S,
    messages: Vec<Message>,
    closed: bool,
}

impl<S: ResponseSource> ChatSession<S> {
    /// Open a session using the system clock.
    ///
    /// # Arguments
    /// * `config` - Sanitized widget configuration
    /// * `limiters` - Registry shared by every session in the process
    /// * `audit` - Shared audit logger for security logging
    /// * `source` - Producer of bot replies
    pub fn new(
        config: WidgetConfig,
        limiters: Arc<LimiterRegistry>,
        audit: Arc<AuditLogger>,
        source: S,
    ) -> Self {
        Self::with_clock(config, limiters, audit, source, system_clock())
    }

    /// Open a session reading time from `clock`
    pub fn with_clock(
        config: WidgetConfig,
        limiters: Arc<LimiterRegistry>,
        audit: Arc<AuditLogger>,
        source: S,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let ids = IdGenerator::default();
        let mut session = Self {
            id: ids.generate(DEFAULT_ID_LENGTH),
            user_id: None,
            config,
            limiters,
            audit,
            clock,
            ids,
            source,
            messages: Vec::new(),
            closed: false,
        };

        // Config text is already escaped; store it verbatim rather than
        // escaping it a second time.
        if let Some(greeting) = session.config.greeting.clone() {
            if !greeting.is_empty() {
                let message = Message::from_sanitized(
                    session.ids.generate(DEFAULT_ID_LENGTH),
                    Sender::Bot,
                    MessageKind::Text,
                    greeting,
                    session.clock.now_ms(),
                );
                session.messages.push(message);
            }
        }

        tracing::debug!(session_id = %session.id, "chat session opened");
        session
    }

    pub fn session_id(&self) -> &str {
        &self.id
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// Attach a user identity; rate limits follow the user across sessions
    pub fn set_user_id(&mut self, user_id: Option<String>) {
        self.user_id = user_id.filter(|id| !id.trim().is_empty());
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    /// History in arrival order
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// End the session and drop its history
    pub fn close(&mut self) {
        self.messages.clear();
        self.closed = true;
        tracing::debug!(session_id = %self.id, "chat session closed");
    }

    fn limit_key(&self) -> &str {
        self.user_id.as_deref().unwrap_or(&self.id)
    }

    fn new_message(&self, sender: Sender, kind: MessageKind, raw_text: &str) -> Message {
        Message::from_untrusted(
            self.ids.generate(DEFAULT_ID_LENGTH),
            sender,
            kind,
            raw_text,
            self.clock.now_ms(),
        )
    }

    fn push(&mut self, message: Message) -> Result<&Message, SendError> {
        self.messages.push(message);
        let Some(stored) = self.messages.last() else {
            return Err(SendError::Closed);
        };
        Ok(stored)
    }

    fn admit(&self, category: LimitCategory) -> Result<(), SendError> {
        if self.limiters.check(category, self.limit_key()) {
            Ok(())
        } else {
            Err(SendError::RateLimited { category })
        }
    }

    /// Send a user message and wait for the reply.
    ///
    /// Returns the stored bot reply. When the outbound call is throttled or
    /// fails, the user's message stays in the history.
    pub async fn send(&mut self, text: &str) -> Result<&Message, SendError> {
        if self.closed {
            return Err(SendError::Closed);
        }

        if let Err(err) = check_message(text, self.config.max_message_length) {
            self.audit
                .log_validation_failure(err.field(), text, &err.to_string());
            return Err(err.into());
        }
        self.admit(LimitCategory::Message)?;

        let user_message = self.new_message(Sender::User, MessageKind::Text, text.trim());
        let outgoing = user_message.text().to_string();
        self.messages.push(user_message);

        self.admit(LimitCategory::General)?;

        let request = ChatRequest {
            message: outgoing,
            session_id: self.id.clone(),
            user_id: self.user_id.clone(),
        };
        let timeout_ms = self.config.request_timeout_ms;

        let response = match tokio::time::timeout(
            Duration::from_millis(timeout_ms),
            self.source.respond(request),
        )
        .await
        {
            Ok(Ok(response)) => response,
            Ok(Err(err)) => {
                self.audit
                    .log_response_source_failure(&self.id, &err.to_string());
                return Err(SendError::Source(err));
            }
            Err(_) => {
                self.audit
                    .log_response_source_failure(&self.id, &format!("timed out after {} ms", timeout_ms));
                return Err(SendError::Timeout { timeout_ms });
            }
        };

        if response.response.trim().is_empty() {
            let err = SourceError::InvalidResponse("empty response".to_string());
            self.audit
                .log_response_source_failure(&self.id, &err.to_string());
            return Err(SendError::Source(err));
        }
        if response.session_id != self.id {
            tracing::debug!(
                session_id = %self.id,
                "response carried a different session id"
            );
        }

        let reply = self.new_message(Sender::Bot, MessageKind::Text, &response.response);
        self.push(reply)
    }

    /// Append a bot message pushed by the host (event-handler mode)
    pub fn push_bot_message(&mut self, text: &str) -> Result<&Message, SendError> {
        if self.closed {
            return Err(SendError::Closed);
        }
        let message = self.new_message(Sender::Bot, MessageKind::Text, text);
        self.push(message)
    }

    /// Record a file offered for upload.
    ///
    /// The stored message text is the sanitized filename. The file bytes
    /// themselves are the host's concern.
    pub fn upload(&mut self, name: &str, size: u64, mime: &str) -> Result<&Message, SendError> {
        if self.closed {
            return Err(SendError::Closed);
        }
        if !self.config.allow_file_upload {
            return Err(SendError::UploadsDisabled);
        }

        if let Err(err) = check_file(name, size, mime, &self.config.file_rules()) {
            self.audit
                .log_validation_failure(err.field(), name, &err.to_string());
            return Err(err.into());
        }
        self.admit(LimitCategory::Upload)?;

        let kind = if mime.trim().to_ascii_lowercase().starts_with("image/") {
            MessageKind::Image
        } else {
            MessageKind::File
        };
        let message = self.new_message(Sender::User, kind, &sanitize_file_name(name));
        self.push(message)
    }
}
