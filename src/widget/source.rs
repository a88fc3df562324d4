//! Where bot replies come from.

use super::types::{ChatRequest, ChatResponse};
use std::future::Future;

/// Failure reported by a response source.
///
/// The text is for logs only and never reaches the rendered conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// The request could not be delivered or the endpoint failed
    Transport(String),
    /// The endpoint answered with something unusable
    InvalidResponse(String),
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceError::Transport(reason) => write!(f, "transport failure: {}", reason),
            SourceError::InvalidResponse(reason) => write!(f, "invalid response: {}", reason),
        }
    }
}

impl std::error::Error for SourceError {}

/// External producer of bot replies: an HTTP client for the configured
/// endpoint, or a caller-driven handler.
///
/// Each call is independent and may fail; the session applies the timeout.
pub trait ResponseSource: Send + Sync {
    fn respond(
        &self,
        request: ChatRequest,
    ) -> impl Future<Output = Result<ChatResponse, SourceError>> + Send;
}

/// Adapts an async closure into a [`ResponseSource`].
///
/// # Examples
///
/// ```
/// use chat_widget_core::widget::{ChatRequest, ChatResponse, HandlerSource, SourceError};
///
/// let source = HandlerSource::new(|request: ChatRequest| async move {
///     Ok::<_, SourceError>(ChatResponse {
///         response: format!("You said: {}", request.message),
///         session_id: request.session_id,
///     })
/// });
/// # let _ = source;
/// ```
pub struct HandlerSource<F> {
    handler: F,
}

impl<F> HandlerSource<F> {
    pub fn new(handler: F) -> Self {
        Self { handler }
    }
}

impl<F, Fut> ResponseSource for HandlerSource<F>
where
    F: Fn(ChatRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Result<ChatResponse, SourceError>> + Send,
{
    fn respond(
        &self,
        request: ChatRequest,
    ) -> impl Future<Output = Result<ChatResponse, SourceError>> + Send {
        (self.handler)(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_handler_source_echo() {
        let source = HandlerSource::new(|request: ChatRequest| async move {
            Ok::<_, SourceError>(ChatResponse {
                response: request.message.to_uppercase(),
                session_id: request.session_id,
            })
        });

        let response = source
            .respond(ChatRequest {
                message: "ping".to_string(),
                session_id: "s1".to_string(),
                user_id: None,
            })
            .await
            .unwrap();

        assert_eq!(response.response, "PING");
        assert_eq!(response.session_id, "s1");
    }

    #[test]
    fn test_source_error_display() {
        let err = SourceError::Transport("connection refused".to_string());
        assert_eq!(err.to_string(), "transport failure: connection refused");
    }
}
