//! Headless widget orchestration.
//!
//! This module is the consumer of [`crate::common`]: it turns untrusted
//! configuration into a [`WidgetConfig`], keeps a session's message history,
//! and runs every user action through validation, rate limiting and
//! sanitization before anything is stored or sent. Rendering (DOM, CSS,
//! framework adapters) is left to the host.
//!
//! # Components
//!
//! - [`WidgetConfig`] - sanitized, typed widget options
//! - [`ChatSession`] - message history plus send/upload pipelines
//! - [`ResponseSource`] - where bot replies come from ([`HandlerSource`] for
//!   caller-driven replies)
//! - [`Message`], [`ChatRequest`], [`ChatResponse`] - message model and wire
//!   format
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use chat_widget_core::common::rate_limit::LimiterRegistry;
//! use chat_widget_core::common::security::audit_logger;
//! use chat_widget_core::widget::{
//!     ChatRequest, ChatResponse, ChatSession, HandlerSource, SourceError, WidgetConfig,
//! };
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let limiters = Arc::new(LimiterRegistry::default());
//! let source = HandlerSource::new(|request: ChatRequest| async move {
//!     Ok::<_, SourceError>(ChatResponse {
//!         response: "Thanks for reaching out!".to_string(),
//!         session_id: request.session_id,
//!     })
//! });
//!
//! let mut session = ChatSession::new(WidgetConfig::default(), limiters, audit_logger(), source);
//! let reply = session.send("<b>hello</b>").await?;
//! assert_eq!(reply.text(), "Thanks for reaching out!");
//! assert_eq!(session.messages()[1].text(), "&lt;b&gt;hello&lt;/b&gt;");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod session;
pub mod source;
pub mod types;

pub use config::{ConfigError, Position, WidgetConfig};
pub use session::{ChatSession, SendError};
pub use source::{HandlerSource, ResponseSource, SourceError};
pub use types::{ChatRequest, ChatResponse, Message, MessageKind, Sender};
