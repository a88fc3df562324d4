// Library exports for chat-widget-core
// The security and rate-limiting core lives in `common`; `widget` consumes it

pub mod common;
pub mod widget;
