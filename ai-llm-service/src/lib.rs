//! HTTP clients for the models behind the course assistant.
//!
//! - [`services::anthropic_service::AnthropicService`]: Messages API with tool use
//! - [`services::ollama_service::OllamaService`]: embeddings
//!
//! Wire types and the [`messages::MessagesApi`] seam live in [`messages`].

pub mod config;
pub mod error_handler;
pub mod messages;
pub mod services;
pub mod telemetry;

pub use error_handler::{AiLlmError, Result};
pub use messages::{
    ContentBlock, Message, MessageContent, MessagesApi, MessagesFuture, MessagesRequest,
    MessagesResponse, Role, StopReason, ToolChoice, ToolDefinition,
};
