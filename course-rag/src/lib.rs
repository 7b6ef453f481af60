//! Course question answering over a vector store with model-driven search.
//!
//! Public API: [`RagSystem`]. A query is wrapped into a course prompt, sent to
//! the model together with the `search_course_content` tool, and answered in
//! at most two model calls. Citations gathered by the tool are returned next
//! to the answer and cleared before the next query.
//!
//! # Example
//! ```no_run
//! # use course_rag::{RagSystem, RagSystemConfig};
//! # #[tokio::main] async fn main() {
//! let mut rag = RagSystem::from_config(RagSystemConfig::from_env()).await.unwrap();
//! let session = rag.create_session();
//! let (answer, sources) = rag.query("What is MCP?", Some(&session)).await.unwrap();
//! println!("{answer} ({} sources)", sources.len());
//! # }
//! ```

mod ai_generator;
mod api_types;
mod cfg;
mod document_processor;
mod error;
mod progress;
mod rag_system;
mod search_tools;
mod session_manager;

#[cfg(test)]
mod test_support;

pub use ai_generator::{AiGenerator, SYSTEM_PROMPT};
pub use api_types::{CourseAnalytics, Source};
pub use cfg::RagSystemConfig;
pub use document_processor::DocumentProcessor;
pub use error::{DocumentError, RagSystemError, ToolError};
pub use progress::{IndicatifProgress, NoopProgress, Progress};
pub use rag_system::RagSystem;
pub use search_tools::{CourseSearchTool, SEARCH_TOOL_NAME, Tool, ToolFuture, ToolManager};
pub use session_manager::{MessageRole, SessionManager, SessionMessage};
