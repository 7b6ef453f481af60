//! Typed errors for the course-rag crate.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RagSystemError {
    /// Model transport/provider failures; propagated unchanged.
    #[error(transparent)]
    Llm(#[from] ai_llm_service::AiLlmError),

    /// Errors from the underlying rag-store crate.
    #[error("RAG error: {0}")]
    Store(#[from] rag_store::RagError),

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Tool(#[from] ToolError),
}

/// Tool registration failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ToolError {
    #[error("Tool must have a 'name' in its definition")]
    MissingName,
}

/// Failures while reading or parsing a course document.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("IO error reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("document {0:?} is empty")]
    Empty(PathBuf),

    #[error("document {0:?} has no course title")]
    MissingTitle(PathBuf),

    #[error("invalid chunking parameters: {0}")]
    InvalidChunking(&'static str),

    #[error("pattern error: {0}")]
    Pattern(#[from] regex::Error),
}
