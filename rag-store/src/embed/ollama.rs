//! Ollama embedding provider implementation.
//!
//! Delegates HTTP to [`OllamaService`] and enforces the configured dimension.

use std::{future::Future, pin::Pin, sync::Arc};

use ai_llm_service::services::ollama_service::OllamaService;
use tracing::warn;

use crate::{EmbeddingsProvider, RagError};

/// Configuration for the Ollama embedding backend.
#[derive(Clone, Debug)]
pub struct OllamaConfig {
    pub svc: Arc<OllamaService>,
    /// Expected embedding dimension size.
    pub dim: usize,
}

/// Ollama embedding provider (async).
#[derive(Clone, Debug)]
pub struct OllamaEmbedder {
    svc: Arc<OllamaService>,
    dim: usize,
}

impl OllamaEmbedder {
    /// Construct a new embedder from configuration.
    pub fn new(cfg: OllamaConfig) -> Self {
        Self {
            svc: cfg.svc,
            dim: cfg.dim,
        }
    }
}

impl EmbeddingsProvider for OllamaEmbedder {
    fn embed<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<f32>, RagError>> + Send + 'a>> {
        Box::pin(async move {
            let v = self.svc.embeddings(text).await?;

            if v.len() != self.dim {
                warn!(got = v.len(), want = self.dim, "embedding dimension mismatch");
                return Err(RagError::VectorSizeMismatch {
                    got: v.len(),
                    want: self.dim,
                });
            }

            Ok(v)
        })
    }
}
