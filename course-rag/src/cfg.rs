//! Runtime configuration loaded from environment variables.

use std::path::PathBuf;

use ai_llm_service::error_handler::{ConfigError, Result as LlmResult, validate_http_endpoint};
use rag_store::{DistanceKind, RagConfig};

/// Config bag for the course assistant. All fields have defaults via `from_env`.
#[derive(Clone, Debug)]
pub struct RagSystemConfig {
    // Document processing
    pub chunk_size: usize,
    pub chunk_overlap: usize,

    // Retrieval + conversation
    pub max_results: u64,
    pub max_history: usize,

    // Vector store
    pub qdrant_url: String,
    pub qdrant_api_key: Option<String>,
    pub embedding_dim: usize,
    pub embedding_concurrency: usize,
    pub upsert_batch: usize,
    pub rag_exact: bool,

    /// Folder ingested at startup.
    pub docs_path: PathBuf,
}

impl Default for RagSystemConfig {
    fn default() -> Self {
        Self {
            chunk_size: 800,
            chunk_overlap: 100,
            max_results: 5,
            max_history: 2,
            qdrant_url: "http://127.0.0.1:6334".into(),
            qdrant_api_key: None,
            embedding_dim: 384,
            embedding_concurrency: 4,
            upsert_batch: 256,
            rag_exact: false,
            docs_path: PathBuf::from("../docs"),
        }
    }
}

impl RagSystemConfig {
    /// Build from environment variables with sensible defaults.
    ///
    /// Unparseable numbers fall back to the default; cross-field constraints
    /// are checked by [`RagSystemConfig::validate`].
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            chunk_size: parse("CHUNK_SIZE", d.chunk_size),
            chunk_overlap: parse("CHUNK_OVERLAP", d.chunk_overlap),
            max_results: parse("MAX_RESULTS", d.max_results),
            max_history: parse("MAX_HISTORY", d.max_history),
            qdrant_url: env("QDRANT_URL", &d.qdrant_url),
            qdrant_api_key: std::env::var("QDRANT_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
            embedding_dim: parse("EMBEDDING_DIM", d.embedding_dim),
            embedding_concurrency: parse("EMBEDDING_CONCURRENCY", d.embedding_concurrency),
            upsert_batch: parse("QDRANT_BATCH_SIZE", d.upsert_batch),
            rag_exact: env("RAG_EXACT_SEARCH", "false") == "true",
            docs_path: PathBuf::from(env("DOCS_PATH", "../docs")),
        }
    }

    /// Checks the invariants the rest of the system relies on.
    pub fn validate(&self) -> LlmResult<()> {
        validate_http_endpoint("QDRANT_URL", &self.qdrant_url)?;
        if self.chunk_size == 0 {
            return Err(ConfigError::OutOfRange {
                field: "CHUNK_SIZE",
                detail: "must be > 0",
            }
            .into());
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(ConfigError::OutOfRange {
                field: "CHUNK_OVERLAP",
                detail: "must be smaller than CHUNK_SIZE",
            }
            .into());
        }
        if self.max_results == 0 {
            return Err(ConfigError::OutOfRange {
                field: "MAX_RESULTS",
                detail: "must be > 0",
            }
            .into());
        }
        if self.embedding_dim == 0 {
            return Err(ConfigError::OutOfRange {
                field: "EMBEDDING_DIM",
                detail: "must be > 0",
            }
            .into());
        }
        Ok(())
    }

    /// Convert to a `rag_store::RagConfig` used by `VectorStore`.
    pub fn make_rag_config(&self) -> RagConfig {
        let mut cfg = RagConfig::new_default(self.qdrant_url.clone());
        cfg.qdrant_api_key = self.qdrant_api_key.clone();
        cfg.distance = DistanceKind::Cosine;
        cfg.embedding_dim = self.embedding_dim;
        cfg.max_results = self.max_results;
        cfg.upsert_batch = self.upsert_batch;
        cfg.embedding_concurrency = self.embedding_concurrency;
        cfg.exact_search = self.rag_exact;
        cfg
    }
}

fn env(k: &str, dflt: &str) -> String {
    std::env::var(k).unwrap_or_else(|_| dflt.to_string())
}

fn parse<T: std::str::FromStr>(k: &str, dflt: T) -> T {
    std::env::var(k)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(dflt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = RagSystemConfig::default();
        assert_eq!(cfg.chunk_size, 800);
        assert_eq!(cfg.chunk_overlap, 100);
        assert_eq!(cfg.max_results, 5);
        assert_eq!(cfg.max_history, 2);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn overlap_must_be_smaller_than_chunk() {
        let cfg = RagSystemConfig {
            chunk_size: 100,
            chunk_overlap: 100,
            ..RagSystemConfig::default()
        };
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("CHUNK_OVERLAP"));
    }

    #[test]
    fn rag_config_carries_store_knobs() {
        let cfg = RagSystemConfig {
            max_results: 3,
            embedding_dim: 768,
            ..RagSystemConfig::default()
        };
        let rag = cfg.make_rag_config();
        assert_eq!(rag.max_results, 3);
        assert_eq!(rag.embedding_dim, 768);
        assert_eq!(rag.catalog_collection, "course_catalog");
        assert!(rag.validate().is_ok());
    }
}
