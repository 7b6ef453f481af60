//! Runtime and collection configuration.

use crate::errors::RagError;

/// Distance function used for the vector space.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DistanceKind {
    /// Cosine distance (recommended for most embeddings).
    Cosine,
    /// Dot product (useful for normalized vectors).
    Dot,
    /// Euclidean distance (L2).
    Euclid,
}

/// Describes the vector space of a collection.
#[derive(Clone, Debug)]
pub struct VectorSpace {
    /// Dimensionality of vectors.
    pub size: usize,
    /// Distance function.
    pub distance: DistanceKind,
}

/// Configuration for the course vector store.
#[derive(Clone, Debug)]
pub struct RagConfig {
    /// Qdrant gRPC endpoint, e.g. `http://localhost:6334`.
    pub qdrant_url: String,
    /// Optional API key for Qdrant Cloud.
    pub qdrant_api_key: Option<String>,
    /// Collection with one point per course (title embeddings).
    pub catalog_collection: String,
    /// Collection with one point per content chunk.
    pub content_collection: String,
    /// Distance function (Cosine by default).
    pub distance: DistanceKind,
    /// Embedding dimension; every vector is checked against it.
    pub embedding_dim: usize,
    /// Search result limit.
    pub max_results: u64,
    /// Upsert batch size (typical range: 128..512).
    pub upsert_batch: usize,
    /// Concurrent embedding requests during ingestion.
    pub embedding_concurrency: usize,
    /// Exact search flag (false = HNSW ANN).
    pub exact_search: bool,
}

impl RagConfig {
    /// Creates a sane default config for a given Qdrant endpoint.
    pub fn new_default(url: impl Into<String>) -> Self {
        Self {
            qdrant_url: url.into(),
            qdrant_api_key: None,
            catalog_collection: "course_catalog".into(),
            content_collection: "course_content".into(),
            distance: DistanceKind::Cosine,
            embedding_dim: 384,
            max_results: 5,
            upsert_batch: 256,
            embedding_concurrency: 4,
            exact_search: false,
        }
    }

    pub fn space(&self) -> VectorSpace {
        VectorSpace {
            size: self.embedding_dim,
            distance: self.distance,
        }
    }

    /// Validates config values.
    pub fn validate(&self) -> Result<(), RagError> {
        if self.qdrant_url.trim().is_empty() {
            return Err(RagError::Config("qdrant_url is empty".into()));
        }
        if self.catalog_collection.trim().is_empty() || self.content_collection.trim().is_empty()
        {
            return Err(RagError::Config("collection name is empty".into()));
        }
        if self.catalog_collection == self.content_collection {
            return Err(RagError::Config(
                "catalog and content collections must differ".into(),
            ));
        }
        if self.embedding_dim == 0 {
            return Err(RagError::Config("embedding_dim must be > 0".into()));
        }
        if self.max_results == 0 {
            return Err(RagError::Config("max_results must be > 0".into()));
        }
        if self.upsert_batch == 0 {
            return Err(RagError::Config("upsert_batch must be > 0".into()));
        }
        Ok(())
    }
}
