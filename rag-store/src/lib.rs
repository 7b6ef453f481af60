//! Course vector store: catalog + content collections over Qdrant.
//!
//! This crate provides:
//! - The course data model ([`Course`], [`CourseChunk`], [`SearchResults`], ...)
//! - The [`CourseStore`] seam used by the search tool and ingestion
//! - [`VectorStore`], the Qdrant-backed implementation
//!
//! The design is flat (no deep nesting) and splits responsibilities into focused modules.

mod config;
mod embed;
mod embed_pool;
mod errors;
mod filters;
mod ingest;
mod qdrant_facade;
mod record;
mod retrieve;
mod store;

pub use config::{DistanceKind, RagConfig, VectorSpace};
pub use embed::EmbeddingsProvider;
pub use embed::ollama::{OllamaConfig, OllamaEmbedder};
pub use errors::RagError;
pub use record::{ChunkMetadata, Course, CourseChunk, Lesson, SearchResults};
pub use store::{CourseStore, StoreFuture};

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

/// High-level facade that wires configuration, Qdrant client and embeddings.
///
/// This is the single entry point recommended for application code.
pub struct VectorStore {
    cfg: RagConfig,
    client: qdrant_facade::QdrantFacade,
    embedder: Arc<dyn EmbeddingsProvider>,
}

impl VectorStore {
    /// Connects to Qdrant and makes sure both collections exist.
    ///
    /// # Errors
    /// Returns `RagError::Config` for invalid config and `RagError::Qdrant` if
    /// the collections cannot be checked or created.
    pub async fn connect(
        cfg: RagConfig,
        embedder: Arc<dyn EmbeddingsProvider>,
    ) -> Result<Self, RagError> {
        let client = qdrant_facade::QdrantFacade::new(&cfg)?;
        let space = cfg.space();
        client
            .ensure_collection(&cfg.catalog_collection, &space)
            .await?;
        client
            .ensure_collection(&cfg.content_collection, &space)
            .await?;

        info!(
            url = %cfg.qdrant_url,
            catalog = %cfg.catalog_collection,
            content = %cfg.content_collection,
            dim = cfg.embedding_dim,
            "vector store ready"
        );

        Ok(Self {
            cfg,
            client,
            embedder,
        })
    }

    pub fn config(&self) -> &RagConfig {
        &self.cfg
    }

    #[instrument(skip_all, fields(course = ?course_name, lesson = ?lesson_number))]
    async fn search_impl(
        &self,
        query: &str,
        course_name: Option<&str>,
        lesson_number: Option<u32>,
    ) -> SearchResults {
        match retrieve::search_content(
            &self.cfg,
            &self.client,
            self.embedder.as_ref(),
            query,
            course_name,
            lesson_number,
        )
        .await
        {
            Ok(results) => {
                debug!(hits = results.documents.len(), error = ?results.error, "search finished");
                results
            }
            Err(e) => {
                warn!(error = %e, "search failed");
                SearchResults::from_error(format!("Search error: {e}"))
            }
        }
    }

    async fn catalog_payload(&self, course_title: &str) -> Option<serde_json::Value> {
        match retrieve::course_payload(&self.cfg, &self.client, course_title).await {
            Ok(p) => p,
            Err(e) => {
                warn!(course = course_title, error = %e, "catalog lookup failed");
                None
            }
        }
    }

    async fn existing_titles_impl(&self) -> Result<Vec<String>, RagError> {
        let payloads = self
            .client
            .scroll_payloads(&self.cfg.catalog_collection)
            .await?;
        Ok(payloads
            .into_iter()
            .filter_map(|p| p.get("title").and_then(|t| t.as_str()).map(str::to_string))
            .collect())
    }

    async fn clear_impl(&self) -> Result<(), RagError> {
        let space = self.cfg.space();
        self.client
            .recreate_collection(&self.cfg.catalog_collection, &space)
            .await?;
        self.client
            .recreate_collection(&self.cfg.content_collection, &space)
            .await?;
        info!("all course data cleared");
        Ok(())
    }
}

impl CourseStore for VectorStore {
    fn search<'a>(
        &'a self,
        query: &'a str,
        course_name: Option<&'a str>,
        lesson_number: Option<u32>,
    ) -> StoreFuture<'a, SearchResults> {
        Box::pin(self.search_impl(query, course_name, lesson_number))
    }

    fn get_lesson_link<'a>(
        &'a self,
        course_title: &'a str,
        lesson_number: u32,
    ) -> StoreFuture<'a, Option<String>> {
        Box::pin(async move {
            let payload = self.catalog_payload(course_title).await?;
            retrieve::lesson_link_from_payload(&payload, lesson_number)
        })
    }

    fn get_course_link<'a>(&'a self, course_title: &'a str) -> StoreFuture<'a, Option<String>> {
        Box::pin(async move {
            let payload = self.catalog_payload(course_title).await?;
            retrieve::course_link_from_payload(&payload)
        })
    }

    fn add_course_metadata<'a>(&'a self, course: &'a Course) -> StoreFuture<'a, Result<(), RagError>> {
        Box::pin(ingest::ingest_course(
            &self.cfg,
            &self.client,
            self.embedder.as_ref(),
            course,
        ))
    }

    fn add_course_content<'a>(
        &'a self,
        chunks: &'a [CourseChunk],
    ) -> StoreFuture<'a, Result<usize, RagError>> {
        Box::pin(ingest::ingest_chunks(
            &self.cfg,
            &self.client,
            self.embedder.as_ref(),
            chunks,
        ))
    }

    fn clear_all_data(&self) -> StoreFuture<'_, Result<(), RagError>> {
        Box::pin(self.clear_impl())
    }

    fn existing_course_titles(&self) -> StoreFuture<'_, Result<Vec<String>, RagError>> {
        Box::pin(self.existing_titles_impl())
    }

    fn course_count(&self) -> StoreFuture<'_, Result<usize, RagError>> {
        Box::pin(async move {
            let n = self.client.count(&self.cfg.catalog_collection).await?;
            Ok(n as usize)
        })
    }
}
