//! The `RagSystem` facade: ingestion, sessions and the query flow.

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
    sync::Arc,
};

use ai_llm_service::{
    MessagesApi,
    config::default_config::{config_anthropic_chat, config_ollama_embedding},
    services::{anthropic_service::AnthropicService, ollama_service::OllamaService},
};
use rag_store::{Course, CourseChunk, CourseStore, OllamaConfig, OllamaEmbedder, VectorStore};
use tracing::{error, info, instrument, warn};

use crate::{
    ai_generator::AiGenerator,
    api_types::{CourseAnalytics, Source},
    cfg::RagSystemConfig,
    document_processor::DocumentProcessor,
    error::RagSystemError,
    progress::{NoopProgress, Progress},
    search_tools::{CourseSearchTool, ToolManager},
    session_manager::SessionManager,
};

const QUERY_PREFIX: &str = "Answer this question about course materials: ";

/// Wires the document processor, store, generator, tools and sessions.
///
/// Queries take `&mut self`: the tool registry keeps the citations of the
/// query in flight, so callers sharing one instance must serialize access.
pub struct RagSystem {
    config: RagSystemConfig,
    store: Arc<dyn CourseStore>,
    processor: DocumentProcessor,
    generator: AiGenerator,
    tools: ToolManager,
    sessions: SessionManager,
}

impl RagSystem {
    /// Builds the facade over an existing store and Messages client.
    ///
    /// # Errors
    /// Invalid chunking parameters or a tool registration failure.
    pub fn new(
        config: RagSystemConfig,
        store: Arc<dyn CourseStore>,
        client: Arc<dyn MessagesApi>,
        model: impl Into<String>,
    ) -> Result<Self, RagSystemError> {
        let processor = DocumentProcessor::new(config.chunk_size, config.chunk_overlap)?;
        let generator = AiGenerator::new(client, model);

        let mut tools = ToolManager::new();
        tools.register_tool(Box::new(CourseSearchTool::new(store.clone())))?;

        let sessions = SessionManager::new(config.max_history);

        Ok(Self {
            config,
            store,
            processor,
            generator,
            tools,
            sessions,
        })
    }

    /// Connects Anthropic, Ollama and Qdrant from environment configuration.
    ///
    /// # Errors
    /// Missing/invalid env vars, or a Qdrant connection failure.
    #[instrument(skip_all, fields(qdrant = %config.qdrant_url))]
    pub async fn from_config(config: RagSystemConfig) -> Result<Self, RagSystemError> {
        config.validate()?;

        let anthropic = AnthropicService::new(config_anthropic_chat()?)?;
        let model = anthropic.model().to_string();

        let ollama = OllamaService::new(config_ollama_embedding()?)?;
        let embedder = OllamaEmbedder::new(OllamaConfig {
            svc: Arc::new(ollama),
            dim: config.embedding_dim,
        });

        let store = VectorStore::connect(config.make_rag_config(), Arc::new(embedder)).await?;
        info!(model = %model, "course assistant ready");

        Self::new(config, Arc::new(store), Arc::new(anthropic), model)
    }

    pub fn config(&self) -> &RagSystemConfig {
        &self.config
    }

    pub fn create_session(&mut self) -> String {
        self.sessions.create_session()
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Answers `query`, returning the answer and the citations gathered by
    /// tool calls made while producing it.
    ///
    /// With a `session_id` the prior exchanges are supplied as history and
    /// the new exchange is recorded afterwards.
    ///
    /// # Errors
    /// Generation failures propagate and leave the session untouched. Citations
    /// are cleared on both paths.
    #[instrument(skip_all, fields(session = session_id.unwrap_or("-")))]
    pub async fn query(
        &mut self,
        query: &str,
        session_id: Option<&str>,
    ) -> Result<(String, Vec<Source>), RagSystemError> {
        let prompt = format!("{QUERY_PREFIX}{query}");
        let history = session_id.and_then(|id| self.sessions.conversation_history(id));

        self.tools.reset_sources();
        let result = self
            .generator
            .generate_response(&prompt, history.as_deref(), Some(&mut self.tools))
            .await;

        let sources = self.tools.last_sources();
        self.tools.reset_sources();
        let answer = result?;

        if let Some(id) = session_id {
            self.sessions.add_exchange(id, query, &answer);
        }

        info!(sources = sources.len(), "query answered");
        Ok((answer, sources))
    }

    /// Ingests one course file. Failures are logged and yield `(None, 0)`.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub async fn add_course_document(&self, path: &Path) -> (Option<Course>, usize) {
        match self.ingest_file(path).await {
            Ok((course, n)) => (Some(course), n),
            Err(e) => {
                error!(error = %e, "failed to ingest course document");
                (None, 0)
            }
        }
    }

    /// Ingests every `.txt` file in `folder`, skipping courses already in the
    /// catalog. Returns `(courses_added, chunks_added)`.
    pub async fn add_course_folder(&self, folder: &Path, clear_existing: bool) -> (usize, usize) {
        self.add_course_folder_with_progress(folder, clear_existing, &NoopProgress)
            .await
    }

    #[instrument(skip_all, fields(folder = %folder.display(), clear = clear_existing))]
    pub async fn add_course_folder_with_progress(
        &self,
        folder: &Path,
        clear_existing: bool,
        progress: &dyn Progress,
    ) -> (usize, usize) {
        if clear_existing {
            info!("clearing existing course data");
            if let Err(e) = self.store.clear_all_data().await {
                error!(error = %e, "failed to clear existing data");
            }
        }

        if !folder.is_dir() {
            warn!("course folder does not exist");
            return (0, 0);
        }

        let files = match course_files(folder) {
            Ok(f) => f,
            Err(e) => {
                error!(error = %e, "failed to list course folder");
                return (0, 0);
            }
        };
        progress.set_total(files.len() as u64);

        let mut existing: HashSet<String> = match self.store.existing_course_titles().await {
            Ok(t) => t.into_iter().collect(),
            Err(e) => {
                warn!(error = %e, "could not read existing course titles");
                HashSet::new()
            }
        };

        let mut total_courses = 0usize;
        let mut total_chunks = 0usize;

        for file in &files {
            let name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();

            let (course, chunks) = match self.processor.process_course_document(file) {
                Ok(parsed) => parsed,
                Err(e) => {
                    error!(file = %name, error = %e, "failed to process course file");
                    progress.step(&name);
                    continue;
                }
            };

            if existing.contains(&course.title) {
                info!(course = %course.title, "course already exists, skipping");
                progress.step(&name);
                continue;
            }

            match self.store_course(&course, &chunks).await {
                Ok(n) => {
                    info!(course = %course.title, chunks = n, "added course");
                    total_courses += 1;
                    total_chunks += n;
                    existing.insert(course.title);
                }
                Err(e) => error!(course = %course.title, error = %e, "failed to store course"),
            }
            progress.step(&name);
        }

        progress.finish("ingestion done");
        info!(
            courses = total_courses,
            chunks = total_chunks,
            "course folder ingested"
        );
        (total_courses, total_chunks)
    }

    /// Course count and titles from the catalog.
    pub async fn course_analytics(&self) -> Result<CourseAnalytics, RagSystemError> {
        let course_titles = self.store.existing_course_titles().await?;
        let total_courses = self.store.course_count().await?;
        Ok(CourseAnalytics {
            total_courses,
            course_titles,
        })
    }

    async fn ingest_file(&self, path: &Path) -> Result<(Course, usize), RagSystemError> {
        let (course, chunks) = self.processor.process_course_document(path)?;
        let n = self.store_course(&course, &chunks).await?;
        Ok((course, n))
    }

    async fn store_course(
        &self,
        course: &Course,
        chunks: &[CourseChunk],
    ) -> Result<usize, RagSystemError> {
        self.store.add_course_metadata(course).await?;
        Ok(self.store.add_course_content(chunks).await?)
    }
}

/// `.txt` files directly inside `folder`, sorted by name.
fn course_files(folder: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(folder)? {
        let path = entry?.path();
        let is_txt = path
            .extension()
            .is_some_and(|e| e.eq_ignore_ascii_case("txt"));
        if path.is_file() && is_txt {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
