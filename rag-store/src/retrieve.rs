//! Retrieval helpers: course-name resolution, content search and catalog lookups.

use crate::config::RagConfig;
use crate::embed::EmbeddingsProvider;
use crate::errors::RagError;
use crate::filters::content_filter;
use crate::ingest::course_point_id;
use crate::qdrant_facade::QdrantFacade;
use crate::record::{ChunkMetadata, Lesson, SearchResults};

use tracing::{debug, trace};

/// Resolves a fuzzy course name to the closest catalog title.
///
/// Returns `None` when the catalog is empty.
pub async fn resolve_course_name(
    cfg: &RagConfig,
    client: &QdrantFacade,
    provider: &dyn EmbeddingsProvider,
    course_name: &str,
) -> Result<Option<String>, RagError> {
    let qv = provider.embed(course_name).await?;
    let hits = client
        .search(&cfg.catalog_collection, qv, 1, None, cfg.exact_search)
        .await?;

    let title = hits.into_iter().next().and_then(|(score, payload)| {
        let title = payload.get("title")?.as_str()?.to_string();
        debug!(query = course_name, resolved = %title, score, "course name resolved");
        Some(title)
    });
    Ok(title)
}

/// Full content search: optional course resolution, filtered vector search,
/// conversion into [`SearchResults`].
///
/// An unresolvable course name yields a [`SearchResults`] carrying the
/// `No course found matching '<name>'` error; backend failures are returned
/// as `Err` for the caller to render.
pub async fn search_content(
    cfg: &RagConfig,
    client: &QdrantFacade,
    provider: &dyn EmbeddingsProvider,
    query: &str,
    course_name: Option<&str>,
    lesson_number: Option<u32>,
) -> Result<SearchResults, RagError> {
    trace!(
        course = ?course_name,
        lesson = ?lesson_number,
        "retrieve::search_content"
    );

    let course_title = match course_name {
        Some(name) => match resolve_course_name(cfg, client, provider, name).await? {
            Some(title) => Some(title),
            None => {
                return Ok(SearchResults::from_error(format!(
                    "No course found matching '{name}'"
                )));
            }
        },
        None => None,
    };

    let qv = provider.embed(query).await?;
    let filter = content_filter(course_title.as_deref(), lesson_number);
    let hits = client
        .search(
            &cfg.content_collection,
            qv,
            cfg.max_results,
            filter,
            cfg.exact_search,
        )
        .await?;

    Ok(hits_to_results(hits))
}

/// Converts `(score, payload)` hits into parallel result sequences.
///
/// Scores are cosine similarities; distances are `1 - score`.
pub(crate) fn hits_to_results(hits: Vec<(f32, serde_json::Value)>) -> SearchResults {
    let mut out = SearchResults::empty();
    for (score, payload) in hits {
        let document = payload
            .get("content")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        out.push(document, ChunkMetadata::from_payload(&payload), 1.0 - score);
    }
    out
}

/// Catalog payload of a course by exact title.
pub async fn course_payload(
    cfg: &RagConfig,
    client: &QdrantFacade,
    course_title: &str,
) -> Result<Option<serde_json::Value>, RagError> {
    client
        .get_payload(&cfg.catalog_collection, course_point_id(course_title))
        .await
}

/// Lesson link stored in a catalog payload.
pub(crate) fn lesson_link_from_payload(
    payload: &serde_json::Value,
    lesson_number: u32,
) -> Option<String> {
    let raw = payload.get("lessons_json")?.as_str()?;
    let lessons: Vec<Lesson> = serde_json::from_str(raw).ok()?;
    lessons
        .into_iter()
        .find(|l| l.lesson_number == lesson_number)
        .and_then(|l| l.lesson_link)
}

/// Course link stored in a catalog payload.
pub(crate) fn course_link_from_payload(payload: &serde_json::Value) -> Option<String> {
    payload
        .get("course_link")
        .and_then(|v| v.as_str())
        .map(str::to_string)
}
