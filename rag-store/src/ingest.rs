//! Ingestion: course metadata and content chunks → Qdrant points.
//!
//! Catalog points are keyed by course title and carry the lesson list as a
//! JSON string (nested payload values are not read back by the facade).
//! Content points are keyed by `title#chunk_index`.

use std::collections::HashMap;

use qdrant_client::qdrant::{PointId, PointStruct, Value as QValue, value};
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::RagConfig;
use crate::embed::EmbeddingsProvider;
use crate::embed_pool::embed_all;
use crate::errors::RagError;
use crate::qdrant_facade::QdrantFacade;
use crate::record::{Course, CourseChunk};

/// Deterministic UUIDv5 from an arbitrary string id.
pub(crate) fn stable_uuid(id: &str) -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, id.as_bytes())
}

/// Point id of a course in the catalog collection.
pub(crate) fn course_point_id(title: &str) -> PointId {
    stable_uuid(title).to_string().into()
}

/// Point id of a content chunk.
pub(crate) fn chunk_point_id(course_title: &str, chunk_index: usize) -> PointId {
    stable_uuid(&format!("{course_title}#{chunk_index}"))
        .to_string()
        .into()
}

/// Embeds the course title and upserts the catalog point.
pub async fn ingest_course(
    cfg: &RagConfig,
    client: &QdrantFacade,
    provider: &dyn EmbeddingsProvider,
    course: &Course,
) -> Result<(), RagError> {
    let vector = provider.embed(&course.title).await?;
    if vector.len() != cfg.embedding_dim {
        return Err(RagError::VectorSizeMismatch {
            got: vector.len(),
            want: cfg.embedding_dim,
        });
    }

    let point = course_point(course, vector)?;
    client
        .upsert_points(&cfg.catalog_collection, vec![point])
        .await?;

    info!(
        course = %course.title,
        lessons = course.lessons.len(),
        "course metadata stored"
    );
    Ok(())
}

/// Embeds chunks concurrently and upserts them in batches.
///
/// Returns the number of chunks written.
pub async fn ingest_chunks(
    cfg: &RagConfig,
    client: &QdrantFacade,
    provider: &dyn EmbeddingsProvider,
    chunks: &[CourseChunk],
) -> Result<usize, RagError> {
    if chunks.is_empty() {
        debug!("no chunks to ingest");
        return Ok(0);
    }

    let batch_size = cfg.upsert_batch.max(1);
    let mut total = 0usize;

    for batch in chunks.chunks(batch_size) {
        let texts: Vec<&str> = batch.iter().map(|c| c.content.as_str()).collect();
        let vectors = embed_all(
            &texts,
            provider,
            cfg.embedding_dim,
            cfg.embedding_concurrency,
        )
        .await?;

        let points: Vec<PointStruct> = batch
            .iter()
            .zip(vectors)
            .map(|(c, v)| chunk_point(c, v))
            .collect();

        total += client
            .upsert_points(&cfg.content_collection, points)
            .await?;
        debug!(written = total, of = chunks.len(), "content batch upserted");
    }

    info!(chunks = total, "course content stored");
    Ok(total)
}

/// Builds the catalog point for a course.
pub(crate) fn course_point(course: &Course, vector: Vec<f32>) -> Result<PointStruct, RagError> {
    let mut payload: HashMap<String, QValue> = HashMap::new();
    payload.insert("title".into(), qstring(&course.title));
    if let Some(instructor) = &course.instructor {
        payload.insert("instructor".into(), qstring(instructor));
    }
    if let Some(link) = &course.course_link {
        payload.insert("course_link".into(), qstring(link));
    }
    payload.insert(
        "lessons_json".into(),
        qstring(&serde_json::to_string(&course.lessons)?),
    );
    payload.insert("lesson_count".into(), qint(course.lessons.len() as i64));

    Ok(PointStruct {
        id: Some(course_point_id(&course.title)),
        payload,
        vectors: Some(vector.into()),
        ..Default::default()
    })
}

/// Builds the content point for a chunk.
pub(crate) fn chunk_point(chunk: &CourseChunk, vector: Vec<f32>) -> PointStruct {
    let mut payload: HashMap<String, QValue> = HashMap::new();
    payload.insert("content".into(), qstring(&chunk.content));
    payload.insert("course_title".into(), qstring(&chunk.course_title));
    if let Some(n) = chunk.lesson_number {
        payload.insert("lesson_number".into(), qint(i64::from(n)));
    }
    payload.insert("chunk_index".into(), qint(chunk.chunk_index as i64));

    PointStruct {
        id: Some(chunk_point_id(&chunk.course_title, chunk.chunk_index)),
        payload,
        vectors: Some(vector.into()),
        ..Default::default()
    }
}

/// Wraps a string into Qdrant `Value`.
fn qstring(s: &str) -> QValue {
    QValue {
        kind: Some(value::Kind::StringValue(s.to_string())),
    }
}

fn qint(i: i64) -> QValue {
    QValue {
        kind: Some(value::Kind::IntegerValue(i)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qdrant_facade::qpayload_to_json;
    use crate::record::{ChunkMetadata, Lesson};

    #[test]
    fn point_ids_are_stable_and_distinct() {
        assert_eq!(stable_uuid("MCP"), stable_uuid("MCP"));
        assert_ne!(chunk_point_id("MCP", 0), chunk_point_id("MCP", 1));
        assert_ne!(course_point_id("MCP"), chunk_point_id("MCP", 0));
    }

    #[test]
    fn chunk_payload_reads_back_as_metadata() {
        let chunk = CourseChunk {
            content: "Lesson 1 content: hello".into(),
            course_title: "MCP".into(),
            lesson_number: Some(1),
            chunk_index: 4,
        };
        let p = chunk_point(&chunk, vec![0.0; 3]);
        let json = qpayload_to_json(p.payload);
        assert_eq!(json["content"], "Lesson 1 content: hello");
        let meta = ChunkMetadata::from_payload(&json);
        assert_eq!(meta.course_title.as_deref(), Some("MCP"));
        assert_eq!(meta.lesson_number, Some(1));
        assert_eq!(meta.chunk_index, Some(4));
    }

    #[test]
    fn course_level_chunk_has_no_lesson_number() {
        let chunk = CourseChunk {
            content: "overview".into(),
            course_title: "MCP".into(),
            lesson_number: None,
            chunk_index: 0,
        };
        let json = qpayload_to_json(chunk_point(&chunk, vec![0.0]).payload);
        assert!(json.get("lesson_number").is_none());
    }

    #[test]
    fn course_payload_keeps_lessons_as_json_string() {
        let course = Course {
            title: "MCP".into(),
            course_link: Some("https://c".into()),
            instructor: Some("Elie".into()),
            lessons: vec![Lesson {
                lesson_number: 0,
                title: "Intro".into(),
                lesson_link: Some("https://c/0".into()),
            }],
        };
        let json = qpayload_to_json(course_point(&course, vec![0.0]).unwrap().payload);
        assert_eq!(json["title"], "MCP");
        assert_eq!(json["lesson_count"], 1);
        let lessons: Vec<Lesson> =
            serde_json::from_str(json["lessons_json"].as_str().unwrap()).unwrap();
        assert_eq!(lessons, course.lessons);
    }
}
