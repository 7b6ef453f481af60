//! Core data models used by the library.

use serde::{Deserialize, Serialize};

/// A course and its ordered lessons. `title` is the unique key.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub title: String,
    #[serde(default)]
    pub course_link: Option<String>,
    #[serde(default)]
    pub instructor: Option<String>,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
}

impl Course {
    /// Link of the lesson with the given number, if both exist.
    pub fn lesson_link(&self, lesson_number: u32) -> Option<&str> {
        self.lessons
            .iter()
            .find(|l| l.lesson_number == lesson_number)
            .and_then(|l| l.lesson_link.as_deref())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    pub lesson_number: u32,
    pub title: String,
    #[serde(default)]
    pub lesson_link: Option<String>,
}

/// One embedded passage of course text.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CourseChunk {
    pub content: String,
    pub course_title: String,
    pub lesson_number: Option<u32>,
    pub chunk_index: usize,
}

/// Metadata attached to a search hit.
///
/// Every field is optional: payloads written by older ingests or by hand are
/// read as far as they parse.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    #[serde(default)]
    pub course_title: Option<String>,
    #[serde(default)]
    pub lesson_number: Option<u32>,
    #[serde(default)]
    pub chunk_index: Option<usize>,
}

impl ChunkMetadata {
    /// Lenient conversion from a raw payload; anything malformed becomes `default()`.
    pub fn from_payload(payload: &serde_json::Value) -> Self {
        serde_json::from_value(payload.clone()).unwrap_or_default()
    }
}

/// Result of a content search.
///
/// `documents`, `metadata` and `distances` are parallel. An empty result with
/// `error == None` means "nothing matched"; `error == Some` means the search
/// itself could not be performed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SearchResults {
    pub documents: Vec<String>,
    pub metadata: Vec<ChunkMetadata>,
    pub distances: Vec<f32>,
    pub error: Option<String>,
}

impl SearchResults {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_error(msg: impl Into<String>) -> Self {
        Self {
            error: Some(msg.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Appends one hit, keeping the sequences aligned.
    pub fn push(&mut self, document: String, metadata: ChunkMetadata, distance: f32) {
        self.documents.push(document);
        self.metadata.push(metadata);
        self.distances.push(distance);
    }

    /// Iterates hits as `(document, metadata)` pairs.
    pub fn hits(&self) -> impl Iterator<Item = (&str, &ChunkMetadata)> {
        self.documents
            .iter()
            .map(String::as_str)
            .zip(self.metadata.iter())
    }
}
