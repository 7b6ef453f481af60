//! The storage seam consumed by the search tool and the ingestion path.

use std::{future::Future, pin::Pin};

use crate::errors::RagError;
use crate::record::{Course, CourseChunk, SearchResults};

/// Boxed future returned by [`CourseStore`] methods.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Course catalog plus semantically searchable course content.
///
/// `search` never fails: backend problems come back as
/// [`SearchResults::error`] so callers can hand the text to the model.
pub trait CourseStore: Send + Sync {
    /// Semantic search over content, optionally scoped to a course (resolved
    /// by fuzzy name) and/or a lesson number. Filters are ANDed.
    fn search<'a>(
        &'a self,
        query: &'a str,
        course_name: Option<&'a str>,
        lesson_number: Option<u32>,
    ) -> StoreFuture<'a, SearchResults>;

    /// Link of a lesson by exact course title and lesson number.
    fn get_lesson_link<'a>(
        &'a self,
        course_title: &'a str,
        lesson_number: u32,
    ) -> StoreFuture<'a, Option<String>>;

    /// Link of a course by exact title.
    fn get_course_link<'a>(&'a self, course_title: &'a str) -> StoreFuture<'a, Option<String>>;

    /// Stores (or replaces) the catalog entry for a course.
    fn add_course_metadata<'a>(&'a self, course: &'a Course) -> StoreFuture<'a, Result<(), RagError>>;

    /// Embeds and stores content chunks, returning how many were written.
    fn add_course_content<'a>(
        &'a self,
        chunks: &'a [CourseChunk],
    ) -> StoreFuture<'a, Result<usize, RagError>>;

    /// Drops all catalog and content data.
    fn clear_all_data(&self) -> StoreFuture<'_, Result<(), RagError>>;

    /// Titles of every course in the catalog.
    fn existing_course_titles(&self) -> StoreFuture<'_, Result<Vec<String>, RagError>>;

    /// Number of courses in the catalog.
    fn course_count(&self) -> StoreFuture<'_, Result<usize, RagError>>;
}
