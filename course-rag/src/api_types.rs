//! Public API types re-used by external crates (e.g., the HTTP API layer).

use serde::{Deserialize, Serialize};

/// A citation for one search hit shown alongside the answer.
///
/// # Example
/// ```
/// use course_rag::Source;
/// let s = Source {
///     text: "MCP: Build Rich-Context AI Apps - Lesson 2".into(),
///     url: Some("https://learn.example.com/mcp/lesson-2".into()),
/// };
/// assert!(s.text.ends_with("Lesson 2"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub text: String,
    pub url: Option<String>,
}

/// Catalog statistics.
///
/// # Example
/// ```
/// use course_rag::CourseAnalytics;
/// let a = CourseAnalytics { total_courses: 1, course_titles: vec!["MCP".into()] };
/// assert_eq!(a.total_courses, a.course_titles.len());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseAnalytics {
    pub total_courses: usize,
    pub course_titles: Vec<String>,
}
