//! Course document parsing and sentence-based chunking.
//!
//! Expected layout:
//!
//! ```text
//! Course Title: <title>
//! Course Link: <url>
//! Course Instructor: <name>
//!
//! Lesson 0: Introduction
//! Lesson Link: <url>
//! <transcript...>
//! ```

use std::path::Path;

use regex::Regex;
use rag_store::{Course, CourseChunk, Lesson};
use tracing::debug;

use crate::error::DocumentError;

pub struct DocumentProcessor {
    chunk_size: usize,
    chunk_overlap: usize,
    course_field: Regex,
    lesson_header: Regex,
    lesson_link: Regex,
}

impl DocumentProcessor {
    /// # Errors
    /// [`DocumentError::InvalidChunking`] when `chunk_size == 0` or the overlap
    /// is not smaller than the chunk size.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self, DocumentError> {
        if chunk_size == 0 {
            return Err(DocumentError::InvalidChunking("chunk_size must be > 0"));
        }
        if chunk_overlap >= chunk_size {
            return Err(DocumentError::InvalidChunking(
                "chunk_overlap must be smaller than chunk_size",
            ));
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
            course_field: Regex::new(r"(?i)^course\s+(title|link|instructor):\s*(.*)$")?,
            lesson_header: Regex::new(r"(?i)^lesson\s+(\d+):\s*(.*)$")?,
            lesson_link: Regex::new(r"(?i)^lesson\s+link:\s*(.*)$")?,
        })
    }

    /// Reads and parses one course file.
    pub fn process_course_document(
        &self,
        path: &Path,
    ) -> Result<(Course, Vec<CourseChunk>), DocumentError> {
        let raw = std::fs::read(path).map_err(|source| DocumentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let text = String::from_utf8_lossy(&raw);
        self.parse_course(&text)
            .map_err(|e| match e {
                DocumentError::Empty(_) => DocumentError::Empty(path.to_path_buf()),
                DocumentError::MissingTitle(_) => DocumentError::MissingTitle(path.to_path_buf()),
                other => other,
            })
    }

    /// Parses course text into metadata and chunks.
    pub fn parse_course(&self, text: &str) -> Result<(Course, Vec<CourseChunk>), DocumentError> {
        let lines: Vec<&str> = text.lines().collect();
        if lines.iter().all(|l| l.trim().is_empty()) {
            return Err(DocumentError::Empty(Default::default()));
        }

        let mut course = Course {
            title: String::new(),
            course_link: None,
            instructor: None,
            lessons: Vec::new(),
        };

        // Header: up to the first blank line or lesson marker.
        let mut body_start = 0;
        for (i, line) in lines.iter().enumerate() {
            let line = line.trim();
            if line.is_empty() || self.lesson_marker(line).is_some() {
                body_start = i;
                break;
            }
            body_start = i + 1;
            match self.course_field.captures(line) {
                Some(caps) => {
                    let value = caps[2].trim().to_string();
                    match caps[1].to_ascii_lowercase().as_str() {
                        "title" => course.title = value,
                        "link" => course.course_link = non_empty(value),
                        _ => course.instructor = non_empty(value),
                    }
                }
                None if i == 0 => course.title = line.to_string(),
                None => {
                    body_start = i;
                    break;
                }
            }
        }

        if course.title.is_empty() {
            return Err(DocumentError::MissingTitle(Default::default()));
        }

        let mut chunks: Vec<CourseChunk> = Vec::new();
        let mut current: Option<(Lesson, Vec<&str>)> = None;
        let mut preamble: Vec<&str> = Vec::new();
        let mut expect_link = false;

        for line in &lines[body_start..] {
            let trimmed = line.trim();

            if let Some((lesson_number, title)) = self.lesson_marker(trimmed) {
                if let Some((lesson, body)) = current.take() {
                    self.flush_lesson(&mut course, &mut chunks, lesson, &body);
                }
                current = Some((
                    Lesson {
                        lesson_number,
                        title,
                        lesson_link: None,
                    },
                    Vec::new(),
                ));
                expect_link = true;
                continue;
            }

            if expect_link {
                expect_link = false;
                if let Some(caps) = self.lesson_link.captures(trimmed) {
                    if let Some((lesson, _)) = current.as_mut() {
                        lesson.lesson_link = non_empty(caps[1].trim().to_string());
                    }
                    continue;
                }
            }

            match current.as_mut() {
                Some((_, body)) => body.push(line),
                None => preamble.push(line),
            }
        }

        if let Some((lesson, body)) = current.take() {
            self.flush_lesson(&mut course, &mut chunks, lesson, &body);
        }

        if course.lessons.is_empty() {
            let content = preamble.join("\n");
            for piece in self.chunk_text(&content) {
                let chunk_index = chunks.len();
                chunks.push(CourseChunk {
                    content: piece,
                    course_title: course.title.clone(),
                    lesson_number: None,
                    chunk_index,
                });
            }
        }

        debug!(
            course = %course.title,
            lessons = course.lessons.len(),
            chunks = chunks.len(),
            "course document parsed"
        );
        Ok((course, chunks))
    }

    /// `Lesson N: Title` with `N` fitting a `u32`; anything else is body text.
    fn lesson_marker(&self, line: &str) -> Option<(u32, String)> {
        let caps = self.lesson_header.captures(line)?;
        let number = caps[1].parse::<u32>().ok()?;
        Some((number, caps[2].trim().to_string()))
    }

    fn flush_lesson(
        &self,
        course: &mut Course,
        chunks: &mut Vec<CourseChunk>,
        lesson: Lesson,
        body: &[&str],
    ) {
        let content = body.join("\n");
        for (i, piece) in self.chunk_text(&content).into_iter().enumerate() {
            let content = if i == 0 {
                format!("Lesson {} content: {piece}", lesson.lesson_number)
            } else {
                piece
            };
            let chunk_index = chunks.len();
            chunks.push(CourseChunk {
                content,
                course_title: course.title.clone(),
                lesson_number: Some(lesson.lesson_number),
                chunk_index,
            });
        }
        course.lessons.push(lesson);
    }

    /// Splits text into sentence-aligned chunks of at most `chunk_size`
    /// characters (a single longer sentence becomes its own chunk), with up
    /// to `chunk_overlap` characters of trailing sentences repeated.
    pub fn chunk_text(&self, text: &str) -> Vec<String> {
        let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
        let sentences = split_sentences(&normalized);
        let mut chunks = Vec::new();

        let mut i = 0;
        while i < sentences.len() {
            let mut size = 0usize;
            let mut end = i;
            while end < sentences.len() {
                let add = sentences[end].chars().count() + usize::from(end > i);
                if end > i && size + add > self.chunk_size {
                    break;
                }
                size += add;
                end += 1;
            }

            let window = &sentences[i..end];
            chunks.push(window.join(" "));

            if end == sentences.len() {
                break;
            }

            let mut overlap_size = 0usize;
            let mut overlap_count = 0usize;
            for (k, s) in window.iter().enumerate().rev() {
                let len = s.chars().count() + usize::from(k + 1 < window.len());
                if overlap_size + len > self.chunk_overlap {
                    break;
                }
                overlap_size += len;
                overlap_count += 1;
            }

            i = (end - overlap_count).max(i + 1);
        }

        chunks
    }
}

/// Splits on `.`, `!` or `?` followed by whitespace and an uppercase letter.
fn split_sentences(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut iter = text.char_indices().peekable();

    while let Some((idx, c)) = iter.next() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }
        let end = idx + c.len_utf8();
        let rest = &text[end..];
        let trimmed = rest.trim_start();
        if trimmed.len() == rest.len() {
            continue;
        }
        if trimmed.chars().next().is_some_and(char::is_uppercase) {
            let sentence = text[start..end].trim();
            if !sentence.is_empty() {
                out.push(sentence);
            }
            start = text.len() - trimmed.len();
        }
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        out.push(tail);
    }
    out
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() { None } else { Some(s) }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "Course Title: Building Towards Computer Use
Course Link: https://example.com/course
Course Instructor: Colt Steele

Lesson 0: Introduction
Lesson Link: https://example.com/l0
Welcome to the course. It covers computer use.

Lesson 1: API Basics
Lesson Link: https://example.com/l1
Requests go to the messages endpoint. Responses contain content blocks.
";

    fn processor() -> DocumentProcessor {
        DocumentProcessor::new(800, 100).unwrap()
    }

    #[test]
    fn parses_header_and_lessons() {
        let (course, chunks) = processor().parse_course(DOC).unwrap();
        assert_eq!(course.title, "Building Towards Computer Use");
        assert_eq!(course.course_link.as_deref(), Some("https://example.com/course"));
        assert_eq!(course.instructor.as_deref(), Some("Colt Steele"));
        assert_eq!(course.lessons.len(), 2);
        assert_eq!(course.lessons[1].lesson_number, 1);
        assert_eq!(course.lessons[1].title, "API Basics");
        assert_eq!(course.lesson_link(0), Some("https://example.com/l0"));

        assert_eq!(chunks.len(), 2);
        assert_eq!(
            chunks[0].content,
            "Lesson 0 content: Welcome to the course. It covers computer use."
        );
        assert_eq!(chunks[1].lesson_number, Some(1));
        assert_eq!(chunks[1].chunk_index, 1);
        assert!(chunks.iter().all(|c| c.course_title == course.title));
    }

    #[test]
    fn overflowing_lesson_number_is_body_text() {
        let doc = "Course Title: Big Numbers

Lesson 1: Start
Lesson 99999999999: Huge
Numbers this large are not lessons.
";
        let (course, chunks) = processor().parse_course(doc).unwrap();
        assert_eq!(course.lessons.len(), 1);
        assert_eq!(course.lessons[0].lesson_number, 1);
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].content.starts_with("Lesson 1 content: "));
        assert!(chunks[0].content.contains("Lesson 99999999999: Huge"));
        assert!(course.lessons.iter().all(|l| l.lesson_number != 0));
    }

    #[test]
    fn title_falls_back_to_first_line() {
        let (course, chunks) = processor()
            .parse_course("Intro to Rust\n\nSome text here. More text.")
            .unwrap();
        assert_eq!(course.title, "Intro to Rust");
        assert!(course.lessons.is_empty());
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].lesson_number, None);
    }

    #[test]
    fn empty_document_is_an_error() {
        assert!(matches!(
            processor().parse_course("  \n\n"),
            Err(DocumentError::Empty(_))
        ));
        assert!(matches!(
            processor().parse_course("Course Title:   \nLesson 1: x"),
            Err(DocumentError::MissingTitle(_))
        ));
    }

    #[test]
    fn chunks_respect_size_and_overlap() {
        let p = DocumentProcessor::new(40, 20).unwrap();
        let text = "Alpha beta gamma. Delta epsilon zeta. Eta theta iota. Kappa lambda mu.";
        let chunks = p.chunk_text(text);
        assert_eq!(
            chunks,
            vec![
                "Alpha beta gamma. Delta epsilon zeta.",
                "Delta epsilon zeta. Eta theta iota.",
                "Eta theta iota. Kappa lambda mu.",
            ]
        );
    }

    #[test]
    fn oversized_sentence_still_progresses() {
        let p = DocumentProcessor::new(10, 5).unwrap();
        let chunks = p.chunk_text("This sentence is far too long. Ok.");
        assert_eq!(chunks, vec!["This sentence is far too long.", "Ok."]);
    }

    #[test]
    fn sentence_split_requires_capital_after_punctuation() {
        assert_eq!(
            split_sentences("Version 1.5 is out. see below! Next one?"),
            vec!["Version 1.5 is out. see below!", "Next one?"]
        );
    }

    #[test]
    fn rejects_bad_chunking_params() {
        assert!(DocumentProcessor::new(0, 0).is_err());
        assert!(DocumentProcessor::new(100, 100).is_err());
    }
}
