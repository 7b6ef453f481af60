//! Filter conversion to Qdrant `Filter`.
//!
//! Content search supports exact equality on `course_title` (keyword) and
//! `lesson_number` (integer); all supplied conditions must hold.

use qdrant_client::qdrant::{
    Condition, FieldCondition, Filter, Match, condition::ConditionOneOf, r#match::MatchValue,
};
use tracing::debug;

/// Builds an AND filter for content search. `None` when no condition applies.
pub fn content_filter(course_title: Option<&str>, lesson_number: Option<u32>) -> Option<Filter> {
    let mut must: Vec<Condition> = Vec::new();

    if let Some(title) = course_title {
        must.push(field_match(
            "course_title",
            MatchValue::Keyword(title.to_string()),
        ));
    }
    if let Some(n) = lesson_number {
        must.push(field_match("lesson_number", MatchValue::Integer(i64::from(n))));
    }

    debug!(conditions = must.len(), "filters::content_filter");

    if must.is_empty() {
        None
    } else {
        Some(Filter {
            must,
            ..Default::default()
        })
    }
}

fn field_match(key: &str, value: MatchValue) -> Condition {
    Condition {
        condition_one_of: Some(ConditionOneOf::Field(FieldCondition {
            key: key.to_string(),
            r#match: Some(Match {
                match_value: Some(value),
            }),
            ..Default::default()
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(f: &Filter) -> Vec<String> {
        f.must
            .iter()
            .filter_map(|c| match &c.condition_one_of {
                Some(ConditionOneOf::Field(fc)) => Some(fc.key.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn no_filters_means_no_filter() {
        assert!(content_filter(None, None).is_none());
    }

    #[test]
    fn both_filters_are_anded() {
        let f = content_filter(Some("MCP"), Some(3)).unwrap();
        assert!(f.should.is_empty());
        assert_eq!(keys(&f), vec!["course_title", "lesson_number"]);
    }

    #[test]
    fn lesson_only_filter() {
        let f = content_filter(None, Some(2)).unwrap();
        assert_eq!(keys(&f), vec!["lesson_number"]);
    }
}
