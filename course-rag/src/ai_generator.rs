//! Answer generation with at most one round of tool use.
//!
//! Round 1 sends the question (plus tool definitions when a registry is
//! given). If the model stops for tool use, every `tool_use` block is
//! executed in order and round 2 sends the results back without tools, so
//! the model has to answer. Anything else short-circuits with round 1's text.

use std::sync::Arc;

use ai_llm_service::{
    AiLlmError, ContentBlock, Message, MessagesApi, MessagesRequest, MessagesResponse, ToolChoice,
    config::default_config::ANSWER_MAX_TOKENS,
};
use tracing::{debug, info, instrument};

use crate::search_tools::ToolManager;

/// System instructions for course answers.
pub const SYSTEM_PROMPT: &str = "You are an AI assistant specialized in course materials and educational content with access to a comprehensive search tool for course information.

Search Tool Usage:
- Use the search tool **only** for questions about specific course content or detailed educational materials
- **One search per query maximum**
- Synthesize search results into accurate, fact-based responses
- If search yields no results, state this clearly without offering alternatives

Response Protocol:
- **General knowledge questions**: Answer using existing knowledge without searching
- **Course-specific questions**: Search first, then answer
- **No meta-commentary**:
  - Provide direct answers only, no reasoning process, search explanations, or question-type analysis
  - Do not mention \"based on the search results\"

All responses must be:
1. **Brief, concise and focused** - Get to the point quickly
2. **Educational** - Maintain instructional value
3. **Clear** - Use accessible language
4. **Example-supported** - Include relevant examples when they aid understanding

Provide only the direct answer to what was asked.";

/// Drives the Messages API for one user query.
pub struct AiGenerator {
    client: Arc<dyn MessagesApi>,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl AiGenerator {
    pub fn new(client: Arc<dyn MessagesApi>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            temperature: 0.0,
            max_tokens: ANSWER_MAX_TOKENS,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// System text for a request, with prior conversation appended when present.
    pub fn system_text(history: Option<&str>) -> String {
        match history {
            Some(h) => format!("{SYSTEM_PROMPT}\n\nPrevious conversation:\n{h}"),
            None => SYSTEM_PROMPT.to_string(),
        }
    }

    /// Produces the answer text for `query`.
    ///
    /// # Errors
    /// Transport and provider failures are returned unchanged.
    #[instrument(skip_all, fields(model = %self.model, history = history.is_some(), tools = tools.is_some()))]
    pub async fn generate_response(
        &self,
        query: &str,
        history: Option<&str>,
        tools: Option<&mut ToolManager>,
    ) -> Result<String, AiLlmError> {
        let mut request = MessagesRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: Some(self.temperature),
            system: Some(Self::system_text(history)),
            messages: vec![Message::user_text(query)],
            tools: Vec::new(),
            tool_choice: None,
        };

        if let Some(manager) = tools.as_deref() {
            request.tools = manager.tool_definitions();
            if !request.tools.is_empty() {
                request.tool_choice = Some(ToolChoice::Auto);
            }
        }

        let response = self.client.create(&request).await?;

        match tools {
            Some(manager) if response.wants_tools() => {
                self.handle_tool_execution(response, request, manager).await
            }
            _ => {
                debug!(stop_reason = ?response.stop_reason, "answered without tools");
                Ok(response.text())
            }
        }
    }

    /// Runs every requested tool and asks for the final answer without tools.
    async fn handle_tool_execution(
        &self,
        response: MessagesResponse,
        initial: MessagesRequest,
        manager: &mut ToolManager,
    ) -> Result<String, AiLlmError> {
        let mut messages = initial.messages;

        let mut results: Vec<ContentBlock> = Vec::new();
        for block in &response.content {
            if let ContentBlock::ToolUse { id, name, input } = block {
                info!(tool = %name, "executing tool");
                let output = manager.execute_tool(name, input).await;
                results.push(ContentBlock::tool_result(id.clone(), output));
            }
        }

        let assistant: Vec<ContentBlock> = response
            .content
            .into_iter()
            .filter(|b| !matches!(b, ContentBlock::Unsupported))
            .collect();
        messages.push(Message::assistant_blocks(assistant));

        if !results.is_empty() {
            messages.push(Message::user_blocks(results));
        }

        let followup = MessagesRequest {
            messages,
            tools: Vec::new(),
            tool_choice: None,
            ..initial
        };

        let final_response = self.client.create(&followup).await?;
        Ok(final_response.text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search_tools::{CourseSearchTool, SEARCH_TOOL_NAME};
    use crate::test_support::{FakeStore, ScriptedClient, text_response, tool_use_response};
    use ai_llm_service::{MessageContent, Role, StopReason};
    use rag_store::{ChunkMetadata, SearchResults};
    use serde_json::json;

    fn manager_with(store: Arc<FakeStore>) -> ToolManager {
        let mut m = ToolManager::new();
        m.register_tool(Box::new(CourseSearchTool::new(store))).unwrap();
        m
    }

    #[test]
    fn system_prompt_states_the_rules() {
        let p = SYSTEM_PROMPT.to_lowercase();
        assert!(p.contains("search tool"));
        assert!(p.contains("one search per query maximum"));
        assert!(p.contains("course-specific questions"));
        assert!(p.contains("brief, concise"));
        assert!(p.contains("no meta-commentary"));
    }

    #[tokio::test]
    async fn direct_answer_without_tools() {
        let client = Arc::new(ScriptedClient::new(vec![text_response(
            "This is a direct response without tool usage.",
        )]));
        let generator = AiGenerator::new(client.clone(), "claude-sonnet-4-20250514");

        let out = generator
            .generate_response("What is machine learning?", None, None)
            .await
            .unwrap();
        assert_eq!(out, "This is a direct response without tool usage.");

        let reqs = client.requests();
        assert_eq!(reqs.len(), 1);
        let r = &reqs[0];
        assert_eq!(r.model, "claude-sonnet-4-20250514");
        assert_eq!(r.temperature, Some(0.0));
        assert_eq!(r.max_tokens, 800);
        assert_eq!(r.messages, vec![Message::user_text("What is machine learning?")]);
        assert_eq!(r.system.as_deref(), Some(SYSTEM_PROMPT));
        assert!(r.tools.is_empty());
        assert!(r.tool_choice.is_none());
    }

    #[tokio::test]
    async fn history_is_appended_to_system_text() {
        let client = Arc::new(ScriptedClient::new(vec![text_response("ok")]));
        let generator = AiGenerator::new(client.clone(), "m");
        let history = "User: Previous question\nAssistant: Previous answer";

        generator
            .generate_response("Follow up", Some(history), None)
            .await
            .unwrap();

        let expected = format!("{SYSTEM_PROMPT}\n\nPrevious conversation:\n{history}");
        assert_eq!(client.requests()[0].system.as_deref(), Some(expected.as_str()));
    }

    #[tokio::test]
    async fn tools_offered_but_not_used() {
        let client = Arc::new(ScriptedClient::new(vec![text_response("plain")]));
        let generator = AiGenerator::new(client.clone(), "m");
        let store = Arc::new(FakeStore::default());
        let mut manager = manager_with(store.clone());

        let out = generator
            .generate_response("What is 2+2?", None, Some(&mut manager))
            .await
            .unwrap();

        assert_eq!(out, "plain");
        let reqs = client.requests();
        assert_eq!(reqs.len(), 1);
        assert_eq!(reqs[0].tools, manager.tool_definitions());
        assert_eq!(reqs[0].tool_choice, Some(ToolChoice::Auto));
        assert!(store.search_calls().is_empty());
    }

    #[tokio::test]
    async fn tool_use_triggers_exactly_one_followup() {
        let client = Arc::new(ScriptedClient::new(vec![
            tool_use_response(
                vec![],
                vec![(
                    "tool_123",
                    json!({"query": "machine learning", "course_name": "Introduction to Machine Learning"}),
                )],
            ),
            text_response("Based on the search results, machine learning is a subset of AI."),
        ]));
        let mut hits = SearchResults::empty();
        hits.push(
            "ML content".into(),
            ChunkMetadata {
                course_title: Some("Introduction to Machine Learning".into()),
                lesson_number: Some(1),
                chunk_index: Some(0),
            },
            0.1,
        );
        let store = Arc::new(FakeStore::with_results(hits));
        let mut manager = manager_with(store.clone());
        let generator = AiGenerator::new(client.clone(), "m");

        let out = generator
            .generate_response("What is ML?", None, Some(&mut manager))
            .await
            .unwrap();
        assert_eq!(
            out,
            "Based on the search results, machine learning is a subset of AI."
        );

        assert_eq!(
            store.search_calls(),
            vec![(
                "machine learning".to_string(),
                Some("Introduction to Machine Learning".to_string()),
                None
            )]
        );

        let reqs = client.requests();
        assert_eq!(reqs.len(), 2);
        let second = &reqs[1];
        assert!(second.tools.is_empty());
        assert!(second.tool_choice.is_none());
        assert_eq!(second.system, reqs[0].system);
        assert_eq!(second.messages.len(), 3);
        assert_eq!(second.messages[1].role, Role::Assistant);

        let last = &second.messages[2];
        assert_eq!(last.role, Role::User);
        match &last.content {
            MessageContent::Blocks(blocks) => {
                assert_eq!(blocks.len(), 1);
                match &blocks[0] {
                    ContentBlock::ToolResult {
                        tool_use_id,
                        content,
                        ..
                    } => {
                        assert_eq!(tool_use_id, "tool_123");
                        assert!(content.contains("[Introduction to Machine Learning - Lesson 1]"));
                    }
                    other => panic!("expected tool_result, got {other:?}"),
                }
            }
            other => panic!("expected blocks, got {other:?}"),
        }
        assert_eq!(manager.last_sources().len(), 1);
    }

    #[tokio::test]
    async fn every_tool_use_block_gets_a_result_in_order() {
        let client = Arc::new(ScriptedClient::new(vec![
            tool_use_response(
                vec![ContentBlock::text("Let me search.")],
                vec![
                    ("tool_123", json!({"query": "machine learning"})),
                    ("tool_456", json!({"query": "neural networks"})),
                ],
            ),
            text_response("Final response"),
        ]));
        let store = Arc::new(FakeStore::default());
        let mut manager = manager_with(store.clone());
        let generator = AiGenerator::new(client.clone(), "m");

        let out = generator
            .generate_response("q", None, Some(&mut manager))
            .await
            .unwrap();
        assert_eq!(out, "Final response");
        assert_eq!(store.search_calls().len(), 2);

        let reqs = client.requests();
        let assistant = &reqs[1].messages[1];
        match &assistant.content {
            MessageContent::Blocks(blocks) => {
                assert_eq!(blocks.len(), 3);
                assert_eq!(blocks[0], ContentBlock::text("Let me search."));
            }
            other => panic!("expected blocks, got {other:?}"),
        }
        match &reqs[1].messages[2].content {
            MessageContent::Blocks(blocks) => {
                let ids: Vec<&str> = blocks
                    .iter()
                    .filter_map(|b| match b {
                        ContentBlock::ToolResult { tool_use_id, .. } => Some(tool_use_id.as_str()),
                        _ => None,
                    })
                    .collect();
                assert_eq!(ids, vec!["tool_123", "tool_456"]);
            }
            other => panic!("expected blocks, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn tool_stop_without_tool_blocks_skips_result_turn() {
        let client = Arc::new(ScriptedClient::new(vec![
            tool_use_response(vec![ContentBlock::text("thinking aloud")], vec![]),
            text_response("No tools were executed"),
        ]));
        let mut manager = manager_with(Arc::new(FakeStore::default()));
        let generator = AiGenerator::new(client.clone(), "m");

        let out = generator
            .generate_response("q", None, Some(&mut manager))
            .await
            .unwrap();
        assert_eq!(out, "No tools were executed");
        assert_eq!(client.requests()[1].messages.len(), 2);
    }

    #[tokio::test]
    async fn tool_stop_without_registry_returns_first_text() {
        let mut resp = text_response("partial");
        resp.stop_reason = Some(StopReason::ToolUse);
        let client = Arc::new(ScriptedClient::new(vec![resp]));
        let generator = AiGenerator::new(client.clone(), "m");

        let out = generator.generate_response("q", None, None).await.unwrap();
        assert_eq!(out, "partial");
        assert_eq!(client.requests().len(), 1);
    }

    #[tokio::test]
    async fn unknown_tool_result_is_fed_back() {
        let mut first = tool_use_response(vec![], vec![("t1", json!({"query": "x"}))]);
        first.content = vec![ContentBlock::ToolUse {
            id: "t1".into(),
            name: "no_such_tool".into(),
            input: json!({"query": "x"}),
        }];
        let client = Arc::new(ScriptedClient::new(vec![first, text_response("done")]));
        let mut manager = manager_with(Arc::new(FakeStore::default()));
        let generator = AiGenerator::new(client.clone(), "m");

        generator
            .generate_response("q", None, Some(&mut manager))
            .await
            .unwrap();

        match &client.requests()[1].messages[2].content {
            MessageContent::Blocks(blocks) => assert_eq!(
                blocks[0],
                ContentBlock::tool_result("t1", "Tool 'no_such_tool' not found")
            ),
            other => panic!("expected blocks, got {other:?}"),
        }
        assert_ne!(SEARCH_TOOL_NAME, "no_such_tool");
    }

    #[tokio::test]
    async fn transport_errors_propagate() {
        let client = Arc::new(ScriptedClient::new(vec![]));
        let generator = AiGenerator::new(client, "m");
        let err = generator.generate_response("q", None, None).await.unwrap_err();
        assert!(matches!(err, AiLlmError::Provider(_)));
    }
}
