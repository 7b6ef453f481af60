//! In-memory fakes shared by unit tests.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use ai_llm_service::{
    AiLlmError, ContentBlock, MessagesApi, MessagesFuture, MessagesRequest, MessagesResponse, StopReason,
    error_handler::{Provider, ProviderError, ProviderErrorKind},
};
use rag_store::{Course, CourseChunk, CourseStore, RagError, SearchResults, StoreFuture};
use serde_json::Value;

use crate::search_tools::SEARCH_TOOL_NAME;

/* ---------------------------------------------------------------------- */
/* FakeStore                                                              */
/* ---------------------------------------------------------------------- */

type SearchCall = (String, Option<String>, Option<u32>);

#[derive(Default)]
struct StoreState {
    results: Option<SearchResults>,
    search_calls: Vec<SearchCall>,
    link_calls: Vec<(String, u32)>,
    courses: Vec<Course>,
    chunks: Vec<CourseChunk>,
    cleared: usize,
}

/// Records every call; `search` answers with a canned result.
#[derive(Default)]
pub struct FakeStore {
    state: Mutex<StoreState>,
}

impl FakeStore {
    pub fn with_results(results: SearchResults) -> Self {
        let store = Self::default();
        store.state.lock().unwrap().results = Some(results);
        store
    }

    pub fn search_calls(&self) -> Vec<SearchCall> {
        self.state.lock().unwrap().search_calls.clone()
    }

    pub fn link_calls(&self) -> Vec<(String, u32)> {
        self.state.lock().unwrap().link_calls.clone()
    }

    pub fn courses(&self) -> Vec<Course> {
        self.state.lock().unwrap().courses.clone()
    }

    pub fn chunks(&self) -> Vec<CourseChunk> {
        self.state.lock().unwrap().chunks.clone()
    }

    pub fn cleared(&self) -> usize {
        self.state.lock().unwrap().cleared
    }
}

impl CourseStore for FakeStore {
    fn search<'a>(
        &'a self,
        query: &'a str,
        course_name: Option<&'a str>,
        lesson_number: Option<u32>,
    ) -> StoreFuture<'a, SearchResults> {
        let mut st = self.state.lock().unwrap();
        st.search_calls.push((
            query.to_string(),
            course_name.map(str::to_string),
            lesson_number,
        ));
        let out = st.results.clone().unwrap_or_else(SearchResults::empty);
        Box::pin(async move { out })
    }

    fn get_lesson_link<'a>(
        &'a self,
        course_title: &'a str,
        lesson_number: u32,
    ) -> StoreFuture<'a, Option<String>> {
        self.state
            .lock()
            .unwrap()
            .link_calls
            .push((course_title.to_string(), lesson_number));
        Box::pin(async { Some("https://example.com/lesson-link".to_string()) })
    }

    fn get_course_link<'a>(&'a self, course_title: &'a str) -> StoreFuture<'a, Option<String>> {
        let link = self
            .state
            .lock()
            .unwrap()
            .courses
            .iter()
            .find(|c| c.title == course_title)
            .and_then(|c| c.course_link.clone());
        Box::pin(async move { link })
    }

    fn add_course_metadata<'a>(
        &'a self,
        course: &'a Course,
    ) -> StoreFuture<'a, Result<(), RagError>> {
        let mut st = self.state.lock().unwrap();
        st.courses.retain(|c| c.title != course.title);
        st.courses.push(course.clone());
        Box::pin(async { Ok(()) })
    }

    fn add_course_content<'a>(
        &'a self,
        chunks: &'a [CourseChunk],
    ) -> StoreFuture<'a, Result<usize, RagError>> {
        self.state.lock().unwrap().chunks.extend_from_slice(chunks);
        let n = chunks.len();
        Box::pin(async move { Ok(n) })
    }

    fn clear_all_data(&self) -> StoreFuture<'_, Result<(), RagError>> {
        let mut st = self.state.lock().unwrap();
        st.courses.clear();
        st.chunks.clear();
        st.cleared += 1;
        Box::pin(async { Ok(()) })
    }

    fn existing_course_titles(&self) -> StoreFuture<'_, Result<Vec<String>, RagError>> {
        let titles = self
            .state
            .lock()
            .unwrap()
            .courses
            .iter()
            .map(|c| c.title.clone())
            .collect();
        Box::pin(async move { Ok(titles) })
    }

    fn course_count(&self) -> StoreFuture<'_, Result<usize, RagError>> {
        let n = self.state.lock().unwrap().courses.len();
        Box::pin(async move { Ok(n) })
    }
}

/* ---------------------------------------------------------------------- */
/* ScriptedClient                                                         */
/* ---------------------------------------------------------------------- */

/// Replays queued responses and records every request it receives.
///
/// A `None` step, or an exhausted script, answers with a provider error.
pub struct ScriptedClient {
    script: Mutex<VecDeque<Option<MessagesResponse>>>,
    requests: Arc<Mutex<Vec<MessagesRequest>>>,
}

impl ScriptedClient {
    pub fn new(script: Vec<MessagesResponse>) -> Self {
        Self::with_steps(script.into_iter().map(Some).collect())
    }

    pub fn with_steps(steps: Vec<Option<MessagesResponse>>) -> Self {
        Self {
            script: Mutex::new(steps.into()),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn requests(&self) -> Vec<MessagesRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl MessagesApi for ScriptedClient {
    fn create<'a>(&'a self, request: &'a MessagesRequest) -> MessagesFuture<'a> {
        self.requests.lock().unwrap().push(request.clone());
        let next = self.script.lock().unwrap().pop_front().flatten();
        Box::pin(async move {
            next.ok_or_else(|| {
                AiLlmError::from(ProviderError::new(
                    Provider::Anthropic,
                    ProviderErrorKind::Decode("script exhausted".into()),
                ))
            })
        })
    }
}

pub fn text_response(text: &str) -> MessagesResponse {
    MessagesResponse {
        id: "msg_text".into(),
        content: vec![ContentBlock::text(text)],
        stop_reason: Some(StopReason::EndTurn),
        usage: None,
    }
}

/// A `tool_use` stop with `lead` blocks followed by one search call per entry.
pub fn tool_use_response(lead: Vec<ContentBlock>, calls: Vec<(&str, Value)>) -> MessagesResponse {
    let mut content = lead;
    content.extend(calls.into_iter().map(|(id, input)| ContentBlock::ToolUse {
        id: id.to_string(),
        name: SEARCH_TOOL_NAME.to_string(),
        input,
    }));
    MessagesResponse {
        id: "msg_tool".into(),
        content,
        stop_reason: Some(StopReason::ToolUse),
        usage: None,
    }
}
