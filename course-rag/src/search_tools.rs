//! Tools the model may call, and the registry that dispatches them.

use std::{future::Future, pin::Pin, sync::Arc};

use ai_llm_service::ToolDefinition;
use rag_store::{CourseStore, SearchResults};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::api_types::Source;
use crate::error::ToolError;

/// Boxed future returned by [`Tool::execute`].
pub type ToolFuture<'a> = Pin<Box<dyn Future<Output = String> + Send + 'a>>;

/// A tool advertised to the model.
///
/// `execute` always yields text for the model; failures are rendered into
/// that text rather than returned as errors.
pub trait Tool: Send + Sync {
    fn definition(&self) -> ToolDefinition;

    fn execute<'a>(&'a mut self, input: &'a Value) -> ToolFuture<'a>;

    /// Citations collected since the last reset.
    fn last_sources(&self) -> &[Source] {
        &[]
    }

    fn reset_sources(&mut self) {}
}

/* ---------------------------------------------------------------------- */
/* CourseSearchTool                                                       */
/* ---------------------------------------------------------------------- */

pub const SEARCH_TOOL_NAME: &str = "search_course_content";

#[derive(Debug, Deserialize)]
struct SearchArgs {
    query: String,
    #[serde(default)]
    course_name: Option<String>,
    #[serde(default)]
    lesson_number: Option<u32>,
}

/// Semantic search over course content with optional course/lesson filters.
pub struct CourseSearchTool {
    store: Arc<dyn CourseStore>,
    last_sources: Vec<Source>,
}

impl CourseSearchTool {
    pub fn new(store: Arc<dyn CourseStore>) -> Self {
        Self {
            store,
            last_sources: Vec::new(),
        }
    }

    async fn run(&mut self, input: &Value) -> String {
        let args: SearchArgs = match serde_json::from_value(input.clone()) {
            Ok(a) => a,
            Err(e) => {
                warn!(error = %e, "invalid search tool arguments");
                return format!("Invalid arguments for tool '{SEARCH_TOOL_NAME}': {e}");
            }
        };

        debug!(
            query = %args.query,
            course = ?args.course_name,
            lesson = ?args.lesson_number,
            "search tool invoked"
        );

        let results = self
            .store
            .search(&args.query, args.course_name.as_deref(), args.lesson_number)
            .await;

        if let Some(err) = &results.error {
            return err.clone();
        }

        if results.is_empty() {
            return empty_message(args.course_name.as_deref(), args.lesson_number);
        }

        self.format_results(&results).await
    }

    /// Renders hits for the model; their citations replace the previous ones.
    async fn format_results(&mut self, results: &SearchResults) -> String {
        let mut formatted = Vec::with_capacity(results.documents.len());
        let mut sources = Vec::with_capacity(results.documents.len());

        for (doc, meta) in results.hits() {
            let course = meta.course_title.as_deref().unwrap_or("unknown");

            let mut label = course.to_string();
            if let Some(n) = meta.lesson_number {
                label.push_str(&format!(" - Lesson {n}"));
            }

            let url = match meta.lesson_number {
                Some(n) => self.store.get_lesson_link(course, n).await,
                None => None,
            };

            formatted.push(format!("[{label}]\n{doc}"));
            sources.push(Source { text: label, url });
        }

        self.last_sources = sources;
        formatted.join("\n\n")
    }
}

fn empty_message(course_name: Option<&str>, lesson_number: Option<u32>) -> String {
    let mut msg = String::from("No relevant content found");
    if let Some(course) = course_name {
        msg.push_str(&format!(" in course '{course}'"));
    }
    if let Some(n) = lesson_number {
        msg.push_str(&format!(" in lesson {n}"));
    }
    msg.push('.');
    msg
}

impl Tool for CourseSearchTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: SEARCH_TOOL_NAME.to_string(),
            description: "Search course materials with smart course name matching and lesson filtering"
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "What to search for in the course content"
                    },
                    "course_name": {
                        "type": "string",
                        "description": "Course title (partial matches work, e.g. 'MCP', 'Introduction')"
                    },
                    "lesson_number": {
                        "type": "integer",
                        "description": "Specific lesson number to search within (e.g. 1, 2, 3)"
                    }
                },
                "required": ["query"]
            }),
        }
    }

    fn execute<'a>(&'a mut self, input: &'a Value) -> ToolFuture<'a> {
        Box::pin(self.run(input))
    }

    fn last_sources(&self) -> &[Source] {
        &self.last_sources
    }

    fn reset_sources(&mut self) {
        self.last_sources.clear();
    }
}

/* ---------------------------------------------------------------------- */
/* ToolManager                                                            */
/* ---------------------------------------------------------------------- */

/// Name-keyed tool registry; iteration follows registration order.
#[derive(Default)]
pub struct ToolManager {
    tools: Vec<(String, Box<dyn Tool>)>,
}

impl ToolManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tool under its definition name, replacing any tool
    /// already registered with that name.
    ///
    /// # Errors
    /// [`ToolError::MissingName`] when the definition has an empty name.
    pub fn register_tool(&mut self, tool: Box<dyn Tool>) -> Result<(), ToolError> {
        let name = tool.definition().name;
        if name.trim().is_empty() {
            return Err(ToolError::MissingName);
        }
        match self.tools.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = tool,
            None => self.tools.push((name, tool)),
        }
        Ok(())
    }

    pub fn tool_definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|(_, t)| t.definition()).collect()
    }

    /// Runs a tool by name. Unknown names yield `Tool '<name>' not found`.
    pub async fn execute_tool(&mut self, name: &str, input: &Value) -> String {
        match self.tools.iter_mut().find(|(n, _)| n == name) {
            Some((_, tool)) => tool.execute(input).await,
            None => {
                warn!(tool = name, "model requested unknown tool");
                format!("Tool '{name}' not found")
            }
        }
    }

    /// Citations retained by all registered tools, in registration order.
    pub fn last_sources(&self) -> Vec<Source> {
        self.tools
            .iter()
            .flat_map(|(_, t)| t.last_sources().iter().cloned())
            .collect()
    }

    pub fn reset_sources(&mut self) {
        for (_, tool) in &mut self.tools {
            tool.reset_sources();
        }
    }
}
