use std::sync::Arc;

use course_rag::RagSystem;
use tokio::sync::Mutex;

/// Shared state for all HTTP handlers.
///
/// Queries mutate the tool registry's citations, so the facade sits behind
/// one async mutex and requests are answered one at a time.
#[derive(Clone)]
pub struct AppState {
    pub rag: Arc<Mutex<RagSystem>>,
}

impl AppState {
    pub fn new(rag: RagSystem) -> Self {
        Self {
            rag: Arc::new(Mutex::new(rag)),
        }
    }
}
