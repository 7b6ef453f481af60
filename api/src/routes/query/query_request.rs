use course_rag::Source;
use serde::{Deserialize, Serialize};

/// Request payload for POST /api/query.
#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    /// The user's question.
    pub query: String,
    /// Existing conversation; a new one is created when omitted.
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Response payload for POST /api/query.
#[derive(Debug, Serialize, Deserialize)]
pub struct QueryResponse {
    pub answer: String,
    pub sources: Vec<Source>,
    pub session_id: String,
}
