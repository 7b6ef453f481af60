//! POST /api/query: answers a course question within a session.

use axum::{Json, extract::State};
use tracing::info;

use crate::{
    core::app_state::AppState,
    error_handler::{AppError, AppResult},
    routes::query::query_request::{QueryRequest, QueryResponse},
};

/// Handler: POST /api/query
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:8000/api/query \
///   -H 'content-type: application/json' \
///   -d '{"query":"What is covered in lesson 2 of the MCP course?"}'
/// ```
pub async fn query_route(
    State(state): State<AppState>,
    Json(body): Json<QueryRequest>,
) -> AppResult<Json<QueryResponse>> {
    if body.query.trim().is_empty() {
        return Err(AppError::BadRequest("query must not be empty".into()));
    }

    let mut rag = state.rag.lock().await;
    let session_id = match body.session_id {
        Some(id) => id,
        None => rag.create_session(),
    };

    let (answer, sources) = rag.query(&body.query, Some(&session_id)).await?;
    info!(session = %session_id, sources = sources.len(), "query served");

    Ok(Json(QueryResponse {
        answer,
        sources,
        session_id,
    }))
}
