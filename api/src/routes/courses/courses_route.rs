//! GET /api/courses: catalog statistics.

use axum::{Json, extract::State};
use course_rag::CourseAnalytics;

use crate::{core::app_state::AppState, error_handler::AppResult};

pub async fn courses_route(State(state): State<AppState>) -> AppResult<Json<CourseAnalytics>> {
    let rag = state.rag.lock().await;
    Ok(Json(rag.course_analytics().await?))
}
