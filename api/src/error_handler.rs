use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use course_rag::RagSystemError;
use serde::Serialize;
use thiserror::Error;

/// Public application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // --- IO / network / server ---
    #[error("failed to bind listener")]
    Bind(#[source] std::io::Error),

    #[error("server error")]
    Server(#[source] std::io::Error),

    // --- Request / routing ---
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Rich HTTP error mapped from lower layers with specific status & code.
    #[error("{message}")]
    Http {
        status: StatusCode,
        code: &'static str,
        message: String,
    },
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Http { status, .. } => *status,
            AppError::Bind(_) | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            AppError::Bind(_) => "BIND_ERROR",
            AppError::Server(_) => "SERVER_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Http { code, .. } => code,
        }
    }
}

/// JSON error body: `{ "error": <code>, "message": <text> }`.
#[derive(Serialize)]
pub(crate) struct ErrorBody<'a> {
    pub error: &'a str,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), error = %self, "request failed");
        }
        let body = ErrorBody {
            error: self.error_code(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Handy result alias used across handlers.
pub type AppResult<T> = Result<T, AppError>;

/// Upstream model and vector-store failures are gateway errors; everything
/// else is ours.
impl From<RagSystemError> for AppError {
    fn from(err: RagSystemError) -> Self {
        let (status, code) = match &err {
            RagSystemError::Llm(_) => (StatusCode::BAD_GATEWAY, "LLM_ERROR"),
            RagSystemError::Store(_) => (StatusCode::BAD_GATEWAY, "STORE_ERROR"),
            RagSystemError::Document(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DOCUMENT_ERROR"),
            RagSystemError::Tool(_) => (StatusCode::INTERNAL_SERVER_ERROR, "TOOL_ERROR"),
        };
        AppError::Http {
            status,
            code,
            message: err.to_string(),
        }
    }
}
