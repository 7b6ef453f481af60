//! HTTP wrapper over the course assistant.
//!
//! Routes:
//! - `POST /api/query`: answer a question, creating a session when needed
//! - `GET /api/courses`: catalog statistics

mod core;
mod error_handler;
mod middleware_layer;
mod routes;

pub use crate::core::app_state::AppState;
pub use error_handler::{AppError, AppResult};

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tokio::signal;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

use crate::{
    middleware_layer::json_extractor::json_error_mapper,
    routes::{courses::courses_route::courses_route, query::query_route::query_route},
};

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/query", post(query_route))
        .route("/api/courses", get(courses_route))
        .layer(middleware::from_fn(json_error_mapper))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves the API on `address` until Ctrl+C.
///
/// # Errors
/// [`AppError::Bind`] when the address cannot be bound, [`AppError::Server`]
/// when the server loop fails.
pub async fn start(state: AppState, address: &str) -> AppResult<()> {
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(AppError::Bind)?;
    info!(address, "api listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    info!("api stopped");
    Ok(())
}

/// Returns a future that resolves when Ctrl+C is pressed
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
