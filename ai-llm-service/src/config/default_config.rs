//! Default LLM configs loaded from environment variables.
//!
//! Two roles are needed by the course assistant:
//!
//! - **Chat**      → Anthropic Messages API model used for answers and tool use
//! - **Embedding** → Ollama embedding model used for semantic search
//!
//! # Environment variables
//!
//! Anthropic:
//! - `ANTHROPIC_API_KEY` = API key (mandatory)
//! - `ANTHROPIC_MODEL`   = model id (default `claude-sonnet-4-20250514`)
//! - `ANTHROPIC_URL`     = API base (default `https://api.anthropic.com`)
//! - `LLM_TIMEOUT_SECS`  = HTTP timeout (default 60)
//!
//! Ollama:
//! - `OLLAMA_URL` or `OLLAMA_PORT` = endpoint (default `http://localhost:11434`)
//! - `EMBEDDING_MODEL`             = embedding model (default `all-minilm`)

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{
        ConfigError, Result, env_opt_u64, env_or, must_env, validate_http_endpoint,
    },
};

pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_ANTHROPIC_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_EMBEDDING_MODEL: &str = "all-minilm";
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Token budget for a single answer.
pub const ANSWER_MAX_TOKENS: u32 = 800;

/// Constructs the config for the Anthropic chat model.
///
/// # Env
/// - `ANTHROPIC_API_KEY` (required)
/// - `ANTHROPIC_MODEL`, `ANTHROPIC_URL`, `LLM_TIMEOUT_SECS` (optional)
///
/// # Defaults
/// - `temperature = Some(0.0)`
/// - `max_tokens = Some(800)`
/// - `timeout_secs = Some(60)`
///
/// # Errors
/// - [`ConfigError::MissingVar`] when the API key is absent
/// - [`ConfigError::InvalidFormat`] when the URL is not http(s)
pub fn config_anthropic_chat() -> Result<LlmModelConfig> {
    let api_key = must_env("ANTHROPIC_API_KEY")?;
    let model = env_or("ANTHROPIC_MODEL", DEFAULT_ANTHROPIC_MODEL);
    let endpoint = env_or("ANTHROPIC_URL", DEFAULT_ANTHROPIC_URL);
    validate_http_endpoint("ANTHROPIC_URL", &endpoint)?;
    let timeout_secs = env_opt_u64("LLM_TIMEOUT_SECS")?.unwrap_or(60);

    Ok(LlmModelConfig {
        provider: LlmProvider::Anthropic,
        model,
        endpoint,
        api_key: Some(api_key),
        max_tokens: Some(ANSWER_MAX_TOKENS),
        temperature: Some(0.0),
        timeout_secs: Some(timeout_secs),
    })
}

/// Constructs the config for the Ollama embedding model.
///
/// # Env
/// - `OLLAMA_URL` or `OLLAMA_PORT` (optional, defaults to localhost)
/// - `EMBEDDING_MODEL` (optional)
///
/// # Defaults
/// - `temperature = Some(0.0)` (deterministic)
/// - `timeout_secs = Some(30)`
pub fn config_ollama_embedding() -> Result<LlmModelConfig> {
    let endpoint = ollama_endpoint(
        std::env::var("OLLAMA_URL").ok(),
        std::env::var("OLLAMA_PORT").ok(),
    )?;
    let model = env_or("EMBEDDING_MODEL", DEFAULT_EMBEDDING_MODEL);

    Ok(LlmModelConfig {
        provider: LlmProvider::Ollama,
        model,
        endpoint,
        api_key: None,
        max_tokens: None,
        temperature: Some(0.0),
        timeout_secs: Some(30),
    })
}

/// Resolves the Ollama endpoint.
///
/// Precedence:
/// 1. `OLLAMA_URL` if present and non-empty
/// 2. `OLLAMA_PORT` → `http://localhost:{port}`
/// 3. [`DEFAULT_OLLAMA_URL`]
fn ollama_endpoint(url: Option<String>, port: Option<String>) -> Result<String> {
    if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
        validate_http_endpoint("OLLAMA_URL", &url)?;
        return Ok(url);
    }
    if let Some(port) = port.filter(|p| !p.trim().is_empty()) {
        let port = port
            .trim()
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidNumber {
                var: "OLLAMA_PORT",
                reason: "expected u16 (1..=65535)",
            })?;
        return Ok(format!("http://localhost:{port}"));
    }
    Ok(DEFAULT_OLLAMA_URL.to_string())
}
