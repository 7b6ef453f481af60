/// Represents the provider (backend) used for large language model (LLM) calls.
///
/// Chat/tool-use traffic goes to Anthropic; embeddings come from a local
/// Ollama runtime.
///
/// # Examples
///
/// ```
/// use ai_llm_service::config::llm_provider::LlmProvider;
///
/// fn describe(provider: LlmProvider) -> &'static str {
///     match provider {
///         LlmProvider::Anthropic => "Anthropic Messages API",
///         LlmProvider::Ollama => "local Ollama runtime",
///     }
/// }
/// assert_eq!(describe(LlmProvider::Ollama), "local Ollama runtime");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LlmProvider {
    /// Anthropic Messages API (chat + tool use).
    Anthropic,
    /// Local Ollama runtime (embeddings).
    Ollama,
}
