//! Embedding executor with concurrency and dimension checks.

use crate::{embed::EmbeddingsProvider, errors::RagError};
use futures::stream::{self, StreamExt};
use tracing::debug;

/// Embeds every text with at most `concurrency` requests in flight.
///
/// Output order matches input order.
///
/// # Errors
/// Returns the first provider error, or [`RagError::VectorSizeMismatch`] if a
/// vector does not have `expected_dim` components.
pub async fn embed_all(
    texts: &[&str],
    provider: &dyn EmbeddingsProvider,
    expected_dim: usize,
    concurrency: usize,
) -> Result<Vec<Vec<f32>>, RagError> {
    debug!(total = texts.len(), concurrency, "embed_pool::embed_all");

    if texts.is_empty() {
        return Ok(Vec::new());
    }

    let owned: Vec<(usize, String)> = texts
        .iter()
        .enumerate()
        .map(|(i, t)| (i, t.to_string()))
        .collect();

    let mut results: Vec<(usize, Vec<f32>)> = stream::iter(owned)
        .map(|(i, text)| embed_one(provider, i, text))
        .buffer_unordered(concurrency.max(1))
        .collect::<Vec<_>>()
        .await
        .into_iter()
        .collect::<Result<Vec<_>, RagError>>()?;

    if let Some((_, v)) = results.iter().find(|(_, v)| v.len() != expected_dim) {
        return Err(RagError::VectorSizeMismatch {
            got: v.len(),
            want: expected_dim,
        });
    }

    results.sort_unstable_by_key(|(i, _)| *i);
    Ok(results.into_iter().map(|(_, v)| v).collect())
}

async fn embed_one(
    provider: &dyn EmbeddingsProvider,
    i: usize,
    text: String,
) -> Result<(usize, Vec<f32>), RagError> {
    let v = provider.embed(&text).await?;
    Ok((i, v))
}
