//! Ranking of corpus entries against a free-text query.

use crate::embed::EmbeddingProvider;
use crate::index::SimilarityIndex;
use crate::model::FaqEntry;
use crate::text::clean_text;
use anyhow::{Context, Result};

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.is_empty() || b.is_empty() || a.len() != b.len() {
        return 0.0;
    }

    let (dot, na, nb) = a
        .iter()
        .zip(b.iter())
        .fold((0.0f32, 0.0f32, 0.0f32), |(d, aa, bb), (x, y)| {
            (d + (x * y), aa + (x * x), bb + (y * y))
        });

    if na == 0.0 || nb == 0.0 {
        0.0
    } else {
        dot / (na.sqrt() * nb.sqrt())
    }
}

/// Rank every indexed entry against `query_text` and return the best
/// `top_k`, unfiltered — confidence filtering is presentation policy
/// and belongs to the caller.
///
/// The query is cleaned, embedded, and compared against all entries in
/// one exhaustive pass; the corpus is small enough that this beats
/// maintaining an approximate index. The sort is stable and descending
/// by score, so equal scores keep ascending corpus order.
///
/// Callers pass a clamped `top_k` >= 1.
pub fn rank<'a, E>(
    encoder: &E,
    index: &'a SimilarityIndex,
    query_text: &str,
    top_k: usize,
) -> Result<Vec<(&'a FaqEntry, f32)>>
where
    E: EmbeddingProvider + ?Sized,
{
    let cleaned = clean_text(query_text);
    let query_vector = encoder.embed(&cleaned).context("embed query")?;

    let mut scored: Vec<(&FaqEntry, f32)> = index
        .iter()
        .map(|(entry, vector)| (entry, cosine_similarity(&query_vector, vector)))
        .collect();

    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    scored.truncate(top_k);
    Ok(scored)
}
