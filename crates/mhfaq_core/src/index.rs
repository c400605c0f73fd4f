//! The similarity index: the corpus plus one precomputed embedding per
//! entry, index-aligned and immutable after build.

use crate::embed::EmbeddingProvider;
use crate::model::FaqEntry;
use anyhow::{bail, Context, Result};

pub struct SimilarityIndex {
    entries: Vec<FaqEntry>,
    vectors: Vec<Vec<f32>>,
}

impl SimilarityIndex {
    /// Encode every entry's cleaned question in corpus order. Fails on
    /// an empty corpus or when the encoder fails on any entry.
    pub fn build<E>(entries: Vec<FaqEntry>, encoder: &E) -> Result<Self>
    where
        E: EmbeddingProvider + ?Sized,
    {
        if entries.is_empty() {
            bail!("cannot build index from an empty corpus");
        }

        let mut vectors = Vec::with_capacity(entries.len());
        for entry in &entries {
            let vector = encoder
                .embed(&entry.cleaned_question)
                .with_context(|| format!("embed corpus entry {}", entry.id))?;
            vectors.push(vector);
        }

        Ok(Self { entries, vectors })
    }

    pub fn size(&self) -> usize {
        self.entries.len()
    }

    pub fn dimension(&self) -> usize {
        self.vectors.first().map(Vec::len).unwrap_or(0)
    }

    pub fn entries(&self) -> &[FaqEntry] {
        &self.entries
    }

    /// Entries paired with their vectors, in corpus order.
    pub fn iter(&self) -> impl Iterator<Item = (&FaqEntry, &[f32])> {
        self.entries
            .iter()
            .zip(self.vectors.iter().map(Vec::as_slice))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embed::HashEmbeddingProvider;

    fn entry(id: usize, cleaned: &str) -> FaqEntry {
        FaqEntry {
            id,
            question: format!("q{id}"),
            cleaned_question: cleaned.to_string(),
            answer: format!("a{id}"),
            category: "General".to_string(),
        }
    }

    #[test]
    fn build_pairs_vectors_with_entries_in_order() {
        let encoder = HashEmbeddingProvider::new(32);
        let index =
            SimilarityIndex::build(vec![entry(0, "sleep"), entry(1, "stress")], &encoder).unwrap();

        assert_eq!(index.size(), 2);
        assert_eq!(index.dimension(), 32);
        let ids: Vec<usize> = index.iter().map(|(e, _)| e.id).collect();
        assert_eq!(ids, vec![0, 1]);
    }

    #[test]
    fn empty_corpus_fails_to_build() {
        let encoder = HashEmbeddingProvider::new(32);
        assert!(SimilarityIndex::build(Vec::new(), &encoder).is_err());
    }
}
