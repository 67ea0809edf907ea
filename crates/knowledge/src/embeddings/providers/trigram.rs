//! Trigram embedding provider for offline retrieval.

use crate::embeddings::provider::EmbeddingProvider;
use manual_core::AppResult;
use std::collections::HashMap;

const MODEL_NAME: &str = "trigram-v1";

const STOP_WORDS: &[&str] = &[
    "the", "is", "at", "which", "on", "a", "an", "as", "are", "was", "were", "for", "to", "of",
    "in", "and", "or", "but", "with", "by", "from", "this", "that", "be", "have", "has", "had",
    "it", "its", "their", "they", "them", "how",
];

/// Deterministic, content-dependent embeddings built from character trigrams
/// and whole-word hashes.
///
/// Not semantically aware like a neural model, but stable across runs and
/// good enough for keyword-style matching of short manual passages.
#[derive(Debug)]
pub struct TrigramProvider {
    dimensions: usize,
}

impl TrigramProvider {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0_f32; self.dimensions];

        for (word, freq) in word_frequencies(text) {
            let chars: Vec<char> = word.chars().collect();
            for window in chars.windows(3) {
                let trigram: String = window.iter().collect();
                let idx = (hash_with(&trigram, 37) as usize) % self.dimensions;
                embedding[idx] += (freq as f32).sqrt();
            }

            let idx = (hash_with(&word, 31) as usize) % self.dimensions;
            embedding[idx] += freq as f32;
        }

        normalize(&mut embedding);
        embedding
    }
}

/// Lowercased content words (stop words and words under three bytes dropped)
/// with their counts. Surrounding punctuation is stripped.
fn word_frequencies(text: &str) -> HashMap<String, u32> {
    let lower = text.to_lowercase();
    let mut freq = HashMap::new();

    for word in lower
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|w| w.len() > 2 && !STOP_WORDS.contains(&w))
    {
        *freq.entry(word.to_string()).or_insert(0) += 1;
    }

    freq
}

fn hash_with(s: &str, multiplier: u64) -> u64 {
    s.bytes()
        .fold(0u64, |acc, b| acc.wrapping_mul(multiplier).wrapping_add(b as u64))
}

fn normalize(v: &mut [f32]) {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for TrigramProvider {
    fn provider_name(&self) -> &str {
        "trigram"
    }

    fn model_name(&self) -> &str {
        MODEL_NAME
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.embed_text(text)).collect())
    }
}
