// Trained word vectors and the queries run against them.

use std::collections::HashMap;

use anyhow::Result;
use ndarray::{Array2, ArrayView1};

/// Word vectors produced by the skip-gram trainer.
///
/// Rows follow vocabulary order (most frequent word first).
#[derive(Debug, Clone)]
pub struct WordVectors {
    words: Vec<String>,
    index: HashMap<String, usize>,
    vectors: Array2<f32>,
}

/// Vectors gathered for a list of words, with the words that had none.
#[derive(Debug, Clone)]
pub struct VectorSelection {
    /// Words that have a vector, in request order
    pub words: Vec<String>,
    /// One row per entry of `words`
    pub vectors: Array2<f64>,
    /// Requested words missing from the vocabulary (pruned by min_count)
    pub skipped: Vec<String>,
}

impl WordVectors {
    /// Wrap a `(words, dim)` matrix. `words.len()` must equal the row count.
    pub fn new(words: Vec<String>, vectors: Array2<f32>) -> Result<Self> {
        if words.len() != vectors.nrows() {
            anyhow::bail!(
                "Vector matrix has {} rows for {} words",
                vectors.nrows(),
                words.len()
            );
        }
        let index = words
            .iter()
            .enumerate()
            .map(|(i, w)| (w.clone(), i))
            .collect();
        Ok(Self {
            words,
            index,
            vectors,
        })
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Vector dimensionality.
    pub fn dim(&self) -> usize {
        self.vectors.ncols()
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn contains(&self, word: &str) -> bool {
        self.index.contains_key(word)
    }

    pub fn vector(&self, word: &str) -> Option<ArrayView1<'_, f32>> {
        self.index.get(word).map(|&i| self.vectors.row(i))
    }

    fn require(&self, word: &str) -> Result<ArrayView1<'_, f32>> {
        self.vector(word).ok_or_else(|| {
            anyhow::anyhow!("'{word}' is not in the vocabulary (below the minimum count?)")
        })
    }

    /// Cosine similarity between two words.
    pub fn similarity(&self, a: &str, b: &str) -> Result<f32> {
        Ok(cosine_similarity(self.require(a)?, self.require(b)?))
    }

    /// The `topn` words closest to `word` by cosine similarity, excluding
    /// the word itself, most similar first.
    pub fn most_similar(&self, word: &str, topn: usize) -> Result<Vec<(String, f32)>> {
        let target = self.require(word)?;

        let mut scored: Vec<(String, f32)> = self
            .words
            .iter()
            .enumerate()
            .filter(|(_, w)| w.as_str() != word)
            .map(|(i, w)| (w.clone(), cosine_similarity(target, self.vectors.row(i))))
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(topn);

        Ok(scored)
    }

    /// Gather vectors for `words`, skipping any that are not in the vocabulary.
    pub fn select<'a>(&self, words: impl IntoIterator<Item = &'a str>) -> Result<VectorSelection> {
        let mut kept = Vec::new();
        let mut skipped = Vec::new();
        let mut flat = Vec::new();

        for word in words {
            match self.vector(word) {
                Some(v) => {
                    kept.push(word.to_string());
                    flat.extend(v.iter().map(|&x| x as f64));
                }
                None => skipped.push(word.to_string()),
            }
        }

        let vectors = Array2::from_shape_vec((kept.len(), self.dim()), flat)?;
        Ok(VectorSelection {
            words: kept,
            vectors,
            skipped,
        })
    }
}

/// Cosine similarity in [-1, 1]; 0.0 when either vector has zero length.
pub fn cosine_similarity(a: ArrayView1<'_, f32>, b: ArrayView1<'_, f32>) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot = a.dot(&b);
    let denom = a.dot(&a).sqrt() * b.dot(&b).sqrt();
    if denom < f32::EPSILON {
        0.0
    } else {
        (dot / denom).clamp(-1.0, 1.0)
    }
}
