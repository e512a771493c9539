// Word map pipeline: word vectors → spectral clusters → 2-D t-SNE layout.
//
// Training and the O(n²)/O(n³) clustering and projection stages are CPU-bound,
// so the async entry points move them onto spawn_blocking. The synchronous
// cores are public too, for tests and library callers without a runtime.

use anyhow::{Context, Result};
use indicatif::ProgressBar;
use ndarray::Array2;
use tracing::info;

use crate::cluster::spectral::SpectralClustering;
use crate::embedding::model::{VectorSelection, WordVectors};
use crate::embedding::skipgram::{SkipGramParams, SkipGramTrainer};
use crate::projection::scaler::StandardScaler;
use crate::projection::tsne::Tsne;

/// Clustered and projected words, ready to print or plot.
#[derive(Debug, Clone)]
pub struct WordMap {
    /// Words that had a vector, in frequency-table order
    pub words: Vec<String>,
    /// Cluster label per word
    pub labels: Vec<usize>,
    /// 2-D coordinates per word, one row each
    pub points: Array2<f64>,
    /// Words dropped because they fell below the training minimum count
    pub skipped: Vec<String>,
    pub n_clusters: usize,
}

impl WordMap {
    /// Words grouped by cluster label, in label order.
    pub fn clusters(&self) -> Vec<Vec<&str>> {
        let mut groups = vec![Vec::new(); self.n_clusters];
        for (word, &label) in self.words.iter().zip(&self.labels) {
            if let Some(group) = groups.get_mut(label) {
                group.push(word.as_str());
            }
        }
        groups
    }
}

/// Cluster and project a set of word vectors.
pub fn build_word_map(
    selection: VectorSelection,
    clustering: &SpectralClustering,
    tsne: &Tsne,
) -> Result<WordMap> {
    if tsne.n_components != 2 {
        anyhow::bail!(
            "A word map is two-dimensional; t-SNE is set to {} components",
            tsne.n_components
        );
    }

    let VectorSelection {
        words,
        vectors,
        skipped,
    } = selection;

    info!(
        words = words.len(),
        skipped = skipped.len(),
        "Building word map"
    );

    let labels = clustering.fit_predict(&vectors)?;
    let scaled = StandardScaler::fit_transform(&vectors);
    let points = tsne.fit_transform(&scaled)?;

    Ok(WordMap {
        words,
        labels,
        points,
        skipped,
        n_clusters: clustering.n_clusters,
    })
}

/// Train word vectors on a blocking thread.
pub async fn train_vectors(
    texts: Vec<Vec<String>>,
    params: SkipGramParams,
    progress: ProgressBar,
) -> Result<WordVectors> {
    tokio::task::spawn_blocking(move || {
        SkipGramTrainer::new(params).train_observed(&texts, &progress)
    })
    .await
    .context("spawn_blocking panicked")?
}

/// Cluster and project on a blocking thread.
pub async fn map_words(
    selection: VectorSelection,
    clustering: SpectralClustering,
    tsne: Tsne,
) -> Result<WordMap> {
    tokio::task::spawn_blocking(move || build_word_map(selection, &clustering, &tsne))
        .await
        .context("spawn_blocking panicked")?
}
