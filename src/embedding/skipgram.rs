// Skip-gram word2vec trainer.
//
// For every word in a training text, each word within a (randomly shrunk)
// window around it is used as input to predict the centre word. Two output
// objectives are supported and can be combined: hierarchical softmax over a
// Huffman tree, and negative sampling against the unigram^0.75 distribution.
// The learning rate decays linearly from `alpha` to `min_alpha` over all
// epochs.
//
// Training is single-threaded and fully determined by the seed, so repeated
// runs over the same text produce the same vectors.

use anyhow::Result;
use indicatif::ProgressBar;
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use super::model::WordVectors;
use super::vocab::{NoiseTable, Vocabulary};

/// Input to the sigmoid is clamped to this range.
const MAX_EXP: f32 = 20.0;

/// Hyperparameters for skip-gram training.
#[derive(Debug, Clone)]
pub struct SkipGramParams {
    /// Dimensionality of the word vectors
    pub vector_size: usize,
    /// Maximum distance between the centre word and a context word
    pub window: usize,
    /// Noise words drawn per positive pair (0 disables negative sampling)
    pub negative: usize,
    /// Use hierarchical softmax
    pub hierarchical_softmax: bool,
    /// Words seen fewer times than this are left out of the vocabulary
    pub min_count: u64,
    /// Subsampling threshold for frequent words (0 disables it)
    pub sample: f64,
    /// Passes over the training texts
    pub epochs: usize,
    /// Initial learning rate
    pub alpha: f32,
    /// Final learning rate
    pub min_alpha: f32,
    pub seed: u64,
}

impl Default for SkipGramParams {
    fn default() -> Self {
        Self {
            vector_size: 100,
            window: 5,
            negative: 3,
            hierarchical_softmax: true,
            min_count: 5,
            sample: 0.001,
            epochs: 5,
            alpha: 0.025,
            min_alpha: 0.0001,
            seed: 1,
        }
    }
}

/// Trains word vectors from tokenized texts.
#[derive(Debug, Clone, Default)]
pub struct SkipGramTrainer {
    pub params: SkipGramParams,
}

impl SkipGramTrainer {
    pub fn new(params: SkipGramParams) -> Self {
        Self { params }
    }

    /// Train without progress reporting.
    pub fn train(&self, texts: &[Vec<String>]) -> Result<WordVectors> {
        self.train_observed(texts, &ProgressBar::hidden())
    }

    /// Train, advancing `progress` once per training text per epoch.
    pub fn train_observed(
        &self,
        texts: &[Vec<String>],
        progress: &ProgressBar,
    ) -> Result<WordVectors> {
        let params = &self.params;
        if params.vector_size == 0 {
            anyhow::bail!("vector_size must be at least 1");
        }
        if !params.hierarchical_softmax && params.negative == 0 {
            anyhow::bail!("Enable hierarchical softmax or negative sampling (or both)");
        }

        let vocab = Vocabulary::build(texts, params.min_count);
        if vocab.is_empty() {
            anyhow::bail!(
                "No word occurs at least {} times; the text is too short to train on",
                params.min_count
            );
        }

        info!(
            vocab = vocab.len(),
            texts = texts.len(),
            dim = params.vector_size,
            epochs = params.epochs,
            "Training skip-gram model"
        );

        let mut session = Session::new(params, &vocab);
        let keep = vocab.keep_probabilities(params.sample);

        let words_per_epoch: u64 = texts
            .iter()
            .map(|t| t.iter().filter(|w| vocab.index_of(w.as_str()).is_some()).count() as u64)
            .sum();
        let total_words = (words_per_epoch * params.epochs as u64).max(1);
        let mut processed: u64 = 0;

        progress.set_length((texts.len() * params.epochs) as u64);

        for epoch in 0..params.epochs {
            let mut pairs: u64 = 0;
            for text in texts {
                let indices: Vec<usize> =
                    text.iter().filter_map(|w| vocab.index_of(w.as_str())).collect();
                let progress_frac = processed as f32 / total_words as f32;
                let alpha = (params.alpha - (params.alpha - params.min_alpha) * progress_frac)
                    .max(params.min_alpha);
                processed += indices.len() as u64;

                let kept: Vec<usize> = indices
                    .into_iter()
                    .filter(|&i| keep[i] >= 1.0 || keep[i] >= session.rng.random::<f64>())
                    .collect();

                pairs += session.train_text(&kept, alpha);
                progress.inc(1);
            }
            debug!(epoch, pairs, "Finished epoch");
        }

        progress.finish_and_clear();

        let words = vocab.words().iter().map(|w| w.word.clone()).collect();
        let vectors = Array2::from_shape_vec((vocab.len(), params.vector_size), session.syn0)?;
        WordVectors::new(words, vectors)
    }
}

/// Mutable training state: weights and the random source.
struct Session<'a> {
    params: &'a SkipGramParams,
    vocab: &'a Vocabulary,
    noise: NoiseTable,
    rng: StdRng,
    /// Input (word) vectors, `vocab × dim`
    syn0: Vec<f32>,
    /// Hierarchical softmax inner-node vectors, `(vocab - 1) × dim`
    syn1: Vec<f32>,
    /// Negative-sampling output vectors, `vocab × dim`
    syn1neg: Vec<f32>,
}

impl<'a> Session<'a> {
    fn new(params: &'a SkipGramParams, vocab: &'a Vocabulary) -> Self {
        let dim = params.vector_size;
        let n = vocab.len();
        let mut rng = StdRng::seed_from_u64(params.seed);

        let syn0 = (0..n * dim)
            .map(|_| (rng.random::<f32>() - 0.5) / dim as f32)
            .collect();
        let syn1 = if params.hierarchical_softmax {
            vec![0.0; n.saturating_sub(1) * dim]
        } else {
            Vec::new()
        };
        let syn1neg = if params.negative > 0 {
            vec![0.0; n * dim]
        } else {
            Vec::new()
        };

        Self {
            params,
            vocab,
            noise: vocab.noise_table(),
            rng,
            syn0,
            syn1,
            syn1neg,
        }
    }

    /// Train on one text of vocabulary indices. Returns the number of
    /// (context, centre) pairs visited.
    fn train_text(&mut self, text: &[usize], alpha: f32) -> u64 {
        let window = self.params.window;
        let mut pairs = 0;

        for (pos, &centre) in text.iter().enumerate() {
            let reduced = if window > 0 {
                self.rng.random_range(0..window)
            } else {
                0
            };
            let span = window - reduced;
            let start = pos.saturating_sub(span);
            let end = (pos + span + 1).min(text.len());

            for (ctx_pos, &context) in text.iter().enumerate().take(end).skip(start) {
                if ctx_pos == pos {
                    continue;
                }
                self.train_pair(centre, context, alpha);
                pairs += 1;
            }
        }

        pairs
    }

    /// One SGD step: use `input`'s vector to predict `target`.
    fn train_pair(&mut self, target: usize, input: usize, alpha: f32) {
        let dim = self.params.vector_size;
        let vocab = self.vocab;
        let l1: Vec<f32> = self.syn0[input * dim..(input + 1) * dim].to_vec();
        let mut neu1e = vec![0.0f32; dim];

        if self.params.hierarchical_softmax {
            let word = vocab.get(target);
            for (&point, &code) in word.point.iter().zip(word.code.iter()) {
                let row = &mut self.syn1[point * dim..(point + 1) * dim];
                let f = sigmoid(dot(&l1, row));
                let g = (1.0 - code as f32 - f) * alpha;
                axpy(&mut neu1e, g, row);
                axpy(row, g, &l1);
            }
        }

        if self.params.negative > 0 {
            for d in 0..=self.params.negative {
                let (sample, label) = if d == 0 {
                    (target, 1.0)
                } else {
                    let sample = self.noise.sample(&mut self.rng);
                    if sample == target {
                        continue;
                    }
                    (sample, 0.0)
                };
                let row = &mut self.syn1neg[sample * dim..(sample + 1) * dim];
                let f = sigmoid(dot(&l1, row));
                let g = (label - f) * alpha;
                axpy(&mut neu1e, g, row);
                axpy(row, g, &l1);
            }
        }

        axpy(&mut self.syn0[input * dim..(input + 1) * dim], 1.0, &neu1e);
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// `y += a * x`
fn axpy(y: &mut [f32], a: f32, x: &[f32]) {
    for (yi, xi) in y.iter_mut().zip(x) {
        *yi += a * xi;
    }
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x.clamp(-MAX_EXP, MAX_EXP)).exp())
}
