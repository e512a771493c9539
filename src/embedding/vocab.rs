// Training vocabulary.
//
// Holds the words that survived the minimum-count cut, ordered by descending
// frequency, together with the three per-word tables the skip-gram trainer
// needs: subsampling keep probabilities, the unigram^0.75 noise distribution
// for negative sampling, and Huffman codes for hierarchical softmax.

use std::collections::HashMap;

use rand::Rng;

/// Exponent applied to counts when building the negative-sampling table.
const NOISE_POWER: f64 = 0.75;

/// One vocabulary entry.
#[derive(Debug, Clone)]
pub struct VocabWord {
    pub word: String,
    pub count: u64,
    /// Huffman code, root first (0 = left, 1 = right)
    pub code: Vec<u8>,
    /// Inner-node indices along the path, root first; same length as `code`
    pub point: Vec<usize>,
}

/// Words kept for training, most frequent first.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    words: Vec<VocabWord>,
    index: HashMap<String, usize>,
    /// Sum of counts of kept words
    total: u64,
}

impl Vocabulary {
    /// Count words across the training texts and keep those seen at least
    /// `min_count` times. Ties in count keep first-seen order.
    pub fn build(texts: &[Vec<String>], min_count: u64) -> Self {
        let mut counts: HashMap<&str, u64> = HashMap::new();
        let mut order: Vec<&str> = Vec::new();
        for text in texts {
            for word in text {
                let count = counts.entry(word.as_str()).or_insert_with(|| {
                    order.push(word.as_str());
                    0
                });
                *count += 1;
            }
        }

        let mut kept: Vec<(&str, u64)> = order
            .into_iter()
            .map(|w| (w, counts[w]))
            .filter(|&(_, c)| c >= min_count)
            .collect();
        kept.sort_by(|a, b| b.1.cmp(&a.1));

        let words: Vec<VocabWord> = kept
            .into_iter()
            .map(|(word, count)| VocabWord {
                word: word.to_string(),
                count,
                code: Vec::new(),
                point: Vec::new(),
            })
            .collect();

        let index = words
            .iter()
            .enumerate()
            .map(|(i, w)| (w.word.clone(), i))
            .collect();
        let total = words.iter().map(|w| w.count).sum();

        let mut vocab = Self {
            words,
            index,
            total,
        };
        vocab.assign_huffman_codes();
        vocab
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn index_of(&self, word: &str) -> Option<usize> {
        self.index.get(word).copied()
    }

    pub fn get(&self, index: usize) -> &VocabWord {
        &self.words[index]
    }

    pub fn words(&self) -> &[VocabWord] {
        &self.words
    }

    /// Probability of keeping each word under frequent-word subsampling.
    ///
    /// Words much more frequent than `sample * total` are randomly dropped
    /// from training texts; rare words are always kept. `sample <= 0`
    /// disables subsampling.
    pub fn keep_probabilities(&self, sample: f64) -> Vec<f64> {
        if sample <= 0.0 || self.total == 0 {
            return vec![1.0; self.words.len()];
        }

        let threshold = sample * self.total as f64;
        self.words
            .iter()
            .map(|w| {
                let v = w.count as f64;
                (((v / threshold).sqrt() + 1.0) * (threshold / v)).min(1.0)
            })
            .collect()
    }

    /// Cumulative unigram^0.75 distribution for drawing negative samples.
    pub fn noise_table(&self) -> NoiseTable {
        let mut cumulative = Vec::with_capacity(self.words.len());
        let mut acc = 0.0;
        for w in &self.words {
            acc += (w.count as f64).powf(NOISE_POWER);
            cumulative.push(acc);
        }
        NoiseTable { cumulative }
    }

    /// Build the Huffman tree over word counts and store each word's path.
    ///
    /// Leaves are `0..n`, inner nodes `n..2n-1` with the root at `2n-2`.
    /// Stored points are inner-node indices shifted down by `n`, so they
    /// address rows `0..n-1` of the output weights.
    fn assign_huffman_codes(&mut self) {
        let n = self.words.len();
        if n < 2 {
            return;
        }

        let mut count: Vec<u64> = self.words.iter().map(|w| w.count).collect();
        count.resize(2 * n - 1, u64::MAX);
        let mut parent = vec![0usize; 2 * n - 1];
        let mut binary = vec![0u8; 2 * n - 1];

        // Leaves are sorted descending, so the smallest unmerged leaf is at
        // pos1 (walking down) and the smallest inner node at pos2 (walking up).
        let mut pos1 = n as isize - 1;
        let mut pos2 = n;
        for a in 0..n - 1 {
            let min1 = take_min(&count, &mut pos1, &mut pos2);
            let min2 = take_min(&count, &mut pos1, &mut pos2);
            count[n + a] = count[min1] + count[min2];
            parent[min1] = n + a;
            parent[min2] = n + a;
            binary[min2] = 1;
        }

        let root = 2 * n - 2;
        for (leaf, word) in self.words.iter_mut().enumerate() {
            let mut node = leaf;
            while node != root {
                word.code.push(binary[node]);
                word.point.push(parent[node] - n);
                node = parent[node];
            }
            word.code.reverse();
            word.point.reverse();
        }
    }
}

fn take_min(count: &[u64], pos1: &mut isize, pos2: &mut usize) -> usize {
    if *pos1 >= 0 && count[*pos1 as usize] < count[*pos2] {
        *pos1 -= 1;
        (*pos1 + 1) as usize
    } else {
        *pos2 += 1;
        *pos2 - 1
    }
}

/// Sampler for negative words, proportional to count^0.75.
#[derive(Debug, Clone)]
pub struct NoiseTable {
    cumulative: Vec<f64>,
}

impl NoiseTable {
    /// Draw one word index. Must not be called on an empty table.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> usize {
        let total = self.cumulative.last().copied().unwrap_or(0.0);
        let r = rng.random::<f64>() * total;
        self.cumulative
            .partition_point(|&c| c <= r)
            .min(self.cumulative.len().saturating_sub(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn texts(raw: &[&[&str]]) -> Vec<Vec<String>> {
        raw.iter()
            .map(|t| t.iter().map(|w| w.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_build_orders_by_count_and_prunes() {
        let vocab = Vocabulary::build(&texts(&[&["b", "a", "a"], &["c", "a", "b"]]), 2);
        let words: Vec<&str> = vocab.words().iter().map(|w| w.word.as_str()).collect();
        assert_eq!(words, vec!["a", "b"]);
        assert_eq!(vocab.total(), 5);
        assert_eq!(vocab.index_of("c"), None);
    }

    #[test]
    fn test_huffman_codes_are_prefix_free() {
        let vocab = Vocabulary::build(
            &texts(&[&["a", "a", "a", "a", "b", "b", "b", "c", "c", "d"]]),
            1,
        );
        let codes: Vec<&Vec<u8>> = vocab.words().iter().map(|w| &w.code).collect();
        for (i, a) in codes.iter().enumerate() {
            assert!(!a.is_empty());
            assert_eq!(a.len(), vocab.get(i).point.len());
            for (j, b) in codes.iter().enumerate() {
                if i != j {
                    assert!(!b.starts_with(a.as_slice()), "{a:?} is a prefix of {b:?}");
                }
            }
        }
        // Most frequent word gets the shortest code
        assert!(codes[0].len() <= codes[3].len());
        // Every point addresses one of the n-1 inner nodes
        assert!(vocab
            .words()
            .iter()
            .flat_map(|w| w.point.iter())
            .all(|&p| p < vocab.len() - 1));
    }

    #[test]
    fn test_single_word_has_no_code() {
        let vocab = Vocabulary::build(&texts(&[&["a", "a"]]), 1);
        assert_eq!(vocab.len(), 1);
        assert!(vocab.get(0).code.is_empty());
    }

    #[test]
    fn test_keep_probabilities() {
        let vocab = Vocabulary::build(&texts(&[&["a"; 100][..], &["b"][..]]), 1);
        let keep = vocab.keep_probabilities(0.001);
        assert!(keep[0] < 1.0);
        assert!((keep[1] - 1.0).abs() < f64::EPSILON);
        assert!(vocab.keep_probabilities(0.0).iter().all(|&p| p == 1.0));
    }

    #[test]
    fn test_noise_table_stays_in_range() {
        let vocab = Vocabulary::build(&texts(&[&["a", "a", "b", "c"]]), 1);
        let noise = vocab.noise_table();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            assert!(noise.sample(&mut rng) < vocab.len());
        }
    }
}
