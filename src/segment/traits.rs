// Segmenter trait: swap-ready abstraction.
//
// The corpus builder only needs "sentence in, tokens out". The word-level
// jieba segmenter and the character-level segmenter both plug in here, so
// the frequency table, training texts and everything downstream are shared
// between the two analyses.

/// Trait for turning one sentence into tokens.
pub trait Segmenter: Send + Sync {
    /// Segment a sentence. Tokens come back in reading order; repeats are kept.
    fn segment(&self, sentence: &str) -> Vec<String>;
}
