// Word-level segmentation backed by jieba-rs.
//
// Each divider-delimited fragment is segmented independently. Tokens have
// their ASCII spaces removed and anything shorter than two characters is
// dropped: single characters in Chinese are mostly particles and function
// words, and stray punctuation that survived the divider pass is one
// character long as well.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use jieba_rs::Jieba;
use tracing::debug;

use super::fragments::split_fragments;
use super::traits::Segmenter;

/// Minimum token length, in characters, kept by the word segmenter.
pub const MIN_WORD_CHARS: usize = 2;

/// Which jieba cutting strategy to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SegmentMode {
    /// Most likely single segmentation (jieba's default mode)
    #[default]
    Precise,
    /// Precise mode plus extra sub-words of long words
    Search,
    /// Every dictionary word found in the text, overlapping
    Full,
}

impl SegmentMode {
    /// Parse a mode name as used in configuration. Unknown names yield `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "precise" | "default" | "paddle" => Some(Self::Precise),
            "search" => Some(Self::Search),
            "full" | "all" => Some(Self::Full),
            _ => None,
        }
    }
}

/// Jieba-based word segmenter.
pub struct JiebaSegmenter {
    jieba: Jieba,
    mode: SegmentMode,
    hmm: bool,
}

impl Default for JiebaSegmenter {
    fn default() -> Self {
        Self::new(SegmentMode::default(), true)
    }
}

impl JiebaSegmenter {
    /// Create a segmenter with jieba's bundled dictionary.
    pub fn new(mode: SegmentMode, hmm: bool) -> Self {
        Self {
            jieba: Jieba::new(),
            mode,
            hmm,
        }
    }

    /// Extend the dictionary with a user word list
    /// (`word [freq] [tag]` per line, jieba's dictionary format).
    pub fn with_user_dict(mut self, path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open user dictionary {}", path.display()))?;
        let mut reader = BufReader::new(file);
        self.jieba
            .load_dict(&mut reader)
            .map_err(|e| anyhow::anyhow!("Invalid user dictionary {}: {:?}", path.display(), e))?;

        debug!(path = %path.display(), "Loaded user dictionary");
        Ok(self)
    }

    pub fn mode(&self) -> SegmentMode {
        self.mode
    }

    fn cut<'a>(&self, fragment: &'a str) -> Vec<&'a str> {
        match self.mode {
            SegmentMode::Precise => self.jieba.cut(fragment, self.hmm),
            SegmentMode::Search => self.jieba.cut_for_search(fragment, self.hmm),
            SegmentMode::Full => self.jieba.cut_all(fragment),
        }
    }
}

impl Segmenter for JiebaSegmenter {
    fn segment(&self, sentence: &str) -> Vec<String> {
        split_fragments(sentence)
            .into_iter()
            .flat_map(|fragment| self.cut(fragment))
            .map(strip_spaces)
            .filter(|token| token.chars().count() >= MIN_WORD_CHARS)
            .collect()
    }
}

/// Remove ASCII spaces. Other whitespace (tabs, the ideographic space) is
/// left in the token.
fn strip_spaces(token: &str) -> String {
    token.replace(' ', "")
}
