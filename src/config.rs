use std::env;
use std::path::PathBuf;

use anyhow::Result;
use tracing::warn;

use crate::frequency::corpus::TrainingUnit;
use crate::segment::jieba::{JiebaSegmenter, SegmentMode};

/// Input file used when neither `--input` nor INKSTONE_INPUT is given.
pub const DEFAULT_INPUT: &str = "demo.txt";

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded automatically at startup via dotenvy. Command-line
/// flags override individual fields after loading.
#[derive(Debug, Clone)]
pub struct Config {
    /// Text file to analyze (one paragraph per line)
    pub input: PathBuf,
    /// Jieba cutting strategy
    pub segment_mode: SegmentMode,
    /// Let jieba guess unknown words with its HMM
    pub hmm: bool,
    /// Extra dictionary loaded on top of jieba's bundled one
    pub user_dict: Option<PathBuf>,
    /// Whether training texts are sentences or whole paragraphs
    pub training_unit: TrainingUnit,
    /// Seed for embedding training and k-means
    pub seed: u64,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Every setting has a default. Unrecognised values fall back to the
    /// default with a warning rather than failing the run.
    pub fn load() -> Result<Self> {
        let segment_mode = match env::var("INKSTONE_SEGMENT_MODE") {
            Ok(name) => SegmentMode::from_name(&name).unwrap_or_else(|| {
                warn!(value = %name, "Unknown INKSTONE_SEGMENT_MODE, using precise");
                SegmentMode::Precise
            }),
            Err(_) => SegmentMode::default(),
        };

        let training_unit = match env::var("INKSTONE_TRAINING_UNIT") {
            Ok(name) => TrainingUnit::from_name(&name).unwrap_or_else(|| {
                warn!(value = %name, "Unknown INKSTONE_TRAINING_UNIT, using sentence");
                TrainingUnit::Sentence
            }),
            Err(_) => TrainingUnit::default(),
        };

        let hmm = match env::var("INKSTONE_HMM").as_deref() {
            Ok("0") | Ok("false") | Ok("off") | Ok("no") => false,
            // anything else, or unset, leaves the HMM on
            _ => true,
        };

        let seed = match env::var("INKSTONE_SEED") {
            Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
                warn!(value = %raw, "INKSTONE_SEED is not a number, using 1");
                1
            }),
            Err(_) => 1,
        };

        Ok(Self {
            input: env::var("INKSTONE_INPUT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_INPUT)),
            segment_mode,
            hmm,
            user_dict: env::var("INKSTONE_USER_DICT").ok().map(PathBuf::from),
            training_unit,
            seed,
        })
    }

    /// Check that the input file exists.
    /// Call this before any command that reads the text.
    pub fn require_input(&self) -> Result<()> {
        if !self.input.is_file() {
            anyhow::bail!(
                "Input file not found: {}\n\
                 Pass --input <PATH> or set INKSTONE_INPUT in your .env file.",
                self.input.display()
            );
        }
        Ok(())
    }

    /// Build the word segmenter described by this configuration.
    pub fn word_segmenter(&self) -> Result<JiebaSegmenter> {
        let segmenter = JiebaSegmenter::new(self.segment_mode, self.hmm);
        match &self.user_dict {
            Some(path) => segmenter.with_user_dict(path),
            None => Ok(segmenter),
        }
    }
}
