// Corpus assembly: run a segmenter over a document, count every token, and
// collect the training texts for the embedding model.
//
// A training text is the de-duplicated token list of one training unit. The
// unit is a sentence by default; whole paragraphs can be used instead when
// sentences are too short to give the model any context.

use std::collections::HashSet;

use tracing::info;

use super::table::{FrequencyTable, SentenceRef};
use crate::segment::traits::Segmenter;
use crate::text::Document;

/// What one training text corresponds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrainingUnit {
    #[default]
    Sentence,
    Paragraph,
}

impl TrainingUnit {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "sentence" => Some(Self::Sentence),
            "paragraph" => Some(Self::Paragraph),
            _ => None,
        }
    }
}

/// A segmented document.
pub struct Corpus {
    /// Token counts over the whole document
    pub table: FrequencyTable,
    /// One de-duplicated token list per training unit
    pub texts: Vec<Vec<String>>,
    document: Document,
}

impl Corpus {
    /// Segment every sentence of `document` and accumulate the results.
    pub fn build(document: Document, segmenter: &dyn Segmenter, unit: TrainingUnit) -> Self {
        let mut table = FrequencyTable::new();
        let mut texts = Vec::new();

        for (p, paragraph) in document.iter().enumerate() {
            let mut paragraph_tokens = Vec::new();

            for (s, sentence) in paragraph.iter().enumerate() {
                let tokens = segmenter.segment(sentence);
                let at = SentenceRef {
                    paragraph: p,
                    sentence: s,
                };
                for token in &tokens {
                    table.record(token, at);
                }

                match unit {
                    TrainingUnit::Sentence => texts.push(dedup(tokens)),
                    TrainingUnit::Paragraph => paragraph_tokens.extend(tokens),
                }
            }

            if unit == TrainingUnit::Paragraph {
                texts.push(dedup(paragraph_tokens));
            }
        }

        info!(
            paragraphs = document.len(),
            distinct_tokens = table.len(),
            total_tokens = table.total(),
            training_texts = texts.len(),
            "Built corpus"
        );

        Self {
            table,
            texts,
            document,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Look up a sentence by position.
    pub fn sentence(&self, at: SentenceRef) -> Option<&str> {
        self.document
            .get(at.paragraph)
            .and_then(|p| p.get(at.sentence))
            .map(String::as_str)
    }

    /// Number of sentences across all paragraphs.
    pub fn sentence_count(&self) -> usize {
        self.document.iter().map(Vec::len).sum()
    }
}

/// Drop repeated tokens, keeping the first occurrence of each.
fn dedup(tokens: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    tokens
        .into_iter()
        .filter(|t| seen.insert(t.clone()))
        .collect()
}
