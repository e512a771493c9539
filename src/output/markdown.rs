// Markdown report: word table and cluster membership, timestamped.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;

use crate::frequency::corpus::Corpus;
use crate::frequency::table::RankedToken;
use crate::pipeline::word_map::WordMap;

/// Render the report as a markdown string.
pub fn render_report(
    source: &str,
    corpus: &Corpus,
    top_words: &[RankedToken],
    map: Option<&WordMap>,
) -> String {
    let mut md = String::new();

    let _ = writeln!(md, "# Text analysis: {source}\n");
    let _ = writeln!(
        md,
        "Generated {}\n",
        Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    let _ = writeln!(md, "- Paragraphs: {}", corpus.document().len());
    let _ = writeln!(md, "- Sentences: {}", corpus.sentence_count());
    let _ = writeln!(md, "- Distinct words: {}", corpus.table.len());
    let _ = writeln!(md, "- Word occurrences: {}\n", corpus.table.total());

    let _ = writeln!(md, "## Word frequency\n");
    let _ = writeln!(md, "| Rank | Word | Count | Sentences |");
    let _ = writeln!(md, "|---:|---|---:|---:|");
    for (i, row) in top_words.iter().enumerate() {
        let _ = writeln!(
            md,
            "| {} | {} | {} | {} |",
            i + 1,
            row.token,
            row.count,
            row.sentence_count
        );
    }

    if let Some(map) = map {
        let _ = writeln!(md, "\n## Clusters\n");
        for (label, members) in map.clusters().iter().enumerate() {
            let _ = writeln!(
                md,
                "- **Cluster {}** ({} words): {}",
                label + 1,
                members.len(),
                members.join("、")
            );
        }
        if !map.skipped.is_empty() {
            let _ = writeln!(
                md,
                "\n{} words fell below the training minimum count and are not clustered.",
                map.skipped.len()
            );
        }
    }

    md
}

/// Write the report to `path`, creating parent directories. Returns the path
/// as displayed.
pub fn generate_report(
    source: &str,
    corpus: &Corpus,
    top_words: &[RankedToken],
    map: Option<&WordMap>,
    path: &Path,
) -> Result<String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }

    let report = render_report(source, corpus, top_words, map);
    std::fs::write(path, report)
        .with_context(|| format!("Failed to write report to {}", path.display()))?;

    Ok(path.display().to_string())
}
