// Coloured terminal output for frequency tables, neighbours and clusters.
//
// Column alignment uses display width rather than char count, since every
// CJK character takes two terminal columns.

use colored::Colorize;
use ndarray::ArrayView1;

use super::{cluster_color, pad_to_width, truncate_chars};
use crate::frequency::corpus::Corpus;
use crate::frequency::table::RankedToken;
use crate::pipeline::word_map::WordMap;
use crate::text::Document;

const BAR_WIDTH: usize = 20;

/// Heading line for the document listing.
pub fn document_heading(document: &Document) -> String {
    let sentences: usize = document.iter().map(Vec::len).sum();
    format!(
        "=== Document ({} paragraphs, {} sentences) ===",
        document.len(),
        sentences
    )
}

/// Print every paragraph with its numbered sentences.
pub fn display_document(document: &Document) {
    println!("\n{}", document_heading(document).bold());

    for (p, paragraph) in document.iter().enumerate() {
        println!("\n  {}", format!("¶ {}", p + 1).bold());
        for (s, sentence) in paragraph.iter().enumerate() {
            println!("    {:>3}. {}", s + 1, sentence);
        }
    }
    println!();
}

/// Heading line for a frequency table. `distinct` and `total` describe the
/// whole table; `shown` is how many rows follow.
pub fn frequency_heading(title: &str, shown: usize, distinct: usize, total: u64) -> String {
    if shown < distinct {
        format!("=== {title} ({distinct} distinct, {total} total, top {shown} shown) ===")
    } else {
        format!("=== {title} ({distinct} distinct, {total} total) ===")
    }
}

/// Print a ranked token table with a bar proportional to the top count.
pub fn display_frequency_table(title: &str, rows: &[RankedToken], distinct: usize, total: u64) {
    if rows.is_empty() {
        println!("No tokens found. Is the input file empty?");
        return;
    }

    println!(
        "\n{}",
        frequency_heading(title, rows.len(), distinct, total).bold()
    );
    println!();
    println!(
        "  {:>5}  {}  {:>6}  {:>9}",
        "Rank".dimmed(),
        pad_to_width("Token", 12).dimmed(),
        "Count".dimmed(),
        "Sentences".dimmed(),
    );
    println!("  {}", "-".repeat(60).dimmed());

    let max = rows[0].count.max(1);
    for (i, row) in rows.iter().enumerate() {
        let filled = ((row.count as f64 / max as f64) * BAR_WIDTH as f64).round() as usize;
        let bar = "=".repeat(filled);
        println!(
            "  {:>4}.  {}  {:>6}  {:>9}  {}",
            i + 1,
            pad_to_width(&row.token, 12).bold(),
            row.count,
            row.sentence_count,
            bar.bright_green(),
        );
    }
    println!();
}

/// Print the character table with a few example sentences per character.
pub fn display_char_table(corpus: &Corpus, rows: &[RankedToken], examples: usize) {
    display_frequency_table(
        "Character Frequency",
        rows,
        corpus.table.len(),
        corpus.table.total(),
    );
    if examples == 0 {
        return;
    }

    println!("{}", "=== Example Sentences ===".bold());
    for row in rows {
        let Some(stats) = corpus.table.get(&row.token) else {
            continue;
        };
        println!("\n  {} ({} sentences)", row.token.bold(), stats.sentences.len());
        for at in stats.sentences.iter().take(examples) {
            if let Some(sentence) = corpus.sentence(*at) {
                println!(
                    "    [{}:{}] {}",
                    at.paragraph + 1,
                    at.sentence + 1,
                    truncate_chars(sentence, 60).dimmed()
                );
            }
        }
    }
    println!();
}

/// Print the first components of a word's vector.
pub fn display_vector_preview(word: &str, vector: ArrayView1<'_, f32>, shown: usize) {
    let head: Vec<String> = vector.iter().take(shown).map(|v| format!("{v:+.4}")).collect();
    println!(
        "\n  Vector for {} ({} dims): [{}{}]",
        word.bold(),
        vector.len(),
        head.join(", "),
        if vector.len() > shown { ", ..." } else { "" }
    );
}

/// Print nearest neighbours of a word.
pub fn display_neighbours(word: &str, neighbours: &[(String, f32)]) {
    println!("\n{}", format!("=== Most similar to {word} ===").bold());
    if neighbours.is_empty() {
        println!("  (no other words in the vocabulary)");
        return;
    }
    for (i, (other, sim)) in neighbours.iter().enumerate() {
        let sim_str = format!("{sim:.4}");
        let colored_sim = if *sim >= 0.5 {
            sim_str.bright_green()
        } else if *sim >= 0.2 {
            sim_str.bright_yellow()
        } else {
            sim_str.dimmed()
        };
        println!("  {:>3}. {} {}", i + 1, pad_to_width(other, 12), colored_sim);
    }
}

/// Print cluster membership.
pub fn display_word_map(map: &WordMap) {
    println!(
        "\n{}",
        format!(
            "=== Word Clusters ({} words, {} clusters) ===",
            map.words.len(),
            map.n_clusters
        )
        .bold()
    );

    for (label, members) in map.clusters().iter().enumerate() {
        let (r, g, b) = cluster_color(label);
        println!(
            "\n  {} ({} words)",
            format!("Cluster {}", label + 1).truecolor(r, g, b).bold(),
            members.len()
        );
        println!("    {}", members.join("  "));
    }

    if !map.skipped.is_empty() {
        println!(
            "\n  {}",
            format!(
                "{} words below the training minimum count were left out",
                map.skipped.len()
            )
            .dimmed()
        );
    }
    println!();
}
