use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use inkstone::cluster::spectral::SpectralClustering;
use inkstone::config::Config;
use inkstone::embedding::skipgram::SkipGramParams;
use inkstone::frequency::corpus::Corpus;
use inkstone::output::{markdown, plot, terminal};
use inkstone::pipeline::word_map;
use inkstone::projection::tsne::Tsne;
use inkstone::segment::chars::CharSegmenter;
use inkstone::segment::traits::Segmenter;
use inkstone::text::loader::load_document;

/// Inkstone: exploratory analysis of Chinese text.
///
/// Splits a text into sentences, segments it into words, counts words and
/// characters, trains word embeddings, and clusters and plots the words.
#[derive(Parser)]
#[command(name = "inkstone", version, about)]
struct Cli {
    /// Text file to analyze, one paragraph per line (default: INKSTONE_INPUT or demo.txt)
    #[arg(long, global = true)]
    input: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the paragraphs and sentences of the input
    Sentences,

    /// Show the word frequency table
    Words {
        /// Number of rows to show (0 for all)
        #[arg(long, default_value = "50")]
        top: usize,

        /// Leave out common Chinese stop words
        #[arg(long)]
        stopwords: bool,

        /// Print the table as JSON instead
        #[arg(long)]
        json: bool,
    },

    /// Show the character frequency table and the sentences each character appears in
    Chars {
        /// Number of rows to show (0 for all)
        #[arg(long, default_value = "50")]
        top: usize,

        /// Example sentences listed per character
        #[arg(long, default_value = "0")]
        examples: usize,
    },

    /// Train word embeddings and inspect them
    Train {
        /// Word to look up (default: the most frequent word)
        #[arg(long)]
        word: Option<String>,

        /// Number of nearest neighbours to show
        #[arg(long, default_value = "10")]
        topn: usize,

        /// Minimum occurrences for a word to get a vector
        #[arg(long, default_value = "5")]
        min_count: u64,
    },

    /// Train embeddings, cluster the words, and project them to 2-D
    Cluster {
        /// Number of clusters
        #[arg(long, default_value = "7")]
        clusters: usize,

        /// t-SNE perplexity
        #[arg(long, default_value = "30")]
        perplexity: f64,

        /// Minimum occurrences for a word to get a vector
        #[arg(long, default_value = "5")]
        min_count: u64,

        /// Write the two-panel plot to this SVG file
        #[arg(long)]
        plot: Option<PathBuf>,

        /// Write a markdown report to this file
        #[arg(long)]
        report: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("inkstone=info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = Config::load()?;
    if let Some(input) = cli.input {
        config.input = input;
    }
    config.require_input()?;

    match cli.command {
        Commands::Sentences => {
            let document = load_document(&config.input)?;
            terminal::display_document(&document);
        }

        Commands::Words {
            top,
            stopwords,
            json,
        } => {
            let segmenter = config.word_segmenter()?;
            let corpus = load_corpus(&config, &segmenter)?;

            let rows = if stopwords {
                let stop_words: HashSet<String> =
                    stop_words::get(stop_words::LANGUAGE::Chinese).into_iter().collect();
                corpus.table.ranked_excluding(&stop_words)
            } else {
                corpus.table.ranked()
            };
            let rows = take_top(rows, top);

            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                terminal::display_frequency_table(
                    "Word Frequency",
                    &rows,
                    corpus.table.len(),
                    corpus.table.total(),
                );
            }
        }

        Commands::Chars { top, examples } => {
            let corpus = load_corpus(&config, &CharSegmenter)?;
            let rows = take_top(corpus.table.ranked(), top);
            terminal::display_char_table(&corpus, &rows, examples);
        }

        Commands::Train {
            word,
            topn,
            min_count,
        } => {
            let segmenter = config.word_segmenter()?;
            let corpus = load_corpus(&config, &segmenter)?;
            let ranked = corpus.table.ranked();

            let params = SkipGramParams {
                min_count,
                seed: config.seed,
                ..SkipGramParams::default()
            };
            let vectors = word_map::train_vectors(
                corpus.texts.clone(),
                params,
                training_progress(),
            )
            .await?;

            println!(
                "\n{}",
                format!(
                    "Trained {} word vectors ({} dims) from {} texts",
                    vectors.len(),
                    vectors.dim(),
                    corpus.texts.len()
                )
                .bold()
            );

            let query = match word.or_else(|| ranked.first().map(|r| r.token.clone())) {
                Some(w) => w,
                None => anyhow::bail!("The input contains no words"),
            };

            if let Some(vector) = vectors.vector(&query) {
                terminal::display_vector_preview(&query, vector, 8);
            }
            let neighbours = vectors.most_similar(&query, topn)?;
            terminal::display_neighbours(&query, &neighbours);

            // Similarity between the two most frequent words, when both have vectors
            if let [first, second, ..] = ranked.as_slice() {
                match vectors.similarity(&first.token, &second.token) {
                    Ok(sim) => println!(
                        "\n  Similarity {} / {}: {:.4}",
                        first.token.bold(),
                        second.token.bold(),
                        sim
                    ),
                    Err(e) => println!("\n  {} {}", "Note:".yellow(), e),
                }
            }
        }

        Commands::Cluster {
            clusters,
            perplexity,
            min_count,
            plot: plot_path,
            report,
        } => {
            let segmenter = config.word_segmenter()?;
            let corpus = load_corpus(&config, &segmenter)?;

            let params = SkipGramParams {
                min_count,
                seed: config.seed,
                ..SkipGramParams::default()
            };
            let vectors = word_map::train_vectors(
                corpus.texts.clone(),
                params,
                training_progress(),
            )
            .await?;

            let selection = vectors.select(corpus.table.tokens())?;
            println!(
                "Clustering {} words ({} below the minimum count skipped)...",
                selection.words.len(),
                selection.skipped.len()
            );

            let clustering = SpectralClustering {
                n_clusters: clusters,
                seed: config.seed,
                ..SpectralClustering::default()
            };
            let tsne = Tsne {
                perplexity,
                ..Tsne::default()
            };
            let map = word_map::map_words(selection, clustering, tsne).await?;

            terminal::display_word_map(&map);

            if let Some(path) = plot_path {
                plot::write_svg(&map, &path)?;
                println!("{}", format!("Plot saved to: {}", path.display()).bold());
            }

            if let Some(path) = report {
                let top_words = take_top(corpus.table.ranked(), 50);
                let source = config.input.display().to_string();
                let report_path =
                    markdown::generate_report(&source, &corpus, &top_words, Some(&map), &path)?;
                println!("{}", format!("Markdown report saved to: {report_path}").bold());
            }
        }
    }

    Ok(())
}

/// Load the configured input and run it through a segmenter.
fn load_corpus(config: &Config, segmenter: &dyn Segmenter) -> Result<Corpus> {
    let document = load_document(&config.input)?;
    info!(
        input = %config.input.display(),
        paragraphs = document.len(),
        "Loaded input"
    );
    Ok(Corpus::build(document, segmenter, config.training_unit))
}

/// Keep the first `top` rows; `0` keeps everything.
fn take_top<T>(mut rows: Vec<T>, top: usize) -> Vec<T> {
    if top > 0 {
        rows.truncate(top);
    }
    rows
}

/// Progress bar for embedding training.
fn training_progress() -> ProgressBar {
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("  Training [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .expect("valid template")
            .progress_chars("=> "),
    );
    pb
}
