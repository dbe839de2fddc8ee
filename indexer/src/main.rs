use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ferret_core::analysis::{Analyzer, Language};
use ferret_core::builder::IndexBuilder;
use ferret_core::persist::{save_meta, IndexPaths, MetaFile, FORMAT_VERSION};
use ferret_core::DocId;
use tracing_subscriber::{fmt, EnvFilter};
use walkdir::WalkDir;

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build a boolean inverted index over tokenized documents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index from a directory of doc<N>.tokens files
    Build {
        /// Input directory containing .tokens files
        #[arg(long)]
        input: String,
        /// Output index directory
        #[arg(long)]
        output: String,
    },
    /// Tokenize a directory of .txt files into .tokens files
    Tokenize {
        /// Input directory containing .txt files
        #[arg(long)]
        input: String,
        /// Output directory for .tokens files
        #[arg(long)]
        output: String,
        /// Stemmer language: english or russian
        #[arg(long, default_value = "russian")]
        language: String,
        /// Drop tokens shorter than this many characters
        #[arg(long, default_value_t = 2)]
        min_token_len: usize,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { input, output } => build_index(&input, &output),
        Commands::Tokenize {
            input,
            output,
            language,
            min_token_len,
        } => {
            let language: Language = language.parse().map_err(anyhow::Error::msg)?;
            tokenize_corpus(&input, &output, language, min_token_len)
        }
    }
}

/// Document ids follow the numeric suffix in `doc<N>.tokens`, not the
/// filesystem enumeration order, so repeated builds assign the same ids.
fn build_index(input: &str, output: &str) -> Result<()> {
    let mut files: Vec<(u32, String, PathBuf)> = Vec::new();
    for entry in WalkDir::new(input).max_depth(1).into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|s| s.to_str()) else {
            continue;
        };
        match doc_number(name) {
            Some(num) => files.push((num, name.to_string(), path.to_path_buf())),
            None => tracing::debug!(file = name, "skipping file without a doc<N>.tokens name"),
        }
    }
    files.sort_unstable_by_key(|(num, _, _)| *num);
    if files.is_empty() {
        tracing::warn!(input, "no doc<N>.tokens files found");
    }

    let mut builder = IndexBuilder::new();
    for (i, (_, name, path)) in files.iter().enumerate() {
        let doc_id = builder.add_document(name);
        ingest_tokens(path, doc_id, &mut builder)
            .with_context(|| format!("reading {}", path.display()))?;
        if (i + 1) % 100 == 0 {
            tracing::info!(processed = i + 1, "token files ingested");
        }
    }
    tracing::info!(
        num_docs = builder.num_docs(),
        num_terms = builder.num_terms(),
        "ingested documents"
    );

    let stats = builder.finalize_and_save(Path::new(output))?;

    let meta = MetaFile {
        num_docs: stats.num_docs,
        num_terms: stats.num_terms as u32,
        created_at: time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_else(|_| "".into()),
        version: FORMAT_VERSION,
    };
    save_meta(&IndexPaths::new(output), &meta)?;

    tracing::info!(output, "index build complete");
    Ok(())
}

fn doc_number(name: &str) -> Option<u32> {
    name.strip_prefix("doc")?.strip_suffix(".tokens")?.parse().ok()
}

/// One line per occurrence group: `<term> <pos> [<pos>...]`. Non-numeric
/// and non-positive positions are dropped, as are lines with no positions.
fn ingest_tokens(path: &Path, doc_id: DocId, builder: &mut IndexBuilder) -> Result<()> {
    let reader = BufReader::new(File::open(path)?);
    for line in reader.lines() {
        let line = line?;
        let mut parts = line.split_whitespace();
        let Some(term) = parts.next() else { continue };
        for pos_str in parts {
            if let Ok(pos) = pos_str.parse::<u32>() {
                if pos > 0 {
                    builder.add_occurrence(term, doc_id, pos);
                }
            }
        }
    }
    Ok(())
}

fn tokenize_corpus(input: &str, output: &str, language: Language, min_token_len: usize) -> Result<()> {
    fs::create_dir_all(output)?;
    let analyzer = Analyzer::new(language).with_min_token_len(min_token_len);

    let mut processed = 0usize;
    let mut total_tokens = 0usize;
    for entry in WalkDir::new(input).into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();
        if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("txt") {
            continue;
        }
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(file = %path.display(), error = %err, "skipping unreadable file");
                continue;
            }
        };
        let tokens = analyzer.tokenize(&text);

        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("doc");
        let out_path = Path::new(output).join(format!("{stem}.tokens"));
        let mut writer = BufWriter::new(
            File::create(&out_path).with_context(|| format!("creating {}", out_path.display()))?,
        );
        for (term, pos) in &tokens {
            writeln!(writer, "{term} {pos}")?;
        }
        writer.flush()?;

        total_tokens += tokens.len();
        processed += 1;
    }

    tracing::info!(processed, total_tokens, output, "tokenization complete");
    Ok(())
}
