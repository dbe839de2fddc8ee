use anyhow::{Context, Result};
use clap::Parser;
use ferret_core::persist::{load_meta, IndexPaths};
use ferret_core::query::run_query;
use ferret_core::reader::SearchIndex;
use tracing_subscriber::{fmt, EnvFilter};

use std::io::{self, BufRead, Write};

#[derive(Parser)]
#[command(name = "searcher")]
#[command(about = "Answer boolean queries against a persisted index", long_about = None)]
struct Args {
    /// Index directory path
    #[arg(long, default_value = "./index")]
    index: String,
    /// Run a single query and exit instead of reading queries from stdin
    #[arg(long)]
    query: Option<String>,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    let index = SearchIndex::load(&args.index)
        .with_context(|| format!("loading index from {}", args.index))?;
    if let Ok(meta) = load_meta(&IndexPaths::new(&args.index)) {
        tracing::info!(
            num_docs = meta.num_docs,
            num_terms = meta.num_terms,
            created_at = %meta.created_at,
            "index metadata"
        );
    }

    match args.query {
        Some(query) => answer(&index, &query),
        None => repl(&index),
    }
}

fn answer(index: &SearchIndex, query: &str) -> Result<()> {
    let outcome = run_query(query, index);
    for error in &outcome.errors {
        tracing::warn!(query, error = %error, "query problem");
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "Found {} documents", outcome.docs.len())?;
    for id in &outcome.docs {
        writeln!(out, "{}\t{}", id, index.doc_name(*id).unwrap_or("?"))?;
    }
    Ok(())
}

fn repl(index: &SearchIndex) -> Result<()> {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        answer(index, query)?;
    }
    Ok(())
}
