use std::path::Path;

use crate::dictionary::TermDict;
use crate::persist;
use crate::postings::PostingAccumulator;
use crate::{DocId, Position, Result};

/// Counts reported after a successful save.
#[derive(Debug, Clone, Copy)]
pub struct IndexStats {
    pub num_docs: u32,
    pub num_terms: usize,
}

/// Accumulates a corpus document by document and writes the persisted index.
///
/// Documents must be presented in the order that should define their ids;
/// the directory-scanning caller owns that ordering contract.
#[derive(Default)]
pub struct IndexBuilder {
    dict: TermDict,
    postings: PostingAccumulator,
    doc_names: Vec<String>,
}

impl IndexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns the next sequential document id to `name`.
    pub fn add_document(&mut self, name: &str) -> DocId {
        let id = self.doc_names.len() as DocId;
        self.doc_names.push(name.to_string());
        id
    }

    /// Records one term occurrence. Empty terms and position 0 are dropped
    /// silently; positions are 1-based by convention.
    pub fn add_occurrence(&mut self, term: &str, doc_id: DocId, position: Position) {
        if term.is_empty() || position == 0 {
            return;
        }
        let term_id = self.dict.intern(term);
        self.postings.record(term_id, doc_id, position);
    }

    pub fn num_docs(&self) -> u32 {
        self.doc_names.len() as u32
    }

    pub fn num_terms(&self) -> usize {
        self.dict.len()
    }

    /// Sorts all posting lists and streams the index to `out_dir`.
    ///
    /// The vocabulary is written sorted lexicographically by term string,
    /// independently of the per-term doc-id sort.
    pub fn finalize_and_save(mut self, out_dir: &Path) -> Result<IndexStats> {
        tracing::info!(
            num_docs = self.num_docs(),
            num_terms = self.num_terms(),
            "sorting postings"
        );
        self.postings.finalize();

        let stats = IndexStats {
            num_docs: self.num_docs(),
            num_terms: self.num_terms(),
        };
        persist::save_index(out_dir, &self.dict, &self.postings, &self.doc_names)?;
        tracing::info!(out_dir = %out_dir.display(), "index saved");
        Ok(stats)
    }
}
