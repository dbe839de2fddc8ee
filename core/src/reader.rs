use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};
use parking_lot::Mutex;

use crate::persist::IndexPaths;
use crate::query::TermSource;
use crate::{DocId, IndexError, Result};

/// One term's row in the loaded vocabulary.
#[derive(Debug, Clone)]
pub struct TermEntry {
    pub term: String,
    pub doc_count: u32,
    pub offset: u64,
}

/// Read-only view of a persisted index.
///
/// The vocabulary and document table live in memory; posting blocks are
/// read on demand by stored offset. The data-file handle sits behind a
/// mutex so one loaded index can serve queries from multiple threads.
pub struct SearchIndex {
    terms: Vec<TermEntry>,
    doc_names: Vec<Option<String>>,
    total_docs: u32,
    data: Mutex<File>,
}

impl SearchIndex {
    /// Loads the vocabulary and document table from `dir`.
    ///
    /// Malformed lines are logged and skipped. A missing vocabulary or
    /// posting-data file fails the load; a missing document table leaves
    /// the universe empty, the same as an index built from zero documents.
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let paths = IndexPaths::new(dir);

        let vocab_file = File::open(paths.vocabulary())?;
        let mut terms: Vec<TermEntry> = Vec::new();
        for (line_no, line) in BufReader::new(vocab_file).lines().enumerate() {
            let line = line?;
            let Some(entry) = parse_vocab_line(&line) else {
                tracing::warn!(line = line_no + 1, "skipping malformed vocabulary line");
                continue;
            };
            // offsets point into a concatenation of blocks, so they must
            // only ever grow; a regression means the file is unusable
            if terms.last().map_or(false, |prev| entry.offset < prev.offset) {
                return Err(IndexError::Format {
                    path: paths.vocabulary().display().to_string(),
                    reason: format!("offset goes backwards at line {}", line_no + 1),
                });
            }
            terms.push(entry);
        }

        let mut doc_names: Vec<Option<String>> = Vec::new();
        let mut total_docs: u32 = 0;
        match File::open(paths.documents()) {
            Ok(file) => {
                for (line_no, line) in BufReader::new(file).lines().enumerate() {
                    let line = line?;
                    let Some((id, name)) = parse_document_line(&line) else {
                        tracing::warn!(line = line_no + 1, "skipping malformed document line");
                        continue;
                    };
                    let idx = id as usize;
                    if doc_names.len() <= idx {
                        doc_names.resize(idx + 1, None);
                    }
                    if doc_names[idx].is_some() {
                        tracing::warn!(doc_id = id, "duplicate document id, keeping first");
                        continue;
                    }
                    doc_names[idx] = Some(name.to_string());
                    total_docs = total_docs.max(id + 1);
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "document table missing, universe is empty");
            }
        }

        let data = File::open(paths.data())?;
        tracing::info!(num_terms = terms.len(), total_docs, "index loaded");
        Ok(Self {
            terms,
            doc_names,
            total_docs,
            data: Mutex::new(data),
        })
    }

    /// Sorted doc ids containing `term`; empty when the term is unknown.
    ///
    /// The vocabulary scan is linear. The list is sorted, so a binary
    /// search is the obvious upgrade if vocabularies outgrow this.
    pub fn postings_for(&self, term: &str) -> Result<Vec<DocId>> {
        let Some(entry) = self.terms.iter().find(|e| e.term == term) else {
            return Ok(Vec::new());
        };
        let mut data = self.data.lock();
        data.seek(SeekFrom::Start(entry.offset))?;
        let doc_count = data.read_u32::<LittleEndian>()?;
        let mut docs = Vec::with_capacity(doc_count as usize);
        for _ in 0..doc_count {
            let doc_id = data.read_u32::<LittleEndian>()?;
            let pos_count = data.read_u32::<LittleEndian>()?;
            // positions are irrelevant to boolean membership
            data.seek(SeekFrom::Current(i64::from(pos_count) * 4))?;
            docs.push(doc_id);
        }
        Ok(docs)
    }

    pub fn doc_name(&self, id: DocId) -> Option<&str> {
        self.doc_names.get(id as usize).and_then(|n| n.as_deref())
    }

    pub fn total_docs(&self) -> u32 {
        self.total_docs
    }

    pub fn num_terms(&self) -> usize {
        self.terms.len()
    }
}

impl TermSource for SearchIndex {
    fn postings_for(&self, term: &str) -> Result<Vec<DocId>> {
        SearchIndex::postings_for(self, term)
    }

    fn total_docs(&self) -> u32 {
        self.total_docs
    }
}

fn parse_vocab_line(line: &str) -> Option<TermEntry> {
    let mut parts = line.split('\t');
    let term = parts.next()?;
    let doc_count = parts.next()?.parse().ok()?;
    let offset = parts.next()?.parse().ok()?;
    if term.is_empty() || parts.next().is_some() {
        return None;
    }
    Some(TermEntry {
        term: term.to_string(),
        doc_count,
        offset,
    })
}

fn parse_document_line(line: &str) -> Option<(DocId, &str)> {
    let (id, name) = line.split_once('\t')?;
    let id = id.parse().ok()?;
    if name.is_empty() {
        return None;
    }
    Some((id, name))
}
