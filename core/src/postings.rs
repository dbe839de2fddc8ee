use crate::{DocId, Position, TermId};

/// One term's occurrences in one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Posting {
    pub doc_id: DocId,
    /// Positions in order of occurrence; not sorted, never empty.
    pub positions: Vec<Position>,
}

/// All postings for one term.
#[derive(Debug, Default)]
pub struct TermPostings {
    pub postings: Vec<Posting>,
}

impl TermPostings {
    /// Number of documents containing the term.
    pub fn doc_count(&self) -> u32 {
        self.postings.len() as u32
    }
}

/// Per-term posting lists, grown incrementally as occurrences arrive.
///
/// An arena of [`TermPostings`] addressed by dense term id. Postings are
/// appended in call order and only sorted by [`finalize`](Self::finalize);
/// until then a term's doc ids follow ingestion order.
#[derive(Default)]
pub struct PostingAccumulator {
    terms: Vec<TermPostings>,
}

impl PostingAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one occurrence of `term_id` in `doc_id` at `position`.
    ///
    /// The first occurrence of a `(term, doc)` pair creates its posting;
    /// later ones append to the position list. Documents are normally
    /// ingested one at a time, so the matching posting is almost always
    /// the last one; the full scan behind it covers out-of-order callers.
    pub fn record(&mut self, term_id: TermId, doc_id: DocId, position: Position) {
        let idx = term_id as usize;
        if self.terms.len() <= idx {
            self.terms.resize_with(idx + 1, TermPostings::default);
        }
        let term = &mut self.terms[idx];

        if let Some(last) = term.postings.last_mut() {
            if last.doc_id == doc_id {
                last.positions.push(position);
                return;
            }
        }
        if let Some(existing) = term.postings.iter_mut().find(|p| p.doc_id == doc_id) {
            existing.positions.push(position);
            return;
        }
        term.postings.push(Posting {
            doc_id,
            positions: vec![position],
        });
    }

    /// Sorts every term's posting list by ascending doc id.
    ///
    /// Doc ids are unique within a term, so an unstable O(n log n) sort
    /// is sufficient.
    pub fn finalize(&mut self) {
        for term in &mut self.terms {
            term.postings.sort_unstable_by_key(|p| p.doc_id);
        }
    }

    pub fn term(&self, term_id: TermId) -> Option<&TermPostings> {
        self.terms.get(term_id as usize)
    }

    pub fn num_terms(&self) -> usize {
        self.terms.len()
    }
}
