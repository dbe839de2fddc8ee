use std::cmp::Ordering;

use crate::DocId;

/// Merge-based set algebra over sorted, duplicate-free document-id lists.
///
/// Every operation sorts its inputs first, so callers may pass lists in any
/// order but must not rely on their order being preserved.

pub fn intersect(mut a: Vec<DocId>, mut b: Vec<DocId>) -> Vec<DocId> {
    a.sort_unstable();
    b.sort_unstable();
    let mut res = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            Ordering::Equal => {
                res.push(a[i]);
                i += 1;
                j += 1;
            }
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
        }
    }
    res
}

pub fn union(mut a: Vec<DocId>, mut b: Vec<DocId>) -> Vec<DocId> {
    a.sort_unstable();
    b.sort_unstable();
    let mut res = Vec::with_capacity(a.len().max(b.len()));
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            Ordering::Equal => {
                res.push(a[i]);
                i += 1;
                j += 1;
            }
            Ordering::Less => {
                res.push(a[i]);
                i += 1;
            }
            Ordering::Greater => {
                res.push(b[j]);
                j += 1;
            }
        }
    }
    res.extend_from_slice(&a[i..]);
    res.extend_from_slice(&b[j..]);
    res
}

/// `{0, .., total_docs-1} \ a`. Ids in `a` at or beyond `total_docs` would
/// mean the list and the loaded universe disagree; that is a caller bug.
pub fn complement(mut a: Vec<DocId>, total_docs: u32) -> Vec<DocId> {
    a.sort_unstable();
    debug_assert!(
        a.last().map_or(true, |&max| max < total_docs),
        "doc id outside the universe"
    );
    let mut res = Vec::with_capacity(total_docs as usize - a.len().min(total_docs as usize));
    let mut idx = 0;
    for doc in 0..total_docs {
        if idx < a.len() && a[idx] == doc {
            idx += 1;
        } else {
            res.push(doc);
        }
    }
    res
}
