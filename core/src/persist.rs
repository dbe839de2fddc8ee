use byteorder::{LittleEndian, WriteBytesExt};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::dictionary::TermDict;
use crate::postings::{PostingAccumulator, TermPostings};
use crate::{Result, TermId};

/// On-disk format version recorded in `meta.json`.
pub const FORMAT_VERSION: u32 = 1;

/// Resolves the on-disk layout of one index directory.
pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    pub fn vocabulary(&self) -> PathBuf { self.root.join("vocabulary.txt") }
    pub fn data(&self) -> PathBuf { self.root.join("index_data.bin") }
    pub fn documents(&self) -> PathBuf { self.root.join("documents.txt") }
    pub fn meta(&self) -> PathBuf { self.root.join("meta.json") }
}

/// Informational sidecar written next to the index files. The loader never
/// requires it.
#[derive(Debug, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_docs: u32,
    pub num_terms: u32,
    pub created_at: String,
    pub version: u32,
}

/// Writes vocabulary, posting data, and the document table for a finalized
/// build.
///
/// Each file lands under a temporary name and is renamed into place once
/// fully written, so an interrupted save leaves a previous index intact.
///
/// `vocabulary.txt` lines are `<term>\t<doc_count>\t<byte_offset>`, sorted
/// by term byte order; `byte_offset` is absolute into `index_data.bin`.
/// `documents.txt` lines are `<doc_id>\t<name>` in ascending id order.
pub fn save_index(
    out_dir: &Path,
    dict: &TermDict,
    postings: &PostingAccumulator,
    doc_names: &[String],
) -> Result<()> {
    let paths = IndexPaths::new(out_dir);
    fs::create_dir_all(&paths.root)?;

    let mut vocab: Vec<(&str, TermId)> = dict.iter().collect();
    vocab.sort_unstable_by(|a, b| a.0.cmp(b.0));

    let vocab_tmp = tmp_path(&paths.vocabulary());
    let data_tmp = tmp_path(&paths.data());
    {
        let mut vocab_file = BufWriter::new(File::create(&vocab_tmp)?);
        let mut data_file = BufWriter::new(File::create(&data_tmp)?);

        let mut offset: u64 = 0;
        for (term, term_id) in vocab {
            let Some(term_postings) = postings.term(term_id) else { continue };
            writeln!(vocab_file, "{}\t{}\t{}", term, term_postings.doc_count(), offset)?;
            offset += write_posting_block(&mut data_file, term_postings)?;
        }
        vocab_file.flush()?;
        data_file.flush()?;
    }

    let docs_tmp = tmp_path(&paths.documents());
    {
        let mut doc_file = BufWriter::new(File::create(&docs_tmp)?);
        for (id, name) in doc_names.iter().enumerate() {
            writeln!(doc_file, "{}\t{}", id, name)?;
        }
        doc_file.flush()?;
    }

    fs::rename(&vocab_tmp, paths.vocabulary())?;
    fs::rename(&data_tmp, paths.data())?;
    fs::rename(&docs_tmp, paths.documents())?;
    Ok(())
}

/// Serializes one posting block: `u32 doc_count`, then per posting
/// `u32 doc_id`, `u32 pos_count`, then the positions. All integers are
/// little-endian 32-bit. Returns the number of bytes written.
fn write_posting_block<W: Write>(w: &mut W, term: &TermPostings) -> Result<u64> {
    let mut written: u64 = 4;
    w.write_u32::<LittleEndian>(term.doc_count())?;
    for posting in &term.postings {
        w.write_u32::<LittleEndian>(posting.doc_id)?;
        w.write_u32::<LittleEndian>(posting.positions.len() as u32)?;
        for &pos in &posting.positions {
            w.write_u32::<LittleEndian>(pos)?;
        }
        written += 8 + 4 * posting.positions.len() as u64;
    }
    Ok(written)
}

pub fn save_meta(paths: &IndexPaths, meta: &MetaFile) -> Result<()> {
    fs::create_dir_all(&paths.root)?;
    let tmp = tmp_path(&paths.meta());
    let json = serde_json::to_string_pretty(meta)?;
    fs::write(&tmp, json)?;
    fs::rename(&tmp, paths.meta())?;
    Ok(())
}

pub fn load_meta(paths: &IndexPaths) -> Result<MetaFile> {
    let buf = fs::read_to_string(paths.meta())?;
    let meta = serde_json::from_str(&buf)?;
    Ok(meta)
}

fn tmp_path(dst: &Path) -> PathBuf {
    let mut name = dst.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    dst.with_file_name(name)
}
