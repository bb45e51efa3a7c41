//! Postings lists: per-term occurrence lists ordered by document id.
//!
//! The textual form produced by `Display` (and read back by `FromStr`) is the
//! on-disk postings encoding:
//!
//! ```text
//! <count>;<doc>:<offset>:<offset>...;<doc>:<offset>...;
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::{IndexError, Result};
use crate::index::DocId;

#[derive(Debug, Clone, PartialEq)]
pub struct PostingsEntry {
    doc_id: DocId,
    score: f64,
    offsets: Vec<u32>,
}

impl PostingsEntry {
    pub fn new(doc_id: DocId, score: f64, offsets: Vec<u32>) -> Self {
        Self { doc_id, score, offsets }
    }

    pub fn doc_id(&self) -> DocId { self.doc_id }

    pub fn score(&self) -> f64 { self.score }

    pub fn offsets(&self) -> &[u32] { &self.offsets }

    /// Number of occurrences of the term in this document.
    pub fn term_frequency(&self) -> usize { self.offsets.len() }

    pub fn with_score(self, score: f64) -> Self {
        Self { score, ..self }
    }

    /// Entry for the same document with both scores added up.
    fn combined(&self, other: &PostingsEntry, include_offsets: bool) -> PostingsEntry {
        let offsets = if include_offsets {
            merge_offsets(&self.offsets, &other.offsets)
        } else {
            self.offsets.clone()
        };
        PostingsEntry { doc_id: self.doc_id, score: self.score + other.score, offsets }
    }
}

/// Sorted, duplicate-free union of two ascending offset sequences.
fn merge_offsets(a: &[u32], b: &[u32]) -> Vec<u32> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            Ordering::Less => { out.push(a[i]); i += 1; }
            Ordering::Greater => { out.push(b[j]); j += 1; }
            Ordering::Equal => { out.push(a[i]); i += 1; j += 1; }
        }
    }
    out.extend_from_slice(&a[i..]);
    out.extend_from_slice(&b[j..]);
    out
}

/// How `PostingsList::merge` treats documents present on both sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMode {
    /// Add the scores and union the offsets.
    ScoreAccumulate,
    /// Keep the receiver's entry as it is.
    KeepExisting,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostingsList {
    entries: Vec<PostingsEntry>,
}

impl PostingsList {
    pub fn new() -> Self { Self::default() }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn get(&self, i: usize) -> Option<&PostingsEntry> { self.entries.get(i) }

    pub fn iter(&self) -> std::slice::Iter<'_, PostingsEntry> { self.entries.iter() }

    pub fn as_slice(&self) -> &[PostingsEntry] { &self.entries }

    pub fn doc_ids(&self) -> Vec<DocId> {
        self.entries.iter().map(|e| e.doc_id).collect()
    }

    /// Record one occurrence of the term.
    ///
    /// Callers must add postings in non-decreasing `doc_id` order; this is not
    /// checked. An occurrence in the same document as the last entry extends
    /// that entry's offsets.
    pub fn add(&mut self, doc_id: DocId, offset: u32, score: f64) {
        if let Some(last) = self.entries.last_mut() {
            if last.doc_id == doc_id {
                if last.offsets.last() != Some(&offset) {
                    last.offsets.push(offset);
                }
                return;
            }
        }
        self.entries.push(PostingsEntry::new(doc_id, score, vec![offset]));
    }

    /// Append an entry as is.
    pub fn push(&mut self, entry: PostingsEntry) {
        self.entries.push(entry);
    }

    /// Fold `other` into a copy of this list.
    ///
    /// Matching documents are combined according to `mode`. Entries found only
    /// in `other` go after this list's entries, in their original order, so
    /// the result may need a `sort` before use.
    pub fn merge(&self, other: &PostingsList, mode: MergeMode) -> PostingsList {
        let mut out = Vec::with_capacity(self.len() + other.len());
        let mut only_other = Vec::new();
        let (mut i, mut j) = (0, 0);
        while i < self.len() && j < other.len() {
            let (a, b) = (&self.entries[i], &other.entries[j]);
            match a.doc_id.cmp(&b.doc_id) {
                Ordering::Equal => {
                    out.push(match mode {
                        MergeMode::ScoreAccumulate => a.combined(b, true),
                        MergeMode::KeepExisting => a.clone(),
                    });
                    i += 1;
                    j += 1;
                }
                Ordering::Less => { out.push(a.clone()); i += 1; }
                Ordering::Greater => { only_other.push(b.clone()); j += 1; }
            }
        }
        out.extend(self.entries[i..].iter().cloned());
        out.extend(only_other);
        out.extend(other.entries[j..].iter().cloned());
        PostingsList { entries: out }
    }

    /// Full outer merge on document id; scores of shared documents are summed.
    pub fn union(&self, other: &PostingsList, include_offsets: bool) -> PostingsList {
        let mut out = Vec::with_capacity(self.len() + other.len());
        let (mut i, mut j) = (0, 0);
        while i < self.len() && j < other.len() {
            let (a, b) = (&self.entries[i], &other.entries[j]);
            match a.doc_id.cmp(&b.doc_id) {
                Ordering::Equal => {
                    out.push(a.combined(b, include_offsets));
                    i += 1;
                    j += 1;
                }
                Ordering::Less => { out.push(a.clone()); i += 1; }
                Ordering::Greater => { out.push(b.clone()); j += 1; }
            }
        }
        out.extend(self.entries[i..].iter().cloned());
        out.extend(other.entries[j..].iter().cloned());
        PostingsList { entries: out }
    }

    /// Documents present in both lists. Offsets and scores are dropped.
    pub fn intersect(a: &PostingsList, b: &PostingsList) -> PostingsList {
        let mut out = PostingsList::new();
        let (mut i, mut j) = (0, 0);
        while i < a.len() && j < b.len() {
            let (da, db) = (a.entries[i].doc_id, b.entries[j].doc_id);
            match da.cmp(&db) {
                Ordering::Equal => {
                    out.entries.push(PostingsEntry::new(da, 0.0, Vec::new()));
                    i += 1;
                    j += 1;
                }
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
            }
        }
        out
    }

    /// Stable sort by descending score.
    pub fn sort(&mut self) {
        self.entries.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    }
}

impl<'a> IntoIterator for &'a PostingsList {
    type Item = &'a PostingsEntry;
    type IntoIter = std::slice::Iter<'a, PostingsEntry>;

    fn into_iter(self) -> Self::IntoIter { self.entries.iter() }
}

impl IntoIterator for PostingsList {
    type Item = PostingsEntry;
    type IntoIter = std::vec::IntoIter<PostingsEntry>;

    fn into_iter(self) -> Self::IntoIter { self.entries.into_iter() }
}

impl FromIterator<PostingsEntry> for PostingsList {
    fn from_iter<I: IntoIterator<Item = PostingsEntry>>(iter: I) -> Self {
        PostingsList { entries: iter.into_iter().collect() }
    }
}

impl fmt::Display for PostingsList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{};", self.entries.len())?;
        for e in &self.entries {
            write!(f, "{}", e.doc_id)?;
            for off in &e.offsets {
                write!(f, ":{off}")?;
            }
            f.write_str(";")?;
        }
        Ok(())
    }
}

fn parse_num(field: &str) -> Result<u32> {
    field
        .parse()
        .map_err(|_| IndexError::corrupt(format!("bad number {field:?} in postings")))
}

impl FromStr for PostingsList {
    type Err = IndexError;

    fn from_str(s: &str) -> Result<Self> {
        let mut fields = s.split(';');
        let count = fields
            .next()
            .filter(|c| !c.is_empty())
            .ok_or_else(|| IndexError::corrupt("postings without a count"))?;
        let count: usize = count
            .parse()
            .map_err(|_| IndexError::corrupt(format!("bad postings count {count:?}")))?;

        let mut entries = Vec::with_capacity(count);
        for _ in 0..count {
            let field = fields
                .next()
                .ok_or_else(|| IndexError::corrupt(format!("postings truncated, expected {count} entries")))?;
            let mut parts = field.split(':');
            let doc_id = parse_num(parts.next().unwrap_or_default())?;
            let offsets = parts.map(parse_num).collect::<Result<Vec<u32>>>()?;
            entries.push(PostingsEntry::new(doc_id, 0.0, offsets));
        }

        match (fields.next(), fields.next()) {
            (Some(""), None) => Ok(PostingsList { entries }),
            _ => Err(IndexError::corrupt("trailing data after postings")),
        }
    }
}
