use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::postings::PostingsList;

pub type TermId = u32;
pub type DocId = u32;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocInfo {
    /// Stable per-document key, e.g. the path relative to the corpus root.
    pub name: String,
    /// Number of tokens in the document.
    pub token_count: u32,
    /// Length of the document's tf-idf vector.
    pub euclidean_length: f64,
}

/// Read side of an inverted index, as seen by the query evaluator.
pub trait Index {
    /// Postings for `term`; an unknown term yields an empty list.
    fn get_postings(&self, term: &str) -> Result<PostingsList>;

    fn doc_info(&self, doc_id: DocId) -> Option<&DocInfo>;

    fn num_documents(&self) -> usize;
}
