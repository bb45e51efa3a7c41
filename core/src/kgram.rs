//! K-gram index over the vocabulary, used to expand wildcard query terms.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::iter;

use crate::error::{IndexError, Result};
use crate::index::TermId;

/// Marks the start and end of a term so that k-grams can anchor on them.
const BOUNDARY: char = ' ';
pub const WILDCARD: char = '*';

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KGramIndex {
    k: usize,
    term_ids: HashMap<String, TermId>,
    /// Position is the term id.
    terms: Vec<String>,
    /// k-gram -> ascending term ids containing it.
    index: HashMap<String, Vec<TermId>>,
}

fn padded(term: &str) -> Vec<char> {
    iter::once(BOUNDARY).chain(term.chars()).chain(iter::once(BOUNDARY)).collect()
}

fn windows(chars: &[char], k: usize) -> impl Iterator<Item = String> + '_ {
    chars.windows(k).map(|w| w.iter().collect())
}

fn intersect_ids(a: &[TermId], b: &[TermId]) -> Vec<TermId> {
    let mut out = Vec::with_capacity(a.len().min(b.len()));
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            Ordering::Equal => {
                out.push(a[i]);
                i += 1;
                j += 1;
            }
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
        }
    }
    out
}

/// Anchored regex for a wildcard pattern: `*` matches any run of characters,
/// everything else matches literally.
fn wildcard_regex(pattern: &str) -> Result<Regex> {
    let body = pattern.split(WILDCARD).map(regex::escape).collect::<Vec<_>>().join(".*");
    Ok(Regex::new(&format!("(?s)^{body}$"))?)
}

impl KGramIndex {
    pub fn new(k: usize) -> Result<Self> {
        if k == 0 {
            return Err(IndexError::InvalidConfig("k-gram width must be positive".into()));
        }
        Ok(Self { k, term_ids: HashMap::new(), terms: Vec::new(), index: HashMap::new() })
    }

    pub fn k(&self) -> usize { self.k }

    /// Number of distinct terms.
    pub fn len(&self) -> usize { self.terms.len() }

    pub fn is_empty(&self) -> bool { self.terms.is_empty() }

    /// Add a term to the vocabulary. Known terms keep their id.
    pub fn insert(&mut self, term: &str) -> TermId {
        if let Some(&id) = self.term_ids.get(term) {
            return id;
        }
        let id = self.terms.len() as TermId;
        self.term_ids.insert(term.to_string(), id);
        self.terms.push(term.to_string());

        for kgram in windows(&padded(term), self.k) {
            let postings = self.index.entry(kgram).or_default();
            // a k-gram can occur twice in one term ("an" in "banana")
            if postings.last() != Some(&id) {
                postings.push(id);
            }
        }
        id
    }

    pub fn term_id(&self, term: &str) -> Option<TermId> {
        self.term_ids.get(term).copied()
    }

    pub fn term(&self, id: TermId) -> Option<&str> {
        self.terms.get(id as usize).map(String::as_str)
    }

    /// Term ids containing `kgram`; empty when the k-gram was never seen.
    pub fn get_postings(&self, kgram: &str) -> &[TermId] {
        self.index.get(kgram).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Term ids containing every one of `kgrams`. With no k-grams to narrow
    /// by, every term is a candidate.
    pub fn intersect_all<S: AsRef<str>>(&self, kgrams: &[S]) -> Vec<TermId> {
        let mut rest = kgrams.iter();
        let first = match rest.next() {
            Some(g) => self.get_postings(g.as_ref()).to_vec(),
            None => return (0..self.terms.len() as TermId).collect(),
        };
        rest.fold(first, |acc, g| {
            if acc.is_empty() {
                acc
            } else {
                intersect_ids(&acc, self.get_postings(g.as_ref()))
            }
        })
    }

    /// Vocabulary terms matching a wildcard pattern, in term-id order.
    ///
    /// K-grams that do not straddle a `*` prune the vocabulary to candidates;
    /// each candidate is then confirmed against the full pattern, since
    /// sharing all k-grams does not imply a match.
    pub fn expand(&self, pattern: &str) -> Result<Vec<String>> {
        let kgrams: Vec<String> = windows(&padded(pattern), self.k)
            .filter(|g| !g.contains(WILDCARD))
            .collect();
        let candidates = self.intersect_all(&kgrams);
        let re = wildcard_regex(pattern)?;
        let matches: Vec<String> = candidates
            .into_iter()
            .filter_map(|id| self.term(id))
            .filter(|t| re.is_match(t))
            .map(str::to_string)
            .collect();
        tracing::debug!(pattern, kgrams = kgrams.len(), matches = matches.len(), "expanded wildcard");
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_of(k: usize, terms: &[&str]) -> KGramIndex {
        let mut idx = KGramIndex::new(k).unwrap();
        for t in terms {
            idx.insert(t);
        }
        idx
    }

    #[test]
    fn zero_k_rejected() {
        assert!(KGramIndex::new(0).is_err());
    }

    #[test]
    fn insert_is_idempotent() {
        let mut idx = KGramIndex::new(2).unwrap();
        assert_eq!(idx.insert("cat"), 0);
        assert_eq!(idx.insert("dog"), 1);
        assert_eq!(idx.insert("cat"), 0);
        assert_eq!(idx.len(), 2);
        assert_eq!(idx.get_postings("ca"), &[0]);
        assert_eq!(idx.term(1), Some("dog"));
        assert_eq!(idx.term_id("dog"), Some(1));
    }

    #[test]
    fn boundary_kgrams() {
        let idx = index_of(3, &["cat"]);
        assert_eq!(idx.get_postings(" ca"), &[0]);
        assert_eq!(idx.get_postings("at "), &[0]);
        assert!(idx.get_postings("xyz").is_empty());
    }

    #[test]
    fn postings_stay_unique() {
        let idx = index_of(2, &["banana", "ant", "band"]);
        assert_eq!(idx.get_postings("an"), &[0, 1, 2]);
        assert_eq!(idx.get_postings("na"), &[0]);
    }

    #[test]
    fn intersect_all_narrows() {
        let idx = index_of(2, &["cat", "car", "cart", "dog"]);
        assert_eq!(idx.intersect_all(&["ca", "ar"]), vec![1, 2]);
        assert_eq!(idx.intersect_all(&["ca", "zz"]), Vec::<TermId>::new());
        assert_eq!(idx.intersect_all::<&str>(&[]), vec![0, 1, 2, 3]);
    }

    #[test]
    fn expand_prefix() {
        let idx = index_of(2, &["cat", "dog", "car", "scar", "cart"]);
        assert_eq!(idx.expand("ca*").unwrap(), vec!["cat", "car", "cart"]);
    }

    #[test]
    fn expand_confirms_candidates() {
        // "abaa" holds both k-grams of "aa*" but does not start with "aa"
        let idx = index_of(2, &["abaa", "aab"]);
        assert_eq!(idx.intersect_all(&[" a", "aa"]), vec![0, 1]);
        assert_eq!(idx.expand("aa*").unwrap(), vec!["aab"]);

        let idx = index_of(2, &["cart", "tract", "cat", "cut"]);
        assert_eq!(idx.expand("c*t").unwrap(), vec!["cart", "cat", "cut"]);
        assert_eq!(idx.expand("*act").unwrap(), vec!["tract"]);
        assert!(idx.expand("z*").unwrap().is_empty());
    }

    #[test]
    fn expand_escapes_literals() {
        let idx = index_of(2, &["a.b", "axb"]);
        assert_eq!(idx.expand("a.*").unwrap(), vec!["a.b"]);
        assert_eq!(idx.expand("*").unwrap(), vec!["a.b", "axb"]);
    }
}
