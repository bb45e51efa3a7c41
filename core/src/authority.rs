//! Precomputed document authority scores (e.g. PageRank), looked up by the
//! document's stable key.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{IndexError, Result};

pub trait AuthorityScores {
    /// Score of the document named `doc_key`; unknown documents score 0.
    fn score(&self, doc_key: &str) -> f64;
}

impl AuthorityScores for HashMap<String, f64> {
    fn score(&self, doc_key: &str) -> f64 {
        self.get(doc_key).copied().unwrap_or(0.0)
    }
}

/// Authority scores read from a `key;score` text file.
#[derive(Debug, Clone, Default)]
pub struct AuthorityTable {
    scores: HashMap<String, f64>,
}

impl AuthorityTable {
    pub fn new() -> Self { Self::default() }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let f = File::open(path)?;
        let mut scores = HashMap::new();
        for (lineno, line) in BufReader::new(f).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() { continue; }
            let bad = || IndexError::corrupt(format!("authority line {}: {line:?}", lineno + 1));
            let (key, score) = line.rsplit_once(';').ok_or_else(bad)?;
            let score: f64 = score.trim().parse().map_err(|_| bad())?;
            if !score.is_finite() {
                return Err(bad());
            }
            scores.insert(key.to_string(), score);
        }
        tracing::info!(documents = scores.len(), "loaded authority scores");
        Ok(Self { scores })
    }

    pub fn insert(&mut self, doc_key: impl Into<String>, score: f64) {
        self.scores.insert(doc_key.into(), score);
    }

    pub fn len(&self) -> usize { self.scores.len() }

    pub fn is_empty(&self) -> bool { self.scores.is_empty() }
}

impl AuthorityScores for AuthorityTable {
    fn score(&self, doc_key: &str) -> f64 {
        self.scores.score(doc_key)
    }
}
