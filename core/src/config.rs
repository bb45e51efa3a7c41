use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::{IndexError, Result};

/// Number of dictionary slots used when nothing else is configured.
pub const DEFAULT_TABLE_SIZE: u64 = 611_953;

/// Storage settings for one on-disk index.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Directory holding the dictionary, data, doc-info and side files.
    pub dir: PathBuf,
    /// Number of 16-byte slots in the dictionary hash table. Fixed for the
    /// lifetime of a built index.
    #[serde(default = "default_table_size")]
    pub table_size: u64,
    /// Width of the k-grams used for wildcard expansion.
    #[serde(default = "default_kgram_k")]
    pub kgram_k: usize,
    /// Optional `key;score` file with precomputed authority scores.
    #[serde(default)]
    pub authority_path: Option<PathBuf>,
    /// Used for documents at build time. An existing index keeps the
    /// settings recorded in its meta file.
    #[serde(default)]
    pub tokenizer: TokenizerConfig,
}

fn default_table_size() -> u64 { DEFAULT_TABLE_SIZE }
fn default_kgram_k() -> usize { 2 }

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("./index"),
            table_size: DEFAULT_TABLE_SIZE,
            kgram_k: default_kgram_k(),
            authority_path: None,
            tokenizer: TokenizerConfig::default(),
        }
    }
}

impl IndexConfig {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self { dir: dir.as_ref().to_path_buf(), ..Self::default() }
    }

    pub fn with_table_size(mut self, table_size: u64) -> Self {
        self.table_size = table_size;
        self
    }

    pub fn with_kgram_k(mut self, k: usize) -> Self {
        self.kgram_k = k;
        self
    }

    pub fn with_authority_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.authority_path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn with_tokenizer(mut self, tokenizer: TokenizerConfig) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.table_size == 0 {
            return Err(IndexError::InvalidConfig("table_size must be positive".into()));
        }
        if self.kgram_k == 0 {
            return Err(IndexError::InvalidConfig("kgram_k must be positive".into()));
        }
        Ok(())
    }

    /// Load settings from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut f = File::open(path)?;
        let mut buf = String::new();
        f.read_to_string(&mut buf)?;
        let config: IndexConfig = serde_json::from_str(&buf)?;
        config.validate()?;
        Ok(config)
    }
}

/// What INTERSECTION does with a query term that has no postings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbsentTermPolicy {
    /// Leave the term out and keep folding with the previous result.
    Skip,
    /// Treat the term as matching nothing, so the whole result is empty.
    Empty,
}

/// Tunables for query evaluation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_authority_weight")]
    pub authority_weight: f64,
    #[serde(default = "default_tfidf_weight")]
    pub tfidf_weight: f64,
    #[serde(default = "default_absent_terms")]
    pub absent_terms: AbsentTermPolicy,
}

fn default_authority_weight() -> f64 { 1000.0 }
fn default_tfidf_weight() -> f64 { 1.0 }
fn default_absent_terms() -> AbsentTermPolicy { AbsentTermPolicy::Skip }

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            authority_weight: default_authority_weight(),
            tfidf_weight: default_tfidf_weight(),
            absent_terms: default_absent_terms(),
        }
    }
}

/// Tokenizer switches. Both default to off so that indexed terms and
/// positions follow the raw text.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenizerConfig {
    #[serde(default)]
    pub remove_stopwords: bool,
    #[serde(default)]
    pub stem: bool,
}
