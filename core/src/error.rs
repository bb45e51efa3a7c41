use thiserror::Error;

/// Errors raised by the storage engine and the query evaluator.
///
/// A term that is not in the index is never an error: lookups answer with an
/// empty postings list instead.
#[derive(Error, Debug)]
pub enum IndexError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed index data: {0}")]
    Corrupt(String),

    #[error("dictionary full: no free slot among {table_size} slots")]
    TableFull { table_size: u64 },

    #[error("term cannot be stored: {0:?}")]
    InvalidTerm(String),

    #[error("document cannot be stored: {0:?}")]
    InvalidDocument(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid wildcard pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("k-gram snapshot error: {0}")]
    Snapshot(#[from] bincode::Error),

    #[error("meta file error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, IndexError>;

impl IndexError {
    pub(crate) fn corrupt(msg: impl Into<String>) -> Self {
        IndexError::Corrupt(msg.into())
    }

    /// True when the persisted files are unreadable as written, which callers
    /// usually answer with a full rebuild.
    pub fn is_corruption(&self) -> bool {
        matches!(self, IndexError::Corrupt(_) | IndexError::Snapshot(_) | IndexError::Json(_))
    }
}
