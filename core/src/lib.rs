//! Full-text search over a persistent hashed inverted index.

pub mod authority;
pub mod config;
pub mod engine;
pub mod error;
pub mod hashed;
pub mod index;
pub mod kgram;
pub mod persist;
pub mod postings;
pub mod query;
pub mod searcher;
pub mod tokenizer;

pub use authority::{AuthorityScores, AuthorityTable};
pub use config::{AbsentTermPolicy, IndexConfig, SearchConfig, TokenizerConfig};
pub use engine::{Engine, IndexBuilder};
pub use error::{IndexError, Result};
pub use hashed::HashedIndex;
pub use index::{DocId, DocInfo, Index, TermId};
pub use kgram::KGramIndex;
pub use postings::{MergeMode, PostingsEntry, PostingsList};
pub use query::{NormalizationType, Query, QueryTerm, QueryType, RankingType};
pub use searcher::Searcher;
