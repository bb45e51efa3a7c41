use serde::{Deserialize, Serialize};

use crate::kgram::WILDCARD;

/// Weight given to a query term typed by the user.
pub const DEFAULT_TERM_WEIGHT: f64 = 1.0;

#[derive(Debug, Clone, PartialEq)]
pub struct QueryTerm {
    pub term: String,
    pub weight: f64,
}

impl QueryTerm {
    pub fn new(term: impl Into<String>, weight: f64) -> Self {
        Self { term: term.into(), weight }
    }

    pub fn is_wildcard(&self) -> bool {
        self.term.contains(WILDCARD)
    }
}

/// A query as an ordered list of weighted terms.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub terms: Vec<QueryTerm>,
}

impl Query {
    pub fn new() -> Self { Self::default() }

    /// Split on whitespace and lowercase each term.
    pub fn parse(text: &str) -> Self {
        let terms = text
            .split_whitespace()
            .map(|t| QueryTerm::new(t.to_lowercase(), DEFAULT_TERM_WEIGHT))
            .collect();
        Self { terms }
    }

    pub fn add_term(&mut self, term: impl Into<String>) {
        self.terms.push(QueryTerm::new(term, DEFAULT_TERM_WEIGHT));
    }

    pub fn len(&self) -> usize { self.terms.len() }

    pub fn is_empty(&self) -> bool { self.terms.is_empty() }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryType {
    Intersection,
    Phrase,
    Ranked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingType {
    TfIdf,
    Authority,
    Combination,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizationType {
    /// Divide by the number of tokens in the document.
    DocumentLength,
    /// Divide by the length of the document's tf-idf vector.
    EuclideanLength,
}
