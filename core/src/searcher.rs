//! Query evaluation over an `Index`: boolean intersection, phrase matching
//! and ranked retrieval.

use std::cmp::Ordering;
use tracing::debug;

use crate::authority::AuthorityScores;
use crate::config::{AbsentTermPolicy, SearchConfig};
use crate::error::Result;
use crate::index::{DocId, Index};
use crate::kgram::{KGramIndex, WILDCARD};
use crate::postings::{PostingsEntry, PostingsList};
use crate::query::{NormalizationType, Query, QueryTerm, QueryType, RankingType};

/// Keeps NaN and infinities out of result scores.
fn finite_or_zero(x: f64) -> f64 {
    if x.is_finite() { x } else { 0.0 }
}

/// Documents in which a token of `second` directly follows a token of
/// `first`. Each result entry carries the matching offsets of `second`, so
/// the result can be chained with the next phrase term.
pub fn followed_by(first: &PostingsList, second: &PostingsList) -> PostingsList {
    let (a, b) = (first.as_slice(), second.as_slice());
    let mut out = PostingsList::new();
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].doc_id().cmp(&b[j].doc_id()) {
            Ordering::Equal => {
                let (o1, o2) = (a[i].offsets(), b[j].offsets());
                let mut matched = Vec::new();
                let (mut k, mut l) = (0, 0);
                while k < o1.len() && l < o2.len() {
                    match (u64::from(o1[k]) + 1).cmp(&u64::from(o2[l])) {
                        Ordering::Equal => {
                            matched.push(o2[l]);
                            k += 1;
                            l += 1;
                        }
                        Ordering::Less => k += 1,
                        Ordering::Greater => l += 1,
                    }
                }
                if !matched.is_empty() {
                    out.push(PostingsEntry::new(a[i].doc_id(), 0.0, matched));
                }
                i += 1;
                j += 1;
            }
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
        }
    }
    out
}

/// Documents ranked by both lists, scored
/// `authority_weight * authority + tfidf_weight * tfidf`.
fn combine(tfidf: &PostingsList, authority: &PostingsList, tfidf_weight: f64, authority_weight: f64) -> PostingsList {
    let (t, a) = (tfidf.as_slice(), authority.as_slice());
    let mut out = PostingsList::new();
    let (mut i, mut j) = (0, 0);
    while i < t.len() && j < a.len() {
        match t[i].doc_id().cmp(&a[j].doc_id()) {
            Ordering::Equal => {
                let score = authority_weight * a[j].score() + tfidf_weight * t[i].score();
                out.push(PostingsEntry::new(t[i].doc_id(), finite_or_zero(score), t[i].offsets().to_vec()));
                i += 1;
                j += 1;
            }
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
        }
    }
    out
}

pub struct Searcher<'a, I: Index + ?Sized> {
    index: &'a I,
    kgrams: Option<&'a KGramIndex>,
    authority: &'a dyn AuthorityScores,
    config: &'a SearchConfig,
}

impl<'a, I: Index + ?Sized> Searcher<'a, I> {
    pub fn new(
        index: &'a I,
        kgrams: Option<&'a KGramIndex>,
        authority: &'a dyn AuthorityScores,
        config: &'a SearchConfig,
    ) -> Self {
        Self { index, kgrams, authority, config }
    }

    /// Evaluate `query`.
    ///
    /// `Ok(None)` means there was nothing to search for; a search that ran
    /// and matched nothing gives `Ok(Some(list))` with an empty list.
    pub fn search(
        &self,
        query: &Query,
        query_type: QueryType,
        ranking: RankingType,
        normalization: NormalizationType,
    ) -> Result<Option<PostingsList>> {
        if query.is_empty() {
            return Ok(None);
        }
        debug!(
            terms = ?query.terms.iter().map(|t| t.term.as_str()).collect::<Vec<_>>(),
            ?query_type,
            ?ranking,
            "searching"
        );
        let result = match query_type {
            QueryType::Intersection => self.intersection(query)?,
            QueryType::Phrase => self.phrase(query)?,
            QueryType::Ranked => self.ranked(query, ranking, normalization)?,
        };
        debug!(hits = result.len(), "search done");
        Ok(Some(result))
    }

    /// Postings of a single query term. A wildcard term stands for the union
    /// of all vocabulary terms it matches.
    pub fn term_postings(&self, term: &str) -> Result<PostingsList> {
        if !term.contains(WILDCARD) {
            return self.index.get_postings(term);
        }
        let Some(kgrams) = self.kgrams else {
            return Ok(PostingsList::new());
        };
        let mut acc = PostingsList::new();
        for expanded in kgrams.expand(term)? {
            acc = acc.union(&self.index.get_postings(&expanded)?, true);
        }
        Ok(acc)
    }

    fn intersection(&self, query: &Query) -> Result<PostingsList> {
        let mut acc: Option<PostingsList> = None;
        for qt in &query.terms {
            let next = self.term_postings(&qt.term)?;
            if next.is_empty() {
                match self.config.absent_terms {
                    AbsentTermPolicy::Skip => continue,
                    AbsentTermPolicy::Empty => return Ok(PostingsList::new()),
                }
            }
            acc = Some(match acc {
                None => next,
                Some(prev) => PostingsList::intersect(&prev, &next),
            });
        }
        Ok(acc.unwrap_or_default())
    }

    fn phrase(&self, query: &Query) -> Result<PostingsList> {
        let mut terms = query.terms.iter();
        let Some(first) = terms.next() else {
            return Ok(PostingsList::new());
        };
        let mut acc = self.term_postings(&first.term)?;
        for qt in terms {
            if acc.is_empty() {
                break;
            }
            acc = followed_by(&acc, &self.term_postings(&qt.term)?);
        }
        Ok(acc)
    }

    fn ranked(&self, query: &Query, ranking: RankingType, normalization: NormalizationType) -> Result<PostingsList> {
        let mut fetched: Vec<(&QueryTerm, PostingsList)> = Vec::with_capacity(query.len());
        for qt in &query.terms {
            fetched.push((qt, self.term_postings(&qt.term)?));
        }

        let tf_idf = || {
            fetched.iter().fold(PostingsList::new(), |acc, (qt, postings)| {
                acc.union(&self.score_tf_idf(postings, qt.weight, normalization), true)
            })
        };
        let authority = || {
            fetched.iter().fold(PostingsList::new(), |acc, (qt, postings)| {
                acc.union(&self.score_authority(postings, qt.weight), true)
            })
        };

        let mut result = match ranking {
            RankingType::TfIdf => tf_idf(),
            RankingType::Authority => authority(),
            RankingType::Combination => combine(
                &tf_idf(),
                &authority(),
                self.config.tfidf_weight,
                self.config.authority_weight,
            ),
        };
        result.sort();
        Ok(result)
    }

    fn norm_length(&self, doc_id: DocId, normalization: NormalizationType) -> f64 {
        match (self.index.doc_info(doc_id), normalization) {
            (Some(info), NormalizationType::DocumentLength) => f64::from(info.token_count),
            (Some(info), NormalizationType::EuclideanLength) => info.euclidean_length,
            (None, _) => 0.0,
        }
    }

    /// `tf * ln(N / df) * weight / length` for every posting of one term.
    fn score_tf_idf(&self, postings: &PostingsList, weight: f64, normalization: NormalizationType) -> PostingsList {
        let n = self.index.num_documents() as f64;
        let df = postings.len() as f64;
        let idf = if n > 0.0 && df > 0.0 { (n / df).ln() } else { 0.0 };
        postings
            .iter()
            .map(|e| {
                let len = self.norm_length(e.doc_id(), normalization);
                let score = if len > 0.0 { e.term_frequency() as f64 * idf * weight / len } else { 0.0 };
                e.clone().with_score(finite_or_zero(score))
            })
            .collect()
    }

    fn score_authority(&self, postings: &PostingsList, weight: f64) -> PostingsList {
        postings
            .iter()
            .map(|e| {
                let score = self
                    .index
                    .doc_info(e.doc_id())
                    .map_or(0.0, |info| self.authority.score(&info.name) * weight);
                e.clone().with_score(finite_or_zero(score))
            })
            .collect()
    }
}
