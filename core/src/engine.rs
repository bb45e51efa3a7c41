//! Entry points tying the storage engine, the k-gram index and the
//! authority scores together: `IndexBuilder` for a build pass and `Engine`
//! for searching a sealed index.

use tracing::{info, warn};

use crate::authority::AuthorityTable;
use crate::config::{IndexConfig, SearchConfig, TokenizerConfig};
use crate::error::Result;
use crate::hashed::{HashedIndex, WriteSummary};
use crate::index::{DocId, DocInfo};
use crate::kgram::KGramIndex;
use crate::persist::{self, IndexPaths};
use crate::postings::PostingsList;
use crate::query::{NormalizationType, Query, QueryTerm, QueryType, RankingType};
use crate::searcher::Searcher;
use crate::tokenizer::Tokenizer;

/// One full build of an index directory.
pub struct IndexBuilder {
    index: HashedIndex,
    kgrams: KGramIndex,
    paths: IndexPaths,
}

impl IndexBuilder {
    pub fn create(config: IndexConfig) -> Result<Self> {
        let kgrams = KGramIndex::new(config.kgram_k)?;
        let paths = IndexPaths::new(&config.dir);
        let index = HashedIndex::create(config)?;
        Ok(Self { index, kgrams, paths })
    }

    /// Occurrences of a term must arrive in non-decreasing `doc_id` order.
    pub fn insert(&mut self, term: &str, doc_id: DocId, offset: u32) {
        self.index.insert(term, doc_id, offset);
        self.kgrams.insert(term);
    }

    pub fn add_document(&mut self, doc_id: DocId, name: impl Into<String>, token_count: u32) {
        self.index.add_document(doc_id, name, token_count);
    }

    pub fn set_euclidean_length(&mut self, doc_id: DocId, length: f64) {
        self.index.set_euclidean_length(doc_id, length);
    }

    /// Tokenizer documents of this build should go through.
    pub fn tokenizer(&self) -> Tokenizer {
        Tokenizer::new(self.index.config().tokenizer.clone())
    }

    /// Write everything to disk. Euclidean lengths are computed from the
    /// gathered postings unless `keep_lengths` is set. The k-gram snapshot is
    /// replaced together with the index files.
    pub fn finish(mut self, keep_lengths: bool) -> Result<WriteSummary> {
        if !keep_lengths {
            self.index.compute_euclidean_lengths();
        }
        let (kgrams, paths) = (&self.kgrams, &self.paths);
        let summary = self
            .index
            .write_index_with(|staged| persist::stage_kgram_index(staged, paths, kgrams))?;
        info!(terms = self.kgrams.len(), k = self.kgrams.k(), "k-gram index written");
        Ok(summary)
    }
}

/// A sealed index opened for searching.
pub struct Engine {
    index: HashedIndex,
    kgrams: KGramIndex,
    authority: AuthorityTable,
    search_config: SearchConfig,
    /// The settings the index was built with.
    tokenizer: Tokenizer,
}

impl Engine {
    pub fn open(config: IndexConfig, search_config: SearchConfig) -> Result<Self> {
        config.validate()?;
        let paths = IndexPaths::new(&config.dir);
        let tokenizer = match persist::load_meta(&paths)? {
            Some(meta) => meta.tokenizer,
            None => config.tokenizer.clone(),
        };
        let kgrams = match persist::load_kgram_index(&paths)? {
            Some(kgrams) => kgrams,
            None => KGramIndex::new(config.kgram_k)?,
        };
        let authority = match &config.authority_path {
            Some(path) if path.exists() => AuthorityTable::load(path)?,
            Some(path) => {
                warn!(path = %path.display(), "authority file not found, authority scores are 0");
                AuthorityTable::new()
            }
            None => AuthorityTable::new(),
        };
        let index = HashedIndex::open(config)?;
        Ok(Self { index, kgrams, authority, search_config, tokenizer: Tokenizer::new(tokenizer) })
    }

    /// Replace the authority scores, e.g. with ones computed in process.
    pub fn with_authority(mut self, authority: AuthorityTable) -> Self {
        self.authority = authority;
        self
    }

    pub fn searcher(&self) -> Searcher<'_, HashedIndex> {
        Searcher::new(&self.index, Some(&self.kgrams), &self.authority, &self.search_config)
    }

    /// Bring query terms into the form documents were indexed in. A term may
    /// split into several terms; one with no words left is kept as typed and
    /// matches nothing. Wildcard patterns are only normalized.
    pub fn analyze(&self, query: &Query) -> Query {
        let mut analyzed = Query::new();
        for qt in &query.terms {
            if qt.is_wildcard() {
                analyzed.terms.push(QueryTerm::new(self.tokenizer.normalize(&qt.term), qt.weight));
                continue;
            }
            let tokens = self.tokenizer.tokenize(&qt.term);
            if tokens.is_empty() {
                analyzed.terms.push(qt.clone());
            }
            analyzed
                .terms
                .extend(tokens.into_iter().map(|(term, _)| QueryTerm::new(term, qt.weight)));
        }
        analyzed
    }

    /// Analyze `query`, then see `Searcher::search`: `Ok(None)` is an empty
    /// query.
    pub fn search(
        &self,
        query: &Query,
        query_type: QueryType,
        ranking: RankingType,
        normalization: NormalizationType,
    ) -> Result<Option<PostingsList>> {
        self.searcher().search(&self.analyze(query), query_type, ranking, normalization)
    }

    pub fn tokenizer_config(&self) -> &TokenizerConfig { self.tokenizer.config() }

    pub fn index(&self) -> &HashedIndex { &self.index }

    pub fn kgrams(&self) -> &KGramIndex { &self.kgrams }

    pub fn doc_info(&self, doc_id: DocId) -> Option<&DocInfo> {
        self.index.docs().get(&doc_id)
    }

    pub fn num_documents(&self) -> usize { self.index.docs().len() }
}
