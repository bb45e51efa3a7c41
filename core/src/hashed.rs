//! Inverted index stored as a hash table on disk.
//!
//! Two files hold the index. The data file is an append-only sequence of
//! records `"<term>;<postings>\n"`. The dictionary file is an array of
//! `table_size` fixed-width slots, each a big-endian `(pointer, size)` pair
//! addressing one record. A term lives in the first free slot of the probe
//! sequence `(home + i²) mod table_size`, where `home` is a hash of the term.
//! Lookups walk the same sequence and confirm each hit by the term prefix of
//! the record.
//!
//! While an index is being built, postings accumulate in memory and are only
//! committed to disk by `write_index`.

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::fs::{create_dir_all, File, OpenOptions};
use std::io::{self, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;
use tracing::{debug, info};

use crate::config::IndexConfig;
use crate::error::{IndexError, Result};
use crate::index::{DocId, DocInfo, Index};
use crate::persist::{self, IndexPaths, MetaFile, Staged, FORMAT_VERSION};
use crate::postings::PostingsList;

/// Bytes per dictionary slot: two 64-bit integers.
pub const SLOT_WIDTH: u64 = 16;

/// Separates the term from its postings inside a data record.
const SEPARATOR: char = ';';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Slot {
    ptr: i64,
    size: i64,
}

impl Slot {
    const EMPTY: Slot = Slot { ptr: -1, size: 0 };

    /// Zero-filled slots count as empty too, since their size is 0.
    fn is_empty(&self) -> bool {
        self.ptr < 0 || self.size <= 0
    }

    fn encode<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_i64::<BigEndian>(self.ptr)?;
        w.write_i64::<BigEndian>(self.size)
    }

    fn decode(mut bytes: &[u8]) -> io::Result<Slot> {
        let ptr = bytes.read_i64::<BigEndian>()?;
        let size = bytes.read_i64::<BigEndian>()?;
        Ok(Slot { ptr, size })
    }
}

/// Where a term was found in the dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotHit {
    pub slot: u64,
    /// Slots inspected, including the one that matched.
    pub probes: u64,
}

/// Outcome of a `write_index` pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteSummary {
    pub terms: usize,
    pub collisions: u64,
    pub data_bytes: u64,
}

/// djb2 over the UTF-8 bytes of the term.
pub fn hash_term(term: &str) -> u64 {
    term.bytes()
        .fold(5381u64, |h, b| h.wrapping_mul(33).wrapping_add(u64::from(b)))
}

/// The `i`-th slot of the quadratic probe sequence starting at `home`.
fn probe_slot(home: u64, i: u64, table_size: u64) -> u64 {
    let i = u128::from(i);
    ((u128::from(home) + i * i) % u128::from(table_size)) as u64
}

/// Terms that fit the record format. Nothing else can be in the index.
fn is_storable(term: &str) -> bool {
    !term.is_empty() && !term.contains([SEPARATOR, '\n'])
}

fn open_rw(path: &Path) -> io::Result<File> {
    OpenOptions::new().read(true).write(true).create(true).open(path)
}

pub struct HashedIndex {
    config: IndexConfig,
    paths: IndexPaths,
    dictionary: Mutex<File>,
    data: Mutex<File>,
    dictionary_len: u64,
    data_len: u64,
    /// Postings gathered during a build, keyed by term.
    cache: HashMap<String, PostingsList>,
    docs: BTreeMap<DocId, DocInfo>,
}

impl HashedIndex {
    /// Open the index in `config.dir`, creating empty files on first use.
    pub fn open(config: IndexConfig) -> Result<Self> {
        config.validate()?;
        let paths = IndexPaths::new(&config.dir);
        create_dir_all(&paths.root)?;

        if let Some(meta) = persist::load_meta(&paths)? {
            if meta.table_size != config.table_size {
                return Err(IndexError::InvalidConfig(format!(
                    "index at {} was built with table size {}, configured {}",
                    paths.root.display(),
                    meta.table_size,
                    config.table_size
                )));
            }
        }

        let dictionary = open_rw(&paths.dictionary())?;
        let data = open_rw(&paths.data())?;
        let dictionary_len = dictionary.metadata()?.len();
        let data_len = data.metadata()?.len();
        let docs = persist::load_doc_info(&paths)?;
        info!(dir = %paths.root.display(), docs = docs.len(), dictionary_len, data_len, "opened index");

        Ok(Self {
            config,
            paths,
            dictionary: Mutex::new(dictionary),
            data: Mutex::new(data),
            dictionary_len,
            data_len,
            cache: HashMap::new(),
            docs,
        })
    }

    /// Open the index for a full rebuild: documents from a previous build
    /// are forgotten.
    pub fn create(config: IndexConfig) -> Result<Self> {
        let mut index = Self::open(config)?;
        index.docs.clear();
        Ok(index)
    }

    pub fn config(&self) -> &IndexConfig { &self.config }

    pub fn docs(&self) -> &BTreeMap<DocId, DocInfo> { &self.docs }

    pub fn home_slot(&self, term: &str) -> u64 {
        hash_term(term) % self.config.table_size
    }

    // ------------------------------------------------------------------
    // Build

    /// Record that `term` occurs in `doc_id` at token position `offset`.
    ///
    /// Occurrences of a term must arrive in non-decreasing `doc_id` order.
    pub fn insert(&mut self, term: &str, doc_id: DocId, offset: u32) {
        match self.cache.get_mut(term) {
            Some(list) => list.add(doc_id, offset, 0.0),
            None => {
                let mut list = PostingsList::new();
                list.add(doc_id, offset, 0.0);
                self.cache.insert(term.to_string(), list);
            }
        }
    }

    pub fn add_document(&mut self, doc_id: DocId, name: impl Into<String>, token_count: u32) {
        self.docs.insert(doc_id, DocInfo { name: name.into(), token_count, euclidean_length: 0.0 });
    }

    pub fn set_euclidean_length(&mut self, doc_id: DocId, length: f64) {
        if let Some(info) = self.docs.get_mut(&doc_id) {
            info.euclidean_length = length;
        }
    }

    /// Number of distinct terms waiting in the build cache.
    pub fn pending_terms(&self) -> usize { self.cache.len() }

    /// Fill every registered document's Euclidean length,
    /// `sqrt(sum over terms of (tf * ln(N / df))^2)`, from the build cache.
    pub fn compute_euclidean_lengths(&mut self) {
        let n = self.docs.len() as f64;
        if n == 0.0 {
            return;
        }
        let mut sums: HashMap<DocId, f64> = HashMap::new();
        for list in self.cache.values() {
            let idf = (n / list.len() as f64).ln();
            for entry in list {
                let w = entry.term_frequency() as f64 * idf;
                *sums.entry(entry.doc_id()).or_insert(0.0) += w * w;
            }
        }
        for (doc_id, info) in self.docs.iter_mut() {
            info.euclidean_length = sums.get(doc_id).copied().unwrap_or(0.0).sqrt();
        }
    }

    /// Commit the build cache to disk, replacing whatever the files held.
    pub fn write_index(&mut self) -> Result<WriteSummary> {
        self.write_index_with(|_| Ok(()))
    }

    /// Like `write_index`, with `side_files` staging extra files that are
    /// replaced in the same commit.
    ///
    /// Every slot is resolved before anything is written, and all files are
    /// staged and only renamed into place once each has been written. On
    /// error the previous index stays as it was, both on disk and for
    /// readers that already have it open.
    pub fn write_index_with<F>(&mut self, side_files: F) -> Result<WriteSummary>
    where
        F: FnOnce(&mut Staged) -> Result<()>,
    {
        let table_size = self.config.table_size;
        let mut terms: Vec<&String> = self.cache.keys().collect();
        terms.sort();
        if let Some(bad) = terms.iter().find(|t| !is_storable(t)) {
            return Err(IndexError::InvalidTerm((*bad).clone()));
        }
        persist::check_doc_names(&self.docs)?;
        let num_terms = terms.len();

        let mut taken = vec![false; table_size as usize];
        let mut placed: Vec<u64> = Vec::with_capacity(num_terms);
        let mut collisions = 0u64;
        for term in &terms {
            let home = hash_term(term) % table_size;
            let (slot, probes) = (0..table_size)
                .map(|i| (probe_slot(home, i, table_size), i + 1))
                .find(|(s, _)| !taken[*s as usize])
                .ok_or(IndexError::TableFull { table_size })?;
            taken[slot as usize] = true;
            collisions += probes - 1;
            placed.push(slot);
        }

        let mut staged = Staged::new();
        let mut slots = vec![Slot::EMPTY; table_size as usize];
        let mut free = 0u64;
        {
            let mut w = BufWriter::new(staged.create(self.paths.data())?);
            for (n, (term, slot)) in terms.iter().zip(&placed).enumerate() {
                let record = format!("{term}{SEPARATOR}{}\n", self.cache[*term]);
                w.write_all(record.as_bytes())?;
                slots[*slot as usize] = Slot { ptr: free as i64, size: record.len() as i64 };
                free += record.len() as u64;

                if n % 5000 == 0 {
                    debug!(written = n, "writing postings");
                }
            }
            w.flush()?;
        }
        {
            let mut w = BufWriter::new(staged.create(self.paths.dictionary())?);
            for slot in &slots {
                slot.encode(&mut w)?;
            }
            w.flush()?;
        }

        persist::stage_doc_info(&mut staged, &self.paths, &self.docs)?;
        let meta = MetaFile {
            num_docs: self.docs.len() as u32,
            num_terms: num_terms as u64,
            table_size,
            kgram_k: self.config.kgram_k,
            tokenizer: self.config.tokenizer.clone(),
            created_at: persist::now_rfc3339(),
            version: FORMAT_VERSION,
        };
        persist::stage_meta(&mut staged, &self.paths, &meta)?;
        side_files(&mut staged)?;
        staged.commit()?;

        // the old handles still point at the replaced files
        *self.data.get_mut() = open_rw(&self.paths.data())?;
        *self.dictionary.get_mut() = open_rw(&self.paths.dictionary())?;
        self.dictionary_len = table_size * SLOT_WIDTH;
        self.data_len = free;
        self.cache.clear();

        info!(terms = num_terms, collisions, data_bytes = free, "index written");
        Ok(WriteSummary { terms: num_terms, collisions, data_bytes: free })
    }

    // ------------------------------------------------------------------
    // Lookup

    fn read_slot(&self, slot_no: u64) -> Result<Slot> {
        let mut buf = [0u8; SLOT_WIDTH as usize];
        {
            let mut f = self.dictionary.lock();
            f.seek(SeekFrom::Start(slot_no * SLOT_WIDTH))?;
            f.read_exact(&mut buf)?;
        }
        Ok(Slot::decode(&buf)?)
    }

    fn read_record(&self, slot_no: u64, slot: Slot) -> Result<String> {
        let (ptr, size) = (slot.ptr as u64, slot.size as u64);
        if ptr.checked_add(size).map_or(true, |end| end > self.data_len) {
            return Err(IndexError::corrupt(format!(
                "slot {slot_no} points past the end of the data file ({ptr}+{size} > {})",
                self.data_len
            )));
        }
        let mut buf = vec![0u8; size as usize];
        {
            let mut f = self.data.lock();
            f.seek(SeekFrom::Start(ptr))?;
            f.read_exact(&mut buf)?;
        }
        String::from_utf8(buf)
            .map_err(|_| IndexError::corrupt(format!("record at {ptr} is not valid UTF-8")))
    }

    /// Walk the probe sequence for `term`; returns the hit and the record
    /// with its term prefix removed.
    fn find_record(&self, term: &str) -> Result<Option<(SlotHit, String)>> {
        if self.dictionary_len == 0 || !is_storable(term) {
            return Ok(None);
        }
        let table_size = self.config.table_size;
        if self.dictionary_len != table_size * SLOT_WIDTH {
            return Err(IndexError::corrupt(format!(
                "dictionary holds {} bytes, expected {}",
                self.dictionary_len,
                table_size * SLOT_WIDTH
            )));
        }

        let prefix = format!("{term}{SEPARATOR}");
        let home = self.home_slot(term);
        for i in 0..table_size {
            let slot_no = probe_slot(home, i, table_size);
            let slot = self.read_slot(slot_no)?;
            if slot.is_empty() {
                return Ok(None);
            }
            let record = self.read_record(slot_no, slot)?;
            if let Some(rest) = record.strip_prefix(&prefix) {
                let hit = SlotHit { slot: slot_no, probes: i + 1 };
                return Ok(Some((hit, rest.to_string())));
            }
        }
        Ok(None)
    }

    /// Dictionary slot holding `term`, if it is in the index.
    pub fn locate(&self, term: &str) -> Result<Option<SlotHit>> {
        Ok(self.find_record(term)?.map(|(hit, _)| hit))
    }

    /// Postings for `term` read from disk; empty when the term is unknown.
    pub fn get_postings(&self, term: &str) -> Result<PostingsList> {
        match self.find_record(term)? {
            Some((_, rest)) => rest.trim_end_matches('\n').parse(),
            None => Ok(PostingsList::new()),
        }
    }
}

impl Index for HashedIndex {
    fn get_postings(&self, term: &str) -> Result<PostingsList> {
        HashedIndex::get_postings(self, term)
    }

    fn doc_info(&self, doc_id: DocId) -> Option<&DocInfo> {
        self.docs.get(&doc_id)
    }

    fn num_documents(&self) -> usize {
        self.docs.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use tempfile::tempdir;

    fn config(dir: &Path, table_size: u64) -> IndexConfig {
        IndexConfig::new(dir).with_table_size(table_size)
    }

    #[test]
    fn fresh_index_answers_empty() {
        let dir = tempdir().unwrap();
        let idx = HashedIndex::open(config(dir.path(), 101)).unwrap();
        assert!(dir.path().join("dictionary").exists());
        assert!(dir.path().join("data").exists());
        assert!(idx.get_postings("anything").unwrap().is_empty());
        assert_eq!(idx.locate("anything").unwrap(), None);
    }

    #[test]
    fn slot_encoding_is_big_endian() {
        let mut buf = Vec::new();
        Slot { ptr: 1, size: 258 }.encode(&mut buf).unwrap();
        assert_eq!(buf, [0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 1, 2]);
        assert_eq!(Slot::decode(&buf).unwrap(), Slot { ptr: 1, size: 258 });
        assert!(Slot::decode(&[0u8; 16]).unwrap().is_empty());
        assert!(Slot::EMPTY.is_empty());
    }

    #[test]
    fn write_then_lookup() {
        let dir = tempdir().unwrap();
        let mut idx = HashedIndex::create(config(dir.path(), 1009)).unwrap();
        idx.insert("cat", 0, 1);
        idx.insert("cat", 0, 4);
        idx.insert("cat", 2, 0);
        idx.insert("dog", 1, 1);
        idx.add_document(0, "d0.txt", 5);
        idx.add_document(1, "d1.txt", 2);
        idx.add_document(2, "d2.txt", 1);
        let summary = idx.write_index().unwrap();
        assert_eq!(summary.terms, 2);
        assert_eq!(idx.pending_terms(), 0);

        let cat = idx.get_postings("cat").unwrap();
        assert_eq!(cat.to_string(), "2;0:1:4;2:0;");
        assert_eq!(idx.get_postings("dog").unwrap().doc_ids(), vec![1]);
        assert!(idx.get_postings("bird").unwrap().is_empty());

        let data = std::fs::read_to_string(dir.path().join("data")).unwrap();
        assert_eq!(data, "cat;2;0:1:4;2:0;\ndog;1;1:1;\n");
        let dict_len = std::fs::metadata(dir.path().join("dictionary")).unwrap().len();
        assert_eq!(dict_len, 1009 * SLOT_WIDTH);
    }

    #[test]
    fn reopen_reads_from_disk() {
        let dir = tempdir().unwrap();
        {
            let mut idx = HashedIndex::create(config(dir.path(), 211)).unwrap();
            idx.insert("sat", 0, 2);
            idx.insert("sat", 1, 2);
            idx.add_document(0, "a.txt", 3);
            idx.add_document(1, "b.txt", 3);
            idx.write_index().unwrap();
        }
        let idx = HashedIndex::open(config(dir.path(), 211)).unwrap();
        assert_eq!(idx.get_postings("sat").unwrap().doc_ids(), vec![0, 1]);
        assert_eq!(idx.num_documents(), 2);
        assert_eq!(idx.doc_info(1).unwrap().name, "b.txt");
    }

    #[test]
    fn distinct_homes_take_one_probe() {
        let dir = tempdir().unwrap();
        let mut idx = HashedIndex::create(config(dir.path(), 10_007)).unwrap();
        let mut homes = HashSet::new();
        let terms: Vec<String> = (0..50)
            .map(|i| format!("term{i}"))
            .filter(|t| homes.insert(idx.home_slot(t)))
            .collect();
        for (doc, t) in terms.iter().enumerate() {
            idx.insert(t, doc as DocId, 0);
        }
        assert_eq!(idx.write_index().unwrap().collisions, 0);
        for t in &terms {
            let hit = idx.locate(t).unwrap().unwrap();
            assert_eq!(hit.probes, 1);
            assert_eq!(hit.slot, idx.home_slot(t));
        }
    }

    #[test]
    fn colliding_terms_are_probed() {
        let dir = tempdir().unwrap();
        let mut idx = HashedIndex::create(config(dir.path(), 13)).unwrap();
        // 14 candidates in 13 slots: at least two share a home slot
        let mut by_home: HashMap<u64, String> = HashMap::new();
        let (a, b) = (0..14)
            .map(|i| format!("w{i}"))
            .find_map(|t| by_home.insert(idx.home_slot(&t), t.clone()).map(|prev| (prev, t)))
            .unwrap();

        idx.insert(&a, 0, 3);
        idx.insert(&b, 1, 5);
        idx.insert(&b, 1, 6);
        let summary = idx.write_index().unwrap();
        assert_eq!(summary.collisions, 1);

        assert_eq!(idx.get_postings(&a).unwrap().to_string(), "1;0:3;");
        assert_eq!(idx.get_postings(&b).unwrap().to_string(), "1;1:5:6;");
        let probes: Vec<u64> = [&a, &b].iter().map(|t| idx.locate(t).unwrap().unwrap().probes).collect();
        assert!(probes.iter().all(|p| *p <= 13));
        assert!(probes.contains(&2));
    }

    #[test]
    fn full_table_is_reported() {
        let dir = tempdir().unwrap();
        let mut idx = HashedIndex::create(config(dir.path(), 1)).unwrap();
        idx.insert("one", 0, 0);
        idx.insert("two", 0, 1);
        assert!(matches!(idx.write_index(), Err(IndexError::TableFull { table_size: 1 })));
    }

    #[test]
    fn failed_rebuild_keeps_previous_index() {
        let dir = tempdir().unwrap();
        {
            let mut idx = HashedIndex::create(config(dir.path(), 3)).unwrap();
            idx.insert("alpha", 0, 0);
            idx.add_document(0, "a.txt", 1);
            idx.write_index().unwrap();
        }
        let reader = HashedIndex::open(config(dir.path(), 3)).unwrap();

        let mut idx = HashedIndex::create(config(dir.path(), 3)).unwrap();
        for (doc, t) in ["b", "c", "d", "e", "f"].iter().enumerate() {
            idx.insert(t, doc as DocId, 0);
            idx.add_document(doc as DocId, format!("{t}.txt"), 1);
        }
        assert!(matches!(idx.write_index(), Err(IndexError::TableFull { table_size: 3 })));

        assert_eq!(reader.get_postings("alpha").unwrap().doc_ids(), vec![0]);
        let reopened = HashedIndex::open(config(dir.path(), 3)).unwrap();
        assert_eq!(reopened.get_postings("alpha").unwrap().doc_ids(), vec![0]);
        assert_eq!(reopened.doc_info(0).unwrap().name, "a.txt");
        assert_eq!(reopened.num_documents(), 1);
        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn bad_doc_name_leaves_index_untouched() {
        let dir = tempdir().unwrap();
        {
            let mut idx = HashedIndex::create(config(dir.path(), 101)).unwrap();
            idx.insert("alpha", 0, 0);
            idx.add_document(0, "a.txt", 1);
            idx.write_index().unwrap();
        }
        let mut idx = HashedIndex::create(config(dir.path(), 101)).unwrap();
        idx.insert("beta", 0, 0);
        idx.add_document(0, "bad\nname", 1);
        assert!(matches!(idx.write_index(), Err(IndexError::InvalidDocument(_))));

        let reopened = HashedIndex::open(config(dir.path(), 101)).unwrap();
        assert_eq!(reopened.get_postings("alpha").unwrap().doc_ids(), vec![0]);
        assert!(reopened.get_postings("beta").unwrap().is_empty());
    }

    #[test]
    fn rewrite_replaces_contents_for_the_writer() {
        let dir = tempdir().unwrap();
        let mut idx = HashedIndex::create(config(dir.path(), 101)).unwrap();
        idx.insert("alpha", 0, 0);
        idx.write_index().unwrap();
        idx.insert("beta", 0, 3);
        idx.write_index().unwrap();
        assert!(idx.get_postings("alpha").unwrap().is_empty());
        assert_eq!(idx.get_postings("beta").unwrap().to_string(), "1;0:3;");
    }

    #[test]
    fn unstorable_query_terms_are_absent() {
        let dir = tempdir().unwrap();
        let mut idx = HashedIndex::create(config(dir.path(), 1)).unwrap();
        idx.insert("a", 0, 0);
        idx.write_index().unwrap();
        // with one slot every term shares a home with "a"
        for term in ["a;1", "a;", "", "a\nb"] {
            assert!(idx.get_postings(term).unwrap().is_empty(), "{term:?}");
            assert_eq!(idx.locate(term).unwrap(), None);
        }
        assert_eq!(idx.get_postings("a").unwrap().doc_ids(), vec![0]);
    }

    #[test]
    fn unencodable_term_rejected() {
        let dir = tempdir().unwrap();
        let mut idx = HashedIndex::create(config(dir.path(), 101)).unwrap();
        idx.insert("semi;colon", 0, 0);
        assert!(matches!(idx.write_index(), Err(IndexError::InvalidTerm(_))));
    }

    #[test]
    fn table_size_mismatch_on_open() {
        let dir = tempdir().unwrap();
        {
            let mut idx = HashedIndex::create(config(dir.path(), 101)).unwrap();
            idx.insert("x", 0, 0);
            idx.write_index().unwrap();
        }
        assert!(matches!(
            HashedIndex::open(config(dir.path(), 103)),
            Err(IndexError::InvalidConfig(_))
        ));
    }

    #[test]
    fn truncated_data_is_corrupt() {
        let dir = tempdir().unwrap();
        {
            let mut idx = HashedIndex::create(config(dir.path(), 101)).unwrap();
            idx.insert("cat", 0, 0);
            idx.write_index().unwrap();
        }
        let data = dir.path().join("data");
        let f = OpenOptions::new().write(true).open(&data).unwrap();
        f.set_len(3).unwrap();
        drop(f);

        let idx = HashedIndex::open(config(dir.path(), 101)).unwrap();
        let err = idx.get_postings("cat").unwrap_err();
        assert!(err.is_corruption(), "{err}");
    }

    #[test]
    fn short_dictionary_is_corrupt() {
        let dir = tempdir().unwrap();
        {
            let mut idx = HashedIndex::create(config(dir.path(), 101)).unwrap();
            idx.insert("cat", 0, 0);
            idx.write_index().unwrap();
        }
        let f = OpenOptions::new().write(true).open(dir.path().join("dictionary")).unwrap();
        f.set_len(SLOT_WIDTH * 10).unwrap();
        drop(f);

        let idx = HashedIndex::open(config(dir.path(), 101)).unwrap();
        assert!(idx.get_postings("cat").unwrap_err().is_corruption());
    }

    #[test]
    fn euclidean_lengths_from_cache() {
        let dir = tempdir().unwrap();
        let mut idx = HashedIndex::create(config(dir.path(), 101)).unwrap();
        // doc 0: "a b b", doc 1: "a"
        idx.insert("a", 0, 0);
        idx.insert("a", 1, 0);
        idx.insert("b", 0, 1);
        idx.insert("b", 0, 2);
        idx.add_document(0, "d0", 3);
        idx.add_document(1, "d1", 1);
        idx.compute_euclidean_lengths();
        let expected = 2.0 * 2f64.ln();
        assert!((idx.docs()[&0].euclidean_length - expected).abs() < 1e-12);
        assert_eq!(idx.docs()[&1].euclidean_length, 0.0);
    }
}
