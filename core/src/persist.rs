use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, create_dir_all, File};
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use crate::config::TokenizerConfig;
use crate::error::{IndexError, Result};
use crate::index::{DocId, DocInfo};
use crate::kgram::KGramIndex;

/// Bumped whenever the on-disk layout changes.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_docs: u32,
    pub num_terms: u64,
    pub table_size: u64,
    pub kgram_k: usize,
    /// How documents were tokenized, so queries can be analyzed the same way.
    #[serde(default)]
    pub tokenizer: TokenizerConfig,
    pub created_at: String,
    pub version: u32,
}

pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    pub fn dictionary(&self) -> PathBuf { self.root.join("dictionary") }
    pub fn data(&self) -> PathBuf { self.root.join("data") }
    pub fn doc_info(&self) -> PathBuf { self.root.join("docInfo") }
    pub fn meta(&self) -> PathBuf { self.root.join("meta.json") }
    pub fn kgrams(&self) -> PathBuf { self.root.join("kgram.bin") }
}

/// New versions of index files, written next to their final names and
/// renamed into place by `commit`. Files never committed are removed on drop,
/// so a failed build leaves the previous index untouched.
#[derive(Default)]
pub struct Staged {
    files: Vec<(PathBuf, PathBuf)>,
}

impl Staged {
    pub fn new() -> Self { Self::default() }

    /// Create the staging file that will replace `target`.
    pub fn create(&mut self, target: PathBuf) -> Result<File> {
        if let Some(dir) = target.parent() {
            create_dir_all(dir)?;
        }
        let mut tmp = target.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        let f = File::create(&tmp)?;
        self.files.push((tmp, target));
        Ok(f)
    }

    /// Flush every staged file to disk, then rename each over its target.
    /// Readers holding the old files open keep seeing the old contents.
    pub fn commit(mut self) -> Result<()> {
        for (tmp, _) in &self.files {
            File::open(tmp)?.sync_all()?;
        }
        for (tmp, target) in std::mem::take(&mut self.files) {
            fs::rename(&tmp, &target)?;
        }
        Ok(())
    }
}

impl Drop for Staged {
    fn drop(&mut self) {
        for (tmp, _) in &self.files {
            let _ = fs::remove_file(tmp);
        }
    }
}

/// Open a file for reading, mapping "not there yet" to `None`.
fn open_existing(path: &Path) -> Result<Option<File>> {
    match File::open(path) {
        Ok(f) => Ok(Some(f)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Names that would break the line format are rejected before anything is
/// written.
pub fn check_doc_names(docs: &BTreeMap<DocId, DocInfo>) -> Result<()> {
    match docs.values().find(|info| info.name.contains(['\n', '\r'])) {
        Some(info) => Err(IndexError::InvalidDocument(info.name.clone())),
        None => Ok(()),
    }
}

/// Write one `id;name;tokenCount;euclideanLength` line per document.
pub fn stage_doc_info(staged: &mut Staged, paths: &IndexPaths, docs: &BTreeMap<DocId, DocInfo>) -> Result<()> {
    check_doc_names(docs)?;
    let mut w = BufWriter::new(staged.create(paths.doc_info())?);
    for (doc_id, info) in docs {
        writeln!(w, "{};{};{};{}", doc_id, info.name, info.token_count, info.euclidean_length)?;
    }
    w.flush()?;
    Ok(())
}

fn parse_doc_info_line(line: &str) -> Result<(DocId, DocInfo)> {
    let bad = || IndexError::corrupt(format!("bad docInfo line {line:?}"));
    // the name may contain ';', so split the id from the left and the numbers from the right
    let (id, rest) = line.split_once(';').ok_or_else(bad)?;
    let mut tail = rest.rsplitn(3, ';');
    let euclidean_length = tail.next().ok_or_else(bad)?;
    let token_count = tail.next().ok_or_else(bad)?;
    let name = tail.next().ok_or_else(bad)?;

    let doc_id: DocId = id.parse().map_err(|_| bad())?;
    let info = DocInfo {
        name: name.to_string(),
        token_count: token_count.parse().map_err(|_| bad())?,
        euclidean_length: euclidean_length.parse().map_err(|_| bad())?,
    };
    Ok((doc_id, info))
}

/// Read the doc-info file; an index that was never built has no documents.
pub fn load_doc_info(paths: &IndexPaths) -> Result<BTreeMap<DocId, DocInfo>> {
    let mut docs = BTreeMap::new();
    let Some(f) = open_existing(&paths.doc_info())? else {
        return Ok(docs);
    };
    for line in BufReader::new(f).lines() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        let (doc_id, info) = parse_doc_info_line(&line)?;
        docs.insert(doc_id, info);
    }
    Ok(docs)
}

pub fn stage_meta(staged: &mut Staged, paths: &IndexPaths, meta: &MetaFile) -> Result<()> {
    let mut f = staged.create(paths.meta())?;
    let json = serde_json::to_string_pretty(meta)?;
    f.write_all(json.as_bytes())?;
    Ok(())
}

pub fn load_meta(paths: &IndexPaths) -> Result<Option<MetaFile>> {
    let Some(mut f) = open_existing(&paths.meta())? else {
        return Ok(None);
    };
    let mut buf = String::new();
    f.read_to_string(&mut buf)?;
    let meta: MetaFile = serde_json::from_str(&buf)?;
    Ok(Some(meta))
}

pub fn stage_kgram_index(staged: &mut Staged, paths: &IndexPaths, kgrams: &KGramIndex) -> Result<()> {
    let bytes = bincode::serialize(kgrams)?;
    staged.create(paths.kgrams())?.write_all(&bytes)?;
    Ok(())
}

pub fn load_kgram_index(paths: &IndexPaths) -> Result<Option<KGramIndex>> {
    let Some(mut f) = open_existing(&paths.kgrams())? else {
        return Ok(None);
    };
    let mut buf = Vec::new();
    f.read_to_end(&mut buf)?;
    let kgrams = bincode::deserialize(&buf)?;
    Ok(Some(kgrams))
}

pub fn now_rfc3339() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_default()
}
