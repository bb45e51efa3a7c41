use anyhow::{Context, Result};
use hashdex_core::hashed::WriteSummary;
use hashdex_core::{DocId, IndexBuilder, IndexConfig};
use walkdir::WalkDir;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct BuildReport {
    pub documents: u32,
    pub skipped: usize,
    pub summary: WriteSummary,
}

/// Files under `input` (or `input` itself), in a stable order so that
/// document ids are reproducible across builds.
fn collect_files(input: &Path, extensions: &[String]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    if input.is_file() {
        files.push(input.to_path_buf());
        return files;
    }
    for entry in WalkDir::new(input).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
        let p = entry.path();
        if !p.is_file() { continue; }
        if !extensions.is_empty() {
            let ext = p.extension().and_then(|s| s.to_str()).unwrap_or("");
            if !extensions.iter().any(|e| e == ext) { continue; }
        }
        files.push(p.to_path_buf());
    }
    files
}

/// Document key: the path relative to the corpus root, with `/` separators.
fn document_name(input: &Path, file: &Path) -> String {
    let rel = file.strip_prefix(input).ok().filter(|r| !r.as_os_str().is_empty());
    let rel = rel.unwrap_or_else(|| Path::new(file.file_name().unwrap_or(file.as_os_str())));
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Index every readable text file under `input` into `config.dir`,
/// tokenized per `config.tokenizer`. The previous index there is replaced
/// only once the new one is completely written.
pub fn build_index(input: &Path, config: IndexConfig, extensions: &[String]) -> Result<BuildReport> {
    let dir = config.dir.clone();
    let mut builder = IndexBuilder::create(config)
        .with_context(|| format!("opening index at {}", dir.display()))?;
    let tokenizer = builder.tokenizer();

    let mut next_doc_id: DocId = 0;
    let mut skipped = 0usize;
    for file in collect_files(input, extensions) {
        let text = match fs::read_to_string(&file) {
            Ok(t) => t,
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                tracing::warn!(file = %file.display(), "skipping non UTF-8 file");
                skipped += 1;
                continue;
            }
            Err(e) => return Err(e).with_context(|| format!("reading {}", file.display())),
        };

        let doc_id = next_doc_id;
        next_doc_id += 1;
        if doc_id % 1000 == 0 {
            tracing::info!(doc_id, "indexing");
        }

        let tokens = tokenizer.tokenize(&text);
        for (term, pos) in &tokens {
            builder.insert(term, doc_id, *pos);
        }
        builder.add_document(doc_id, document_name(input, &file), tokens.len() as u32);
    }

    tracing::info!(num_docs = next_doc_id, skipped, "ingested documents");
    let summary = builder.finish(false).context("writing index")?;
    tracing::info!(output = %dir.display(), terms = summary.terms, collisions = summary.collisions, "index build complete");
    Ok(BuildReport { documents: next_doc_id, skipped, summary })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hashdex_core::{Engine, NormalizationType, Query, QueryType, RankingType, SearchConfig, TokenizerConfig};
    use tempfile::tempdir;

    #[test]
    fn names_are_relative() {
        let root = Path::new("/corpus");
        assert_eq!(document_name(root, Path::new("/corpus/a/b.txt")), "a/b.txt");
        assert_eq!(document_name(Path::new("/corpus/x.txt"), Path::new("/corpus/x.txt")), "x.txt");
    }

    #[test]
    fn builds_searchable_index() {
        let corpus = tempdir().unwrap();
        fs::create_dir_all(corpus.path().join("sub")).unwrap();
        fs::write(corpus.path().join("a.txt"), "The cat sat").unwrap();
        fs::write(corpus.path().join("sub/b.txt"), "the dog sat").unwrap();
        fs::write(corpus.path().join("c.bin"), [0xffu8, 0xfe, 0x00]).unwrap();
        let out = tempdir().unwrap();

        let config = IndexConfig::new(out.path()).with_table_size(1009);
        let report = build_index(corpus.path(), config.clone(), &[]).unwrap();
        assert_eq!(report.documents, 2);
        assert_eq!(report.skipped, 1);

        let engine = Engine::open(config, SearchConfig::default()).unwrap();
        assert_eq!(engine.doc_info(0).unwrap().name, "a.txt");
        assert_eq!(engine.doc_info(1).unwrap().name, "sub/b.txt");
        let hits = engine
            .search(&Query::parse("cat sat"), QueryType::Phrase, RankingType::TfIdf, NormalizationType::DocumentLength)
            .unwrap()
            .unwrap();
        assert_eq!(hits.doc_ids(), vec![0]);
    }

    #[test]
    fn stemmed_build_is_searchable_by_surface_form() {
        let corpus = tempdir().unwrap();
        fs::write(corpus.path().join("a.txt"), "dogs running fast").unwrap();
        let out = tempdir().unwrap();
        let stemmed = TokenizerConfig { stem: true, remove_stopwords: false };
        let config = IndexConfig::new(out.path()).with_table_size(101).with_tokenizer(stemmed.clone());
        build_index(corpus.path(), config, &[]).unwrap();

        let engine = Engine::open(IndexConfig::new(out.path()).with_table_size(101), SearchConfig::default()).unwrap();
        assert_eq!(engine.tokenizer_config(), &stemmed);
        let hits = engine
            .search(&Query::parse("running"), QueryType::Intersection, RankingType::TfIdf, NormalizationType::DocumentLength)
            .unwrap()
            .unwrap();
        assert_eq!(hits.doc_ids(), vec![0]);
    }

    #[test]
    fn extension_filter() {
        let corpus = tempdir().unwrap();
        fs::write(corpus.path().join("a.txt"), "kept").unwrap();
        fs::write(corpus.path().join("b.md"), "dropped").unwrap();
        let out = tempdir().unwrap();
        let config = IndexConfig::new(out.path()).with_table_size(101);
        let report = build_index(corpus.path(), config, &["txt".to_string()]).unwrap();
        assert_eq!(report.documents, 1);
    }
}
