use anyhow::Result;
use clap::{Parser, Subcommand};
use hashdex_core::{IndexConfig, TokenizerConfig};
use tracing_subscriber::{fmt, EnvFilter};

use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build a persistent hashed inverted index from a text corpus", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index from a file or a directory of text files
    Build {
        /// Input path (file or directory)
        #[arg(long)]
        input: PathBuf,
        /// Output index directory
        #[arg(long)]
        output: PathBuf,
        /// JSON file with index settings; flags below override it
        #[arg(long)]
        config: Option<PathBuf>,
        /// Number of slots in the dictionary hash table
        #[arg(long)]
        table_size: Option<u64>,
        /// K-gram width for wildcard queries
        #[arg(long)]
        k: Option<usize>,
        /// Only index files with these extensions (repeatable)
        #[arg(long = "ext")]
        extensions: Vec<String>,
        /// Apply English stemming to terms
        #[arg(long, default_value_t = false)]
        stem: bool,
        /// Drop English stopwords
        #[arg(long, default_value_t = false)]
        stopwords: bool,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { input, output, config, table_size, k, extensions, stem, stopwords } => {
            let mut index_config = match config {
                Some(path) => IndexConfig::from_json_file(path)?,
                None => IndexConfig::default(),
            };
            index_config.dir = output;
            if let Some(size) = table_size {
                index_config = index_config.with_table_size(size);
            }
            if let Some(k) = k {
                index_config = index_config.with_kgram_k(k);
            }
            if stem || stopwords {
                index_config = index_config.with_tokenizer(TokenizerConfig { remove_stopwords: stopwords, stem });
            }
            let report = indexer::build_index(&input, index_config, &extensions)?;
            println!(
                "indexed {} documents ({} skipped), {} terms, {} collisions",
                report.documents, report.skipped, report.summary.terms, report.summary.collisions
            );
            Ok(())
        }
    }
}
