use anyhow::Result;
use clap::Parser;
use hashdex_core::{IndexConfig, SearchConfig};
use server::{build_app, AppState};
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// Index directory path
    #[arg(long, default_value = "./index")]
    index: PathBuf,
    /// JSON file with index settings (table size, k-gram width)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Corpus directory, used for snippets and rebuilds
    #[arg(long)]
    corpus: Option<PathBuf>,
    /// File of `key;score` authority scores
    #[arg(long)]
    authority: Option<PathBuf>,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    let mut index_config = match &args.config {
        Some(path) => IndexConfig::from_json_file(path)?,
        None => IndexConfig::default(),
    };
    index_config.dir = args.index.clone();
    if let Some(path) = &args.authority {
        index_config = index_config.with_authority_path(path);
    }
    let state = AppState::open(index_config, SearchConfig::default(), args.corpus.clone())?;
    let app = build_app(state);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
