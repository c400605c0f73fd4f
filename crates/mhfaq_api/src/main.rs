mod handlers;
mod types;

use anyhow::Context;
use clap::Parser;
use handlers::AppState;
use mhfaq_core::{LoaderConfig, ModelLoader, QueryService};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "mhfaq_api", version, about = "Mental health FAQ retrieval API")]
struct Cli {
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Listen port; falls back to the PORT environment variable, then 8000.
    #[arg(long)]
    port: Option<u16>,

    /// FAQ corpus CSV (Questions, Answers, optional category columns).
    #[arg(long, default_value = "processed_faq.csv")]
    corpus: PathBuf,

    /// MiniLM safetensors weights. Without --model-path and
    /// --tokenizer-path the deterministic hash encoder is used.
    #[arg(long)]
    model_path: Option<PathBuf>,

    /// tokenizer.json matching the model.
    #[arg(long)]
    tokenizer_path: Option<PathBuf>,

    /// Build the index before accepting traffic instead of on the
    /// first request.
    #[arg(long)]
    eager_load: bool,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let port = cli
        .port
        .or_else(|| std::env::var("PORT").ok().and_then(|p| p.parse().ok()))
        .unwrap_or(8000);

    let loader = Arc::new(ModelLoader::new(LoaderConfig {
        corpus_path: cli.corpus,
        model_path: cli.model_path,
        tokenizer_path: cli.tokenizer_path,
    }));

    if cli.eager_load {
        let loader = loader.clone();
        tokio::task::spawn_blocking(move || loader.ensure_ready())
            .await?
            .context("eager load failed")?;
    }

    let state = AppState {
        service: Arc::new(QueryService::new(loader.clone())),
        loader,
    };

    let addr: SocketAddr = format!("{}:{port}", cli.host)
        .parse()
        .context("invalid listen address")?;
    info!("Starting Mental Health FAQ API on {addr}");

    axum::Server::bind(&addr)
        .serve(handlers::router(state).into_make_service())
        .await?;

    Ok(())
}
