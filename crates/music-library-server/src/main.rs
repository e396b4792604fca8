mod api;
mod catalog;
mod config;
mod library;
mod models;
mod openapi;
mod probe;
mod scanner;
mod startup;
mod state;
mod status;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "music-library-server")]
struct Args {
    /// HTTP bind address, e.g. 0.0.0.0:3001
    #[arg(long)]
    bind: Option<std::net::SocketAddr>,

    /// Optional server config file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// SQLite catalog database path override
    #[arg(long)]
    database: Option<PathBuf>,
}

#[actix_web::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,actix_web=info")),
        )
        .init();

    startup::run(args).await
}
