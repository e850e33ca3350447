mod action;
mod app;
mod app_state;
mod cache;
mod component;
mod components;
mod debounce;
mod fetch;
mod focus;
mod shell;
mod theme;
mod view;
mod widgets;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use reco_proto::api::ApiClient;
use reco_proto::config::Config;
use reco_proto::platform;

#[derive(Parser, Debug)]
#[command(name = "recoterm")]
#[command(about = "Terminal front end for a song recommendation service")]
#[command(version)]
struct Cli {
    /// Base URL of the recommendation service (overrides the config file)
    #[arg(long, env = "RECOTERM_API_URL")]
    api_url: Option<String>,

    /// Config file to use instead of the default location
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let data_dir = platform::data_dir();
    std::fs::create_dir_all(&data_dir)?;
    let log_path = platform::log_path();

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    // RUST_LOG wins; otherwise debug for our code, quiet HTTP internals.
    let log_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "debug,hyper_util=warn,reqwest=warn,hyper=warn".to_string());
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(log_filter.as_str())
        .with_ansi(false)
        .init();

    eprintln!("recoterm log: {}", log_path.display());
    tracing::info!("recoterm starting…");

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => Config::load().unwrap_or_else(|e| {
            tracing::warn!("config unreadable, using defaults: {}", e);
            Config::default()
        }),
    };
    if let Some(url) = cli.api_url {
        config.api.base_url = url;
    }
    tracing::info!(
        "api={} search.debounce_ms={} list.per_page={} cache.max_songs={}",
        config.api.base_url,
        config.search.debounce_ms,
        config.list.per_page,
        config.cache.max_songs
    );

    let client = ApiClient::new(&config.api)?;
    app::App::new(&config, Arc::new(client)).run().await?;

    tracing::info!("recoterm exiting");
    Ok(())
}
