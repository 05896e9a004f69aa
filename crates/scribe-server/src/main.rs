//! scribe-server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) plus `SCRIBE_*`
//! environment overrides, opens the SQLite store, ensures the bootstrap admin
//! exists, and serves the JSON API over HTTP until Ctrl-C.

mod config;

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use axum::http::HeaderValue;
use clap::Parser;
use scribe_api::{AppState, TokenService, credentials};
use scribe_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tower_http::{
  cors::{Any, CorsLayer},
  trace::TraceLayer,
};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::config::{ServerConfig, expand_tilde};

#[derive(Parser)]
#[command(author, version, about = "Scribe blog API server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let server_cfg = ServerConfig::load(&cli.config)
    .with_context(|| format!("failed to load configuration from {:?}", cli.config))?;

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  credentials::bootstrap_admin(&store, &server_cfg.admin_email, &server_cfg.admin_password)
    .await
    .context("failed to bootstrap admin account")?;

  let state = AppState {
    store:  Arc::new(store),
    tokens: Arc::new(TokenService::new(server_cfg.jwt_secret.as_bytes())),
    author: Arc::from(server_cfg.author.as_str()),
  };

  let app = scribe_api::router(state)
    .layer(cors_layer(&server_cfg))
    .layer(TraceLayer::new_for_http());

  let address = server_cfg.address();
  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  tracing::info!("server stopped");
  Ok(())
}

fn cors_layer(cfg: &ServerConfig) -> CorsLayer {
  let layer = match cfg.allowed_origins() {
    None => CorsLayer::new().allow_origin(Any),
    Some(origins) => {
      let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse() {
          Ok(value) => Some(value),
          Err(_) => {
            tracing::warn!(origin = %o, "ignoring unparseable CORS origin");
            None
          }
        })
        .collect();
      CorsLayer::new().allow_origin(origins)
    }
  };
  layer.allow_methods(Any).allow_headers(Any)
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(error = %e, "failed to listen for shutdown signal");
    std::future::pending::<()>().await;
  }
  tracing::info!("shutdown signal received");
}
