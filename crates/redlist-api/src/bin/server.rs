//! Dashboard API server binary.
//!
//! Reads `server.toml` (or the path given with `--config`) and `REDLIST_*`
//! environment variables, loads the snapshot from the SQLite store once and
//! serves it as JSON over HTTP.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;
use redlist_api::ServerConfig;
use redlist_core::store::SnapshotStore;
use redlist_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Red List usage dashboard API")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "server.toml")]
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

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("REDLIST"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let store_path = expand_tilde(&server_cfg.store_path);

  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;
  let snapshot = store
    .load()
    .await
    .with_context(|| format!("failed to load snapshot from {store_path:?}"))?;

  if snapshot.records().is_empty() {
    tracing::warn!(path = ?store_path, "store is empty; run `redlist build` first");
  } else {
    tracing::info!(
      records = snapshot.records().len(),
      countries = snapshot.countries().len(),
      "snapshot loaded"
    );
  }

  let app = redlist_api::api_router(Arc::new(snapshot)).layer(TraceLayer::new_for_http());
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
