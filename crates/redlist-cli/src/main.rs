//! `redlist`: operator surface for the Red List harvest pipeline.
//!
//! # Usage
//!
//! ```text
//! redlist harvest --ids species.txt --workers 16 --out harvest/
//! redlist recover --ids species.txt --harvest-dir harvest/ --output missing.txt
//! redlist harvest --ids missing.txt --out harvest/
//! redlist build --harvest-dir harvest/ --store redlist.db
//! redlist trajectory "Chelonia mydas" --store redlist.db
//! ```

mod config;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use config::{ConfigFile, HarvestOverrides};
use redlist_core::store::SnapshotStore;
use redlist_harvest::{
  HttpApi, WorkerOutcome, harvest_to_dir,
  merge::read_artifacts,
  recovery::{format_id_list, read_id_list, read_unresolved, reharvest_ids, seen_ids},
};
use redlist_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "redlist", about = "Harvest and query IUCN Red List assessments")]
struct Args {
  /// Path to a TOML config file (store_path, [harvest] settings).
  #[arg(short, long, value_name = "FILE", global = true)]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Fetch every species in an identifier list into per-worker artifacts.
  Harvest {
    /// File with one species identifier per line.
    #[arg(long, value_name = "FILE")]
    ids: PathBuf,

    /// Number of concurrent workers.
    #[arg(long)]
    workers: Option<usize>,

    /// Directory receiving the `{worker}.json` artifacts.
    #[arg(long, value_name = "DIR")]
    out: Option<PathBuf>,

    /// API token, sent as the `Authorization` header.
    #[arg(long, env = "REDLIST_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Base URL of the Red List API.
    #[arg(long, env = "REDLIST_API_URL")]
    url: Option<String>,
  },

  /// List the identifiers a harvest directory lacks or only partly covers.
  Recover {
    #[arg(long, value_name = "FILE")]
    ids: PathBuf,

    #[arg(long, value_name = "DIR")]
    harvest_dir: Option<PathBuf>,

    /// Write the list here instead of stdout.
    #[arg(long, value_name = "FILE")]
    output: Option<PathBuf>,
  },

  /// Merge and reconcile the artifacts, replacing the stored snapshot.
  Build {
    #[arg(long, value_name = "DIR")]
    harvest_dir: Option<PathBuf>,

    #[arg(long, value_name = "FILE")]
    store: Option<PathBuf>,
  },

  /// Print the risk trajectory of one species.
  Trajectory {
    /// Scientific name, e.g. "Chelonia mydas".
    name: String,

    #[arg(long, value_name = "FILE")]
    store: Option<PathBuf>,

    /// Last year of the trajectory (default: the current year).
    #[arg(long)]
    through: Option<i32>,
  },
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let args = Args::parse();
  let file_cfg = ConfigFile::load(args.config.as_deref())?;

  match args.command {
    Command::Harvest { ids, workers, out, token, url } => {
      let config = HarvestOverrides { base_url: url, token, workers, out }
        .apply(file_cfg.harvest.clone());
      run_harvest(ids, config).await
    }
    Command::Recover { ids, harvest_dir, output } => {
      run_recover(ids, file_cfg.harvest_dir(harvest_dir), output).await
    }
    Command::Build { harvest_dir, store } => {
      run_build(file_cfg.harvest_dir(harvest_dir), file_cfg.store_path(store)).await
    }
    Command::Trajectory { name, store, through } => {
      run_trajectory(&name, file_cfg.store_path(store), through).await
    }
  }
}

// ─── Subcommands ──────────────────────────────────────────────────────────────

async fn run_harvest(ids: PathBuf, config: redlist_harvest::HarvestConfig) -> Result<()> {
  if config.token.is_empty() {
    bail!("no API token: pass --token, set REDLIST_TOKEN, or add it to the config file");
  }

  let ids = read_id_list(&ids).await?;
  let api = HttpApi::new(&config)?;
  let report = harvest_to_dir(api, ids, &config)
    .await
    .context("harvest failed")?;

  for worker in &report.workers {
    match worker.outcome {
      WorkerOutcome::Completed => println!(
        "worker {:>3}: completed, progress {}, {} records",
        worker.index, worker.progress, worker.written
      ),
      WorkerOutcome::Terminated { unresolved } => println!(
        "worker {:>3}: terminated at {unresolved}, progress {}, {} records",
        worker.index, worker.progress, worker.written
      ),
    }
  }
  println!(
    "{} records in {}",
    report.written(),
    config.output_dir.display()
  );
  if !report.is_complete() {
    println!("harvest incomplete; run `redlist recover` to list what is missing");
  }
  Ok(())
}

async fn run_recover(
  ids: PathBuf,
  harvest_dir: PathBuf,
  output: Option<PathBuf>,
) -> Result<()> {
  let all = read_id_list(&ids).await?;
  let harvested = read_artifacts(&harvest_dir).await?;
  let unresolved = read_unresolved(&harvest_dir).await?;
  let missing = reharvest_ids(&all, &seen_ids(&harvested), &unresolved);
  tracing::info!(
    total = all.len(),
    unresolved = unresolved.len(),
    missing = missing.len(),
    "recovery diff"
  );

  let text = format_id_list(&missing);
  match output {
    Some(path) => tokio::fs::write(&path, text)
      .await
      .with_context(|| format!("writing {}", path.display()))?,
    None => print!("{text}"),
  }
  Ok(())
}

async fn run_build(harvest_dir: PathBuf, store_path: PathBuf) -> Result<()> {
  let raw = read_artifacts(&harvest_dir).await?;
  let harvested = raw.len();
  let records = redlist_core::reconcile::reconcile_records(raw);
  if records.len() < harvested {
    tracing::warn!(
      dropped = harvested - records.len(),
      "assessments without a risk category were left out"
    );
  }

  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;
  let summary = store.replace(records).await.context("failed to write snapshot")?;

  println!(
    "{} records, {} species, {} usage rows, {} country rows -> {}",
    summary.records,
    summary.species,
    summary.usage_rows,
    summary.country_rows,
    store_path.display()
  );
  Ok(())
}

async fn run_trajectory(name: &str, store_path: PathBuf, through: Option<i32>) -> Result<()> {
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;
  let snapshot = store.load().await.context("failed to load snapshot")?;

  let points = snapshot.trajectory(name, through)?;
  if points.is_empty() {
    println!("no dated assessments");
  }
  for point in points {
    println!(
      "{}\t{}\t{}",
      point.year,
      point.category.code(),
      point.category.label()
    );
  }
  Ok(())
}
