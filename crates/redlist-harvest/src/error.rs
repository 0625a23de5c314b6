//! Error types for the harvester.

use std::path::PathBuf;

use thiserror::Error;

use crate::worker::WorkerReport;

#[derive(Debug, Error)]
pub enum Error {
  #[error("I/O error on {path}: {source}")]
  Io {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("JSON error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("HTTP client error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("line {line}: not a species identifier: {value:?}")]
  InvalidIdLine { line: usize, value: String },

  #[error("worker count must be at least 1")]
  NoWorkers,

  #[error("worker task failed: {0}")]
  Join(#[from] tokio::task::JoinError),

  /// A worker failed; `reports` holds the workers that did finish.
  #[error("harvest failed ({} worker reports kept): {source}", reports.len())]
  Incomplete {
    reports: Vec<WorkerReport>,
    #[source]
    source:  Box<Error>,
  },
}

impl Error {
  pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
    let path = path.into();
    move |source| Self::Io { path, source }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
