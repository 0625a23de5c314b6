//! Per-worker output artifacts.

use std::{
  future::Future,
  path::{Path, PathBuf},
};

use redlist_core::record::RawAssessment;
use tokio::{fs::OpenOptions, io::AsyncWriteExt};
use tracing::debug;

use crate::{Error, Result};

/// Where a worker flushes its buffered records. Each worker owns its sink
/// exclusively, so no two workers ever write to the same destination.
pub trait RecordSink: Send {
  fn write(
    &mut self,
    records: Vec<RawAssessment>,
  ) -> impl Future<Output = Result<()>> + Send + '_;
}

/// Appends one JSON object per line to a file.
#[derive(Debug, Clone)]
pub struct NdjsonSink {
  path: PathBuf,
}

impl NdjsonSink {
  pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into() } }

  /// The artifact of worker `index` under `dir`.
  pub fn for_worker(dir: &Path, index: usize) -> Self {
    Self::new(dir.join(format!("{index}.json")))
  }

  pub fn path(&self) -> &Path { &self.path }
}

impl RecordSink for NdjsonSink {
  async fn write(&mut self, records: Vec<RawAssessment>) -> Result<()> {
    if records.is_empty() {
      return Ok(());
    }

    let mut buf = Vec::new();
    for record in &records {
      serde_json::to_writer(&mut buf, record)?;
      buf.push(b'\n');
    }

    let mut file = OpenOptions::new()
      .create(true)
      .append(true)
      .open(&self.path)
      .await
      .map_err(Error::io(&self.path))?;
    file.write_all(&buf).await.map_err(Error::io(&self.path))?;
    file.flush().await.map_err(Error::io(&self.path))?;

    debug!(path = %self.path.display(), count = records.len(), "flushed records");
    Ok(())
  }
}
