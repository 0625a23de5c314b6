//! Splitting an identifier list across concurrent workers.

use std::{ops::Range, path::Path, sync::Arc};

use redlist_core::record::SpeciesId;
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::{
  Error, Result,
  config::{HarvestConfig, RetryPolicy},
  fetch::RedListApi,
  recovery::write_unresolved,
  sink::{NdjsonSink, RecordSink},
  worker::{WorkerContext, WorkerOutcome, WorkerReport, run_worker},
};

/// Contiguous, near-equal slices: slice `i` spans `i*n/workers` up to
/// `(i+1)*n/workers`.
pub fn slice_bounds(n: usize, workers: usize) -> Vec<Range<usize>> {
  (0..workers)
    .map(|i| i * n / workers..(i + 1) * n / workers)
    .collect()
}

/// The reports of every worker, in worker order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HarvestReport {
  pub workers: Vec<WorkerReport>,
}

impl HarvestReport {
  /// The per-worker progress counters.
  pub fn progress(&self) -> Vec<u64> {
    self.workers.iter().map(|w| w.progress).collect()
  }

  pub fn written(&self) -> usize { self.workers.iter().map(|w| w.written).sum() }

  /// Whether every worker finished its slice.
  pub fn is_complete(&self) -> bool {
    self
      .workers
      .iter()
      .all(|w| w.outcome == WorkerOutcome::Completed)
  }
}

/// Harvest `ids` with `workers` concurrent workers. `sink_for` gives each
/// worker index its own sink.
pub async fn harvest<A, S, F>(
  api: A,
  ids: Vec<SpeciesId>,
  workers: usize,
  policy: RetryPolicy,
  mut sink_for: F,
) -> Result<HarvestReport>
where
  A: RedListApi + 'static,
  S: RecordSink + 'static,
  F: FnMut(usize) -> S,
{
  if workers == 0 {
    return Err(Error::NoWorkers);
  }

  let api = Arc::new(api);
  let ids: Arc<[SpeciesId]> = ids.into();
  info!(ids = ids.len(), workers, "harvest started");

  let handles: Vec<JoinHandle<Result<WorkerReport>>> = slice_bounds(ids.len(), workers)
    .into_iter()
    .enumerate()
    .map(|(index, range)| {
      let api = Arc::clone(&api);
      let ids = Arc::clone(&ids);
      let ctx = WorkerContext { index, sink: sink_for(index) };
      tokio::spawn(async move { run_worker(&*api, policy, ctx, &ids[range]).await })
    })
    .collect();

  let mut reports = Vec::with_capacity(handles.len());
  let mut first_error = None;
  for handle in handles {
    match handle.await {
      Ok(Ok(report)) => reports.push(report),
      Ok(Err(e)) => first_error = first_error.or(Some(e)),
      Err(e) => first_error = first_error.or(Some(Error::Join(e))),
    }
  }
  if let Some(e) = first_error {
    for report in &reports {
      warn!(
        worker = report.index,
        progress = report.progress,
        written = report.written,
        outcome = ?report.outcome,
        "worker finished before harvest failed"
      );
    }
    return Err(Error::Incomplete { reports, source: Box::new(e) });
  }

  let report = HarvestReport { workers: reports };
  info!(
    progress = ?report.progress(),
    written = report.written(),
    complete = report.is_complete(),
    "harvest finished"
  );
  Ok(report)
}

/// [`harvest`] with the settings of `config`, writing `{worker}.json`
/// artifacts into `config.output_dir`. Each terminated worker also leaves a
/// `{worker}.unresolved` marker naming the species it gave up on; markers
/// from earlier runs are replaced.
pub async fn harvest_to_dir<A>(
  api: A,
  ids: Vec<SpeciesId>,
  config: &HarvestConfig,
) -> Result<HarvestReport>
where
  A: RedListApi + 'static,
{
  let dir: &Path = &config.output_dir;
  tokio::fs::create_dir_all(dir).await.map_err(Error::io(dir))?;
  let report = harvest(api, ids, config.workers, config.retry_policy(), |index| {
    NdjsonSink::for_worker(dir, index)
  })
  .await?;
  write_unresolved(dir, &report).await?;
  Ok(report)
}
