//! One harvest worker: a sequential walk over a slice of species ids.
//!
//! For each species the worker fetches the taxon, then each of its
//! assessments in turn, normalizing and buffering every assessment it
//! resolves. The progress counter advances once per taxon resolved or
//! confirmed absent and once per assessment handled.
//!
//! A transient failure starts the cooldown protocol: flush the buffer, sleep,
//! probe the canary taxon. A healthy canary retries the same request; a
//! failing one (or too many retries of one request) ends the worker early.

use redlist_core::record::{RawAssessment, SpeciesId};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::{
  Result,
  config::RetryPolicy,
  fetch::{FetchOutcome, RedListApi},
  normalize::{assessment_ids, normalize},
  sink::RecordSink,
};

/// The identity and output of one worker.
#[derive(Debug)]
pub struct WorkerContext<S> {
  pub index: usize,
  pub sink:  S,
}

/// How a worker stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WorkerOutcome {
  /// Every id of the slice was resolved.
  Completed,
  /// The remote kept failing. `unresolved` is the species in progress; it and
  /// everything after it in the slice must be harvested again.
  Terminated { unresolved: SpeciesId },
}

/// The final state of one worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkerReport {
  pub index:    usize,
  /// The progress counter at exit.
  pub progress: u64,
  /// Records flushed to the sink.
  pub written:  usize,
  pub outcome:  WorkerOutcome,
}

enum Target {
  Taxon(SpeciesId),
  Assessment(u64),
}

/// A request resolved through the cooldown protocol.
enum Resolved {
  Found(Value),
  Absent,
  GaveUp,
}

async fn fetch<A: RedListApi>(api: &A, target: &Target) -> FetchOutcome {
  match target {
    Target::Taxon(id) => api.taxon(*id).await,
    Target::Assessment(id) => api.assessment(*id).await,
  }
}

struct Worker<'a, A, S> {
  api:      &'a A,
  policy:   RetryPolicy,
  ctx:      WorkerContext<S>,
  buffer:   Vec<RawAssessment>,
  progress: u64,
  written:  usize,
}

impl<A: RedListApi, S: RecordSink> Worker<'_, A, S> {
  async fn flush(&mut self) -> Result<()> {
    let records = std::mem::take(&mut self.buffer);
    let count = records.len();
    self.ctx.sink.write(records).await?;
    self.written += count;
    Ok(())
  }

  /// Checkpoint, wait out the cooldown, and report whether the canary
  /// answers.
  async fn cooldown(&mut self) -> Result<bool> {
    self.flush().await?;
    warn!(
      worker = self.ctx.index,
      secs = self.policy.cooldown.as_secs(),
      "cooling down"
    );
    tokio::time::sleep(self.policy.cooldown).await;

    let canary = self.api.taxon(self.policy.canary).await;
    debug!(worker = self.ctx.index, healthy = canary.is_found(), "canary probed");
    Ok(canary.is_found())
  }

  async fn resolve(&mut self, target: Target) -> Result<Resolved> {
    let mut retries = 0;
    loop {
      match fetch(self.api, &target).await {
        FetchOutcome::Found(body) => return Ok(Resolved::Found(body)),
        FetchOutcome::NotFound => return Ok(Resolved::Absent),
        FetchOutcome::Malformed(reason) => {
          warn!(worker = self.ctx.index, %reason, "malformed response");
          return Ok(Resolved::Absent);
        }
        FetchOutcome::RateLimited { status } => {
          warn!(worker = self.ctx.index, status, "suspected rate limit");
        }
        FetchOutcome::Failed(reason) => {
          warn!(worker = self.ctx.index, %reason, "request failed");
        }
      }

      if !self.cooldown().await? {
        warn!(worker = self.ctx.index, "canary still failing");
        return Ok(Resolved::GaveUp);
      }
      if retries >= self.policy.max_retries {
        warn!(worker = self.ctx.index, retries, "retries exhausted");
        return Ok(Resolved::GaveUp);
      }
      retries += 1;
    }
  }

  /// Harvest one species. Returns `false` when the worker must stop.
  async fn species(&mut self, id: SpeciesId) -> Result<bool> {
    let entity = match self.resolve(Target::Taxon(id)).await? {
      Resolved::Found(body) => body,
      Resolved::Absent => {
        debug!(worker = self.ctx.index, %id, "taxon absent");
        self.progress += 1;
        return Ok(true);
      }
      Resolved::GaveUp => return Ok(false),
    };

    let assessments = match assessment_ids(&entity) {
      Ok(ids) => ids,
      Err(e) => {
        warn!(worker = self.ctx.index, %id, error = %e, "malformed taxon payload");
        self.progress += 1;
        return Ok(true);
      }
    };
    self.progress += 1;

    for assessment in assessments {
      match self.resolve(Target::Assessment(assessment)).await? {
        Resolved::Found(body) => match normalize(&body) {
          Ok(record) => self.buffer.push(record),
          Err(e) => {
            warn!(worker = self.ctx.index, assessment, error = %e, "malformed assessment");
          }
        },
        Resolved::Absent => {
          debug!(worker = self.ctx.index, assessment, "assessment absent");
        }
        Resolved::GaveUp => return Ok(false),
      }
      self.progress += 1;
    }

    Ok(true)
  }
}

/// Run one worker over `ids` to completion or early termination. The buffer
/// is flushed once more on exit either way.
pub async fn run_worker<A, S>(
  api: &A,
  policy: RetryPolicy,
  ctx: WorkerContext<S>,
  ids: &[SpeciesId],
) -> Result<WorkerReport>
where
  A: RedListApi,
  S: RecordSink,
{
  info!(worker = ctx.index, ids = ids.len(), "worker started");
  let mut worker = Worker {
    api,
    policy,
    ctx,
    buffer: Vec::new(),
    progress: 0,
    written: 0,
  };

  let mut outcome = WorkerOutcome::Completed;
  for id in ids {
    if !worker.species(*id).await? {
      outcome = WorkerOutcome::Terminated { unresolved: *id };
      break;
    }
  }
  worker.flush().await?;

  info!(
    worker = worker.ctx.index,
    progress = worker.progress,
    written = worker.written,
    ?outcome,
    "worker finished"
  );
  Ok(WorkerReport {
    index: worker.ctx.index,
    progress: worker.progress,
    written: worker.written,
    outcome,
  })
}
