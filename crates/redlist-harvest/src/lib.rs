//! Harvesting of Red List assessments.
//!
//! Fetches taxa and their assessments from the remote API with a pool of
//! independent workers, normalizes each assessment, and writes one NDJSON
//! artifact per worker. The artifacts are later merged, and diffed against
//! the full identifier list to find what a re-run must fetch.
//!
//! # Quick start
//!
//! ```no_run
//! use redlist_harvest::{HarvestConfig, HttpApi, harvest_to_dir};
//! use redlist_core::record::SpeciesId;
//!
//! # async fn run() -> redlist_harvest::Result<()> {
//! let config = HarvestConfig { token: "secret".into(), ..Default::default() };
//! let api = HttpApi::new(&config)?;
//! let report = harvest_to_dir(api, vec![SpeciesId(22732)], &config).await?;
//! println!("{:?}", report.progress());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod coordinator;
pub mod error;
pub mod fetch;
pub mod merge;
pub mod normalize;
pub mod recovery;
pub mod sink;
pub mod worker;

pub use config::{HarvestConfig, RetryPolicy};
pub use coordinator::{HarvestReport, harvest, harvest_to_dir, slice_bounds};
pub use error::{Error, Result};
pub use fetch::{FetchOutcome, HttpApi, RedListApi};
pub use sink::{NdjsonSink, RecordSink};
pub use worker::{WorkerContext, WorkerOutcome, WorkerReport};

// ─── Shared test helpers ──────────────────────────────────────────────────────

#[cfg(test)]
pub(crate) mod testing {
  use std::{
    collections::{HashMap, HashSet},
    sync::{
      Arc, Mutex,
      atomic::{AtomicUsize, Ordering},
    },
  };

  use redlist_core::record::{RawAssessment, SpeciesId};
  use serde_json::Value;

  use crate::{
    Result,
    fetch::{FetchOutcome, RedListApi},
    normalize::fixtures,
    sink::RecordSink,
  };

  pub(crate) const CANARY: u64 = 999;

  #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
  enum Key {
    Taxon(u64),
    Assessment(u64),
  }

  /// An in-process [`RedListApi`] answering from fixed payloads. Unknown ids
  /// are `404`; scripted failures answer `429` a set number of times.
  pub(crate) struct ScriptedApi {
    payloads:     HashMap<Key, Value>,
    undecodable:  HashSet<Key>,
    failures:     Mutex<HashMap<Key, u32>>,
    canary_up:    bool,
    canary_calls: AtomicUsize,
  }

  impl Default for ScriptedApi {
    fn default() -> Self {
      Self {
        payloads:     HashMap::new(),
        undecodable:  HashSet::new(),
        failures:     Mutex::new(HashMap::new()),
        canary_up:    true,
        canary_calls: AtomicUsize::new(0),
      }
    }
  }

  impl ScriptedApi {
    pub(crate) fn with_species(
      mut self,
      id: u64,
      name: &str,
      assessments: &[(u64, i32)],
    ) -> Self {
      let ids: Vec<u64> = assessments.iter().map(|(a, _)| *a).collect();
      self.payloads.insert(Key::Taxon(id), fixtures::taxon(id, &ids));
      for (assessment, year) in assessments {
        self.payloads.insert(
          Key::Assessment(*assessment),
          fixtures::assessment(id, name, *year, "LC"),
        );
      }
      self
    }

    pub(crate) fn with_raw_assessment(mut self, id: u64, payload: Value) -> Self {
      self.payloads.insert(Key::Assessment(id), payload);
      self
    }

    pub(crate) fn without_assessment(mut self, id: u64) -> Self {
      self.payloads.remove(&Key::Assessment(id));
      self
    }

    /// Answer `200` with a body that is not JSON.
    pub(crate) fn undecodable_assessment(mut self, id: u64) -> Self {
      self.undecodable.insert(Key::Assessment(id));
      self
    }

    pub(crate) fn fail_taxon(self, id: u64, times: u32) -> Self {
      self.fail(Key::Taxon(id), times)
    }

    pub(crate) fn fail_assessment(self, id: u64, times: u32) -> Self {
      self.fail(Key::Assessment(id), times)
    }

    fn fail(self, key: Key, times: u32) -> Self {
      self.failures.lock().unwrap().insert(key, times);
      self
    }

    pub(crate) fn canary_down(mut self) -> Self {
      self.canary_up = false;
      self
    }

    pub(crate) fn canary_calls(&self) -> usize {
      self.canary_calls.load(Ordering::SeqCst)
    }

    fn answer(&self, key: Key) -> FetchOutcome {
      if let Some(left) = self.failures.lock().unwrap().get_mut(&key)
        && *left > 0
      {
        *left -= 1;
        return FetchOutcome::RateLimited { status: 429 };
      }
      if self.undecodable.contains(&key) {
        return FetchOutcome::Malformed("expected value at line 1 column 1".into());
      }
      match self.payloads.get(&key) {
        Some(payload) => FetchOutcome::Found(payload.clone()),
        None => FetchOutcome::NotFound,
      }
    }
  }

  impl RedListApi for ScriptedApi {
    async fn taxon(&self, id: SpeciesId) -> FetchOutcome {
      if id.0 == CANARY {
        self.canary_calls.fetch_add(1, Ordering::SeqCst);
        return if self.canary_up {
          FetchOutcome::Found(fixtures::taxon(CANARY, &[]))
        } else {
          FetchOutcome::RateLimited { status: 429 }
        };
      }
      self.answer(Key::Taxon(id.0))
    }

    async fn assessment(&self, id: u64) -> FetchOutcome {
      self.answer(Key::Assessment(id))
    }
  }

  #[derive(Debug, Default)]
  struct Flushed {
    records: Vec<RawAssessment>,
    flushes: usize,
  }

  /// A [`RecordSink`] that keeps everything in memory. Clones share state.
  #[derive(Debug, Clone, Default)]
  pub(crate) struct MemorySink(Arc<Mutex<Flushed>>);

  impl MemorySink {
    pub(crate) fn records(&self) -> Vec<RawAssessment> {
      self.0.lock().unwrap().records.clone()
    }

    pub(crate) fn flushes(&self) -> usize { self.0.lock().unwrap().flushes }
  }

  impl RecordSink for MemorySink {
    async fn write(&mut self, records: Vec<RawAssessment>) -> Result<()> {
      let mut state = self.0.lock().unwrap();
      state.records.extend(records);
      state.flushes += 1;
      Ok(())
    }
  }
}
