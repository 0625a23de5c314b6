//! The `SnapshotStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `redlist-store-sqlite`).
//! The CLI and the API server depend on this abstraction, not on any concrete
//! backend.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::{
  record::{AssessmentRecord, SpeciesId},
  snapshot::Snapshot,
};

/// Row counts written by [`SnapshotStore::replace`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotSummary {
  pub records:      usize,
  pub species:      usize,
  pub usage_rows:   usize,
  pub country_rows: usize,
}

/// Persistence for the canonical snapshot.
///
/// A snapshot is never edited in place: `replace` swaps the whole of it
/// atomically, and readers load it once.
pub trait SnapshotStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Replace the stored snapshot with `records`, deriving the usage and
  /// country relations from them.
  fn replace(
    &self,
    records: Vec<AssessmentRecord>,
  ) -> impl Future<Output = Result<SnapshotSummary, Self::Error>> + Send + '_;

  /// Load the stored snapshot. An empty store yields an empty snapshot.
  fn load(&self) -> impl Future<Output = Result<Snapshot, Self::Error>> + Send + '_;

  /// Distinct species ids in the stored snapshot, ascending.
  fn species_ids(
    &self,
  ) -> impl Future<Output = Result<Vec<SpeciesId>, Self::Error>> + Send + '_;
}
