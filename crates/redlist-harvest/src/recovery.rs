//! Finding the identifiers a harvest run never delivered.
//!
//! A species is due for another run when no artifact holds any of its
//! assessments, or when a terminated worker gave up on it partway and left
//! a `{worker}.unresolved` marker.

use std::{
  collections::HashSet,
  path::{Path, PathBuf},
};

use redlist_core::record::{RawAssessment, SpeciesId};

use crate::{
  Error, Result, coordinator::HarvestReport, merge::indexed_paths, worker::WorkerOutcome,
};

const UNRESOLVED: &str = "unresolved";

/// Parse an identifier list: one integer per line, blank lines ignored.
pub fn parse_id_list(text: &str) -> Result<Vec<SpeciesId>> {
  text
    .lines()
    .enumerate()
    .filter(|(_, line)| !line.trim().is_empty())
    .map(|(n, line)| {
      line.parse().map_err(|_| Error::InvalidIdLine {
        line:  n + 1,
        value: line.to_owned(),
      })
    })
    .collect()
}

pub async fn read_id_list(path: &Path) -> Result<Vec<SpeciesId>> {
  let text = tokio::fs::read_to_string(path).await.map_err(Error::io(path))?;
  parse_id_list(&text)
}

pub fn format_id_list(ids: &[SpeciesId]) -> String {
  ids.iter().map(|id| format!("{id}\n")).collect()
}

/// The species ids that occur as a taxon in `records`.
pub fn seen_ids(records: &[RawAssessment]) -> HashSet<SpeciesId> {
  records.iter().map(|r| r.taxon.sis_id).collect()
}

/// The ids of `all` never seen, in their original order, each once.
pub fn missing_ids(all: &[SpeciesId], seen: &HashSet<SpeciesId>) -> Vec<SpeciesId> {
  let mut emitted = HashSet::new();
  all
    .iter()
    .copied()
    .filter(|id| !seen.contains(id) && emitted.insert(*id))
    .collect()
}

/// Ids of `all` a re-harvest must cover: those never seen, and those left
/// `unresolved` by a terminated worker. Original order, each once.
pub fn reharvest_ids(
  all: &[SpeciesId],
  seen: &HashSet<SpeciesId>,
  unresolved: &[SpeciesId],
) -> Vec<SpeciesId> {
  let mut seen = seen.clone();
  for id in unresolved {
    seen.remove(id);
  }
  missing_ids(all, &seen)
}

pub fn unresolved_path(dir: &Path, index: usize) -> PathBuf {
  dir.join(format!("{index}.{UNRESOLVED}"))
}

/// Replace the unresolved markers in `dir` with those of `report`.
pub async fn write_unresolved(dir: &Path, report: &HarvestReport) -> Result<()> {
  for path in indexed_paths(dir, UNRESOLVED).await? {
    tokio::fs::remove_file(&path).await.map_err(Error::io(&path))?;
  }
  for worker in &report.workers {
    if let WorkerOutcome::Terminated { unresolved } = worker.outcome {
      let path = unresolved_path(dir, worker.index);
      tokio::fs::write(&path, format_id_list(&[unresolved]))
        .await
        .map_err(Error::io(&path))?;
    }
  }
  Ok(())
}

/// The species named by every unresolved marker in `dir`.
pub async fn read_unresolved(dir: &Path) -> Result<Vec<SpeciesId>> {
  let mut ids = Vec::new();
  for path in indexed_paths(dir, UNRESOLVED).await? {
    ids.extend(read_id_list(&path).await?);
  }
  Ok(ids)
}
