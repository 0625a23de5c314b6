//! Reading per-worker artifacts back into one record list.

use std::{collections::HashSet, path::{Path, PathBuf}};

use redlist_core::record::RawAssessment;
use tracing::{info, warn};

use crate::{Error, Result};

/// The `{index}.json` artifacts in `dir`, ordered by worker index.
pub async fn artifact_paths(dir: &Path) -> Result<Vec<PathBuf>> {
  indexed_paths(dir, "json").await
}

/// Files in `dir` named `{index}.{extension}`, ordered by index.
pub(crate) async fn indexed_paths(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
  let mut entries = tokio::fs::read_dir(dir).await.map_err(Error::io(dir))?;
  let mut found: Vec<(usize, PathBuf)> = Vec::new();

  while let Some(entry) = entries.next_entry().await.map_err(Error::io(dir))? {
    let path = entry.path();
    if path.extension().and_then(|e| e.to_str()) != Some(extension) {
      continue;
    }
    if let Some(index) = path
      .file_stem()
      .and_then(|s| s.to_str())
      .and_then(|s| s.parse().ok())
    {
      found.push((index, path));
    }
  }

  found.sort_by_key(|(index, _)| *index);
  Ok(found.into_iter().map(|(_, path)| path).collect())
}

/// Read every artifact in `dir`. Identical lines, such as the same
/// assessment fetched by two runs, are kept once. Lines that do not parse,
/// such as a write cut short, are skipped with a warning.
pub async fn read_artifacts(dir: &Path) -> Result<Vec<RawAssessment>> {
  let mut seen = HashSet::new();
  let mut records = Vec::new();
  let mut duplicates = 0usize;

  for path in artifact_paths(dir).await? {
    let text = tokio::fs::read_to_string(&path)
      .await
      .map_err(Error::io(&path))?;

    for (n, line) in text.lines().enumerate() {
      let line = line.trim();
      if line.is_empty() {
        continue;
      }
      if !seen.insert(line.to_owned()) {
        duplicates += 1;
        continue;
      }
      match serde_json::from_str(line) {
        Ok(record) => records.push(record),
        Err(e) => {
          warn!(path = %path.display(), line = n + 1, error = %e, "skipping unreadable line");
        }
      }
    }
  }

  info!(dir = %dir.display(), records = records.len(), duplicates, "artifacts merged");
  Ok(records)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::normalize::{fixtures, normalize};

  fn line(id: u64, year: i32) -> String {
    let raw = normalize(&fixtures::assessment(id, "Some species", year, "VU")).unwrap();
    serde_json::to_string(&raw).unwrap()
  }

  #[tokio::test]
  async fn reads_in_worker_order_and_dedupes() {
    let dir = tempfile::tempdir().unwrap();
    let write = |name: &str, body: String| std::fs::write(dir.path().join(name), body).unwrap();

    write("10.json", format!("{}\n", line(3, 2003)));
    write("2.json", format!("{}\n\n{}\n", line(2, 2002), line(1, 2001)));
    write("0.json", format!("{}\n{}\n", line(1, 2001), line(1, 2001)));
    write("notes.json", "ignored".into());
    write("1.txt", "ignored".into());

    let paths = artifact_paths(dir.path()).await.unwrap();
    let names: Vec<_> = paths
      .iter()
      .map(|p| p.file_name().unwrap().to_str().unwrap().to_owned())
      .collect();
    assert_eq!(names, ["0.json", "2.json", "10.json"]);

    let records = read_artifacts(dir.path()).await.unwrap();
    let years: Vec<_> = records.iter().map(|r| r.year_published).collect();
    assert_eq!(years, [Some(2001), Some(2002), Some(2003)]);
  }

  #[tokio::test]
  async fn truncated_lines_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let good = line(5, 2010);
    let cut = &good[..good.len() / 2];
    std::fs::write(dir.path().join("0.json"), format!("{good}\n{cut}")).unwrap();

    let records = read_artifacts(dir.path()).await.unwrap();
    assert_eq!(records.len(), 1);
  }
}
