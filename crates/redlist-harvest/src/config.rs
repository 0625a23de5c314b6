//! Harvest settings.

use std::{path::PathBuf, time::Duration};

use redlist_core::record::SpeciesId;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://api.iucnredlist.org/api/v4";

/// Everything a harvest run needs besides the identifier list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarvestConfig {
  pub base_url:      String,
  /// Sent verbatim as the `Authorization` header.
  pub token:         String,
  pub workers:       usize,
  pub cooldown_secs: u64,
  /// A taxon known to exist, probed after each cooldown.
  pub canary_id:     u64,
  /// Retries of one request while the canary keeps succeeding.
  pub max_retries:   u32,
  /// Directory receiving one `{worker}.json` artifact per worker.
  pub output_dir:    PathBuf,
}

impl Default for HarvestConfig {
  fn default() -> Self {
    Self {
      base_url:      DEFAULT_BASE_URL.to_owned(),
      token:         String::new(),
      workers:       16,
      cooldown_secs: 60,
      canary_id:     49830106,
      max_retries:   3,
      output_dir:    PathBuf::from("harvest"),
    }
  }
}

impl HarvestConfig {
  pub fn retry_policy(&self) -> RetryPolicy {
    RetryPolicy {
      cooldown:    Duration::from_secs(self.cooldown_secs),
      canary:      SpeciesId(self.canary_id),
      max_retries: self.max_retries,
    }
  }
}

/// The cooldown/canary parameters each worker runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
  pub cooldown:    Duration,
  pub canary:      SpeciesId,
  pub max_retries: u32,
}

impl Default for RetryPolicy {
  fn default() -> Self { HarvestConfig::default().retry_policy() }
}
