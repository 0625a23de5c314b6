//! Optional TOML config file and its merge with command-line flags.
//!
//! Precedence: flags (and their environment variables) over the config file
//! over built-in defaults.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use redlist_harvest::HarvestConfig;
use serde::Deserialize;

/// Shape of the optional TOML config file.
///
/// ```toml
/// store_path = "~/redlist/redlist.db"
///
/// [harvest]
/// token   = "..."
/// workers = 8
/// ```
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct ConfigFile {
  pub harvest:    HarvestConfig,
  pub store_path: Option<PathBuf>,
}

impl ConfigFile {
  pub fn load(path: Option<&Path>) -> Result<Self> {
    let Some(path) = path else {
      return Ok(Self::default());
    };
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")
  }

  /// The store path, falling back to `redlist.db` in the working directory.
  pub fn store_path(&self, flag: Option<PathBuf>) -> PathBuf {
    let path = flag
      .or_else(|| self.store_path.clone())
      .unwrap_or_else(|| PathBuf::from("redlist.db"));
    expand_tilde(&path)
  }

  /// The harvest directory, falling back to `harvest.output_dir`.
  pub fn harvest_dir(&self, flag: Option<PathBuf>) -> PathBuf {
    expand_tilde(&flag.unwrap_or_else(|| self.harvest.output_dir.clone()))
  }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

/// Harvest settings given on the command line.
#[derive(Debug, Default)]
pub struct HarvestOverrides {
  pub base_url: Option<String>,
  pub token:    Option<String>,
  pub workers:  Option<usize>,
  pub out:      Option<PathBuf>,
}

impl HarvestOverrides {
  pub fn apply(self, mut config: HarvestConfig) -> HarvestConfig {
    if let Some(url) = self.base_url.filter(|u| !u.is_empty()) {
      config.base_url = url;
    }
    if let Some(token) = self.token.filter(|t| !t.is_empty()) {
      config.token = token;
    }
    if let Some(workers) = self.workers {
      config.workers = workers;
    }
    if let Some(out) = self.out {
      config.output_dir = out;
    }
    config
  }
}
