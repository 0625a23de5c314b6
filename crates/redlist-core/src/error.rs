//! Error types for `redlist-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("species not found: {0:?}")]
  SpeciesNotFound(String),

  #[error("unknown taxonomic rank: {0:?}")]
  UnknownRank(String),

  #[error("unknown grouping: {0:?}")]
  UnknownGrouping(String),

  #[error("invalid {grouping} group key: {key:?}")]
  InvalidGroupKey { grouping: &'static str, key: String },

  #[error("year {year} is after the current year {latest}")]
  YearInFuture { year: i32, latest: i32 },

  #[error("invalid species identifier: {0:?}")]
  InvalidSpeciesId(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
