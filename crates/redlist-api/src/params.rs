//! Query-string parameters shared by the chart and dropdown endpoints.
//!
//! Multi-valued parameters (`countries`, `years`, `keys`) are accepted as
//! comma-separated strings.

use redlist_core::{filter::TaxonomySelection, snapshot::UsageQuery};
use serde::Deserialize;

use crate::error::ApiError;

#[derive(Debug, Deserialize, Default)]
pub struct SelectionParams {
  pub kingdom:   Option<String>,
  pub phylum:    Option<String>,
  pub class:     Option<String>,
  pub order:     Option<String>,
  pub family:    Option<String>,
  pub species:   Option<String>,
  /// Comma-separated country names.
  pub countries: Option<String>,
  /// Comma-separated publication years.
  pub years:     Option<String>,
}

/// Split a comma-separated list, dropping empty items.
pub fn split_list(raw: Option<&str>) -> Vec<&str> {
  raw
    .map(|s| s.split(',').map(str::trim).filter(|t| !t.is_empty()).collect())
    .unwrap_or_default()
}

impl SelectionParams {
  pub fn taxonomy(&self) -> TaxonomySelection {
    TaxonomySelection {
      kingdom: self.kingdom.clone(),
      phylum:  self.phylum.clone(),
      class:   self.class.clone(),
      order:   self.order.clone(),
      family:  self.family.clone(),
      species: self.species.clone(),
    }
  }

  pub fn countries(&self) -> Vec<String> {
    split_list(self.countries.as_deref())
      .into_iter()
      .map(str::to_owned)
      .collect()
  }

  pub fn years(&self) -> Result<Vec<i32>, ApiError> {
    split_list(self.years.as_deref())
      .into_iter()
      .map(|y| {
        y.parse()
          .map_err(|_| ApiError::BadRequest(format!("invalid year: {y:?}")))
      })
      .collect()
  }

  pub fn query(&self) -> Result<UsageQuery, ApiError> {
    Ok(UsageQuery {
      taxonomy:  self.taxonomy(),
      countries: self.countries(),
      years:     self.years()?,
    })
  }
}
