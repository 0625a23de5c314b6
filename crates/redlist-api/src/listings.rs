//! Handlers feeding the dashboard's dropdowns.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
};
use redlist_core::{
  Snapshot,
  category::{RiskCategory, UsageTag},
  filter::Rank,
};
use serde::Serialize;

use crate::{error::ApiError, params::SelectionParams};

/// `GET /taxonomy/{rank}[?kingdom=...][&phylum=...]...`
///
/// Options for `rank` given the higher ranks already selected; empty while
/// the parent rank is unset.
pub async fn taxonomy(
  State(snapshot): State<Arc<Snapshot>>,
  Path(rank): Path<String>,
  Query(params): Query<SelectionParams>,
) -> Result<Json<Vec<String>>, ApiError> {
  let rank: Rank = rank.parse()?;
  Ok(Json(snapshot.taxonomy_options(rank, &params.taxonomy())))
}

/// `GET /countries`
pub async fn countries(State(snapshot): State<Arc<Snapshot>>) -> Json<Vec<String>> {
  Json(snapshot.countries().to_vec())
}

/// `GET /years[?kingdom=...][&countries=a,b]`
pub async fn years(
  State(snapshot): State<Arc<Snapshot>>,
  Query(params): Query<SelectionParams>,
) -> Json<Vec<i32>> {
  Json(snapshot.available_years(&params.taxonomy(), &params.countries()))
}

/// `GET /species`
pub async fn species(State(snapshot): State<Arc<Snapshot>>) -> Json<Vec<String>> {
  Json(
    snapshot
      .species_names()
      .into_iter()
      .map(str::to_owned)
      .collect(),
  )
}

#[derive(Debug, Serialize)]
pub struct CategoryInfo {
  pub code:  RiskCategory,
  pub label: &'static str,
  pub rank:  u8,
}

/// `GET /categories`, least to most severe.
pub async fn categories() -> Json<Vec<CategoryInfo>> {
  Json(
    RiskCategory::ALL
      .into_iter()
      .map(|c| CategoryInfo { code: c, label: c.label(), rank: c.rank() })
      .collect(),
  )
}

/// `GET /uses`, in display order.
pub async fn uses() -> Json<Vec<UsageTag>> { Json(UsageTag::COUNTABLE.to_vec()) }
