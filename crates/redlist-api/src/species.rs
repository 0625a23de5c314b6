//! Handlers for single-species lookups.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
};
use redlist_core::{Snapshot, trajectory::TrajectoryPoint};
use serde::Deserialize;

use crate::{
  error::ApiError,
  usage::{ModeParams, UsageChart, chart},
};

#[derive(Debug, Deserialize, Default)]
pub struct TrajectoryParams {
  /// Last year of the axis; the current year when absent.
  pub through: Option<i32>,
}

/// `GET /species/{name}/trajectory[?through=2024]`
pub async fn trajectory(
  State(snapshot): State<Arc<Snapshot>>,
  Path(name): Path<String>,
  Query(params): Query<TrajectoryParams>,
) -> Result<Json<Vec<TrajectoryPoint>>, ApiError> {
  Ok(Json(snapshot.trajectory(&name, params.through)?))
}

/// `GET /species/{name}/usage[?percentage=true]`
pub async fn usage(
  State(snapshot): State<Arc<Snapshot>>,
  Path(name): Path<String>,
  Query(mode): Query<ModeParams>,
) -> Result<Json<UsageChart>, ApiError> {
  let histogram = snapshot.species_usage(&name)?;
  Ok(Json(chart(&histogram, mode.mode())))
}
