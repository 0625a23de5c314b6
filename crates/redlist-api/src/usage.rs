//! Handlers for the usage charts.
//!
//! Every chart reports all countable usage tags in display order. In
//! percentage mode values are shares of the chart's grand total.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
};
use redlist_core::{
  Snapshot,
  aggregate::{GroupBy, GroupKey, UsageHistogram, ValueMode, display_counts},
  category::UsageTag,
};
use serde::{Deserialize, Serialize};

use crate::{
  error::ApiError,
  params::{SelectionParams, split_list},
};

#[derive(Debug, Deserialize, Default)]
pub struct ModeParams {
  #[serde(default)]
  pub percentage: bool,
}

impl ModeParams {
  pub(crate) fn mode(&self) -> ValueMode {
    if self.percentage { ValueMode::Percentage } else { ValueMode::Absolute }
  }
}

#[derive(Debug, Deserialize, Default)]
pub struct KeyParams {
  /// Comma-separated group keys; all groups when absent.
  pub keys: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagValue {
  pub tag:   UsageTag,
  pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageChart {
  pub mode:   ValueMode,
  pub total:  u64,
  pub values: Vec<TagValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartGroup {
  pub key:    GroupKey,
  pub values: Vec<TagValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupedChart {
  pub group_by:     GroupBy,
  pub mode:         ValueMode,
  pub total:        u64,
  pub groups:       Vec<ChartGroup>,
  pub total_by_tag: Vec<TagValue>,
}

fn tag_values(histogram: &UsageHistogram, mode: ValueMode, total: u64) -> Vec<TagValue> {
  let counts = display_counts(histogram);
  let raw: Vec<f64> = counts.iter().map(|(_, c)| *c as f64).collect();
  counts
    .iter()
    .zip(mode.apply(&raw, total as f64))
    .map(|((tag, _), value)| TagValue { tag: *tag, value })
    .collect()
}

pub(crate) fn chart(histogram: &UsageHistogram, mode: ValueMode) -> UsageChart {
  let total = histogram.values().sum();
  UsageChart { mode, total, values: tag_values(histogram, mode, total) }
}

/// `GET /usage[?kingdom=...][&countries=a,b][&years=y1,y2][&percentage=true]`
pub async fn accumulated(
  State(snapshot): State<Arc<Snapshot>>,
  Query(selection): Query<SelectionParams>,
  Query(mode): Query<ModeParams>,
) -> Result<Json<UsageChart>, ApiError> {
  let histogram = snapshot.usage_chart(&selection.query()?);
  Ok(Json(chart(&histogram, mode.mode())))
}

/// `GET /usage/by/{group}[?keys=...]` with the same selection parameters as
/// [`accumulated`]. `group` is `country`, `year` or `risk`.
pub async fn grouped(
  State(snapshot): State<Arc<Snapshot>>,
  Path(group): Path<String>,
  Query(selection): Query<SelectionParams>,
  Query(mode): Query<ModeParams>,
  Query(keys): Query<KeyParams>,
) -> Result<Json<GroupedChart>, ApiError> {
  let group_by: GroupBy = group.parse()?;
  let keys = split_list(keys.keys.as_deref())
    .into_iter()
    .map(|k| group_by.parse_key(k))
    .collect::<Result<Vec<_>, _>>()?;

  let grouped = snapshot.grouped_usage_chart(&selection.query()?, group_by, Some(keys));
  let mode = mode.mode();

  Ok(Json(GroupedChart {
    group_by,
    mode,
    total: grouped.total,
    total_by_tag: tag_values(&grouped.total_by_tag, mode, grouped.total),
    groups: grouped
      .groups
      .iter()
      .map(|g| ChartGroup {
        key:    g.key.clone(),
        values: tag_values(&g.histogram, mode, grouped.total),
      })
      .collect(),
  }))
}
