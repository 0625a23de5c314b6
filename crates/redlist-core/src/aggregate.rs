//! Usage-frequency histograms over a narrowed record set.

use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
  Error,
  category::{RiskCategory, UsageTag},
  filter::RecordSet,
  index::{CountryIndex, UsageIndex},
};

/// Count of species per usage tag. Keys iterate in display order and never
/// include [`UsageTag::Unknown`].
pub type UsageHistogram = BTreeMap<UsageTag, u64>;

/// Count every usage tag of every distinct species in `records`.
pub fn usage_histogram(records: &RecordSet<'_>, index: &UsageIndex) -> UsageHistogram {
  let mut histogram = UsageHistogram::new();
  for id in records.species_ids() {
    for tag in index.get(id).unwrap_or_default() {
      *histogram.entry(*tag).or_default() += 1;
    }
  }
  histogram.remove(&UsageTag::Unknown);
  histogram
}

/// The counts of `histogram` for every countable tag in display order, with
/// zeros for tags that never occurred.
pub fn display_counts(histogram: &UsageHistogram) -> Vec<(UsageTag, u64)> {
  UsageTag::COUNTABLE
    .into_iter()
    .map(|tag| (tag, histogram.get(&tag).copied().unwrap_or(0)))
    .collect()
}

// ─── Value modes ─────────────────────────────────────────────────────────────

/// Scale `values` to percentages of `total`. A non-positive total maps every
/// value to zero.
pub fn as_percentage(values: &[f64], total: f64) -> Vec<f64> {
  values
    .iter()
    .map(|v| if total > 0.0 { v / total * 100.0 } else { 0.0 })
    .collect()
}

/// How chart values are reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueMode {
  #[default]
  Absolute,
  Percentage,
}

impl ValueMode {
  pub fn apply(self, values: &[f64], total: f64) -> Vec<f64> {
    match self {
      Self::Absolute => values.to_vec(),
      Self::Percentage => as_percentage(values, total),
    }
  }
}

// ─── Grouping ────────────────────────────────────────────────────────────────

/// The dimension a grouped chart splits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
  Country,
  Year,
  Risk,
}

impl GroupBy {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Country => "country",
      Self::Year => "year",
      Self::Risk => "risk",
    }
  }

  /// Parse one group key of this dimension.
  pub fn parse_key(self, key: &str) -> Result<GroupKey, Error> {
    let invalid = || Error::InvalidGroupKey {
      grouping: self.as_str(),
      key:      key.to_owned(),
    };
    match self {
      Self::Country if !key.trim().is_empty() => {
        Ok(GroupKey::Country(key.trim().to_owned()))
      }
      Self::Country => Err(invalid()),
      Self::Year => key.trim().parse().map(GroupKey::Year).map_err(|_| invalid()),
      Self::Risk => RiskCategory::from_code(key.trim())
        .map(GroupKey::Risk)
        .ok_or_else(invalid),
    }
  }
}

impl FromStr for GroupBy {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "country" => Ok(Self::Country),
      "year" => Ok(Self::Year),
      "risk" | "risk_category" => Ok(Self::Risk),
      other => Err(Error::UnknownGrouping(other.to_owned())),
    }
  }
}

impl fmt::Display for GroupBy {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// One group of a grouped chart.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GroupKey {
  Year(i32),
  Risk(RiskCategory),
  Country(String),
}

impl fmt::Display for GroupKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Country(c) => f.write_str(c),
      Self::Year(y) => write!(f, "{y}"),
      Self::Risk(r) => write!(f, "{r}"),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Group {
  pub key:       GroupKey,
  pub histogram: UsageHistogram,
}

/// Per-group histograms plus the totals used for percentage normalisation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GroupedHistograms {
  pub groups:       Vec<Group>,
  /// Per-tag sums across all groups.
  pub total_by_tag: UsageHistogram,
  /// Sum of every count in every group.
  pub total:        u64,
}

/// Compute one histogram per group key. Each key narrows `records`
/// independently: country membership, exact publication year, or exact risk
/// category.
pub fn grouped_histograms(
  records: &RecordSet<'_>,
  keys: &[GroupKey],
  usage: &UsageIndex,
  countries: &CountryIndex,
) -> GroupedHistograms {
  let mut grouped = GroupedHistograms::default();

  for key in keys {
    let narrowed = match key {
      GroupKey::Country(c) => {
        records.clone().filter_by_countries(countries, std::slice::from_ref(c))
      }
      GroupKey::Year(y) => records.clone().filter_by_years(&[*y]),
      GroupKey::Risk(r) => records.clone().filter_by_risk(*r),
    };
    let histogram = usage_histogram(&narrowed, usage);

    for (tag, count) in &histogram {
      *grouped.total_by_tag.entry(*tag).or_default() += count;
      grouped.total += count;
    }
    grouped.groups.push(Group { key: key.clone(), histogram });
  }

  grouped
}
