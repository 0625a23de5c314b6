//! Canonical vocabularies: risk categories and usage tags.

use std::fmt;

use serde::{Deserialize, Serialize};

// ─── RiskCategory ────────────────────────────────────────────────────────────

/// Canonical extinction-risk category. Declaration order is severity order,
/// so `Ord` compares by severity.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum RiskCategory {
  #[serde(rename = "NE")]
  NotEvaluated,
  #[serde(rename = "LC")]
  LeastConcern,
  #[serde(rename = "LT")]
  LittleThreatened,
  #[serde(rename = "VU")]
  Vulnerable,
  #[serde(rename = "EN")]
  Endangered,
  #[serde(rename = "CR")]
  CriticallyEndangered,
  #[serde(rename = "RE")]
  RegionallyExtinct,
  #[serde(rename = "EW")]
  ExtinctInTheWild,
  #[serde(rename = "EX")]
  Extinct,
}

impl RiskCategory {
  /// All categories, least to most severe.
  pub const ALL: [Self; 9] = [
    Self::NotEvaluated,
    Self::LeastConcern,
    Self::LittleThreatened,
    Self::Vulnerable,
    Self::Endangered,
    Self::CriticallyEndangered,
    Self::RegionallyExtinct,
    Self::ExtinctInTheWild,
    Self::Extinct,
  ];

  /// The two-letter canonical code.
  pub fn code(self) -> &'static str {
    match self {
      Self::NotEvaluated => "NE",
      Self::LeastConcern => "LC",
      Self::LittleThreatened => "LT",
      Self::Vulnerable => "VU",
      Self::Endangered => "EN",
      Self::CriticallyEndangered => "CR",
      Self::RegionallyExtinct => "RE",
      Self::ExtinctInTheWild => "EW",
      Self::Extinct => "EX",
    }
  }

  /// Position on the 9-point severity scale, `NE` = 0 through `EX` = 8.
  pub fn rank(self) -> u8 { self as u8 }

  /// Parse a canonical code. Historical variants are not accepted here; see
  /// [`crate::reconcile::reconcile_risk`] for those.
  pub fn from_code(code: &str) -> Option<Self> {
    Self::ALL.into_iter().find(|c| c.code() == code)
  }

  pub fn label(self) -> &'static str {
    match self {
      Self::NotEvaluated => "Not Evaluated",
      Self::LeastConcern => "Least Concern",
      Self::LittleThreatened => "Little Threatened",
      Self::Vulnerable => "Vulnerable",
      Self::Endangered => "Endangered",
      Self::CriticallyEndangered => "Critically Endangered",
      Self::RegionallyExtinct => "Regionally Extinct",
      Self::ExtinctInTheWild => "Extinct in the Wild",
      Self::Extinct => "Extinct",
    }
  }
}

impl fmt::Display for RiskCategory {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.code())
  }
}

// ─── UsageTag ────────────────────────────────────────────────────────────────

/// Canonical human-use category. Declaration order is the dashboard's display
/// order, which is also the key order of every histogram.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum UsageTag {
  #[serde(rename = "Food")]
  Food,
  #[serde(rename = "Pets/display animals, horticulture")]
  PetsDisplay,
  #[serde(rename = "Medicine - human & veterinary")]
  Medicine,
  #[serde(rename = "Others")]
  Others,
  #[serde(rename = "Sport hunting/specimen collecting")]
  SportHunting,
  #[serde(rename = "Construction or structural materials")]
  Construction,
  #[serde(rename = "Fuels")]
  Fuels,
  #[serde(rename = "Handicrafts, jewellery, etc.")]
  Handicrafts,
  #[serde(rename = "Chemicals")]
  Chemicals,
  #[serde(rename = "Wearing apparel, accessories")]
  WearingApparel,
  #[serde(rename = "Research")]
  Research,
  /// No usage data. Never counted as a use.
  #[serde(rename = "Unknown")]
  Unknown,
}

impl UsageTag {
  /// Every countable tag, in display order. `Unknown` is excluded.
  pub const COUNTABLE: [Self; 11] = [
    Self::Food,
    Self::PetsDisplay,
    Self::Medicine,
    Self::Others,
    Self::SportHunting,
    Self::Construction,
    Self::Fuels,
    Self::Handicrafts,
    Self::Chemicals,
    Self::WearingApparel,
    Self::Research,
  ];

  pub fn label(self) -> &'static str {
    match self {
      Self::Food => "Food",
      Self::PetsDisplay => "Pets/display animals, horticulture",
      Self::Medicine => "Medicine - human & veterinary",
      Self::Others => "Others",
      Self::SportHunting => "Sport hunting/specimen collecting",
      Self::Construction => "Construction or structural materials",
      Self::Fuels => "Fuels",
      Self::Handicrafts => "Handicrafts, jewellery, etc.",
      Self::Chemicals => "Chemicals",
      Self::WearingApparel => "Wearing apparel, accessories",
      Self::Research => "Research",
      Self::Unknown => "Unknown",
    }
  }

  /// Parse a canonical label, including `Unknown`.
  pub fn from_label(label: &str) -> Option<Self> {
    if label == Self::Unknown.label() {
      return Some(Self::Unknown);
    }
    Self::COUNTABLE.into_iter().find(|t| t.label() == label)
  }
}

impl fmt::Display for UsageTag {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.label())
  }
}
