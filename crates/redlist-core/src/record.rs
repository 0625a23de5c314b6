//! Assessment records: one dated conservation evaluation of one species.
//!
//! Records exist in two shapes. [`RawAssessment`] is what the harvester
//! writes: the projected API payload with the historical risk code and the
//! free-text usage descriptions untouched. [`AssessmentRecord`] is the
//! reconciled form that the snapshot and the engine operate on.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
  Error,
  category::{RiskCategory, UsageTag},
};

// ─── Identity ────────────────────────────────────────────────────────────────

/// Opaque positive integer naming one taxonomic unit (the `sis_id`).
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SpeciesId(pub u64);

impl fmt::Display for SpeciesId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

impl FromStr for SpeciesId {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    s.trim()
      .parse()
      .map(SpeciesId)
      .map_err(|_| Error::InvalidSpeciesId(s.to_owned()))
  }
}

/// The fixed taxonomy projection kept from every assessment payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Taxon {
  pub scientific_name: String,
  pub sis_id:          SpeciesId,
  pub kingdom_name:    String,
  pub phylum_name:     String,
  pub class_name:      String,
  pub order_name:      String,
  pub family_name:     String,
}

// ─── Geography ───────────────────────────────────────────────────────────────

/// How a species is present in a country.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Presence {
  Extant,
  ProbablyExtant,
  PossiblyExtant,
  PossiblyExtinct,
  ExtinctPost1500,
  PresenceUncertain,
  /// A code outside the known vocabulary, kept verbatim.
  Other(String),
}

impl Presence {
  pub fn as_str(&self) -> &str {
    match self {
      Self::Extant => "Extant",
      Self::ProbablyExtant => "Probably Extant",
      Self::PossiblyExtant => "Possibly Extant",
      Self::PossiblyExtinct => "Possibly Extinct",
      Self::ExtinctPost1500 => "Extinct Post-1500",
      Self::PresenceUncertain => "Presence Uncertain",
      Self::Other(s) => s,
    }
  }
}

impl From<String> for Presence {
  fn from(s: String) -> Self {
    match s.as_str() {
      "Extant" => Self::Extant,
      "Probably Extant" => Self::ProbablyExtant,
      "Possibly Extant" => Self::PossiblyExtant,
      "Possibly Extinct" => Self::PossiblyExtinct,
      "Extinct Post-1500" => Self::ExtinctPost1500,
      "Presence Uncertain" => Self::PresenceUncertain,
      _ => Self::Other(s),
    }
  }
}

impl From<Presence> for String {
  fn from(p: Presence) -> Self {
    match p {
      Presence::Other(s) => s,
      known => known.as_str().to_owned(),
    }
  }
}

/// One country in which the species occurs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
  pub country:  String,
  pub presence: Presence,
}

// ─── RawAssessment ───────────────────────────────────────────────────────────

/// A normalized but not yet reconciled assessment, as written to the
/// per-worker harvest artifacts (one JSON object per line).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAssessment {
  pub year_published:    Option<i32>,
  pub taxon:             Taxon,
  #[serde(default)]
  pub locations:         Vec<Location>,
  /// Free-text usage descriptions in the API's vocabulary.
  #[serde(default)]
  pub use_and_trade:     Vec<String>,
  #[serde(default)]
  pub threats:           Vec<String>,
  /// Historical category code; absent when the assessment carries none.
  pub red_list_category: Option<String>,
}

// ─── AssessmentRecord ────────────────────────────────────────────────────────

/// A reconciled assessment. Immutable once it enters a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentRecord {
  pub year_published: Option<i32>,
  pub taxon:          Taxon,
  pub locations:      Vec<Location>,
  pub use_and_trade:  Vec<UsageTag>,
  pub threats:        Vec<String>,
  pub risk_category:  RiskCategory,
}

impl AssessmentRecord {
  pub fn species_id(&self) -> SpeciesId { self.taxon.sis_id }
}
