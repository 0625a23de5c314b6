//! Narrowing a record set by taxonomy, publication year, country and risk.
//!
//! All filters take and return a [`RecordSet`], a list of borrowed records
//! over an immutable snapshot, so they chain without copying records.

use std::{collections::HashSet, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
  Error,
  category::RiskCategory,
  index::CountryIndex,
  record::{AssessmentRecord, SpeciesId, Taxon},
};

// ─── Rank ────────────────────────────────────────────────────────────────────

/// A taxonomic rank, highest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rank {
  Kingdom,
  Phylum,
  Class,
  Order,
  Family,
  Species,
}

impl Rank {
  pub const ALL: [Self; 6] = [
    Self::Kingdom,
    Self::Phylum,
    Self::Class,
    Self::Order,
    Self::Family,
    Self::Species,
  ];

  /// The value of this rank on a taxon. `Species` is the scientific name.
  pub fn of(self, taxon: &Taxon) -> &str {
    match self {
      Self::Kingdom => &taxon.kingdom_name,
      Self::Phylum => &taxon.phylum_name,
      Self::Class => &taxon.class_name,
      Self::Order => &taxon.order_name,
      Self::Family => &taxon.family_name,
      Self::Species => &taxon.scientific_name,
    }
  }

  pub fn parent(self) -> Option<Self> {
    match self {
      Self::Kingdom => None,
      Self::Phylum => Some(Self::Kingdom),
      Self::Class => Some(Self::Phylum),
      Self::Order => Some(Self::Class),
      Self::Family => Some(Self::Order),
      Self::Species => Some(Self::Family),
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Kingdom => "kingdom",
      Self::Phylum => "phylum",
      Self::Class => "class",
      Self::Order => "order",
      Self::Family => "family",
      Self::Species => "species",
    }
  }
}

impl fmt::Display for Rank {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Rank {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::ALL
      .into_iter()
      .find(|r| r.as_str() == s)
      .ok_or_else(|| Error::UnknownRank(s.to_owned()))
  }
}

// ─── TaxonomySelection ───────────────────────────────────────────────────────

/// A partial selection down the taxonomic hierarchy. Empty strings count as
/// unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomySelection {
  pub kingdom: Option<String>,
  pub phylum:  Option<String>,
  pub class:   Option<String>,
  pub order:   Option<String>,
  pub family:  Option<String>,
  pub species: Option<String>,
}

impl TaxonomySelection {
  pub fn get(&self, rank: Rank) -> Option<&str> {
    let value = match rank {
      Rank::Kingdom => &self.kingdom,
      Rank::Phylum => &self.phylum,
      Rank::Class => &self.class,
      Rank::Order => &self.order,
      Rank::Family => &self.family,
      Rank::Species => &self.species,
    };
    value.as_deref().filter(|v| !v.is_empty())
  }

  /// Every set criterion, highest rank first.
  pub fn criteria(&self) -> impl Iterator<Item = (Rank, &str)> {
    Rank::ALL
      .into_iter()
      .filter_map(|rank| self.get(rank).map(|v| (rank, v)))
  }

  /// The unbroken run of set criteria starting at kingdom. Stops at the
  /// first unset rank even if lower ranks are set.
  pub fn cascade(&self) -> impl Iterator<Item = (Rank, &str)> {
    Rank::ALL
      .into_iter()
      .map_while(|rank| self.get(rank).map(|v| (rank, v)))
  }

  pub fn is_empty(&self) -> bool { self.criteria().next().is_none() }
}

// ─── RecordSet ───────────────────────────────────────────────────────────────

/// A subset of snapshot records, in snapshot order.
#[derive(Debug, Clone, Default)]
pub struct RecordSet<'a> {
  records: Vec<&'a AssessmentRecord>,
}

impl<'a> RecordSet<'a> {
  pub fn new(records: impl IntoIterator<Item = &'a AssessmentRecord>) -> Self {
    Self { records: records.into_iter().collect() }
  }

  pub fn len(&self) -> usize { self.records.len() }

  pub fn is_empty(&self) -> bool { self.records.is_empty() }

  pub fn iter(&self) -> impl Iterator<Item = &'a AssessmentRecord> + '_ {
    self.records.iter().copied()
  }

  fn retain(mut self, keep: impl Fn(&AssessmentRecord) -> bool) -> Self {
    self.records.retain(|r| keep(r));
    self
  }

  /// Narrow by every set taxonomic criterion, exact match, left to right.
  /// An incoherent combination simply yields an empty set.
  pub fn filter_taxonomy(self, selection: &TaxonomySelection) -> Self {
    selection.criteria().fold(self, |set, (rank, value)| {
      set.retain(|r| rank.of(&r.taxon) == value)
    })
  }

  /// Keep records published in one of `years`.
  pub fn filter_by_years(self, years: &[i32]) -> Self {
    self.retain(|r| r.year_published.is_some_and(|y| years.contains(&y)))
  }

  /// Keep records of species present in any of `countries`.
  pub fn filter_by_countries<S: AsRef<str>>(
    self,
    index: &CountryIndex,
    countries: &[S],
  ) -> Self {
    let ids = index.species_in(countries);
    self.filter_by_species(&ids)
  }

  pub fn filter_by_risk(self, category: RiskCategory) -> Self {
    self.retain(|r| r.risk_category == category)
  }

  pub fn filter_by_species(self, ids: &HashSet<SpeciesId>) -> Self {
    self.retain(|r| ids.contains(&r.species_id()))
  }

  /// Keep every record of each species that has at least one assessment
  /// published in `years`.
  pub fn species_assessed_in(self, years: &[i32]) -> Self {
    let ids: HashSet<SpeciesId> = self
      .clone()
      .filter_by_years(years)
      .iter()
      .map(AssessmentRecord::species_id)
      .collect();
    self.filter_by_species(&ids)
  }

  /// Distinct species ids, first-seen order.
  pub fn species_ids(&self) -> Vec<SpeciesId> {
    let mut seen = HashSet::new();
    self
      .iter()
      .map(AssessmentRecord::species_id)
      .filter(|id| seen.insert(*id))
      .collect()
  }

  /// Distinct publication years, ascending.
  pub fn years(&self) -> Vec<i32> {
    let mut years: Vec<i32> = self.iter().filter_map(|r| r.year_published).collect();
    years.sort_unstable();
    years.dedup();
    years
  }
}

// ─── Dropdown support ────────────────────────────────────────────────────────

/// Publication years available for a taxonomy and country selection.
///
/// The taxonomy side only applies once a kingdom is chosen and narrows along
/// [`TaxonomySelection::cascade`]. With both sides present their species sets
/// are intersected; with neither, every year in `records` is returned.
pub fn available_years<S: AsRef<str>>(
  records: &[AssessmentRecord],
  index: &CountryIndex,
  selection: &TaxonomySelection,
  countries: &[S],
) -> Vec<i32> {
  let all = RecordSet::new(records);

  let by_taxonomy: Option<HashSet<SpeciesId>> =
    selection.get(Rank::Kingdom).map(|_| {
      selection
        .cascade()
        .fold(all.clone(), |set, (rank, value)| {
          set.retain(|r| rank.of(&r.taxon) == value)
        })
        .species_ids()
        .into_iter()
        .collect()
    });
  let by_country = (!countries.is_empty()).then(|| index.species_in(countries));

  let ids = match (by_taxonomy, by_country) {
    (Some(t), Some(c)) => t.intersection(&c).copied().collect(),
    (Some(t), None) => t,
    (None, Some(c)) => c,
    (None, None) => return all.years(),
  };
  all.filter_by_species(&ids).years()
}

/// Distinct values at `rank` among records matching every higher rank of
/// `selection`, first-seen order. Empty while the parent rank is unset.
pub fn taxonomy_options(
  records: &[AssessmentRecord],
  rank: Rank,
  selection: &TaxonomySelection,
) -> Vec<String> {
  if let Some(parent) = rank.parent()
    && selection.get(parent).is_none()
  {
    return Vec::new();
  }

  let mut seen = HashSet::new();
  records
    .iter()
    .filter(|r| {
      Rank::ALL
        .into_iter()
        .take_while(|higher| *higher < rank)
        .all(|higher| selection.get(higher) == Some(higher.of(&r.taxon)))
    })
    .map(|r| rank.of(&r.taxon))
    .filter(|v| seen.insert(*v))
    .map(str::to_owned)
    .collect()
}
