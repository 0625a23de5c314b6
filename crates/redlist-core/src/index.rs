//! Derived per-species relations: reconciled usage tags and countries.
//!
//! A species usually has several assessments, and older ones tend to be less
//! complete. Both indexes keep the longest list observed for each species;
//! on equal lengths the first one seen wins.

use std::collections::{HashMap, HashSet, hash_map::Entry};

use serde::{Deserialize, Serialize};

use crate::{
  category::UsageTag,
  record::{AssessmentRecord, SpeciesId},
};

/// Pick the longest `field` list per species, preserving first-seen species
/// order.
fn longest_per_species<'a, T>(
  records: &'a [AssessmentRecord],
  field: impl Fn(&'a AssessmentRecord) -> &'a [T],
) -> Vec<(SpeciesId, &'a [T])> {
  let mut order = Vec::new();
  let mut best: HashMap<SpeciesId, &'a [T]> = HashMap::new();

  for record in records {
    let list = field(record);
    match best.entry(record.species_id()) {
      Entry::Vacant(e) => {
        order.push(record.species_id());
        e.insert(list);
      }
      Entry::Occupied(mut e) => {
        if list.len() > e.get().len() {
          e.insert(list);
        }
      }
    }
  }

  order.into_iter().map(|id| (id, best[&id])).collect()
}

// ─── UsageIndex ──────────────────────────────────────────────────────────────

/// One `(species, usage tag)` pair of the persisted usage relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRow {
  pub species_id: SpeciesId,
  pub tag:        UsageTag,
}

/// Species → reconciled usage tags.
#[derive(Debug, Clone, Default)]
pub struct UsageIndex {
  order: Vec<SpeciesId>,
  tags:  HashMap<SpeciesId, Vec<UsageTag>>,
}

impl UsageIndex {
  pub fn build(records: &[AssessmentRecord]) -> Self {
    let mut index = Self::default();
    for (id, tags) in longest_per_species(records, |r| &r.use_and_trade) {
      index.order.push(id);
      index.tags.insert(id, tags.to_vec());
    }
    index
  }

  /// Rebuild from persisted rows; rows for one species keep their order.
  pub fn from_rows(rows: impl IntoIterator<Item = UsageRow>) -> Self {
    let mut index = Self::default();
    for row in rows {
      let tags = index.tags.entry(row.species_id).or_insert_with(|| {
        index.order.push(row.species_id);
        Vec::new()
      });
      if !tags.contains(&row.tag) {
        tags.push(row.tag);
      }
    }
    index
  }

  pub fn get(&self, id: SpeciesId) -> Option<&[UsageTag]> {
    self.tags.get(&id).map(Vec::as_slice)
  }

  pub fn len(&self) -> usize { self.order.len() }

  pub fn is_empty(&self) -> bool { self.order.is_empty() }

  pub fn rows(&self) -> impl Iterator<Item = UsageRow> + '_ {
    self.order.iter().flat_map(move |id| {
      self.tags[id].iter().map(move |tag| UsageRow { species_id: *id, tag: *tag })
    })
  }
}

// ─── CountryIndex ────────────────────────────────────────────────────────────

/// One `(species, country)` pair of the persisted country relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryRow {
  pub species_id: SpeciesId,
  pub country:    String,
}

/// Species ↔ country relation, flattened from assessment locations.
#[derive(Debug, Clone, Default)]
pub struct CountryIndex {
  rows:       Vec<CountryRow>,
  /// Distinct country names in first-seen order.
  countries:  Vec<String>,
  by_country: HashMap<String, HashSet<SpeciesId>>,
}

impl CountryIndex {
  pub fn build(records: &[AssessmentRecord]) -> Self {
    let rows = longest_per_species(records, |r| &r.locations)
      .into_iter()
      .flat_map(|(id, locations)| {
        locations.iter().map(move |l| CountryRow {
          species_id: id,
          country:    l.country.clone(),
        })
      })
      .collect::<Vec<_>>();
    Self::from_rows(rows)
  }

  pub fn from_rows(rows: impl IntoIterator<Item = CountryRow>) -> Self {
    let mut index = Self::default();
    for row in rows {
      let ids = index
        .by_country
        .entry(row.country.clone())
        .or_insert_with(|| {
          index.countries.push(row.country.clone());
          HashSet::new()
        });
      ids.insert(row.species_id);
      index.rows.push(row);
    }
    index
  }

  /// Species present in any of `countries`.
  pub fn species_in<S: AsRef<str>>(&self, countries: &[S]) -> HashSet<SpeciesId> {
    countries
      .iter()
      .filter_map(|c| self.by_country.get(c.as_ref()))
      .flatten()
      .copied()
      .collect()
  }

  pub fn countries(&self) -> &[String] { &self.countries }

  pub fn rows(&self) -> &[CountryRow] { &self.rows }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    category::RiskCategory,
    record::{Location, Presence, Taxon},
  };

  fn record(id: u64, uses: &[UsageTag], countries: &[&str]) -> AssessmentRecord {
    AssessmentRecord {
      year_published: Some(2000),
      taxon:          Taxon {
        scientific_name: format!("Species {id}"),
        sis_id:          SpeciesId(id),
        kingdom_name:    "ANIMALIA".into(),
        phylum_name:     "CHORDATA".into(),
        class_name:      "AVES".into(),
        order_name:      "PASSERIFORMES".into(),
        family_name:     "FRINGILLIDAE".into(),
      },
      locations:      countries
        .iter()
        .map(|c| Location { country: (*c).into(), presence: Presence::Extant })
        .collect(),
      use_and_trade:  uses.to_vec(),
      threats:        vec![],
      risk_category:  RiskCategory::LeastConcern,
    }
  }

  #[test]
  fn longest_usage_list_wins() {
    let records = [
      record(1, &[UsageTag::Food], &[]),
      record(1, &[UsageTag::Food, UsageTag::Research], &[]),
      record(1, &[UsageTag::Fuels], &[]),
    ];
    let index = UsageIndex::build(&records);
    assert_eq!(index.get(SpeciesId(1)), Some(&[UsageTag::Food, UsageTag::Research][..]));
  }

  #[test]
  fn equal_lengths_keep_first_seen() {
    let records = [
      record(7, &[UsageTag::Medicine], &[]),
      record(7, &[UsageTag::Fuels], &[]),
    ];
    let index = UsageIndex::build(&records);
    assert_eq!(index.get(SpeciesId(7)), Some(&[UsageTag::Medicine][..]));
  }

  #[test]
  fn usage_rows_round_trip_through_from_rows() {
    let records = [
      record(2, &[UsageTag::PetsDisplay, UsageTag::Food], &[]),
      record(3, &[UsageTag::Unknown], &[]),
    ];
    let index = UsageIndex::build(&records);
    let rebuilt = UsageIndex::from_rows(index.rows().collect::<Vec<_>>());
    assert_eq!(rebuilt.get(SpeciesId(2)), index.get(SpeciesId(2)));
    assert_eq!(rebuilt.get(SpeciesId(3)), Some(&[UsageTag::Unknown][..]));
    assert_eq!(rebuilt.len(), 2);
  }

  #[test]
  fn country_lookup_unions_countries() {
    let records = [
      record(1, &[], &["Brazil", "Peru"]),
      record(2, &[], &["Peru"]),
      record(3, &[], &["Chile"]),
      record(1, &[], &["Brazil"]),
    ];
    let index = CountryIndex::build(&records);
    assert_eq!(index.countries(), ["Brazil", "Peru", "Chile"]);
    assert_eq!(index.rows().len(), 4);

    let ids = index.species_in(&["Peru", "Atlantis"]);
    assert_eq!(ids, HashSet::from([SpeciesId(1), SpeciesId(2)]));
  }
}
