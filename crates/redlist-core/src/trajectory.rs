//! Risk trajectory of a single species over time.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Error, Result, category::RiskCategory, record::AssessmentRecord};

/// The risk category in force for one species in one year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrajectoryPoint {
  pub year:     i32,
  pub category: RiskCategory,
  /// Position on the severity scale, `NE` = 0 through `EX` = 8.
  pub rank:     u8,
}

/// Normalise a user-supplied species name: trim, and collapse internal runs
/// of whitespace to one space.
pub fn clean_species_name(name: &str) -> String {
  name.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Build the yearly risk trajectory of the species named `name`, from its
/// first published assessment through `through_year`.
///
/// Years without an assessment carry the last known category forward. When
/// two assessments share a year the later one in `records` wins. A species
/// whose records all lack a publication year yields an empty trajectory.
pub fn species_trajectory(
  records: &[AssessmentRecord],
  name: &str,
  through_year: i32,
) -> Result<Vec<TrajectoryPoint>> {
  let name = clean_species_name(name);
  let mut found = false;
  let mut by_year = BTreeMap::new();

  for record in records.iter().filter(|r| r.taxon.scientific_name == name) {
    found = true;
    if let Some(year) = record.year_published {
      by_year.insert(year, record.risk_category);
    }
  }

  if !found {
    return Err(Error::SpeciesNotFound(name));
  }
  let Some(first) = by_year.keys().next().copied() else {
    return Ok(Vec::new());
  };

  let mut current = None;
  let trajectory = (first..=through_year)
    .filter_map(|year| {
      if let Some(category) = by_year.get(&year) {
        current = Some(*category);
      }
      current.map(|category| TrajectoryPoint {
        year,
        category,
        rank: category.rank(),
      })
    })
    .collect();

  Ok(trajectory)
}
