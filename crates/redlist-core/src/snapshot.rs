//! The immutable canonical snapshot and the dashboard queries over it.
//!
//! A [`Snapshot`] is built once, from reconciled records or from a store, and
//! is read-only afterwards. Every query borrows it; nothing here mutates.

use std::collections::HashSet;

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  aggregate::{
    GroupBy, GroupKey, GroupedHistograms, UsageHistogram, grouped_histograms,
    usage_histogram,
  },
  category::RiskCategory,
  filter::{self, Rank, RecordSet, TaxonomySelection},
  index::{CountryIndex, UsageIndex},
  record::AssessmentRecord,
  trajectory::{self, TrajectoryPoint, clean_species_name},
};

/// The selection shared by every usage chart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageQuery {
  #[serde(default)]
  pub taxonomy:  TaxonomySelection,
  #[serde(default)]
  pub countries: Vec<String>,
  #[serde(default)]
  pub years:     Vec<i32>,
}

#[derive(Debug, Clone, Default)]
pub struct Snapshot {
  records:   Vec<AssessmentRecord>,
  usage:     UsageIndex,
  countries: CountryIndex,
}

impl Snapshot {
  /// Assemble a snapshot from already-derived relations, as loaded from a
  /// store.
  pub fn new(
    records: Vec<AssessmentRecord>,
    usage: UsageIndex,
    countries: CountryIndex,
  ) -> Self {
    Self { records, usage, countries }
  }

  /// Build a snapshot from reconciled records, deriving both indexes.
  pub fn from_records(records: Vec<AssessmentRecord>) -> Self {
    let usage = UsageIndex::build(&records);
    let countries = CountryIndex::build(&records);
    Self { records, usage, countries }
  }

  pub fn records(&self) -> &[AssessmentRecord] { &self.records }

  pub fn usage_index(&self) -> &UsageIndex { &self.usage }

  pub fn country_index(&self) -> &CountryIndex { &self.countries }

  pub fn all(&self) -> RecordSet<'_> { RecordSet::new(&self.records) }

  // ── Listings ──────────────────────────────────────────────────────────

  /// Distinct scientific names, first-seen order.
  pub fn species_names(&self) -> Vec<&str> {
    let mut seen = HashSet::new();
    self
      .records
      .iter()
      .map(|r| r.taxon.scientific_name.as_str())
      .filter(|name| seen.insert(*name))
      .collect()
  }

  pub fn countries(&self) -> &[String] { self.countries.countries() }

  pub fn years(&self) -> Vec<i32> { self.all().years() }

  pub fn taxonomy_options(
    &self,
    rank: Rank,
    selection: &TaxonomySelection,
  ) -> Vec<String> {
    filter::taxonomy_options(&self.records, rank, selection)
  }

  pub fn available_years<S: AsRef<str>>(
    &self,
    selection: &TaxonomySelection,
    countries: &[S],
  ) -> Vec<i32> {
    filter::available_years(&self.records, &self.countries, selection, countries)
  }

  // ── Usage charts ──────────────────────────────────────────────────────

  /// Apply `query` in dashboard order: countries, then taxonomy, then the
  /// species assessed in any selected year. The dimension named by `skip`
  /// is left unapplied.
  fn narrowed(&self, query: &UsageQuery, skip: Option<GroupBy>) -> RecordSet<'_> {
    let mut set = self.all();
    if skip != Some(GroupBy::Country) && !query.countries.is_empty() {
      set = set.filter_by_countries(&self.countries, &query.countries);
    }
    set = set.filter_taxonomy(&query.taxonomy);
    if skip != Some(GroupBy::Year) && !query.years.is_empty() {
      set = set.species_assessed_in(&query.years);
    }
    set
  }

  /// The accumulated usage histogram for a selection.
  pub fn usage_chart(&self, query: &UsageQuery) -> UsageHistogram {
    usage_histogram(&self.narrowed(query, None), &self.usage)
  }

  /// Usage histograms split by `group_by`. Without explicit `keys` the groups
  /// are the selected countries or years; with nothing selected they are
  /// every country, every year available for the selection, or every risk
  /// category respectively.
  pub fn grouped_usage_chart(
    &self,
    query: &UsageQuery,
    group_by: GroupBy,
    keys: Option<Vec<GroupKey>>,
  ) -> GroupedHistograms {
    let keys = keys.filter(|k| !k.is_empty()).unwrap_or_else(|| match group_by {
      GroupBy::Country if !query.countries.is_empty() => {
        query.countries.iter().cloned().map(GroupKey::Country).collect()
      }
      GroupBy::Country => self
        .countries()
        .iter()
        .cloned()
        .map(GroupKey::Country)
        .collect(),
      GroupBy::Year if !query.years.is_empty() => {
        query.years.iter().copied().map(GroupKey::Year).collect()
      }
      GroupBy::Year => self
        .available_years(&query.taxonomy, &query.countries)
        .into_iter()
        .map(GroupKey::Year)
        .collect(),
      GroupBy::Risk => RiskCategory::ALL.into_iter().map(GroupKey::Risk).collect(),
    });

    let skip = match group_by {
      GroupBy::Risk => None,
      other => Some(other),
    };
    grouped_histograms(
      &self.narrowed(query, skip),
      &keys,
      &self.usage,
      &self.countries,
    )
  }

  // ── Single species ────────────────────────────────────────────────────

  /// Usage histogram of one species by scientific name.
  pub fn species_usage(&self, name: &str) -> Result<UsageHistogram> {
    let name = clean_species_name(name);
    let selection = TaxonomySelection {
      species: Some(name.clone()),
      ..Default::default()
    };
    let set = self.all().filter_taxonomy(&selection);
    if set.is_empty() {
      return Err(Error::SpeciesNotFound(name));
    }
    Ok(usage_histogram(&set, &self.usage))
  }

  /// Forward-filled risk trajectory through `through_year`, defaulting to
  /// the current calendar year. Years after the current one are rejected.
  pub fn trajectory(
    &self,
    name: &str,
    through_year: Option<i32>,
  ) -> Result<Vec<TrajectoryPoint>> {
    let latest = chrono::Utc::now().year();
    let through_year = through_year.unwrap_or(latest);
    if through_year > latest {
      return Err(Error::YearInFuture { year: through_year, latest });
    }
    trajectory::species_trajectory(&self.records, name, through_year)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    category::UsageTag,
    record::{Location, Presence, SpeciesId, Taxon},
  };

  fn record(
    id: u64,
    name: &str,
    class: &str,
    year: i32,
    risk: RiskCategory,
    uses: &[UsageTag],
    countries: &[&str],
  ) -> AssessmentRecord {
    AssessmentRecord {
      year_published: Some(year),
      taxon:          Taxon {
        scientific_name: name.into(),
        sis_id:          SpeciesId(id),
        kingdom_name:    "ANIMALIA".into(),
        phylum_name:     "CHORDATA".into(),
        class_name:      class.into(),
        order_name:      "ORDER".into(),
        family_name:     "FAMILY".into(),
      },
      locations:      countries
        .iter()
        .map(|c| Location { country: (*c).into(), presence: Presence::Extant })
        .collect(),
      use_and_trade:  uses.to_vec(),
      threats:        vec![],
      risk_category:  risk,
    }
  }

  fn snapshot() -> Snapshot {
    use RiskCategory::*;
    use UsageTag::*;
    Snapshot::from_records(vec![
      record(1, "Chelonia mydas", "REPTILIA", 1996, Endangered, &[Food, Handicrafts], &["Brazil", "Mexico"]),
      record(1, "Chelonia mydas", "REPTILIA", 2004, Endangered, &[Food, Handicrafts], &["Brazil", "Mexico"]),
      record(1, "Chelonia mydas", "REPTILIA", 2023, LeastConcern, &[Food, Handicrafts], &["Brazil", "Mexico"]),
      record(2, "Ara macao", "AVES", 2016, LeastConcern, &[PetsDisplay], &["Mexico"]),
      record(3, "Tapirus terrestris", "MAMMALIA", 2004, Vulnerable, &[Food, Medicine], &["Brazil"]),
    ])
  }

  fn query(class: Option<&str>, countries: &[&str], years: &[i32]) -> UsageQuery {
    UsageQuery {
      taxonomy:  TaxonomySelection {
        kingdom: class.map(|_| "ANIMALIA".to_owned()),
        phylum: class.map(|_| "CHORDATA".to_owned()),
        class: class.map(str::to_owned),
        ..Default::default()
      },
      countries: countries.iter().map(|c| (*c).to_owned()).collect(),
      years:     years.to_vec(),
    }
  }

  #[test]
  fn listings() {
    let snapshot = snapshot();
    assert_eq!(
      snapshot.species_names(),
      ["Chelonia mydas", "Ara macao", "Tapirus terrestris"]
    );
    assert_eq!(snapshot.countries(), ["Brazil", "Mexico"]);
    assert_eq!(snapshot.years(), [1996, 2004, 2016, 2023]);
  }

  #[test]
  fn unfiltered_chart_counts_every_species() {
    let histogram = snapshot().usage_chart(&UsageQuery::default());
    assert_eq!(histogram[&UsageTag::Food], 2);
    assert_eq!(histogram[&UsageTag::PetsDisplay], 1);
    assert_eq!(histogram[&UsageTag::Medicine], 1);
    assert_eq!(histogram[&UsageTag::Handicrafts], 1);
  }

  #[test]
  fn chart_applies_countries_taxonomy_and_years() {
    let snapshot = snapshot();
    let histogram = snapshot.usage_chart(&query(None, &["Mexico"], &[]));
    assert_eq!(histogram.get(&UsageTag::Medicine), None);
    assert_eq!(histogram[&UsageTag::PetsDisplay], 1);

    let histogram = snapshot.usage_chart(&query(Some("REPTILIA"), &[], &[2004]));
    assert_eq!(
      histogram,
      UsageHistogram::from([(UsageTag::Food, 1), (UsageTag::Handicrafts, 1)])
    );
  }

  #[test]
  fn grouped_by_country_defaults_to_selected_countries() {
    let snapshot = snapshot();
    let grouped = snapshot.grouped_usage_chart(
      &query(None, &["Brazil"], &[]),
      GroupBy::Country,
      None,
    );
    let keys: Vec<_> = grouped.groups.iter().map(|g| g.key.to_string()).collect();
    assert_eq!(keys, ["Brazil"]);
    assert_eq!(grouped.groups[0].histogram[&UsageTag::Food], 2);
    assert_eq!(grouped.total, 4);

    let grouped = snapshot.grouped_usage_chart(&UsageQuery::default(), GroupBy::Country, None);
    let keys: Vec<_> = grouped.groups.iter().map(|g| g.key.to_string()).collect();
    assert_eq!(keys, ["Brazil", "Mexico"]);
    assert_eq!(grouped.groups[1].histogram[&UsageTag::PetsDisplay], 1);
  }

  #[test]
  fn grouped_by_year_defaults_to_selected_years() {
    let grouped = snapshot().grouped_usage_chart(
      &query(None, &[], &[2016, 2004]),
      GroupBy::Year,
      None,
    );
    let keys: Vec<_> = grouped.groups.iter().map(|g| g.key.clone()).collect();
    assert_eq!(keys, [GroupKey::Year(2016), GroupKey::Year(2004)]);
    assert_eq!(grouped.groups[0].histogram[&UsageTag::PetsDisplay], 1);
    assert_eq!(grouped.total, 5);
  }

  #[test]
  fn grouped_by_year_without_selection_uses_available_years() {
    let grouped = snapshot().grouped_usage_chart(
      &query(Some("REPTILIA"), &[], &[]),
      GroupBy::Year,
      None,
    );
    let keys: Vec<_> = grouped.groups.iter().map(|g| g.key.clone()).collect();
    assert_eq!(
      keys,
      [GroupKey::Year(1996), GroupKey::Year(2004), GroupKey::Year(2023)]
    );
    assert_eq!(grouped.total, 6);
  }

  #[test]
  fn grouped_by_risk_covers_every_category() {
    let grouped = snapshot().grouped_usage_chart(
      &UsageQuery::default(),
      GroupBy::Risk,
      Some(vec![]),
    );
    assert_eq!(grouped.groups.len(), RiskCategory::ALL.len());
    let lc = grouped
      .groups
      .iter()
      .find(|g| g.key == GroupKey::Risk(RiskCategory::LeastConcern))
      .unwrap();
    assert_eq!(lc.histogram[&UsageTag::Food], 1);
    assert_eq!(lc.histogram[&UsageTag::PetsDisplay], 1);
  }

  #[test]
  fn species_lookups_signal_unknown_names() {
    let snapshot = snapshot();
    assert_eq!(
      snapshot.species_usage("Ara  macao").unwrap(),
      UsageHistogram::from([(UsageTag::PetsDisplay, 1)])
    );
    assert!(matches!(
      snapshot.species_usage("Ara ararauna"),
      Err(Error::SpeciesNotFound(_))
    ));
    assert!(matches!(
      snapshot.trajectory("Ara ararauna", Some(2024)),
      Err(Error::SpeciesNotFound(_))
    ));
  }

  #[test]
  fn trajectory_runs_through_requested_year() {
    let trajectory = snapshot().trajectory("Chelonia mydas", Some(2024)).unwrap();
    assert_eq!(trajectory.first().map(|p| p.year), Some(1996));
    assert_eq!(trajectory.last().map(|p| p.category), Some(RiskCategory::LeastConcern));
    assert_eq!(trajectory.len(), 29);
  }

  #[test]
  fn trajectory_rejects_years_after_the_current_one() {
    let snapshot = snapshot();
    let latest = chrono::Utc::now().year();

    assert!(matches!(
      snapshot.trajectory("Chelonia mydas", Some(i32::MAX)),
      Err(Error::YearInFuture { year: i32::MAX, latest: l }) if l == latest
    ));
    assert!(matches!(
      snapshot.trajectory("Chelonia mydas", Some(latest + 1)),
      Err(Error::YearInFuture { .. })
    ));

    let trajectory = snapshot.trajectory("Chelonia mydas", None).unwrap();
    assert_eq!(trajectory.last().map(|p| p.year), Some(latest));
    assert!(snapshot.trajectory("Chelonia mydas", Some(1990)).unwrap().is_empty());
  }
}
