//! Collapse the historical risk-category and usage vocabularies into the
//! canonical sets of [`crate::category`].
//!
//! Both passes are pure and idempotent: feeding canonical values back in
//! yields the same values.

use crate::{
  category::{RiskCategory, UsageTag},
  record::{AssessmentRecord, RawAssessment},
};

/// Map any historical category code to its canonical category.
/// Unrecognized codes map to [`RiskCategory::NotEvaluated`].
pub fn reconcile_risk(raw: &str) -> RiskCategory {
  use RiskCategory::*;
  match raw {
    "LC" | "LR/lc" => LeastConcern,
    "LT" | "NT" | "nt" | "LR/nt" | "LR/cd" => LittleThreatened,
    "VU" | "V" => Vulnerable,
    "EN" | "E" | "T" => Endangered,
    "CR" => CriticallyEndangered,
    "RE" => RegionallyExtinct,
    "EW" => ExtinctInTheWild,
    "EX" | "Ex" | "Ex/E" | "Ex?" => Extinct,
    _ => NotEvaluated,
  }
}

/// Map a list of raw usage descriptions to a deduplicated list of canonical
/// tags, in order of first appearance.
///
/// An empty list, or a list holding nothing but `Unknown`, becomes
/// `[Unknown]`. Otherwise `Unknown` entries are dropped.
pub fn reconcile_uses<S: AsRef<str>>(raw: &[S]) -> Vec<UsageTag> {
  let mut tags: Vec<UsageTag> = Vec::with_capacity(raw.len());

  for description in raw {
    let tag = match description.as_ref() {
      "Food - human" | "Food - animal" => UsageTag::Food,
      "Manufacturing chemicals" | "Other chemicals" => UsageTag::Chemicals,
      other => match UsageTag::from_label(other) {
        Some(UsageTag::Unknown) => continue,
        Some(tag) => tag,
        None => UsageTag::Others,
      },
    };
    if !tags.contains(&tag) {
      tags.push(tag);
    }
  }

  if tags.is_empty() {
    tags.push(UsageTag::Unknown);
  }
  tags
}

/// Reconcile one harvested assessment. Returns `None` when the assessment
/// has no risk category at all; such records are excluded from snapshots.
pub fn reconcile_record(raw: RawAssessment) -> Option<AssessmentRecord> {
  let risk_category = reconcile_risk(raw.red_list_category.as_deref()?);
  Some(AssessmentRecord {
    year_published: raw.year_published,
    use_and_trade: reconcile_uses(&raw.use_and_trade),
    taxon: raw.taxon,
    locations: raw.locations,
    threats: raw.threats,
    risk_category,
  })
}

/// Reconcile a batch, silently dropping records without a risk category.
pub fn reconcile_records(
  raw: impl IntoIterator<Item = RawAssessment>,
) -> Vec<AssessmentRecord> {
  raw.into_iter().filter_map(reconcile_record).collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::record::{SpeciesId, Taxon};

  fn labels(tags: &[UsageTag]) -> Vec<&'static str> {
    tags.iter().map(|t| t.label()).collect()
  }

  #[test]
  fn historical_codes_collapse() {
    let cases = [
      ("LR/lc", RiskCategory::LeastConcern),
      ("nt", RiskCategory::LittleThreatened),
      ("LR/cd", RiskCategory::LittleThreatened),
      ("V", RiskCategory::Vulnerable),
      ("T", RiskCategory::Endangered),
      ("Ex?", RiskCategory::Extinct),
      ("DD", RiskCategory::NotEvaluated),
      ("CUSTOM", RiskCategory::NotEvaluated),
      ("N/A", RiskCategory::NotEvaluated),
      ("something new", RiskCategory::NotEvaluated),
    ];
    for (raw, expected) in cases {
      assert_eq!(reconcile_risk(raw), expected, "raw code {raw:?}");
    }
  }

  #[test]
  fn risk_reconciliation_is_idempotent() {
    for c in RiskCategory::ALL {
      assert_eq!(reconcile_risk(c.code()), c);
    }
  }

  #[test]
  fn food_variants_merge_preserving_first_appearance() {
    let tags = reconcile_uses(&["Food - human", "Food - animal", "Research"]);
    assert_eq!(labels(&tags), ["Food", "Research"]);
  }

  #[test]
  fn chemicals_and_others_are_added_once() {
    let tags = reconcile_uses(&[
      "Other chemicals",
      "Fibre",
      "Manufacturing chemicals",
      "Poisons",
      "Fuels",
    ]);
    assert_eq!(labels(&tags), ["Chemicals", "Others", "Fuels"]);
  }

  #[test]
  fn empty_and_lone_unknown_become_unknown() {
    let empty: [&str; 0] = [];
    assert_eq!(reconcile_uses(&empty), [UsageTag::Unknown]);
    assert_eq!(reconcile_uses(&["Unknown"]), [UsageTag::Unknown]);
  }

  #[test]
  fn unknown_alongside_other_uses_is_dropped() {
    assert_eq!(reconcile_uses(&["Unknown", "Research"]), [UsageTag::Research]);
    assert_eq!(reconcile_uses(&["Unknown", "Unknown"]), [UsageTag::Unknown]);
  }

  #[test]
  fn usage_reconciliation_is_idempotent() {
    let inputs: [&[&str]; 4] = [
      &["Food - human", "Pets/display animals, horticulture", "Fibre"],
      &["Unknown"],
      &[],
      &["Other chemicals", "Wearing apparel, accessories"],
    ];
    for raw in inputs {
      let once = reconcile_uses(raw);
      let twice = reconcile_uses(&labels(&once));
      assert_eq!(once, twice, "input {raw:?}");
    }
  }

  fn raw(category: Option<&str>) -> RawAssessment {
    RawAssessment {
      year_published:    Some(2012),
      taxon:             Taxon {
        scientific_name: "Panthera onca".into(),
        sis_id:          SpeciesId(15953),
        kingdom_name:    "ANIMALIA".into(),
        phylum_name:     "CHORDATA".into(),
        class_name:      "MAMMALIA".into(),
        order_name:      "CARNIVORA".into(),
        family_name:     "FELIDAE".into(),
      },
      locations:         vec![],
      use_and_trade:     vec!["Food - human".into()],
      threats:           vec!["Hunting & trapping terrestrial animals".into()],
      red_list_category: category.map(str::to_owned),
    }
  }

  #[test]
  fn records_without_category_are_dropped() {
    let records = reconcile_records([raw(Some("LR/nt")), raw(None), raw(Some("K"))]);
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].risk_category, RiskCategory::LittleThreatened);
    assert_eq!(records[1].risk_category, RiskCategory::NotEvaluated);
    assert_eq!(records[0].use_and_trade, [UsageTag::Food]);
  }
}
