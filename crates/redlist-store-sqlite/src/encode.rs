//! Encoding and decoding helpers between the domain types and the plain
//! column values stored in SQLite.
//!
//! Species ids are stored as `INTEGER`, risk categories as their canonical
//! code, usage tags as their label, and list fields as compact JSON.

use redlist_core::{
  category::{RiskCategory, UsageTag},
  index::{CountryRow, UsageRow},
  record::{AssessmentRecord, SpeciesId, Taxon},
};

use crate::{Error, Result};

// ─── Scalars ──────────────────────────────────────────────────────────────────

pub fn encode_species_id(id: SpeciesId) -> Result<i64> {
  i64::try_from(id.0).map_err(|_| Error::Encode {
    column: "species_id",
    value:  id.to_string(),
  })
}

pub fn decode_species_id(v: i64) -> Result<SpeciesId> {
  u64::try_from(v).map(SpeciesId).map_err(|_| Error::Decode {
    column: "species_id",
    value:  v.to_string(),
  })
}

pub fn decode_risk(code: &str) -> Result<RiskCategory> {
  RiskCategory::from_code(code).ok_or_else(|| Error::Decode {
    column: "risk_category",
    value:  code.to_owned(),
  })
}

pub fn decode_tag(label: &str) -> Result<UsageTag> {
  UsageTag::from_label(label).ok_or_else(|| Error::Decode {
    column: "tag",
    value:  label.to_owned(),
  })
}

// ─── Assessments ─────────────────────────────────────────────────────────────

/// One `assessments` row as plain column values.
pub struct RawAssessmentRow {
  pub year_published:  Option<i64>,
  pub scientific_name: String,
  pub sis_id:          i64,
  pub kingdom_name:    String,
  pub phylum_name:     String,
  pub class_name:      String,
  pub order_name:      String,
  pub family_name:     String,
  pub locations:       String,
  pub use_and_trade:   String,
  pub threats:         String,
  pub risk_category:   String,
}

impl RawAssessmentRow {
  pub fn encode(record: &AssessmentRecord) -> Result<Self> {
    let taxon = &record.taxon;
    Ok(Self {
      year_published:  record.year_published.map(i64::from),
      scientific_name: taxon.scientific_name.clone(),
      sis_id:          encode_species_id(taxon.sis_id)?,
      kingdom_name:    taxon.kingdom_name.clone(),
      phylum_name:     taxon.phylum_name.clone(),
      class_name:      taxon.class_name.clone(),
      order_name:      taxon.order_name.clone(),
      family_name:     taxon.family_name.clone(),
      locations:       serde_json::to_string(&record.locations)?,
      use_and_trade:   serde_json::to_string(&record.use_and_trade)?,
      threats:         serde_json::to_string(&record.threats)?,
      risk_category:   record.risk_category.code().to_owned(),
    })
  }

  pub fn into_record(self) -> Result<AssessmentRecord> {
    let year_published = self
      .year_published
      .map(|y| {
        i32::try_from(y).map_err(|_| Error::Decode {
          column: "year_published",
          value:  y.to_string(),
        })
      })
      .transpose()?;

    Ok(AssessmentRecord {
      year_published,
      taxon: Taxon {
        scientific_name: self.scientific_name,
        sis_id:          decode_species_id(self.sis_id)?,
        kingdom_name:    self.kingdom_name,
        phylum_name:     self.phylum_name,
        class_name:      self.class_name,
        order_name:      self.order_name,
        family_name:     self.family_name,
      },
      locations: serde_json::from_str(&self.locations)?,
      use_and_trade: serde_json::from_str(&self.use_and_trade)?,
      threats: serde_json::from_str(&self.threats)?,
      risk_category: decode_risk(&self.risk_category)?,
    })
  }
}

// ─── Relations ───────────────────────────────────────────────────────────────

pub fn decode_usage_row((species_id, tag): (i64, String)) -> Result<UsageRow> {
  Ok(UsageRow {
    species_id: decode_species_id(species_id)?,
    tag:        decode_tag(&tag)?,
  })
}

pub fn decode_country_row((species_id, country): (i64, String)) -> Result<CountryRow> {
  Ok(CountryRow {
    species_id: decode_species_id(species_id)?,
    country,
  })
}
