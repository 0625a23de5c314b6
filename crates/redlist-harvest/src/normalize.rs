//! Projection of raw API payloads onto [`RawAssessment`].
//!
//! The remote payloads carry far more than the dashboard needs. Only the
//! fields below are kept; a missing required field is a typed
//! [`NormalizeError`] that the worker treats like an absent assessment.

use redlist_core::record::{Location, RawAssessment, SpeciesId, Taxon};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
  #[error("missing field `{0}`")]
  Missing(&'static str),

  #[error("field `{field}` is not {expected}")]
  WrongType {
    field:    &'static str,
    expected: &'static str,
  },
}

type Result<T, E = NormalizeError> = std::result::Result<T, E>;

fn field<'a>(value: &'a Value, name: &'static str) -> Result<&'a Value> {
  match value.get(name) {
    None | Some(Value::Null) => Err(NormalizeError::Missing(name)),
    Some(v) => Ok(v),
  }
}

fn string(value: &Value, name: &'static str) -> Result<String> {
  field(value, name)?
    .as_str()
    .map(str::to_owned)
    .ok_or(NormalizeError::WrongType { field: name, expected: "a string" })
}

/// Integers sometimes arrive as numeric strings.
fn integer(value: &Value) -> Option<i64> {
  match value {
    Value::Number(n) => n.as_i64(),
    Value::String(s) => s.trim().parse().ok(),
    _ => None,
  }
}

fn array<'a>(value: &'a Value, name: &'static str) -> Result<&'a [Value]> {
  match value.get(name) {
    None => Err(NormalizeError::Missing(name)),
    Some(Value::Null) => Ok(&[]),
    Some(Value::Array(items)) => Ok(items),
    Some(_) => Err(NormalizeError::WrongType { field: name, expected: "a list" }),
  }
}

/// `item.description.en`, the English label used by every list entry.
fn description(item: &Value, list: &'static str) -> Result<String> {
  item
    .get("description")
    .and_then(|d| d.get("en"))
    .and_then(Value::as_str)
    .map(str::to_owned)
    .ok_or(NormalizeError::Missing(list))
}

fn taxon(payload: &Value) -> Result<Taxon> {
  let taxon = field(payload, "taxon")?;
  let sis_id = integer(field(taxon, "sis_id")?)
    .and_then(|id| u64::try_from(id).ok())
    .ok_or(NormalizeError::WrongType {
      field:    "sis_id",
      expected: "a positive integer",
    })?;

  Ok(Taxon {
    scientific_name: string(taxon, "scientific_name")?,
    sis_id:          SpeciesId(sis_id),
    kingdom_name:    string(taxon, "kingdom_name")?,
    phylum_name:     string(taxon, "phylum_name")?,
    class_name:      string(taxon, "class_name")?,
    order_name:      string(taxon, "order_name")?,
    family_name:     string(taxon, "family_name")?,
  })
}

/// Project one assessment payload.
pub fn normalize(payload: &Value) -> Result<RawAssessment> {
  let year_published = payload
    .get("year_published")
    .and_then(integer)
    .and_then(|y| i32::try_from(y).ok());

  let locations = array(payload, "locations")?
    .iter()
    .map(|item| {
      Ok(Location {
        country:  description(item, "locations")?,
        presence: string(item, "presence")?.into(),
      })
    })
    .collect::<Result<Vec<_>>>()?;

  let use_and_trade = array(payload, "use_and_trade")?
    .iter()
    .map(|item| description(item, "use_and_trade"))
    .collect::<Result<Vec<_>>>()?;

  let threats = array(payload, "threats")?
    .iter()
    .map(|item| description(item, "threats"))
    .collect::<Result<Vec<_>>>()?;

  let red_list_category = payload
    .get("red_list_category")
    .and_then(|c| c.get("code"))
    .and_then(Value::as_str)
    .map(str::to_owned);

  Ok(RawAssessment {
    year_published,
    taxon: taxon(payload)?,
    locations,
    use_and_trade,
    threats,
    red_list_category,
  })
}

/// The assessment ids listed by a taxon payload, in payload order.
pub fn assessment_ids(entity: &Value) -> Result<Vec<u64>> {
  array(entity, "assessments")?
    .iter()
    .map(|a| {
      integer(field(a, "assessment_id")?)
        .and_then(|id| u64::try_from(id).ok())
        .ok_or(NormalizeError::WrongType {
          field:    "assessment_id",
          expected: "a positive integer",
        })
    })
    .collect()
}
