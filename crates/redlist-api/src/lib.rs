//! JSON REST API over a Red List snapshot.
//!
//! Exposes an axum [`Router`] serving the dashboard's dropdown listings and
//! usage charts from an in-memory [`Snapshot`]. The snapshot is read-only;
//! reloading it means building a new router.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", redlist_api::api_router(Arc::new(snapshot)))
//! ```

pub mod error;
pub mod listings;
pub mod params;
pub mod species;
pub mod usage;

use std::{path::PathBuf, sync::Arc};

use axum::{Router, routing::get};
use redlist_core::Snapshot;
use serde::Deserialize;

pub use error::ApiError;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `server.toml` and
/// `REDLIST_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:       "127.0.0.1".to_owned(),
      port:       8050,
      store_path: PathBuf::from("redlist.db"),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `snapshot`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router(snapshot: Arc<Snapshot>) -> Router<()> {
  Router::new()
    // Dropdowns
    .route("/taxonomy/{rank}", get(listings::taxonomy))
    .route("/countries", get(listings::countries))
    .route("/years", get(listings::years))
    .route("/species", get(listings::species))
    .route("/categories", get(listings::categories))
    .route("/uses", get(listings::uses))
    // Charts
    .route("/usage", get(usage::accumulated))
    .route("/usage/by/{group}", get(usage::grouped))
    // Single species
    .route("/species/{name}/trajectory", get(species::trajectory))
    .route("/species/{name}/usage", get(species::usage))
    .with_state(snapshot)
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;
  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use redlist_core::{
    category::{RiskCategory, UsageTag},
    record::{AssessmentRecord, Location, Presence, SpeciesId, Taxon},
  };
  use serde_json::{Value, json};
  use tower::ServiceExt;

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

  fn app() -> Router {
    use RiskCategory::*;
    use UsageTag::*;
    let snapshot = Snapshot::from_records(vec![
      record(1, "Chelonia mydas", "REPTILIA", 1996, Endangered, &[Food, Handicrafts], &["Brazil", "Mexico"]),
      record(1, "Chelonia mydas", "REPTILIA", 2004, Endangered, &[Food, Handicrafts], &["Brazil", "Mexico"]),
      record(1, "Chelonia mydas", "REPTILIA", 2023, LeastConcern, &[Food, Handicrafts], &["Brazil", "Mexico"]),
      record(2, "Ara macao", "AVES", 2016, LeastConcern, &[PetsDisplay], &["Mexico"]),
      record(3, "Tapirus terrestris", "MAMMALIA", 2004, Vulnerable, &[Food, Medicine], &["Brazil"]),
    ]);
    api_router(Arc::new(snapshot))
  }

  async fn get_json(uri: &str) -> (StatusCode, Value) {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let resp = app().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
  }

  /// Value reported for `tag` in a chart's `values` array.
  fn value_of(values: &Value, tag: &str) -> f64 {
    values
      .as_array()
      .unwrap()
      .iter()
      .find(|v| v["tag"] == tag)
      .and_then(|v| v["value"].as_f64())
      .unwrap()
  }

  // ── Dropdowns ───────────────────────────────────────────────────────────

  #[tokio::test]
  async fn taxonomy_options_follow_the_parent_selection() {
    let (status, body) = get_json("/taxonomy/class?kingdom=ANIMALIA&phylum=CHORDATA").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!(["REPTILIA", "AVES", "MAMMALIA"]));

    let (_, body) = get_json("/taxonomy/class").await;
    assert_eq!(body, json!([]));
  }

  #[tokio::test]
  async fn unknown_rank_is_a_bad_request() {
    let (status, body) = get_json("/taxonomy/genus").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
  }

  #[tokio::test]
  async fn years_narrow_with_countries() {
    let (_, all) = get_json("/years").await;
    assert_eq!(all, json!([1996, 2004, 2016, 2023]));

    let (_, brazil) = get_json("/years?countries=Brazil").await;
    assert_eq!(brazil, json!([1996, 2004, 2023]));
  }

  #[tokio::test]
  async fn static_listings() {
    let (_, countries) = get_json("/countries").await;
    assert_eq!(countries, json!(["Brazil", "Mexico"]));

    let (_, categories) = get_json("/categories").await;
    assert_eq!(categories.as_array().unwrap().len(), 9);
    assert_eq!(categories[0]["code"], "NE");
    assert_eq!(categories[8]["code"], "EX");

    let (_, uses) = get_json("/uses").await;
    assert_eq!(uses.as_array().unwrap().len(), 11);
    assert_eq!(uses[0], "Food");
  }

  // ── Charts ──────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn accumulated_usage_counts_species() {
    let (status, body) = get_json("/usage").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mode"], "absolute");
    assert_eq!(body["total"], 5);
    assert_eq!(body["values"].as_array().unwrap().len(), 11);
    assert_eq!(value_of(&body["values"], "Food"), 2.0);
    assert_eq!(value_of(&body["values"], "Research"), 0.0);
  }

  #[tokio::test]
  async fn accumulated_usage_in_percentage_mode() {
    let (_, body) = get_json("/usage?countries=Brazil&percentage=true").await;
    assert_eq!(body["mode"], "percentage");
    assert_eq!(body["total"], 4);
    assert_eq!(value_of(&body["values"], "Food"), 50.0);
    assert_eq!(value_of(&body["values"], "Medicine - human & veterinary"), 25.0);
  }

  #[tokio::test]
  async fn invalid_year_is_a_bad_request() {
    let (status, _) = get_json("/usage?years=2004,soon").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn usage_grouped_by_explicit_countries() {
    let (status, body) = get_json("/usage/by/country?keys=Brazil,Mexico").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["group_by"], "country");

    let groups = body["groups"].as_array().unwrap();
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0]["key"], "Brazil");
    assert_eq!(value_of(&groups[0]["values"], "Food"), 2.0);
    assert_eq!(groups[1]["key"], "Mexico");
    assert_eq!(value_of(&groups[1]["values"], "Food"), 1.0);
    assert_eq!(value_of(&groups[1]["values"], "Pets/display animals, horticulture"), 1.0);
  }

  #[tokio::test]
  async fn usage_grouped_by_risk_defaults_to_every_category() {
    let (_, body) = get_json("/usage/by/risk").await;
    let groups = body["groups"].as_array().unwrap();
    assert_eq!(groups.len(), 9);

    let endangered = groups.iter().find(|g| g["key"] == "EN").unwrap();
    assert_eq!(value_of(&endangered["values"], "Food"), 1.0);
    let extinct = groups.iter().find(|g| g["key"] == "EX").unwrap();
    assert_eq!(value_of(&extinct["values"], "Food"), 0.0);
  }

  #[tokio::test]
  async fn unknown_group_key_is_a_bad_request() {
    let (status, _) = get_json("/usage/by/risk?keys=XX").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get_json("/usage/by/decade").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  // ── Single species ──────────────────────────────────────────────────────

  #[tokio::test]
  async fn trajectory_is_forward_filled() {
    let (status, body) =
      get_json("/species/Tapirus%20terrestris/trajectory?through=2006").await;
    assert_eq!(status, StatusCode::OK);
    let points = body.as_array().unwrap();
    assert_eq!(points.len(), 3);
    assert_eq!(points[0]["year"], 2004);
    assert_eq!(points[2]["year"], 2006);
    assert_eq!(points[2]["category"], "VU");
  }

  #[tokio::test]
  async fn trajectory_beyond_the_current_year_is_a_bad_request() {
    let (status, body) =
      get_json("/species/Tapirus%20terrestris/trajectory?through=2147483647").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("2147483647"));
  }

  #[tokio::test]
  async fn unknown_species_is_not_found() {
    let (status, body) = get_json("/species/Nobody%20here/trajectory").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("Nobody here"));

    let (status, _) = get_json("/species/Nobody%20here/usage").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn species_usage_chart() {
    let (_, body) = get_json("/species/Ara%20macao/usage").await;
    assert_eq!(body["total"], 1);
    assert_eq!(value_of(&body["values"], "Pets/display animals, horticulture"), 1.0);
  }
}
