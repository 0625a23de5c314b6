//! The remote assessment API and the classification of its responses.

use std::{future::Future, time::Duration};

use redlist_core::record::SpeciesId;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::debug;

use crate::{Result, config::HarvestConfig};

/// The classified result of one request.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
  /// `200` with a parsed JSON body.
  Found(Value),
  /// `200` whose body is not JSON. Handled like an absent entity.
  Malformed(String),
  /// `404`: the entity does not exist. Never retried.
  NotFound,
  /// Any other status; treated as a rate limit.
  RateLimited { status: u16 },
  /// The request did not produce a usable response at all.
  Failed(String),
}

impl FetchOutcome {
  pub fn is_found(&self) -> bool { matches!(self, Self::Found(_)) }

  /// Whether the cooldown protocol applies.
  pub fn is_transient(&self) -> bool {
    matches!(self, Self::RateLimited { .. } | Self::Failed(_))
  }
}

/// Read access to the two endpoints a harvest uses.
///
/// Implementations never fail outright; every failure is folded into a
/// [`FetchOutcome`].
pub trait RedListApi: Send + Sync {
  /// `GET /taxa/sis/{id}`, a taxon and the ids of its assessments.
  fn taxon(&self, id: SpeciesId) -> impl Future<Output = FetchOutcome> + Send + '_;

  /// `GET /assessment/{id}`, one full assessment.
  fn assessment(&self, id: u64) -> impl Future<Output = FetchOutcome> + Send + '_;
}

/// [`RedListApi`] over HTTP.
///
/// Cheap to clone: the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct HttpApi {
  client:   Client,
  base_url: String,
  token:    String,
}

impl HttpApi {
  pub fn new(config: &HarvestConfig) -> Result<Self> {
    let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
    Ok(Self {
      client,
      base_url: config.base_url.trim_end_matches('/').to_owned(),
      token: config.token.clone(),
    })
  }

  async fn get(&self, path: String) -> FetchOutcome {
    let url = format!("{}{}", self.base_url, path);
    debug!(%url, "GET");

    let resp = match self
      .client
      .get(&url)
      .header(reqwest::header::AUTHORIZATION, &self.token)
      .send()
      .await
    {
      Ok(resp) => resp,
      Err(e) => return FetchOutcome::Failed(e.to_string()),
    };

    match resp.status() {
      StatusCode::OK => match resp.json().await {
        Ok(body) => FetchOutcome::Found(body),
        Err(e) => FetchOutcome::Malformed(format!("decoding {url}: {e}")),
      },
      StatusCode::NOT_FOUND => FetchOutcome::NotFound,
      status => FetchOutcome::RateLimited { status: status.as_u16() },
    }
  }
}

impl RedListApi for HttpApi {
  async fn taxon(&self, id: SpeciesId) -> FetchOutcome {
    self.get(format!("/taxa/sis/{id}")).await
  }

  async fn assessment(&self, id: u64) -> FetchOutcome {
    self.get(format!("/assessment/{id}")).await
  }
}
