//! Async HTTP client wrapping the Vigia JSON API.

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use reqwest::Client;
use std::time::Duration;
use vigia_core::{
  lifecycle::ClassifiedRecord, person::Person, requirement::Requirement,
};

/// Connection settings for the Vigia API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
  pub username: String,
  pub password: String,
}

/// Async HTTP client for the Vigia JSON REST API.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!(
      "{}/api{}",
      self.config.base_url.trim_end_matches('/'),
      path
    )
  }

  fn auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
    if self.config.username.is_empty() {
      req
    } else {
      req.basic_auth(&self.config.username, Some(&self.config.password))
    }
  }

  // ── People & requirements ─────────────────────────────────────────────────

  /// `GET /api/people`
  pub async fn list_people(&self) -> Result<Vec<Person>> {
    let resp = self
      .auth(self.client.get(self.url("/people")))
      .send()
      .await
      .context("GET /people failed")?;

    if !resp.status().is_success() {
      return Err(anyhow!("GET /people → {}", resp.status()));
    }
    resp.json().await.context("deserialising people")
  }

  /// `GET /api/requirements`
  pub async fn list_requirements(&self) -> Result<Vec<Requirement>> {
    let resp = self
      .auth(self.client.get(self.url("/requirements")))
      .send()
      .await
      .context("GET /requirements failed")?;

    if !resp.status().is_success() {
      return Err(anyhow!("GET /requirements → {}", resp.status()));
    }
    resp.json().await.context("deserialising requirements")
  }

  // ── Records ───────────────────────────────────────────────────────────────

  /// `GET /api/records?today=<day>` — classified against `today` so every
  /// row in the table shares one reference day.
  pub async fn list_records(&self, today: NaiveDate) -> Result<Vec<ClassifiedRecord>> {
    let resp = self
      .auth(self.client.get(self.url("/records")))
      .query(&[("today", today.format("%Y-%m-%d").to_string())])
      .send()
      .await
      .context("GET /records failed")?;

    if !resp.status().is_success() {
      return Err(anyhow!("GET /records → {}", resp.status()));
    }
    resp.json().await.context("deserialising records")
  }
}
