//! Async HTTP client for the roster JSON API.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqwest::{Client, RequestBuilder, StatusCode};
use roster_core::{roster::RosterSnapshot, story::Story};
use uuid::Uuid;

/// Connection settings for the roster API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
  pub username: String,
  pub password: String,
}

/// Async HTTP client for the roster API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
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
    format!("{}/api{}", self.config.base_url.trim_end_matches('/'), path)
  }

  fn auth(&self, builder: RequestBuilder) -> RequestBuilder {
    builder.basic_auth(&self.config.username, Some(&self.config.password))
  }

  /// `GET /api/persons`
  ///
  /// The whole roster; filtering happens locally.
  pub async fn list_persons(&self) -> Result<RosterSnapshot> {
    let resp = self
      .auth(self.client.get(self.url("/persons")))
      .send()
      .await
      .context("GET /persons failed")?;

    if !resp.status().is_success() {
      return Err(anyhow!("GET /persons → {}", resp.status()));
    }
    resp.json().await.context("deserialising roster")
  }

  /// `POST /api/refresh`
  pub async fn refresh(&self) -> Result<RosterSnapshot> {
    let resp = self
      .auth(self.client.post(self.url("/refresh")))
      .send()
      .await
      .context("POST /refresh failed")?;

    if !resp.status().is_success() {
      return Err(anyhow!("POST /refresh → {}", resp.status()));
    }
    resp.json().await.context("deserialising roster")
  }

  /// `GET /api/persons/<id>/story`; `None` when the person has no story.
  pub async fn story_for_person(&self, person_id: Uuid) -> Result<Option<Story>> {
    let resp = self
      .auth(self.client.get(self.url(&format!("/persons/{person_id}/story"))))
      .send()
      .await
      .with_context(|| format!("GET /persons/{person_id}/story failed"))?;

    match resp.status() {
      StatusCode::NOT_FOUND => Ok(None),
      s if s.is_success() => resp.json().await.map(Some).context("deserialising story"),
      s => Err(anyhow!("GET /persons/{person_id}/story → {s}")),
    }
  }
}
