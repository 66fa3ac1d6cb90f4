//! Media host connection settings.

use serde::Deserialize;

fn default_api_base() -> String { "https://api.cloudinary.com/v1_1".to_owned() }

fn default_delivery_base() -> String { "https://res.cloudinary.com".to_owned() }

fn default_timeout_secs() -> u64 { 30 }

/// The `[media]` table of the server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MediaConfig {
  pub cloud_name:    String,
  /// Unsigned upload preset; lets uploads go through without the secret.
  pub upload_preset: String,
  /// Needed only for deletion.
  #[serde(default)]
  pub api_key:       Option<String>,
  #[serde(default)]
  pub api_secret:    Option<String>,
  #[serde(default = "default_api_base")]
  pub api_base:      String,
  #[serde(default = "default_delivery_base")]
  pub delivery_base: String,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs:  u64,
}

impl MediaConfig {
  pub fn new(cloud_name: impl Into<String>, upload_preset: impl Into<String>) -> Self {
    Self {
      cloud_name:    cloud_name.into(),
      upload_preset: upload_preset.into(),
      api_key:       None,
      api_secret:    None,
      api_base:      default_api_base(),
      delivery_base: default_delivery_base(),
      timeout_secs:  default_timeout_secs(),
    }
  }

  pub fn can_delete(&self) -> bool { self.api_key.is_some() && self.api_secret.is_some() }
}
