//! Cloudinary-style media host adapter.
//!
//! Uploads go through an unsigned upload preset. Deletion needs the API key
//! and secret and is therefore only available on the trusted server; each
//! destroy call is signed with SHA-256 over the sorted request parameters.

pub mod config;
pub mod error;

use std::time::Duration;

use chrono::Utc;
use reqwest::{
  Client,
  multipart::{Form, Part},
};
use roster_core::media::{ImageUpload, MediaHost, PhotoRef};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::debug;

pub use config::MediaConfig;
pub use error::{Error, Result};

#[derive(Deserialize)]
struct UploadResponse {
  secure_url: String,
  public_id:  String,
  width:      u32,
  height:     u32,
  format:     String,
}

#[derive(Deserialize)]
struct DestroyResponse {
  result: String,
}

#[derive(Deserialize)]
struct ErrorBody {
  error: ErrorMessage,
}

#[derive(Deserialize)]
struct ErrorMessage {
  message: String,
}

/// Sign request parameters: sort by name, join as `k=v&k=v`, append the
/// secret, and hex-encode the SHA-256 digest.
pub fn sign_params(params: &[(&str, &str)], secret: &str) -> String {
  let mut sorted = params.to_vec();
  sorted.sort_by(|a, b| a.0.cmp(b.0));
  let joined = sorted
    .iter()
    .map(|(k, v)| format!("{k}={v}"))
    .collect::<Vec<_>>()
    .join("&");

  let mut hasher = Sha256::new();
  hasher.update(joined.as_bytes());
  hasher.update(secret.as_bytes());
  hex::encode(hasher.finalize())
}

/// HTTP client for the media host. Cheap to clone.
#[derive(Clone)]
pub struct CloudinaryHost {
  client: Client,
  config: MediaConfig,
}

impl CloudinaryHost {
  pub fn new(config: MediaConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()?;
    Ok(Self { client, config })
  }

  pub fn config(&self) -> &MediaConfig { &self.config }

  fn endpoint(&self, action: &str) -> String {
    format!(
      "{}/{}/image/{action}",
      self.config.api_base.trim_end_matches('/'),
      self.config.cloud_name
    )
  }

  async fn rejected(resp: reqwest::Response) -> Error {
    let status = resp.status().as_u16();
    let text = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
      .map(|b| b.error.message)
      .unwrap_or(text);
    Error::Rejected { status, message }
  }
}

impl MediaHost for CloudinaryHost {
  type Error = Error;

  async fn upload_image(&self, image: &ImageUpload, folder: &str) -> Result<PhotoRef> {
    let part = Part::bytes(image.data.to_vec())
      .file_name(format!("upload.{}", image.extension()))
      .mime_str(&image.media_type)?;
    let form = Form::new()
      .part("file", part)
      .text("upload_preset", self.config.upload_preset.clone())
      .text("folder", folder.to_owned());

    let resp = self
      .client
      .post(self.endpoint("upload"))
      .multipart(form)
      .send()
      .await?;
    if !resp.status().is_success() {
      return Err(Self::rejected(resp).await);
    }

    let body: UploadResponse = resp.json().await?;
    debug!(public_id = %body.public_id, bytes = image.len(), "image uploaded");
    Ok(PhotoRef {
      url:         body.secure_url,
      external_id: body.public_id,
      width:       body.width,
      height:      body.height,
      format:      body.format,
    })
  }

  async fn delete_image(&self, external_id: &str) -> Result<()> {
    let (Some(api_key), Some(api_secret)) = (&self.config.api_key, &self.config.api_secret) else {
      return Err(Error::DeletionUnavailable);
    };

    let timestamp = Utc::now().timestamp().to_string();
    let signature =
      sign_params(&[("public_id", external_id), ("timestamp", timestamp.as_str())], api_secret);
    let form = [
      ("public_id", external_id),
      ("timestamp", timestamp.as_str()),
      ("api_key", api_key.as_str()),
      ("signature", signature.as_str()),
      ("signature_algorithm", "sha256"),
    ];

    let resp = self
      .client
      .post(self.endpoint("destroy"))
      .form(&form)
      .send()
      .await?;
    if !resp.status().is_success() {
      return Err(Self::rejected(resp).await);
    }

    let body: DestroyResponse = resp.json().await?;
    match body.result.as_str() {
      "ok" | "not found" => {
        debug!(public_id = external_id, result = %body.result, "image destroyed");
        Ok(())
      }
      _ => Err(Error::UnexpectedResult(body.result)),
    }
  }

  fn thumbnail_url(&self, external_id: &str, width: u32, height: u32) -> Option<String> {
    Some(format!(
      "{}/{}/image/upload/w_{width},h_{height},c_fill,q_auto,f_auto/{external_id}",
      self.config.delivery_base.trim_end_matches('/'),
      self.config.cloud_name
    ))
  }
}
