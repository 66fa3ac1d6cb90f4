//! Photo payloads carried inside JSON request bodies.
//!
//! Image bytes travel base64-encoded so that a record and its photo arrive
//! in one request; the handler decodes them before anything is uploaded.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use roster_core::{PhotoChange, media::ImageUpload};
use serde::Deserialize;

use crate::error::ApiError;

/// `{"media_type": "image/png", "data": "<base64>"}`
#[derive(Debug, Clone, Deserialize)]
pub struct PhotoBody {
  pub media_type: String,
  pub data:       String,
}

impl PhotoBody {
  pub fn decode(self) -> Result<ImageUpload, ApiError> {
    let bytes = STANDARD
      .decode(self.data.trim())
      .map_err(|e| ApiError::Invalid(vec![format!("photo data is not valid base64: {e}")]))?;
    Ok(ImageUpload::new(self.media_type, bytes))
  }
}

/// What an update does to the stored photo:
/// `"keep"`, `"remove"`, or `{"replace": PhotoBody}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhotoField {
  #[default]
  Keep,
  Remove,
  Replace(PhotoBody),
}

impl PhotoField {
  pub fn into_change(self) -> Result<PhotoChange, ApiError> {
    Ok(match self {
      PhotoField::Keep => PhotoChange::Keep,
      PhotoField::Remove => PhotoChange::Remove,
      PhotoField::Replace(body) => PhotoChange::Replace(body.decode()?),
    })
  }
}

pub fn decode_optional(photo: Option<PhotoBody>) -> Result<Option<ImageUpload>, ApiError> {
  photo.map(PhotoBody::decode).transpose()
}
