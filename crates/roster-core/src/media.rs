//! Photo references and the [`MediaHost`] trait.
//!
//! Binary image data never lives in the record store. A record only holds a
//! [`PhotoRef`] produced by the media host when the upload succeeded.

use std::future::Future;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Default thumbnail size for photo cards, in pixels.
pub const THUMBNAIL_WIDTH: u32 = 150;
pub const THUMBNAIL_HEIGHT: u32 = 200;

/// A stable reference to an image hosted by the media host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoRef {
  pub url:         String,
  /// Host-side identifier, needed to derive thumbnails and to delete.
  pub external_id: String,
  pub width:       u32,
  pub height:      u32,
  pub format:      String,
}

/// An image payload submitted alongside a record.
#[derive(Debug, Clone)]
pub struct ImageUpload {
  /// MIME type, trimmed and lowercased, e.g. `image/png`.
  pub media_type: String,
  pub data:       Bytes,
}

impl ImageUpload {
  pub fn new(media_type: impl AsRef<str>, data: impl Into<Bytes>) -> Self {
    Self {
      media_type: media_type.as_ref().trim().to_ascii_lowercase(),
      data:       data.into(),
    }
  }

  pub fn len(&self) -> usize { self.data.len() }

  pub fn is_empty(&self) -> bool { self.data.is_empty() }

  /// File extension matching the media type; used to name multipart parts.
  pub fn extension(&self) -> &str {
    match self.media_type.as_str() {
      "image/jpeg" | "image/jpg" => "jpg",
      "image/png" => "png",
      "image/webp" => "webp",
      "image/gif" => "gif",
      _ => "bin",
    }
  }
}

/// Abstraction over a remote asset host.
///
/// Upload failures must abort the owning write; delete failures are
/// tolerated by callers and only logged.
pub trait MediaHost: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Upload `image` into `folder` and return its reference.
  fn upload_image<'a>(
    &'a self,
    image: &'a ImageUpload,
    folder: &'a str,
  ) -> impl Future<Output = Result<PhotoRef, Self::Error>> + Send + 'a;

  /// Delete the asset with the given host-side id.
  fn delete_image<'a>(
    &'a self,
    external_id: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// A resized rendition URL, if the host supports on-the-fly transforms.
  fn thumbnail_url(&self, _external_id: &str, _width: u32, _height: u32) -> Option<String> {
    None
  }
}
