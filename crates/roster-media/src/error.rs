//! Error type for `roster-media`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  /// The host answered with a non-success status.
  #[error("media host rejected request ({status}): {message}")]
  Rejected { status: u16, message: String },

  /// No API credentials are configured, so assets cannot be deleted.
  #[error("asset deletion is not configured")]
  DeletionUnavailable,

  #[error("unexpected destroy result: {0:?}")]
  UnexpectedResult(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
