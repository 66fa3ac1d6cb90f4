//! Error types and axum `IntoResponse` implementation.

use axum::{
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unauthorized")]
  Unauthorized,

  #[error("store error: {0}")]
  Store(#[from] roster_store_sqlite::Error),

  #[error("media host error: {0}")]
  Media(#[from] roster_media::Error),
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    match self {
      Error::Unauthorized => {
        let mut res = (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
        res.headers_mut().insert(
          header::WWW_AUTHENTICATE,
          HeaderValue::from_static("Basic realm=\"roster\""),
        );
        res
      }
      Error::Store(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
      Error::Media(e) => (StatusCode::BAD_GATEWAY, e.to_string()).into_response(),
    }
  }
}
