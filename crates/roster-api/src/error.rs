//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  /// Field-level validation failures, reported together.
  #[error("invalid input: {}", .0.join("; "))]
  Invalid(Vec<String>),

  /// Carries the short message shown to staff; the cause is only logged.
  #[error("media host error: {message}")]
  Media {
    message: String,
    #[source]
    source:  BoxError,
  },

  #[error("store error: {message}")]
  Store {
    message: String,
    #[source]
    source:  BoxError,
  },
}

impl From<roster_core::Error> for ApiError {
  fn from(e: roster_core::Error) -> Self {
    use roster_core::Error as E;
    let message = e.user_message();
    match e {
      E::PersonNotFound(_) | E::StoryNotFound(_) | E::UnknownAssignment(_) => {
        ApiError::NotFound(message)
      }
      E::DanglingPerson(_) => ApiError::Invalid(vec![message]),
      E::Invalid(errors) => ApiError::Invalid(errors.0),
      E::Media(source) => ApiError::Media { message, source },
      E::Store(source) => ApiError::Store { message, source },
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
      ApiError::Invalid(errors) => {
        return (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({ "errors": errors })))
          .into_response();
      }
      ApiError::Media { message, source } => {
        warn!(error = %source, "media host failure");
        (StatusCode::BAD_GATEWAY, message)
      }
      ApiError::Store { message, source } => {
        error!(error = %source, "record store failure");
        (StatusCode::INTERNAL_SERVER_ERROR, message)
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
