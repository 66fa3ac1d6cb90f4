//! Error types for `roster-core`.

use thiserror::Error;
use uuid::Uuid;

use crate::validate::ValidationErrors;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
  #[error("person not found: {0}")]
  PersonNotFound(Uuid),

  #[error("story not found: {0}")]
  StoryNotFound(Uuid),

  /// A story was written against a person id the store does not know.
  #[error("story refers to unknown person {0}")]
  DanglingPerson(Uuid),

  #[error("unknown assignment: {0:?}")]
  UnknownAssignment(String),

  #[error("invalid input: {0}")]
  Invalid(#[from] ValidationErrors),

  #[error("record store error: {0}")]
  Store(#[source] BoxError),

  #[error("media host error: {0}")]
  Media(#[source] BoxError),
}

impl Error {
  pub fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Error::Store(Box::new(e))
  }

  pub fn media(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Error::Media(Box::new(e))
  }

  /// A short message suitable for showing to staff in place of the data.
  pub fn user_message(&self) -> String {
    match self {
      Error::Store(_) => "Could not load data from the record store. Try again.".to_owned(),
      Error::Media(_) => "Photo upload failed. Try again.".to_owned(),
      other => other.to_string(),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
