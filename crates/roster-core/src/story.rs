//! Stories: free-text life narratives attached to a person.
//!
//! The link to the person is a soft reference: it is checked when a story is
//! written, but deleting the person leaves the story in place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  media::PhotoRef,
  validate::{self, ValidationErrors},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Story {
  pub story_id:   Uuid,
  pub person_id:  Uuid,
  pub text:       String,
  /// Caption shown under the illustrative photo.
  pub quote:      Option<String>,
  pub photo:      Option<PhotoRef>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Input to [`RosterStore::add_story`](crate::store::RosterStore::add_story)
/// and [`RosterStore::update_story`](crate::store::RosterStore::update_story).
#[derive(Debug, Clone)]
pub struct NewStory {
  pub person_id: Uuid,
  pub text:      String,
  pub quote:     Option<String>,
  pub photo:     Option<PhotoRef>,
}

/// Unvalidated story form state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoryDraft {
  pub person_id: Option<Uuid>,
  pub text:      String,
  pub quote:     Option<String>,
}

impl StoryDraft {
  /// Validate and build a [`NewStory`] without a photo.
  pub fn build(&self) -> Result<NewStory, ValidationErrors> {
    let errors = validate::validate_story(self);
    match self.person_id {
      Some(person_id) if errors.is_empty() => Ok(NewStory {
        person_id,
        text: self.text.trim().to_owned(),
        quote: self
          .quote
          .as_deref()
          .map(str::trim)
          .filter(|q| !q.is_empty())
          .map(str::to_owned),
        photo: None,
      }),
      _ => Err(ValidationErrors(errors)),
    }
  }
}

impl From<&Story> for StoryDraft {
  fn from(s: &Story) -> Self {
    StoryDraft {
      person_id: Some(s.person_id),
      text:      s.text.clone(),
      quote:     s.quote.clone(),
    }
  }
}
