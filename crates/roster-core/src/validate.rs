//! Form validation for drafts and image uploads.
//!
//! Every function returns the full list of human-readable problems; an empty
//! list means the input is valid. Validation never stops at the first error.

use chrono::NaiveDate;
use serde::Serialize;

use crate::{
  category::{Category, PersonKind, is_known_assignment},
  media::ImageUpload,
  person::{BloodType, PersonDraft},
  story::StoryDraft,
};

pub const MIN_NAME_CHARS: usize = 2;
pub const MIN_STORY_CHARS: usize = 10;

/// Default ceiling for a single image upload (5 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

pub const SUPPORTED_IMAGE_TYPES: [&str; 5] =
  ["image/jpeg", "image/jpg", "image/png", "image/webp", "image/gif"];

/// The accumulated errors of a rejected draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{}", .0.join("; "))]
pub struct ValidationErrors(pub Vec<String>);

/// Upload constraints shared by every code path that accepts images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadLimits {
  pub max_bytes: usize,
}

impl Default for UploadLimits {
  fn default() -> Self { Self { max_bytes: DEFAULT_MAX_UPLOAD_BYTES } }
}

// ─── Persons ─────────────────────────────────────────────────────────────────

/// Validate a person draft. `today` bounds the birth date.
pub fn validate_person(draft: &PersonDraft, today: NaiveDate) -> Vec<String> {
  let mut errors = Vec::new();

  if draft.name.trim().chars().count() < MIN_NAME_CHARS {
    errors.push(format!("name must be at least {MIN_NAME_CHARS} characters"));
  }
  if draft.full_name.trim().chars().count() < MIN_NAME_CHARS {
    errors.push(format!("full name must be at least {MIN_NAME_CHARS} characters"));
  }

  let category = draft.category.trim();
  let kind = if category.is_empty() {
    errors.push("category is required".to_owned());
    None
  } else {
    match category.parse::<Category>() {
      Ok(c) => Some(c.kind()),
      Err(e) => {
        errors.push(e.to_string());
        None
      }
    }
  };

  match parse_optional_date(&draft.birth_date) {
    Ok(Some(date)) if date > today => {
      errors.push("birth date cannot be in the future".to_owned());
    }
    Ok(_) => {}
    Err(e) => errors.push(e),
  }

  if let Err(e) = parse_optional_date(&draft.admission_date) {
    errors.push(e);
  }

  let has_registration = draft
    .registration
    .as_deref()
    .is_some_and(|r| !r.trim().is_empty());
  if kind == Some(PersonKind::Employee) && !has_registration {
    errors.push("registration is required for employees".to_owned());
  }

  if let Some(bt) = draft.blood_type.as_deref().map(str::trim).filter(|s| !s.is_empty())
    && let Err(e) = bt.parse::<BloodType>()
  {
    errors.push(e);
  }

  for tag in &draft.assignments {
    if !is_known_assignment(tag.trim()) {
      errors.push(format!("unknown assignment: {tag:?}"));
    }
  }

  errors
}

// ─── Stories ─────────────────────────────────────────────────────────────────

pub fn validate_story(draft: &StoryDraft) -> Vec<String> {
  let mut errors = Vec::new();

  if draft.person_id.is_none() {
    errors.push("a person must be selected".to_owned());
  }
  if draft.text.trim().chars().count() < MIN_STORY_CHARS {
    errors.push(format!("story must be at least {MIN_STORY_CHARS} characters"));
  }

  errors
}

// ─── Images ──────────────────────────────────────────────────────────────────

pub fn validate_image(image: &ImageUpload, limits: UploadLimits) -> Vec<String> {
  let mut errors = Vec::new();
  let media_type = image.media_type.as_str();

  if !media_type.starts_with("image/") {
    errors.push("file must be an image".to_owned());
  } else if !SUPPORTED_IMAGE_TYPES.contains(&media_type) {
    errors.push("unsupported image format; use JPG, PNG, WEBP or GIF".to_owned());
  }

  if image.is_empty() {
    errors.push("image is empty".to_owned());
  } else if image.len() > limits.max_bytes {
    errors.push(format!("image must be at most {}", human_size(limits.max_bytes)));
  }

  errors
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Parse an optional `YYYY-MM-DD` form field; blank counts as absent.
pub fn parse_optional_date(field: &Option<String>) -> Result<Option<NaiveDate>, String> {
  match field.as_deref().map(str::trim) {
    None | Some("") => Ok(None),
    Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
      .map(Some)
      .map_err(|_| format!("{s:?} is not a valid date (expected YYYY-MM-DD)")),
  }
}

fn human_size(bytes: usize) -> String {
  const MIB: usize = 1024 * 1024;
  if bytes % MIB == 0 {
    format!("{}MB", bytes / MIB)
  } else {
    format!("{bytes} bytes")
  }
}
