//! Encoding and decoding helpers between roster domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings, UUIDs hyphenated lowercase strings.
//! Structured fields (profile, photo reference, assignment set) are compact
//! JSON.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use roster_core::{
  media::PhotoRef,
  person::{Person, Profile},
  story::Story,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Profile ─────────────────────────────────────────────────────────────────

pub fn encode_profile(p: &Profile) -> Result<String> { Ok(serde_json::to_string(p)?) }

// ─── PhotoRef ────────────────────────────────────────────────────────────────

pub fn encode_photo(photo: Option<&PhotoRef>) -> Result<Option<String>> {
  Ok(photo.map(serde_json::to_string).transpose()?)
}

fn decode_photo(s: Option<&str>) -> Result<Option<PhotoRef>> {
  Ok(s.map(serde_json::from_str).transpose()?)
}

// ─── Assignments ─────────────────────────────────────────────────────────────

pub fn encode_assignments(tags: &BTreeSet<String>) -> Result<String> {
  Ok(serde_json::to_string(tags)?)
}

pub fn decode_assignments(s: &str) -> Result<BTreeSet<String>> { Ok(serde_json::from_str(s)?) }

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `persons` row.
pub struct RawPerson {
  pub person_id:    String,
  pub profile_json: String,
  pub photo_json:   Option<String>,
  pub assignments:  String,
  pub created_at:   String,
  pub updated_at:   String,
}

impl RawPerson {
  pub fn into_person(self) -> Result<Person> {
    Ok(Person {
      person_id:   decode_uuid(&self.person_id)?,
      profile:     serde_json::from_str(&self.profile_json)?,
      photo:       decode_photo(self.photo_json.as_deref())?,
      assignments: decode_assignments(&self.assignments)?,
      created_at:  decode_dt(&self.created_at)?,
      updated_at:  decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read directly from a `stories` row.
pub struct RawStory {
  pub story_id:   String,
  pub person_id:  String,
  pub text:       String,
  pub quote:      Option<String>,
  pub photo_json: Option<String>,
  pub created_at: String,
  pub updated_at: String,
}

impl RawStory {
  pub fn into_story(self) -> Result<Story> {
    Ok(Story {
      story_id:   decode_uuid(&self.story_id)?,
      person_id:  decode_uuid(&self.person_id)?,
      text:       self.text,
      quote:      self.quote,
      photo:      decode_photo(self.photo_json.as_deref())?,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}
