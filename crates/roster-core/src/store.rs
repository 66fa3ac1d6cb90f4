//! The `RosterStore` trait, the record store boundary.
//!
//! Implemented by storage backends (`roster-store-sqlite`, and the in-memory
//! [`MemoryStore`](crate::memory::MemoryStore)). Higher layers depend on this
//! abstraction, never on a concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  person::{NewPerson, Person, PersonUpdate},
  story::{NewStory, Story},
};

/// Abstraction over the persistent person and story collections.
///
/// Stores assign ids and the `created_at`/`updated_at` timestamps. Person
/// listings are ordered by `name`, ascending, comparing bytes (so the order
/// is case-sensitive).
pub trait RosterStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Persons ───────────────────────────────────────────────────────────

  /// All persons, ordered by name.
  fn list_persons(&self) -> impl Future<Output = Result<Vec<Person>, Self::Error>> + Send + '_;

  fn get_person(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + '_;

  /// Look up the person created by an earlier submission with `key`.
  fn person_by_submission_key(
    &self,
    key: String,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + '_;

  /// Persist a new person. If `input.submission_key` was already used, the
  /// existing person is returned and nothing is written.
  fn add_person(
    &self,
    input: NewPerson,
  ) -> impl Future<Output = Result<Person, Self::Error>> + Send + '_;

  /// Replace a person's editable state. Returns `None` if `id` is unknown.
  fn update_person(
    &self,
    id: Uuid,
    update: PersonUpdate,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + '_;

  /// Returns `false` if `id` was not present.
  fn delete_person(&self, id: Uuid) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Add `tag` to the person's assignment set (no-op if present).
  fn add_assignment(
    &self,
    id: Uuid,
    tag: String,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + '_;

  /// Remove `tag` from the person's assignment set (no-op if absent).
  fn remove_assignment(
    &self,
    id: Uuid,
    tag: String,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + '_;

  // ── Stories ───────────────────────────────────────────────────────────

  /// All stories, oldest first.
  fn list_stories(&self) -> impl Future<Output = Result<Vec<Story>, Self::Error>> + Send + '_;

  fn get_story(&self, id: Uuid) -> impl Future<Output = Result<Option<Story>, Self::Error>> + Send + '_;

  /// The oldest story referencing `person_id`, if any.
  fn story_for_person(
    &self,
    person_id: Uuid,
  ) -> impl Future<Output = Result<Option<Story>, Self::Error>> + Send + '_;

  fn add_story(&self, input: NewStory) -> impl Future<Output = Result<Story, Self::Error>> + Send + '_;

  fn update_story(
    &self,
    id: Uuid,
    input: NewStory,
  ) -> impl Future<Output = Result<Option<Story>, Self::Error>> + Send + '_;

  fn delete_story(&self, id: Uuid) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}
