//! [`Roster`]: the repository object that fronts the record store and the
//! media host.
//!
//! It owns the cached roster used by list views and enforces the ordering
//! rules between record writes and asset writes:
//!
//! - uploads happen before the record write, and a failed upload aborts it;
//! - asset deletions happen after the record no longer references the asset,
//!   and their failure is logged, never returned.

use std::sync::{Arc, PoisonError, RwLock};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
  Error, Result,
  category::is_known_assignment,
  filter::RosterFilter,
  media::{ImageUpload, MediaHost, PhotoRef},
  person::{NewPerson, Person, PersonDraft, PersonUpdate},
  store::RosterStore,
  story::{Story, StoryDraft},
  validate::{UploadLimits, ValidationErrors, validate_image, validate_person, validate_story},
};

/// Media-host folder for person photos.
pub const PERSON_FOLDER: &str = "personnel";
/// Media-host folder for story photos.
pub const STORY_FOLDER: &str = "stories";

/// What to do with a record's photo on update.
#[derive(Debug, Clone, Default)]
pub enum PhotoChange {
  #[default]
  Keep,
  Replace(ImageUpload),
  Remove,
}

/// A roster listing as shown to staff. When the store could not be reached,
/// `persons` holds the last good listing (or nothing) and `error` says why.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RosterSnapshot {
  pub persons: Vec<Person>,
  pub error:   Option<String>,
}

#[derive(Default)]
struct Cache {
  persons:    Vec<Person>,
  fresh:      bool,
  /// Bumped by every invalidation. A reload only marks the cache fresh if
  /// no invalidation happened while it was reading.
  generation: u64,
}

pub struct Roster<S, M> {
  store:  Arc<S>,
  media:  Arc<M>,
  limits: UploadLimits,
  cache:  RwLock<Cache>,
}

impl<S, M> Roster<S, M>
where
  S: RosterStore,
  M: MediaHost,
{
  pub fn new(store: Arc<S>, media: Arc<M>, limits: UploadLimits) -> Self {
    Self { store, media, limits, cache: RwLock::new(Cache::default()) }
  }

  pub fn store(&self) -> &S { &self.store }

  pub fn media(&self) -> &M { &self.media }

  pub fn limits(&self) -> UploadLimits { self.limits }

  // ── Cache ─────────────────────────────────────────────────────────────────

  /// Reload the roster from the store. On failure the cache is untouched.
  ///
  /// A write that lands while the listing is being read leaves the reloaded
  /// data stale, so the next [`snapshot`](Self::snapshot) reads again.
  pub async fn refresh(&self) -> Result<Vec<Person>> {
    let generation = self.cache.read().unwrap_or_else(PoisonError::into_inner).generation;
    let persons = self.store.list_persons().await.map_err(Error::store)?;

    let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
    cache.persons = persons.clone();
    if cache.generation == generation {
      cache.fresh = true;
      debug!(count = persons.len(), "roster refreshed");
    } else {
      debug!(count = persons.len(), "roster changed during reload; left stale");
    }
    Ok(persons)
  }

  /// Mark the cached roster as stale; the next [`snapshot`](Self::snapshot)
  /// reloads it.
  pub fn invalidate(&self) {
    let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
    cache.fresh = false;
    cache.generation = cache.generation.wrapping_add(1);
  }

  /// The current roster. Never fails: a load error yields the stale listing
  /// plus a user-facing message.
  pub async fn snapshot(&self) -> RosterSnapshot {
    {
      let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
      if cache.fresh {
        return RosterSnapshot { persons: cache.persons.clone(), error: None };
      }
    }

    match self.refresh().await {
      Ok(persons) => RosterSnapshot { persons, error: None },
      Err(e) => {
        warn!(error = %e, "failed to load roster; serving cached listing");
        let persons = self
          .cache
          .read()
          .unwrap_or_else(PoisonError::into_inner)
          .persons
          .clone();
        RosterSnapshot { persons, error: Some(e.user_message()) }
      }
    }
  }

  /// A snapshot narrowed by `filter`.
  pub async fn view(&self, filter: &RosterFilter) -> RosterSnapshot {
    let snapshot = self.snapshot().await;
    let persons = filter.apply(&snapshot.persons).into_iter().cloned().collect();
    RosterSnapshot { persons, error: snapshot.error }
  }

  // ── Persons ───────────────────────────────────────────────────────────────

  pub async fn person(&self, id: Uuid) -> Result<Person> {
    self
      .store
      .get_person(id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::PersonNotFound(id))
  }

  /// Validate, upload the photo (if any), then persist.
  ///
  /// A `submission_key` seen before returns the person stored by that
  /// earlier submission without uploading or writing anything.
  pub async fn create_person(
    &self,
    draft: &PersonDraft,
    photo: Option<ImageUpload>,
    submission_key: Option<String>,
  ) -> Result<Person> {
    let today = Utc::now().date_naive();
    let mut errors = validate_person(draft, today);
    if let Some(image) = &photo {
      errors.extend(validate_image(image, self.limits));
    }
    if !errors.is_empty() {
      return Err(ValidationErrors(errors).into());
    }
    let (profile, assignments) = draft.build(today)?;

    if let Some(key) = &submission_key
      && let Some(existing) = self
        .store
        .person_by_submission_key(key.clone())
        .await
        .map_err(Error::store)?
    {
      info!(person_id = %existing.person_id, "repeated submission; returning stored person");
      return Ok(existing);
    }

    let uploaded = match &photo {
      Some(image) => Some(self.upload(image, PERSON_FOLDER).await?),
      None => None,
    };

    let input = NewPerson { profile, photo: uploaded.clone(), assignments, submission_key };
    let person = match self.store.add_person(input).await {
      Ok(p) => p,
      Err(e) => {
        if let Some(photo) = &uploaded {
          self.release_photo(photo).await;
        }
        return Err(Error::store(e));
      }
    };

    // A racing submission with the same key won; our asset is unreferenced.
    if let Some(photo) = &uploaded
      && person.photo.as_ref() != Some(photo)
    {
      self.release_photo(photo).await;
    }

    self.invalidate();
    info!(person_id = %person.person_id, category = %person.category(), "person created");
    Ok(person)
  }

  pub async fn update_person(
    &self,
    id: Uuid,
    draft: &PersonDraft,
    change: PhotoChange,
  ) -> Result<Person> {
    let today = Utc::now().date_naive();
    let mut errors = validate_person(draft, today);
    if let PhotoChange::Replace(image) = &change {
      errors.extend(validate_image(image, self.limits));
    }
    if !errors.is_empty() {
      return Err(ValidationErrors(errors).into());
    }
    let (profile, assignments) = draft.build(today)?;

    let existing = self.person(id).await?;
    let (photo, uploaded) = match &change {
      PhotoChange::Keep => (existing.photo.clone(), None),
      PhotoChange::Remove => (None, None),
      PhotoChange::Replace(image) => {
        let photo = self.upload(image, PERSON_FOLDER).await?;
        (Some(photo.clone()), Some(photo))
      }
    };

    let update = PersonUpdate { profile, photo: photo.clone(), assignments };
    let written = match self.store.update_person(id, update).await {
      Ok(Some(p)) => Ok(p),
      Ok(None) => Err(Error::PersonNotFound(id)),
      Err(e) => Err(Error::store(e)),
    };
    let updated = match written {
      Ok(p) => p,
      Err(e) => {
        if let Some(fresh) = &uploaded {
          self.release_photo(fresh).await;
        }
        return Err(e);
      }
    };

    if let Some(old) = &existing.photo
      && photo.as_ref() != Some(old)
    {
      self.release_photo(old).await;
    }

    self.invalidate();
    info!(person_id = %id, "person updated");
    Ok(updated)
  }

  /// Delete the record, then release its photo. Stories are left in place.
  pub async fn delete_person(&self, id: Uuid) -> Result<()> {
    let person = self.person(id).await?;
    if !self.store.delete_person(id).await.map_err(Error::store)? {
      return Err(Error::PersonNotFound(id));
    }
    if let Some(photo) = &person.photo {
      self.release_photo(photo).await;
    }
    self.invalidate();
    info!(person_id = %id, "person deleted");
    Ok(())
  }

  pub async fn assign(&self, id: Uuid, tag: &str) -> Result<Person> {
    if !is_known_assignment(tag) {
      return Err(Error::UnknownAssignment(tag.to_owned()));
    }
    let person = self
      .store
      .add_assignment(id, tag.to_owned())
      .await
      .map_err(Error::store)?
      .ok_or(Error::PersonNotFound(id))?;
    self.invalidate();
    info!(person_id = %id, assignment = tag, "assignment added");
    Ok(person)
  }

  pub async fn unassign(&self, id: Uuid, tag: &str) -> Result<Person> {
    if !is_known_assignment(tag) {
      return Err(Error::UnknownAssignment(tag.to_owned()));
    }
    let person = self
      .store
      .remove_assignment(id, tag.to_owned())
      .await
      .map_err(Error::store)?
      .ok_or(Error::PersonNotFound(id))?;
    self.invalidate();
    info!(person_id = %id, assignment = tag, "assignment removed");
    Ok(person)
  }

  // ── Stories ───────────────────────────────────────────────────────────────

  pub async fn stories(&self) -> Result<Vec<Story>> {
    self.store.list_stories().await.map_err(Error::store)
  }

  pub async fn story(&self, id: Uuid) -> Result<Story> {
    self
      .store
      .get_story(id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::StoryNotFound(id))
  }

  pub async fn story_for_person(&self, person_id: Uuid) -> Result<Option<Story>> {
    self.store.story_for_person(person_id).await.map_err(Error::store)
  }

  pub async fn create_story(&self, draft: &StoryDraft, photo: Option<ImageUpload>) -> Result<Story> {
    let mut input = self.checked_story(draft, photo.as_ref()).await?;

    if let Some(image) = &photo {
      input.photo = Some(self.upload(image, STORY_FOLDER).await?);
    }

    let uploaded = input.photo.clone();
    match self.store.add_story(input).await {
      Ok(story) => {
        info!(story_id = %story.story_id, person_id = %story.person_id, "story created");
        Ok(story)
      }
      Err(e) => {
        if let Some(photo) = &uploaded {
          self.release_photo(photo).await;
        }
        Err(Error::store(e))
      }
    }
  }

  pub async fn update_story(
    &self,
    id: Uuid,
    draft: &StoryDraft,
    change: PhotoChange,
  ) -> Result<Story> {
    let image = match &change {
      PhotoChange::Replace(image) => Some(image),
      _ => None,
    };
    let mut input = self.checked_story(draft, image).await?;
    let existing = self.story(id).await?;

    let mut uploaded = None;
    input.photo = match &change {
      PhotoChange::Keep => existing.photo.clone(),
      PhotoChange::Remove => None,
      PhotoChange::Replace(image) => {
        let photo = self.upload(image, STORY_FOLDER).await?;
        uploaded = Some(photo.clone());
        Some(photo)
      }
    };
    let photo = input.photo.clone();

    let written = match self.store.update_story(id, input).await {
      Ok(Some(s)) => Ok(s),
      Ok(None) => Err(Error::StoryNotFound(id)),
      Err(e) => Err(Error::store(e)),
    };
    let updated = match written {
      Ok(s) => s,
      Err(e) => {
        if let Some(fresh) = &uploaded {
          self.release_photo(fresh).await;
        }
        return Err(e);
      }
    };

    if let Some(old) = &existing.photo
      && photo.as_ref() != Some(old)
    {
      self.release_photo(old).await;
    }

    info!(story_id = %id, "story updated");
    Ok(updated)
  }

  pub async fn delete_story(&self, id: Uuid) -> Result<()> {
    let story = self.story(id).await?;
    if !self.store.delete_story(id).await.map_err(Error::store)? {
      return Err(Error::StoryNotFound(id));
    }
    if let Some(photo) = &story.photo {
      self.release_photo(photo).await;
    }
    info!(story_id = %id, "story deleted");
    Ok(())
  }

  // ── Helpers ───────────────────────────────────────────────────────────────

  /// Validate a story draft and its optional photo, and check that the
  /// referenced person exists.
  async fn checked_story(
    &self,
    draft: &StoryDraft,
    photo: Option<&ImageUpload>,
  ) -> Result<crate::story::NewStory> {
    let mut errors = validate_story(draft);
    if let Some(image) = photo {
      errors.extend(validate_image(image, self.limits));
    }
    if !errors.is_empty() {
      return Err(ValidationErrors(errors).into());
    }
    let input = draft.build()?;

    if self
      .store
      .get_person(input.person_id)
      .await
      .map_err(Error::store)?
      .is_none()
    {
      return Err(Error::DanglingPerson(input.person_id));
    }
    Ok(input)
  }

  async fn upload(&self, image: &ImageUpload, folder: &str) -> Result<PhotoRef> {
    match self.media.upload_image(image, folder).await {
      Ok(photo) => {
        debug!(external_id = %photo.external_id, folder, "photo uploaded");
        Ok(photo)
      }
      Err(e) => {
        warn!(error = %e, folder, "photo upload failed; record not saved");
        Err(Error::media(e))
      }
    }
  }

  /// Best-effort asset deletion.
  async fn release_photo(&self, photo: &PhotoRef) {
    match self.media.delete_image(&photo.external_id).await {
      Ok(()) => debug!(external_id = %photo.external_id, "photo deleted"),
      Err(e) => warn!(
        external_id = %photo.external_id,
        error = %e,
        "failed to delete photo; asset left orphaned"
      ),
    }
  }
}
