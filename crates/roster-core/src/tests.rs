//! Tests for [`Roster`] over a [`MemoryStore`] and a scripted media host.

use std::sync::{
  Arc, Mutex,
  atomic::{AtomicBool, AtomicUsize, Ordering},
};

use tokio::sync::Notify;
use uuid::Uuid;

use crate::{
  Error, PhotoChange, Roster,
  media::{ImageUpload, MediaHost, PhotoRef},
  memory::{MemoryError, MemoryStore},
  person::{NewPerson, Person, PersonDraft, PersonUpdate},
  store::RosterStore,
  story::{NewStory, Story, StoryDraft},
  validate::UploadLimits,
};

// ─── Scripted media host ─────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
#[error("media host unavailable")]
struct MediaDown;

#[derive(Default)]
struct ScriptedMedia {
  fail_uploads: AtomicBool,
  fail_deletes: AtomicBool,
  counter:      AtomicUsize,
  uploads:      Mutex<Vec<String>>,
  deletes:      Mutex<Vec<String>>,
}

impl ScriptedMedia {
  fn uploads(&self) -> Vec<String> { self.uploads.lock().unwrap().clone() }

  fn deletes(&self) -> Vec<String> { self.deletes.lock().unwrap().clone() }
}

impl MediaHost for ScriptedMedia {
  type Error = MediaDown;

  async fn upload_image(&self, _image: &ImageUpload, folder: &str) -> Result<PhotoRef, MediaDown> {
    if self.fail_uploads.load(Ordering::SeqCst) {
      return Err(MediaDown);
    }
    let n = self.counter.fetch_add(1, Ordering::SeqCst);
    let external_id = format!("{folder}/img{n}");
    self.uploads.lock().unwrap().push(external_id.clone());
    Ok(PhotoRef {
      url: format!("https://media.test/{external_id}.png"),
      external_id,
      width: 300,
      height: 400,
      format: "png".into(),
    })
  }

  async fn delete_image(&self, external_id: &str) -> Result<(), MediaDown> {
    self.deletes.lock().unwrap().push(external_id.to_owned());
    if self.fail_deletes.load(Ordering::SeqCst) {
      return Err(MediaDown);
    }
    Ok(())
  }
}

// ─── Gated store ─────────────────────────────────────────────────────────────

/// A [`MemoryStore`] whose writes can be made to fail and whose next listing
/// can be held until the test releases it.
#[derive(Default)]
struct GatedStore {
  inner:       MemoryStore,
  fail_writes: AtomicBool,
  hold_list:   AtomicBool,
  entered:     Notify,
  release:     Notify,
}

impl GatedStore {
  fn check_write(&self) -> Result<(), MemoryError> {
    if self.fail_writes.load(Ordering::SeqCst) {
      return Err(MemoryError::Offline);
    }
    Ok(())
  }
}

impl RosterStore for GatedStore {
  type Error = MemoryError;

  async fn list_persons(&self) -> Result<Vec<Person>, MemoryError> {
    let persons = self.inner.list_persons().await?;
    if self.hold_list.swap(false, Ordering::SeqCst) {
      self.entered.notify_one();
      self.release.notified().await;
    }
    Ok(persons)
  }

  async fn get_person(&self, id: Uuid) -> Result<Option<Person>, MemoryError> {
    self.inner.get_person(id).await
  }

  async fn person_by_submission_key(&self, key: String) -> Result<Option<Person>, MemoryError> {
    self.inner.person_by_submission_key(key).await
  }

  async fn add_person(&self, input: NewPerson) -> Result<Person, MemoryError> {
    self.check_write()?;
    self.inner.add_person(input).await
  }

  async fn update_person(
    &self,
    id: Uuid,
    update: PersonUpdate,
  ) -> Result<Option<Person>, MemoryError> {
    self.check_write()?;
    self.inner.update_person(id, update).await
  }

  async fn delete_person(&self, id: Uuid) -> Result<bool, MemoryError> {
    self.check_write()?;
    self.inner.delete_person(id).await
  }

  async fn add_assignment(&self, id: Uuid, tag: String) -> Result<Option<Person>, MemoryError> {
    self.check_write()?;
    self.inner.add_assignment(id, tag).await
  }

  async fn remove_assignment(&self, id: Uuid, tag: String) -> Result<Option<Person>, MemoryError> {
    self.check_write()?;
    self.inner.remove_assignment(id, tag).await
  }

  async fn list_stories(&self) -> Result<Vec<Story>, MemoryError> { self.inner.list_stories().await }

  async fn get_story(&self, id: Uuid) -> Result<Option<Story>, MemoryError> {
    self.inner.get_story(id).await
  }

  async fn story_for_person(&self, person_id: Uuid) -> Result<Option<Story>, MemoryError> {
    self.inner.story_for_person(person_id).await
  }

  async fn add_story(&self, input: NewStory) -> Result<Story, MemoryError> {
    self.check_write()?;
    self.inner.add_story(input).await
  }

  async fn update_story(&self, id: Uuid, input: NewStory) -> Result<Option<Story>, MemoryError> {
    self.check_write()?;
    self.inner.update_story(id, input).await
  }

  async fn delete_story(&self, id: Uuid) -> Result<bool, MemoryError> {
    self.check_write()?;
    self.inner.delete_story(id).await
  }
}

// ─── Fixtures ────────────────────────────────────────────────────────────────

fn roster() -> (Roster<MemoryStore, ScriptedMedia>, MemoryStore, Arc<ScriptedMedia>) {
  let store = MemoryStore::new();
  let media = Arc::new(ScriptedMedia::default());
  let roster = Roster::new(Arc::new(store.clone()), media.clone(), UploadLimits::default());
  (roster, store, media)
}

fn gated_roster() -> (Arc<Roster<GatedStore, ScriptedMedia>>, Arc<GatedStore>, Arc<ScriptedMedia>) {
  let store = Arc::new(GatedStore::default());
  let media = Arc::new(ScriptedMedia::default());
  let roster = Arc::new(Roster::new(store.clone(), media.clone(), UploadLimits::default()));
  (roster, store, media)
}

fn draft(name: &str) -> PersonDraft {
  PersonDraft {
    name: name.into(),
    full_name: format!("{name} da Silva"),
    category: "Agente".into(),
    ..PersonDraft::default()
  }
}

fn png() -> ImageUpload { ImageUpload::new("image/png", vec![0x89, b'P', b'N', b'G']) }

// ─── Persons ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_without_photo_persists_record() {
  let (roster, store, media) = roster();

  let person = roster.create_person(&draft("Ana"), None, None).await.unwrap();
  assert!(person.photo.is_none());
  assert!(media.uploads().is_empty());

  let stored = store.get_person(person.person_id).await.unwrap().unwrap();
  assert_eq!(stored.profile.full_name, "Ana da Silva");
}

#[tokio::test]
async fn create_with_photo_stores_reference() {
  let (roster, _store, media) = roster();

  let person = roster.create_person(&draft("Ana"), Some(png()), None).await.unwrap();
  let photo = person.photo.unwrap();
  assert_eq!(photo.external_id, "personnel/img0");
  assert_eq!(media.uploads(), ["personnel/img0"]);
}

#[tokio::test]
async fn failed_upload_aborts_create() {
  let (roster, store, media) = roster();
  media.fail_uploads.store(true, Ordering::SeqCst);

  let err = roster.create_person(&draft("Ana"), Some(png()), None).await.unwrap_err();
  assert!(matches!(err, Error::Media(_)));
  assert!(store.list_persons().await.unwrap().is_empty());
}

#[tokio::test]
async fn invalid_input_never_reaches_adapters() {
  let (roster, store, media) = roster();

  let bad = PersonDraft { name: "A".into(), ..draft("Ana") };
  let pdf = ImageUpload::new("application/pdf", vec![1, 2, 3]);
  let err = roster.create_person(&bad, Some(pdf), None).await.unwrap_err();

  match err {
    Error::Invalid(errors) => assert_eq!(errors.0.len(), 2, "{errors:?}"),
    other => panic!("expected validation errors, got {other:?}"),
  }
  assert!(media.uploads().is_empty());
  assert!(store.list_persons().await.unwrap().is_empty());
}

#[tokio::test]
async fn repeated_submission_key_returns_existing_person() {
  let (roster, store, media) = roster();
  let key = Some("form-123".to_owned());

  let first = roster.create_person(&draft("Ana"), Some(png()), key.clone()).await.unwrap();
  let second = roster.create_person(&draft("Ana"), Some(png()), key).await.unwrap();

  assert_eq!(first.person_id, second.person_id);
  assert_eq!(store.list_persons().await.unwrap().len(), 1);
  assert_eq!(media.uploads().len(), 1);
}

#[tokio::test]
async fn delete_succeeds_when_photo_delete_fails() {
  let (roster, store, media) = roster();
  let person = roster.create_person(&draft("Ana"), Some(png()), None).await.unwrap();
  media.fail_deletes.store(true, Ordering::SeqCst);

  roster.delete_person(person.person_id).await.unwrap();

  assert!(store.get_person(person.person_id).await.unwrap().is_none());
  assert_eq!(media.deletes(), ["personnel/img0"]);
}

#[tokio::test]
async fn delete_unknown_person_is_not_found() {
  let (roster, _store, _media) = roster();
  let id = Uuid::new_v4();
  assert!(matches!(roster.delete_person(id).await, Err(Error::PersonNotFound(x)) if x == id));
}

#[tokio::test]
async fn replacing_photo_releases_old_asset_after_write() {
  let (roster, _store, media) = roster();
  let person = roster.create_person(&draft("Ana"), Some(png()), None).await.unwrap();

  let updated = roster
    .update_person(person.person_id, &draft("Ana"), PhotoChange::Replace(png()))
    .await
    .unwrap();

  assert_eq!(updated.photo.unwrap().external_id, "personnel/img1");
  assert_eq!(media.deletes(), ["personnel/img0"]);
}

#[tokio::test]
async fn failed_replacement_upload_leaves_record_untouched() {
  let (roster, store, media) = roster();
  let person = roster.create_person(&draft("Ana"), Some(png()), None).await.unwrap();
  media.fail_uploads.store(true, Ordering::SeqCst);

  let renamed = PersonDraft { full_name: "Ana Renomeada".into(), ..draft("Ana") };
  let err = roster
    .update_person(person.person_id, &renamed, PhotoChange::Replace(png()))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Media(_)));

  let stored = store.get_person(person.person_id).await.unwrap().unwrap();
  assert_eq!(stored.profile.full_name, "Ana da Silva");
  assert_eq!(stored.photo, person.photo);
  assert!(media.deletes().is_empty());
}

#[tokio::test]
async fn keep_and_remove_photo_on_update() {
  let (roster, _store, media) = roster();
  let person = roster.create_person(&draft("Ana"), Some(png()), None).await.unwrap();

  let kept = roster
    .update_person(person.person_id, &draft("Ana"), PhotoChange::Keep)
    .await
    .unwrap();
  assert_eq!(kept.photo, person.photo);
  assert!(media.deletes().is_empty());

  let removed = roster
    .update_person(person.person_id, &draft("Ana"), PhotoChange::Remove)
    .await
    .unwrap();
  assert!(removed.photo.is_none());
  assert_eq!(media.deletes(), ["personnel/img0"]);
}

#[tokio::test]
async fn assignments_are_vocabulary_checked() {
  let (roster, _store, _media) = roster();
  let person = roster.create_person(&draft("Ana"), None, None).await.unwrap();

  let tagged = roster.assign(person.person_id, "Imprensa").await.unwrap();
  assert!(tagged.has_assignment("Imprensa"));

  let untagged = roster.unassign(person.person_id, "Imprensa").await.unwrap();
  assert!(untagged.assignments.is_empty());

  assert!(matches!(
    roster.assign(person.person_id, "Cozinha").await,
    Err(Error::UnknownAssignment(_))
  ));
}

#[tokio::test]
async fn failed_write_after_upload_releases_fresh_asset() {
  let (roster, store, media) = gated_roster();
  store.fail_writes.store(true, Ordering::SeqCst);

  let err = roster.create_person(&draft("Ana"), Some(png()), None).await.unwrap_err();
  assert!(matches!(err, Error::Store(_)));
  assert_eq!(media.uploads(), ["personnel/img0"]);
  assert_eq!(media.deletes(), ["personnel/img0"]);
  assert!(store.inner.list_persons().await.unwrap().is_empty());
}

#[tokio::test]
async fn failed_update_releases_replacement_and_keeps_old_photo() {
  let (roster, store, media) = gated_roster();
  let person = roster.create_person(&draft("Ana"), Some(png()), None).await.unwrap();
  store.fail_writes.store(true, Ordering::SeqCst);

  let err = roster
    .update_person(person.person_id, &draft("Ana"), PhotoChange::Replace(png()))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Store(_)));
  assert_eq!(media.deletes(), ["personnel/img1"]);

  let stored = store.inner.get_person(person.person_id).await.unwrap().unwrap();
  assert_eq!(stored.photo, person.photo);
}

// ─── Snapshot / cache ────────────────────────────────────────────────────────

#[tokio::test]
async fn snapshot_of_unreachable_store_is_empty_with_message() {
  let (roster, store, _media) = roster();
  store.set_offline(true);

  let snap = roster.snapshot().await;
  assert!(snap.persons.is_empty());
  assert!(snap.error.is_some());
}

#[tokio::test]
async fn snapshot_serves_stale_listing_when_store_fails() {
  let (roster, store, _media) = roster();
  roster.create_person(&draft("Ana"), None, None).await.unwrap();
  assert_eq!(roster.snapshot().await.persons.len(), 1);

  roster.invalidate();
  store.set_offline(true);

  let snap = roster.snapshot().await;
  assert_eq!(snap.persons.len(), 1);
  assert!(snap.error.is_some());
}

#[tokio::test]
async fn writes_invalidate_the_cache() {
  let (roster, _store, _media) = roster();
  assert!(roster.snapshot().await.persons.is_empty());

  roster.create_person(&draft("Bruno"), None, None).await.unwrap();
  roster.create_person(&draft("Ana"), None, None).await.unwrap();

  let names: Vec<_> = roster
    .snapshot()
    .await
    .persons
    .into_iter()
    .map(|p| p.profile.name)
    .collect();
  assert_eq!(names, ["Ana", "Bruno"]);
}

#[tokio::test]
async fn write_during_reload_is_not_hidden_by_the_cache() {
  let (roster, store, _media) = gated_roster();
  store.hold_list.store(true, Ordering::SeqCst);

  // Starts reading the (still empty) roster, then parks.
  let reload = tokio::spawn({
    let roster = roster.clone();
    async move { roster.snapshot().await }
  });
  store.entered.notified().await;

  roster.create_person(&draft("Ana"), None, None).await.unwrap();
  store.release.notify_one();
  assert!(reload.await.unwrap().persons.is_empty());

  let names: Vec<_> = roster
    .snapshot()
    .await
    .persons
    .into_iter()
    .map(|p| p.profile.name)
    .collect();
  assert_eq!(names, ["Ana"]);
}

// ─── Stories ─────────────────────────────────────────────────────────────────

fn story_draft(person_id: Uuid) -> StoryDraft {
  StoryDraft {
    person_id: Some(person_id),
    text: "Chegou ao clube com onze anos.".into(),
    quote: Some("Nunca desistir".into()),
  }
}

#[tokio::test]
async fn story_for_unknown_person_is_rejected() {
  let (roster, store, _media) = roster();
  let ghost = Uuid::new_v4();

  let err = roster.create_story(&story_draft(ghost), None).await.unwrap_err();
  assert!(matches!(err, Error::DanglingPerson(id) if id == ghost));
  assert!(store.list_stories().await.unwrap().is_empty());
}

#[tokio::test]
async fn deleting_person_leaves_story_in_place() {
  let (roster, _store, _media) = roster();
  let person = roster.create_person(&draft("Ana"), None, None).await.unwrap();
  let story = roster.create_story(&story_draft(person.person_id), None).await.unwrap();

  roster.delete_person(person.person_id).await.unwrap();

  let kept = roster.story_for_person(person.person_id).await.unwrap().unwrap();
  assert_eq!(kept.story_id, story.story_id);
}

#[tokio::test]
async fn story_photo_lifecycle() {
  let (roster, _store, media) = roster();
  let person = roster.create_person(&draft("Ana"), None, None).await.unwrap();

  let story = roster
    .create_story(&story_draft(person.person_id), Some(png()))
    .await
    .unwrap();
  assert_eq!(story.photo.as_ref().unwrap().external_id, "stories/img0");

  let edited = StoryDraft { text: "Texto revisado da história.".into(), ..story_draft(person.person_id) };
  let updated = roster.update_story(story.story_id, &edited, PhotoChange::Keep).await.unwrap();
  assert_eq!(updated.photo, story.photo);
  assert_eq!(updated.text, "Texto revisado da história.");

  roster.delete_story(story.story_id).await.unwrap();
  assert_eq!(media.deletes(), ["stories/img0"]);
  assert!(matches!(roster.story(story.story_id).await, Err(Error::StoryNotFound(_))));
}

#[tokio::test]
async fn failed_story_update_releases_replacement() {
  let (roster, store, media) = gated_roster();
  let person = roster.create_person(&draft("Ana"), None, None).await.unwrap();
  let story = roster
    .create_story(&story_draft(person.person_id), Some(png()))
    .await
    .unwrap();
  store.fail_writes.store(true, Ordering::SeqCst);

  let err = roster
    .update_story(story.story_id, &story_draft(person.person_id), PhotoChange::Replace(png()))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Store(_)));
  assert_eq!(media.deletes(), ["stories/img1"]);
  assert_eq!(roster.story(story.story_id).await.unwrap().photo, story.photo);
}
