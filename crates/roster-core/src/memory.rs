//! [`MemoryStore`], a process-local [`RosterStore`].
//!
//! Used by tests and local demos. It can be switched offline to simulate an
//! unreachable backend.

use std::{
  collections::HashMap,
  sync::{
    Arc, Mutex, MutexGuard, PoisonError,
    atomic::{AtomicBool, Ordering},
  },
};

use chrono::Utc;
use uuid::Uuid;

use crate::{
  person::{NewPerson, Person, PersonUpdate},
  store::RosterStore,
  story::{NewStory, Story},
};

#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
  #[error("store is offline")]
  Offline,
}

#[derive(Default)]
struct State {
  persons:         Vec<Person>,
  submission_keys: HashMap<String, Uuid>,
  stories:         Vec<Story>,
}

/// Cloning is cheap; clones share the same data.
#[derive(Clone, Default)]
pub struct MemoryStore {
  state:   Arc<Mutex<State>>,
  offline: Arc<AtomicBool>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  /// While offline every call fails with [`MemoryError::Offline`].
  pub fn set_offline(&self, offline: bool) { self.offline.store(offline, Ordering::SeqCst); }

  fn lock(&self) -> Result<MutexGuard<'_, State>, MemoryError> {
    if self.offline.load(Ordering::SeqCst) {
      return Err(MemoryError::Offline);
    }
    Ok(self.state.lock().unwrap_or_else(PoisonError::into_inner))
  }
}

impl RosterStore for MemoryStore {
  type Error = MemoryError;

  async fn list_persons(&self) -> Result<Vec<Person>, MemoryError> {
    let mut persons = self.lock()?.persons.clone();
    persons.sort_by(|a, b| a.profile.name.cmp(&b.profile.name));
    Ok(persons)
  }

  async fn get_person(&self, id: Uuid) -> Result<Option<Person>, MemoryError> {
    Ok(self.lock()?.persons.iter().find(|p| p.person_id == id).cloned())
  }

  async fn person_by_submission_key(&self, key: String) -> Result<Option<Person>, MemoryError> {
    let state = self.lock()?;
    Ok(
      state
        .submission_keys
        .get(&key)
        .and_then(|id| state.persons.iter().find(|p| p.person_id == *id))
        .cloned(),
    )
  }

  async fn add_person(&self, input: NewPerson) -> Result<Person, MemoryError> {
    let mut state = self.lock()?;

    if let Some(key) = &input.submission_key
      && let Some(existing) = state
        .submission_keys
        .get(key)
        .and_then(|id| state.persons.iter().find(|p| p.person_id == *id))
    {
      return Ok(existing.clone());
    }

    let now = Utc::now();
    let person = Person {
      person_id:   Uuid::new_v4(),
      profile:     input.profile,
      photo:       input.photo,
      assignments: input.assignments,
      created_at:  now,
      updated_at:  now,
    };
    if let Some(key) = input.submission_key {
      state.submission_keys.insert(key, person.person_id);
    }
    state.persons.push(person.clone());
    Ok(person)
  }

  async fn update_person(
    &self,
    id: Uuid,
    update: PersonUpdate,
  ) -> Result<Option<Person>, MemoryError> {
    let mut state = self.lock()?;
    Ok(state.persons.iter_mut().find(|p| p.person_id == id).map(|p| {
      p.profile = update.profile;
      p.photo = update.photo;
      p.assignments = update.assignments;
      p.updated_at = Utc::now();
      p.clone()
    }))
  }

  async fn delete_person(&self, id: Uuid) -> Result<bool, MemoryError> {
    let mut state = self.lock()?;
    let before = state.persons.len();
    state.persons.retain(|p| p.person_id != id);
    state.submission_keys.retain(|_, v| *v != id);
    Ok(state.persons.len() != before)
  }

  async fn add_assignment(&self, id: Uuid, tag: String) -> Result<Option<Person>, MemoryError> {
    let mut state = self.lock()?;
    Ok(state.persons.iter_mut().find(|p| p.person_id == id).map(|p| {
      if p.assignments.insert(tag) {
        p.updated_at = Utc::now();
      }
      p.clone()
    }))
  }

  async fn remove_assignment(&self, id: Uuid, tag: String) -> Result<Option<Person>, MemoryError> {
    let mut state = self.lock()?;
    Ok(state.persons.iter_mut().find(|p| p.person_id == id).map(|p| {
      if p.assignments.remove(&tag) {
        p.updated_at = Utc::now();
      }
      p.clone()
    }))
  }

  async fn list_stories(&self) -> Result<Vec<Story>, MemoryError> { Ok(self.lock()?.stories.clone()) }

  async fn get_story(&self, id: Uuid) -> Result<Option<Story>, MemoryError> {
    Ok(self.lock()?.stories.iter().find(|s| s.story_id == id).cloned())
  }

  async fn story_for_person(&self, person_id: Uuid) -> Result<Option<Story>, MemoryError> {
    Ok(self.lock()?.stories.iter().find(|s| s.person_id == person_id).cloned())
  }

  async fn add_story(&self, input: NewStory) -> Result<Story, MemoryError> {
    let now = Utc::now();
    let story = Story {
      story_id:   Uuid::new_v4(),
      person_id:  input.person_id,
      text:       input.text,
      quote:      input.quote,
      photo:      input.photo,
      created_at: now,
      updated_at: now,
    };
    self.lock()?.stories.push(story.clone());
    Ok(story)
  }

  async fn update_story(&self, id: Uuid, input: NewStory) -> Result<Option<Story>, MemoryError> {
    let mut state = self.lock()?;
    Ok(state.stories.iter_mut().find(|s| s.story_id == id).map(|s| {
      s.person_id = input.person_id;
      s.text = input.text;
      s.quote = input.quote;
      s.photo = input.photo;
      s.updated_at = Utc::now();
      s.clone()
    }))
  }

  async fn delete_story(&self, id: Uuid) -> Result<bool, MemoryError> {
    let mut state = self.lock()?;
    let before = state.stories.len();
    state.stories.retain(|s| s.story_id != id);
    Ok(state.stories.len() != before)
  }
}
