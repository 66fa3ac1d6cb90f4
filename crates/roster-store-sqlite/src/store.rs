//! [`SqliteStore`], the SQLite implementation of [`RosterStore`].

use std::{collections::BTreeSet, path::Path};

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use roster_core::{
  media::PhotoRef,
  person::{NewPerson, Person, PersonUpdate, Profile},
  store::RosterStore,
  story::{NewStory, Story},
};

use crate::{
  Result,
  encode::{
    RawPerson, RawStory, encode_assignments, encode_dt, encode_photo, encode_profile, encode_uuid,
  },
  error::Error,
  schema::SCHEMA,
};

const PERSON_COLUMNS: &str =
  "person_id, profile_json, photo_json, assignments, created_at, updated_at";

const STORY_COLUMNS: &str =
  "story_id, person_id, text, quote, photo_json, created_at, updated_at";

fn person_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawPerson> {
  Ok(RawPerson {
    person_id:    row.get(0)?,
    profile_json: row.get(1)?,
    photo_json:   row.get(2)?,
    assignments:  row.get(3)?,
    created_at:   row.get(4)?,
    updated_at:   row.get(5)?,
  })
}

fn story_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawStory> {
  Ok(RawStory {
    story_id:   row.get(0)?,
    person_id:  row.get(1)?,
    text:       row.get(2)?,
    quote:      row.get(3)?,
    photo_json: row.get(4)?,
    created_at: row.get(5)?,
    updated_at: row.get(6)?,
  })
}

fn select_person(conn: &rusqlite::Connection, id: &str) -> rusqlite::Result<Option<RawPerson>> {
  conn
    .query_row(
      &format!("SELECT {PERSON_COLUMNS} FROM persons WHERE person_id = ?1"),
      rusqlite::params![id],
      person_row,
    )
    .optional()
}

fn select_story(conn: &rusqlite::Connection, id: &str) -> rusqlite::Result<Option<RawStory>> {
  conn
    .query_row(
      &format!("SELECT {STORY_COLUMNS} FROM stories WHERE story_id = ?1"),
      rusqlite::params![id],
      story_row,
    )
    .optional()
}

/// Column values shared by person inserts and updates.
struct PersonColumns {
  name:         String,
  kind:         &'static str,
  category:     &'static str,
  profile_json: String,
  photo_json:   Option<String>,
  assignments:  String,
}

impl PersonColumns {
  fn encode(
    profile: &Profile,
    photo: Option<&PhotoRef>,
    assignments: &BTreeSet<String>,
  ) -> Result<Self> {
    let category = profile.role.category();
    Ok(Self {
      name:         profile.name.clone(),
      kind:         category.kind().as_str(),
      category:     category.as_str(),
      profile_json: encode_profile(profile)?,
      photo_json:   encode_photo(photo)?,
      assignments:  encode_assignments(assignments)?,
    })
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A roster store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Read-modify-write of a person's assignment set inside one transaction.
  async fn modify_assignments(&self, id: Uuid, tag: String, add: bool) -> Result<Option<Person>> {
    let id_str = encode_uuid(id);
    let now_str = encode_dt(Utc::now());

    let raw: Option<RawPerson> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let current: Option<String> = tx
          .query_row(
            "SELECT assignments FROM persons WHERE person_id = ?1",
            rusqlite::params![id_str],
            |r| r.get(0),
          )
          .optional()?;
        let Some(current) = current else {
          return Ok(None);
        };

        let mut tags: BTreeSet<String> = serde_json::from_str(&current)
          .map_err(|e| tokio_rusqlite::Error::Other(Box::new(e)))?;
        let changed = if add { tags.insert(tag) } else { tags.remove(&tag) };

        if changed {
          let encoded = serde_json::to_string(&tags)
            .map_err(|e| tokio_rusqlite::Error::Other(Box::new(e)))?;
          tx.execute(
            "UPDATE persons SET assignments = ?1, updated_at = ?2 WHERE person_id = ?3",
            rusqlite::params![encoded, now_str, id_str],
          )?;
        }

        let raw = select_person(&tx, &id_str)?;
        tx.commit()?;
        Ok(raw)
      })
      .await?;

    raw.map(RawPerson::into_person).transpose()
  }
}

// ─── RosterStore impl ────────────────────────────────────────────────────────

impl RosterStore for SqliteStore {
  type Error = Error;

  // ── Persons ───────────────────────────────────────────────────────────────

  async fn list_persons(&self) -> Result<Vec<Person>> {
    let raws: Vec<RawPerson> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {PERSON_COLUMNS} FROM persons ORDER BY name COLLATE BINARY, rowid"
        ))?;
        let rows = stmt
          .query_map([], person_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPerson::into_person).collect()
  }

  async fn get_person(&self, id: Uuid) -> Result<Option<Person>> {
    let id_str = encode_uuid(id);
    let raw = self
      .conn
      .call(move |conn| Ok(select_person(conn, &id_str)?))
      .await?;
    raw.map(RawPerson::into_person).transpose()
  }

  async fn person_by_submission_key(&self, key: String) -> Result<Option<Person>> {
    let raw: Option<RawPerson> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {PERSON_COLUMNS} FROM persons WHERE submission_key = ?1"),
              rusqlite::params![key],
              person_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawPerson::into_person).transpose()
  }

  async fn add_person(&self, input: NewPerson) -> Result<Person> {
    let now = Utc::now();
    let person = Person {
      person_id:   Uuid::new_v4(),
      profile:     input.profile,
      photo:       input.photo,
      assignments: input.assignments,
      created_at:  now,
      updated_at:  now,
    };

    let cols = PersonColumns::encode(&person.profile, person.photo.as_ref(), &person.assignments)?;
    let id_str = encode_uuid(person.person_id);
    let at_str = encode_dt(now);
    let key = input.submission_key;

    let existing: Option<RawPerson> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if let Some(key) = &key {
          let prior = tx
            .query_row(
              &format!("SELECT {PERSON_COLUMNS} FROM persons WHERE submission_key = ?1"),
              rusqlite::params![key],
              person_row,
            )
            .optional()?;
          if prior.is_some() {
            return Ok(prior);
          }
        }

        tx.execute(
          "INSERT INTO persons (
             person_id, name, kind, category, profile_json, photo_json,
             assignments, submission_key, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
          rusqlite::params![
            id_str,
            cols.name,
            cols.kind,
            cols.category,
            cols.profile_json,
            cols.photo_json,
            cols.assignments,
            key,
            at_str,
          ],
        )?;
        tx.commit()?;
        Ok(None)
      })
      .await?;

    match existing {
      Some(raw) => raw.into_person(),
      None => Ok(person),
    }
  }

  async fn update_person(&self, id: Uuid, update: PersonUpdate) -> Result<Option<Person>> {
    let cols = PersonColumns::encode(&update.profile, update.photo.as_ref(), &update.assignments)?;
    let id_str = encode_uuid(id);
    let at_str = encode_dt(Utc::now());

    let raw: Option<RawPerson> = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE persons
             SET name = ?1, kind = ?2, category = ?3, profile_json = ?4,
                 photo_json = ?5, assignments = ?6, updated_at = ?7
           WHERE person_id = ?8",
          rusqlite::params![
            cols.name,
            cols.kind,
            cols.category,
            cols.profile_json,
            cols.photo_json,
            cols.assignments,
            at_str,
            id_str,
          ],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        Ok(select_person(conn, &id_str)?)
      })
      .await?;

    raw.map(RawPerson::into_person).transpose()
  }

  async fn delete_person(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM persons WHERE person_id = ?1", rusqlite::params![id_str])?)
      })
      .await?;
    Ok(deleted > 0)
  }

  async fn add_assignment(&self, id: Uuid, tag: String) -> Result<Option<Person>> {
    self.modify_assignments(id, tag, true).await
  }

  async fn remove_assignment(&self, id: Uuid, tag: String) -> Result<Option<Person>> {
    self.modify_assignments(id, tag, false).await
  }

  // ── Stories ───────────────────────────────────────────────────────────────

  async fn list_stories(&self) -> Result<Vec<Story>> {
    let raws: Vec<RawStory> = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare(&format!("SELECT {STORY_COLUMNS} FROM stories ORDER BY rowid"))?;
        let rows = stmt
          .query_map([], story_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawStory::into_story).collect()
  }

  async fn get_story(&self, id: Uuid) -> Result<Option<Story>> {
    let id_str = encode_uuid(id);
    let raw = self
      .conn
      .call(move |conn| Ok(select_story(conn, &id_str)?))
      .await?;
    raw.map(RawStory::into_story).transpose()
  }

  async fn story_for_person(&self, person_id: Uuid) -> Result<Option<Story>> {
    let id_str = encode_uuid(person_id);
    let raw: Option<RawStory> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {STORY_COLUMNS} FROM stories WHERE person_id = ?1 ORDER BY rowid LIMIT 1"
              ),
              rusqlite::params![id_str],
              story_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawStory::into_story).transpose()
  }

  async fn add_story(&self, input: NewStory) -> Result<Story> {
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

    let id_str = encode_uuid(story.story_id);
    let person_str = encode_uuid(story.person_id);
    let text = story.text.clone();
    let quote = story.quote.clone();
    let photo_json = encode_photo(story.photo.as_ref())?;
    let at_str = encode_dt(now);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO stories (story_id, person_id, text, quote, photo_json, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
          rusqlite::params![id_str, person_str, text, quote, photo_json, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(story)
  }

  async fn update_story(&self, id: Uuid, input: NewStory) -> Result<Option<Story>> {
    let id_str = encode_uuid(id);
    let person_str = encode_uuid(input.person_id);
    let photo_json = encode_photo(input.photo.as_ref())?;
    let at_str = encode_dt(Utc::now());
    let NewStory { text, quote, .. } = input;

    let raw: Option<RawStory> = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE stories
             SET person_id = ?1, text = ?2, quote = ?3, photo_json = ?4, updated_at = ?5
           WHERE story_id = ?6",
          rusqlite::params![person_str, text, quote, photo_json, at_str, id_str],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        Ok(select_story(conn, &id_str)?)
      })
      .await?;

    raw.map(RawStory::into_story).transpose()
  }

  async fn delete_story(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM stories WHERE story_id = ?1", rusqlite::params![id_str])?)
      })
      .await?;
    Ok(deleted > 0)
  }
}
