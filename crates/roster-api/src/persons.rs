//! Handlers for `/persons` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/persons` | Optional `?category`, `?kind`, `?assignment`, `?available_for`, `?assigned`, `?q` |
//! | `POST`   | `/persons` | Body: [`CreateBody`]; optional `Idempotency-Key` header; 201 |
//! | `GET`    | `/persons/{id}` | 404 if not found |
//! | `PUT`    | `/persons/{id}` | Body: [`UpdateBody`] |
//! | `DELETE` | `/persons/{id}` | 204; the photo is released best-effort |
//! | `GET`    | `/persons/{id}/story` | 404 if the person has no story |
//! | `GET`    | `/persons/{id}/thumbnail` | 307 to a resized rendition |
//! | `POST`   | `/refresh` | Reload the cached roster from the store |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::{HeaderMap, StatusCode},
  response::{IntoResponse, Redirect},
};
use roster_core::{
  Roster, RosterSnapshot,
  category::{Category, PersonKind},
  filter::RosterFilter,
  media::{MediaHost, THUMBNAIL_HEIGHT, THUMBNAIL_WIDTH},
  person::{Person, PersonDraft},
  store::RosterStore,
  story::Story,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  error::ApiError,
  photo::{PhotoBody, PhotoField, decode_optional},
};

/// Header carrying the client's submission key for create requests.
pub const IDEMPOTENCY_KEY: &str = "idempotency-key";

// ─── List ────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  pub category:      Option<String>,
  pub kind:          Option<String>,
  pub assignment:    Option<String>,
  pub available_for: Option<String>,
  /// `true` lists everyone with some assignment, `false` everyone without.
  pub assigned:      Option<bool>,
  /// Free-text search over name, full name, and registration.
  pub q:             Option<String>,
}

impl ListParams {
  fn into_filter(self) -> Result<RosterFilter, ApiError> {
    let category = self
      .category
      .filter(|c| !c.is_empty())
      .map(|c| c.parse::<Category>())
      .transpose()
      .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let kind = self
      .kind
      .filter(|k| !k.is_empty())
      .map(|k| k.parse::<PersonKind>())
      .transpose()
      .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    Ok(RosterFilter {
      category,
      kind,
      assignment: self.assignment.filter(|t| !t.is_empty()),
      available_for: self.available_for.filter(|t| !t.is_empty()),
      assigned: self.assigned,
      term: self.q.filter(|q| !q.is_empty()),
    })
  }
}

/// `GET /persons`
///
/// Never fails on a store outage: the snapshot carries the last good listing
/// and an `error` message instead.
pub async fn list<S, M>(
  State(roster): State<Arc<Roster<S, M>>>,
  Query(params): Query<ListParams>,
) -> Result<Json<RosterSnapshot>, ApiError>
where
  S: RosterStore + 'static,
  M: MediaHost + 'static,
{
  let filter = params.into_filter()?;
  Ok(Json(roster.view(&filter).await))
}

/// `POST /refresh`
pub async fn refresh<S, M>(
  State(roster): State<Arc<Roster<S, M>>>,
) -> Result<Json<RosterSnapshot>, ApiError>
where
  S: RosterStore + 'static,
  M: MediaHost + 'static,
{
  let persons = roster.refresh().await?;
  Ok(Json(RosterSnapshot { persons, error: None }))
}

// ─── Create ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub person: PersonDraft,
  #[serde(default)]
  pub photo:  Option<PhotoBody>,
}

/// `POST /persons`
pub async fn create<S, M>(
  State(roster): State<Arc<Roster<S, M>>>,
  headers: HeaderMap,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RosterStore + 'static,
  M: MediaHost + 'static,
{
  let key = headers
    .get(IDEMPOTENCY_KEY)
    .and_then(|v| v.to_str().ok())
    .map(str::trim)
    .filter(|k| !k.is_empty())
    .map(str::to_owned);
  let photo = decode_optional(body.photo)?;

  let person = roster.create_person(&body.person, photo, key).await?;
  Ok((StatusCode::CREATED, Json(person)))
}

// ─── Get / update / delete ───────────────────────────────────────────────────

/// `GET /persons/{id}`
pub async fn get_one<S, M>(
  State(roster): State<Arc<Roster<S, M>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Person>, ApiError>
where
  S: RosterStore + 'static,
  M: MediaHost + 'static,
{
  Ok(Json(roster.person(id).await?))
}

#[derive(Debug, Deserialize)]
pub struct UpdateBody {
  pub person: PersonDraft,
  #[serde(default)]
  pub photo:  PhotoField,
}

/// `PUT /persons/{id}`
pub async fn update<S, M>(
  State(roster): State<Arc<Roster<S, M>>>,
  Path(id): Path<Uuid>,
  Json(body): Json<UpdateBody>,
) -> Result<Json<Person>, ApiError>
where
  S: RosterStore + 'static,
  M: MediaHost + 'static,
{
  let change = body.photo.into_change()?;
  Ok(Json(roster.update_person(id, &body.person, change).await?))
}

/// `DELETE /persons/{id}`
pub async fn delete<S, M>(
  State(roster): State<Arc<Roster<S, M>>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: RosterStore + 'static,
  M: MediaHost + 'static,
{
  roster.delete_person(id).await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Story / thumbnail ───────────────────────────────────────────────────────

/// `GET /persons/{id}/story`
pub async fn story<S, M>(
  State(roster): State<Arc<Roster<S, M>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Story>, ApiError>
where
  S: RosterStore + 'static,
  M: MediaHost + 'static,
{
  roster
    .story_for_person(id)
    .await?
    .map(Json)
    .ok_or_else(|| ApiError::NotFound(format!("no story for person {id}")))
}

#[derive(Debug, Deserialize)]
pub struct ThumbnailParams {
  pub width:  Option<u32>,
  pub height: Option<u32>,
}

/// `GET /persons/{id}/thumbnail[?width=&height=]`
///
/// Falls back to the original image when the media host has no transforms.
pub async fn thumbnail<S, M>(
  State(roster): State<Arc<Roster<S, M>>>,
  Path(id): Path<Uuid>,
  Query(params): Query<ThumbnailParams>,
) -> Result<Redirect, ApiError>
where
  S: RosterStore + 'static,
  M: MediaHost + 'static,
{
  let person = roster.person(id).await?;
  let photo = person
    .photo
    .ok_or_else(|| ApiError::NotFound(format!("person {id} has no photo")))?;

  let width = params.width.unwrap_or(THUMBNAIL_WIDTH);
  let height = params.height.unwrap_or(THUMBNAIL_HEIGHT);
  let url = roster
    .media()
    .thumbnail_url(&photo.external_id, width, height)
    .unwrap_or(photo.url);
  Ok(Redirect::temporary(&url))
}
