//! Handlers for `/stories` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/stories` | Optional `?q` over story text and person names |
//! | `POST`   | `/stories` | Body: [`CreateBody`]; 201; 422 if the person is unknown |
//! | `GET`    | `/stories/{id}` | 404 if not found |
//! | `PUT`    | `/stories/{id}` | Body: [`UpdateBody`] |
//! | `DELETE` | `/stories/{id}` | 204 |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use roster_core::{
  Roster, filter::search_stories, media::MediaHost, store::RosterStore, story::Story,
  story::StoryDraft,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  error::ApiError,
  photo::{PhotoBody, PhotoField, decode_optional},
};

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub q: Option<String>,
}

/// `GET /stories[?q=<term>]`
pub async fn list<S, M>(
  State(roster): State<Arc<Roster<S, M>>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Story>>, ApiError>
where
  S: RosterStore + 'static,
  M: MediaHost + 'static,
{
  let stories = roster.stories().await?;
  let term = params.q.unwrap_or_default();
  if term.is_empty() {
    return Ok(Json(stories));
  }
  let persons = roster.snapshot().await.persons;
  Ok(Json(search_stories(&stories, &persons, &term).into_iter().cloned().collect()))
}

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub story: StoryDraft,
  #[serde(default)]
  pub photo: Option<PhotoBody>,
}

/// `POST /stories`
pub async fn create<S, M>(
  State(roster): State<Arc<Roster<S, M>>>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RosterStore + 'static,
  M: MediaHost + 'static,
{
  let photo = decode_optional(body.photo)?;
  let story = roster.create_story(&body.story, photo).await?;
  Ok((StatusCode::CREATED, Json(story)))
}

/// `GET /stories/{id}`
pub async fn get_one<S, M>(
  State(roster): State<Arc<Roster<S, M>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Story>, ApiError>
where
  S: RosterStore + 'static,
  M: MediaHost + 'static,
{
  Ok(Json(roster.story(id).await?))
}

#[derive(Debug, Deserialize)]
pub struct UpdateBody {
  pub story: StoryDraft,
  #[serde(default)]
  pub photo: PhotoField,
}

/// `PUT /stories/{id}`
pub async fn update<S, M>(
  State(roster): State<Arc<Roster<S, M>>>,
  Path(id): Path<Uuid>,
  Json(body): Json<UpdateBody>,
) -> Result<Json<Story>, ApiError>
where
  S: RosterStore + 'static,
  M: MediaHost + 'static,
{
  let change = body.photo.into_change()?;
  Ok(Json(roster.update_story(id, &body.story, change).await?))
}

/// `DELETE /stories/{id}`
pub async fn delete<S, M>(
  State(roster): State<Arc<Roster<S, M>>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: RosterStore + 'static,
  M: MediaHost + 'static,
{
  roster.delete_story(id).await?;
  Ok(StatusCode::NO_CONTENT)
}
