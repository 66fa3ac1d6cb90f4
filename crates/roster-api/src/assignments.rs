//! Handlers for assignments and the category vocabulary.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/assignments` | The fixed assignment vocabulary |
//! | `GET`    | `/assignments/{tag}` | Who holds `tag` and who is available for it |
//! | `POST`   | `/persons/{id}/assignments/{tag}` | Add `tag`; returns the person |
//! | `DELETE` | `/persons/{id}/assignments/{tag}` | Remove `tag`; returns the person |
//! | `GET`    | `/categories` | Categories grouped by person kind |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use roster_core::{
  Roster,
  category::{ASSIGNMENTS, PersonKind, is_known_assignment},
  filter::{available_for_assignment, by_assignment},
  media::MediaHost,
  person::Person,
  store::RosterStore,
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::ApiError;

/// `GET /assignments`
pub async fn vocabulary() -> Json<[&'static str; 4]> { Json(ASSIGNMENTS) }

#[derive(Debug, Serialize)]
pub struct Partition {
  pub tag:       String,
  pub assigned:  Vec<Person>,
  pub available: Vec<Person>,
  /// Set when the roster could not be loaded and the lists may be stale.
  pub error:     Option<String>,
}

/// `GET /assignments/{tag}`
pub async fn partition<S, M>(
  State(roster): State<Arc<Roster<S, M>>>,
  Path(tag): Path<String>,
) -> Result<Json<Partition>, ApiError>
where
  S: RosterStore + 'static,
  M: MediaHost + 'static,
{
  if !is_known_assignment(&tag) {
    return Err(ApiError::NotFound(format!("unknown assignment: {tag:?}")));
  }
  let snapshot = roster.snapshot().await;
  Ok(Json(Partition {
    assigned: by_assignment(&snapshot.persons, &tag).into_iter().cloned().collect(),
    available: available_for_assignment(&snapshot.persons, &tag)
      .into_iter()
      .cloned()
      .collect(),
    error: snapshot.error,
    tag,
  }))
}

/// `POST /persons/{id}/assignments/{tag}`
pub async fn assign<S, M>(
  State(roster): State<Arc<Roster<S, M>>>,
  Path((id, tag)): Path<(Uuid, String)>,
) -> Result<Json<Person>, ApiError>
where
  S: RosterStore + 'static,
  M: MediaHost + 'static,
{
  Ok(Json(roster.assign(id, &tag).await?))
}

/// `DELETE /persons/{id}/assignments/{tag}`
pub async fn unassign<S, M>(
  State(roster): State<Arc<Roster<S, M>>>,
  Path((id, tag)): Path<(Uuid, String)>,
) -> Result<Json<Person>, ApiError>
where
  S: RosterStore + 'static,
  M: MediaHost + 'static,
{
  Ok(Json(roster.unassign(id, &tag).await?))
}

#[derive(Debug, Serialize)]
pub struct KindCategories {
  pub kind:       PersonKind,
  pub categories: Vec<&'static str>,
}

/// `GET /categories`
pub async fn categories() -> Json<Vec<KindCategories>> {
  Json(
    PersonKind::ALL
      .into_iter()
      .map(|kind| KindCategories {
        kind,
        categories: kind.categories().into_iter().map(|c| c.as_str()).collect(),
      })
      .collect(),
  )
}
