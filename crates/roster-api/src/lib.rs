//! JSON REST API for the club roster.
//!
//! Exposes an axum [`Router`] backed by a [`Roster`] over any
//! [`RosterStore`] and [`MediaHost`]. Auth, TLS, and transport concerns are
//! the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", roster_api::api_router(roster.clone()))
//! ```

pub mod assignments;
pub mod error;
pub mod persons;
pub mod photo;
pub mod stories;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use roster_core::{Roster, media::MediaHost, store::RosterStore};

pub use error::ApiError;

/// Build the API router for `roster`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, M>(roster: Arc<Roster<S, M>>) -> Router<()>
where
  S: RosterStore + 'static,
  M: MediaHost + 'static,
{
  Router::new()
    // Persons
    .route("/persons", get(persons::list::<S, M>).post(persons::create::<S, M>))
    .route(
      "/persons/{id}",
      get(persons::get_one::<S, M>)
        .put(persons::update::<S, M>)
        .delete(persons::delete::<S, M>),
    )
    .route("/persons/{id}/story", get(persons::story::<S, M>))
    .route("/persons/{id}/thumbnail", get(persons::thumbnail::<S, M>))
    .route(
      "/persons/{id}/assignments/{tag}",
      post(assignments::assign::<S, M>).delete(assignments::unassign::<S, M>),
    )
    .route("/refresh", post(persons::refresh::<S, M>))
    // Vocabularies
    .route("/assignments", get(assignments::vocabulary))
    .route("/assignments/{tag}", get(assignments::partition::<S, M>))
    .route("/categories", get(assignments::categories))
    // Stories
    .route("/stories", get(stories::list::<S, M>).post(stories::create::<S, M>))
    .route(
      "/stories/{id}",
      get(stories::get_one::<S, M>)
        .put(stories::update::<S, M>)
        .delete(stories::delete::<S, M>),
    )
    .with_state(roster)
}
