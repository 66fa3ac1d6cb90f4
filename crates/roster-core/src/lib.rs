//! Domain model and service layer for the club roster.
//!
//! Persons, stories, categories and assignments; the pure filters and form
//! validation over them; the [`store::RosterStore`] and [`media::MediaHost`]
//! boundaries; and [`Roster`], which coordinates the two. No HTTP or
//! database code lives here.

// Store and media impls use `async fn` against traits declared with
// `impl Future + Send`.
#![allow(async_fn_in_trait)]

pub mod category;
pub mod error;
pub mod filter;
pub mod media;
pub mod memory;
pub mod person;
pub mod roster;
pub mod store;
pub mod story;
pub mod validate;

pub use error::{Error, Result};
pub use roster::{PhotoChange, Roster, RosterSnapshot};

#[cfg(test)]
mod tests;
