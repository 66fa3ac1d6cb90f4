//! HTTP server for the club roster.
//!
//! Mounts the JSON API under `/api` behind HTTP Basic auth, with request
//! tracing and a body limit sized for base64-encoded photos.

pub mod auth;
pub mod error;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{Router, extract::DefaultBodyLimit, middleware};
use roster_core::{
  Roster,
  media::MediaHost,
  store::RosterStore,
  validate::{DEFAULT_MAX_UPLOAD_BYTES, UploadLimits},
};
use roster_media::{CloudinaryHost, MediaConfig};
use roster_store_sqlite::SqliteStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use auth::{AuthConfig, require_auth};

// ─── Configuration ───────────────────────────────────────────────────────────

fn default_max_upload_bytes() -> usize { DEFAULT_MAX_UPLOAD_BYTES }

/// Runtime server configuration, deserialised from `config.toml` and
/// `ROSTER_*` environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:               String,
  pub port:               u16,
  pub store_path:         PathBuf,
  pub auth_username:      String,
  pub auth_password_hash: String,
  /// Largest accepted photo, in bytes.
  #[serde(default = "default_max_upload_bytes")]
  pub max_upload_bytes:   usize,
  pub media:              MediaConfig,
}

impl ServerConfig {
  pub fn upload_limits(&self) -> UploadLimits { UploadLimits { max_bytes: self.max_upload_bytes } }
}

/// Request body ceiling for a photo of `max_upload_bytes`: base64 grows the
/// payload by a third, and the record fields ride along.
pub fn body_limit(max_upload_bytes: usize) -> usize {
  max_upload_bytes.div_ceil(3) * 4 + 64 * 1024
}

// ─── Application state ───────────────────────────────────────────────────────

/// Everything the router needs.
pub struct AppState<S, M> {
  pub roster: Arc<Roster<S, M>>,
  pub auth:   Arc<AuthConfig>,
}

impl AppState<SqliteStore, CloudinaryHost> {
  /// Open the SQLite store and build the media client described by `config`.
  pub async fn open(config: &ServerConfig, store_path: &std::path::Path) -> Result<Self, Error> {
    let store = SqliteStore::open(store_path).await?;
    let media = CloudinaryHost::new(config.media.clone())?;
    if !config.media.can_delete() {
      warn!("media api_key/api_secret not set; replaced or deleted photos stay on the host");
    }
    info!(
      store = %store_path.display(),
      cloud = %config.media.cloud_name,
      max_upload_bytes = config.max_upload_bytes,
      "roster opened"
    );

    Ok(Self {
      roster: Arc::new(Roster::new(Arc::new(store), Arc::new(media), config.upload_limits())),
      auth:   Arc::new(AuthConfig {
        username:      config.auth_username.clone(),
        password_hash: config.auth_password_hash.clone(),
      }),
    })
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the server [`Router`].
pub fn router<S, M>(state: AppState<S, M>) -> Router
where
  S: RosterStore + 'static,
  M: MediaHost + 'static,
{
  let limit = body_limit(state.roster.limits().max_bytes);
  let api = roster_api::api_router(state.roster)
    .layer(DefaultBodyLimit::max(limit))
    .layer(middleware::from_fn_with_state(state.auth, require_auth));

  Router::new()
    .nest("/api", api)
    .layer(TraceLayer::new_for_http())
}
