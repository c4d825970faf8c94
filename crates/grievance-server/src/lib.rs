//! HTTP layer for the grievance tracker.
//!
//! Exposes an axum [`Router`] serving the complaint JSON API backed by any
//! [`AccountStore`]. Staff endpoints authenticate with HTTP Basic; the
//! engines themselves live in `grievance-core`.

pub mod attachments;
pub mod auth;
pub mod error;
pub mod handlers;
pub mod notify;
pub mod scheduler;

pub use error::ApiError;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  extract::DefaultBodyLimit,
  routing::{get, post, put},
};
use grievance_core::{
  actor::{Actor, DEFAULT_SYSTEM_ACTOR},
  escalation::{AutoEscalationPolicy, DEFAULT_THRESHOLD_DAYS},
  store::{AccountStore, ComplaintStore},
  tracker::Tracker,
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use attachments::UploadDir;
use auth::AuthConfig;
use handlers::{accounts, admin, complaints};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `GRIEVANCE_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                      String,
  #[serde(default = "default_port")]
  pub port:                      u16,
  #[serde(default = "default_store_path")]
  pub store_path:                PathBuf,
  #[serde(default = "default_upload_dir")]
  pub upload_dir:                PathBuf,
  #[serde(default = "default_max_upload_bytes")]
  pub max_upload_bytes:          usize,
  pub admin_username:            String,
  pub admin_password_hash:       String,
  /// Recorded as the actor on sweeps and system-authored replies.
  #[serde(default = "default_system_actor")]
  pub system_actor:              String,
  #[serde(default = "default_threshold_days")]
  pub escalation_threshold_days: i64,
  /// When set, the server sweeps on this interval in the background.
  #[serde(default)]
  pub sweep_interval_secs:       Option<u64>,
}

fn default_host() -> String { "127.0.0.1".to_owned() }
fn default_port() -> u16 { 3000 }
fn default_store_path() -> PathBuf { PathBuf::from("complaints.db") }
fn default_upload_dir() -> PathBuf { PathBuf::from("uploads") }
fn default_max_upload_bytes() -> usize { 10 * 1024 * 1024 }
fn default_system_actor() -> String { DEFAULT_SYSTEM_ACTOR.to_owned() }
fn default_threshold_days() -> i64 { DEFAULT_THRESHOLD_DAYS }

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S> {
  pub tracker: Tracker<S>,
  pub config:  Arc<ServerConfig>,
  pub auth:    Arc<AuthConfig>,
  pub uploads: Arc<UploadDir>,
}

impl<S: ComplaintStore> AppState<S> {
  /// Wire a store into a tracker and state according to `config`.
  pub fn new(store: Arc<S>, config: ServerConfig) -> Self {
    let tracker = Tracker::new(store)
      .with_notifier(Arc::new(notify::LogNotifier))
      .with_system_actor(Actor::new(config.system_actor.clone()))
      .with_policy(AutoEscalationPolicy {
        threshold_days: config.escalation_threshold_days,
        ..AutoEscalationPolicy::default()
      });

    Self {
      tracker,
      auth: Arc::new(AuthConfig {
        username:      config.admin_username.clone(),
        password_hash: config.admin_password_hash.clone(),
      }),
      uploads: Arc::new(UploadDir::new(config.upload_dir.clone())),
      config: Arc::new(config),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the API router for `state`.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: AccountStore + Clone + 'static,
{
  let body_limit = state.config.max_upload_bytes;

  Router::new()
    // Public
    .route("/complaints/submit", post(complaints::submit::<S>))
    .route("/complaints/status/{id}", get(complaints::status::<S>))
    .route("/complaints/resolve/{id}", put(complaints::resolve::<S>))
    // Staff
    .route("/complaints/admin/stats", get(admin::stats::<S>))
    .route("/complaints/admin/recent", get(admin::recent::<S>))
    .route("/complaints/admin/all", get(admin::all::<S>))
    .route("/complaints/admin/update/{id}", put(admin::update::<S>))
    .route("/complaints/admin/escalate/{id}", post(admin::escalate::<S>))
    .route("/complaints/admin/escalated", get(admin::escalated::<S>))
    .route("/complaints/admin/check-escalations", post(admin::check_escalations::<S>))
    // Accounts
    .route("/auth/signup", post(accounts::signup::<S>))
    .route("/auth/login", post(accounts::login::<S>))
    .layer(DefaultBodyLimit::max(body_limit))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────
