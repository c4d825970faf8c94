//! Citizen sign-up and log-in.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/auth/signup` | Body: `{"email":"...","password":"..."}` |
//! | `POST` | `/auth/login`  | Same body; 400 on any mismatch |
//!
//! Only argon2 hashes are stored. Log-in does not issue a session; it only
//! confirms the credentials.

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
};
use grievance_core::store::AccountStore;
use serde::Deserialize;

use crate::{
  AppState,
  auth::{hash_password, verify_password},
  error::ApiError,
  handlers::MessageResponse,
};

#[derive(Debug, Deserialize)]
pub struct Credentials {
  #[serde(default)]
  pub email:    String,
  #[serde(default)]
  pub password: String,
}

impl Credentials {
  fn require(self) -> Result<Self, ApiError> {
    if self.email.trim().is_empty() || self.password.is_empty() {
      return Err(ApiError::BadRequest("Email and password are required".into()));
    }
    Ok(self)
  }
}

/// `POST /auth/signup`
pub async fn signup<S>(
  State(state): State<AppState<S>>,
  body: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError>
where
  S: AccountStore + Clone + 'static,
{
  let Json(creds) = body?;
  let creds = creds.require()?;

  let hash = hash_password(&creds.password)
    .map_err(|e| ApiError::Store(format!("password hashing failed: {e}").into()))?;

  let created = state
    .tracker
    .store()
    .create_account(creds.email.clone(), hash)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  if !created {
    return Err(ApiError::BadRequest("User already exists".into()));
  }

  tracing::info!(email = %creds.email, "account created");
  Ok(Json(MessageResponse::new("Signup successful! Redirecting to complaint portal...")))
}

/// `POST /auth/login`
pub async fn login<S>(
  State(state): State<AppState<S>>,
  body: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError>
where
  S: AccountStore + Clone + 'static,
{
  let Json(creds) = body?;
  let creds = creds.require()?;

  let stored = state
    .tracker
    .store()
    .password_hash(creds.email.clone())
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  match stored {
    Some(phc) if verify_password(&creds.password, &phc) => {
      Ok(Json(MessageResponse::new("Login successful! Redirecting to complaint portal...")))
    }
    _ => Err(ApiError::BadRequest("Invalid email or password".into())),
  }
}
