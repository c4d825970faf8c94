//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::{
    multipart::{MultipartError, MultipartRejection},
    rejection::{JsonRejection, QueryRejection},
  },
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("unauthorized")]
  Unauthorized,

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<grievance_core::Error> for ApiError {
  fn from(e: grievance_core::Error) -> Self {
    use grievance_core::Error as E;
    match e {
      E::ComplaintNotFound(_) => ApiError::NotFound("Complaint not found".into()),
      E::InvalidArgument(m) => ApiError::BadRequest(m),
      E::Store(inner) => ApiError::Store(inner),
    }
  }
}

impl From<JsonRejection> for ApiError {
  fn from(r: JsonRejection) -> Self { ApiError::BadRequest(r.body_text()) }
}

impl From<QueryRejection> for ApiError {
  fn from(r: QueryRejection) -> Self { ApiError::BadRequest(r.body_text()) }
}

impl From<MultipartRejection> for ApiError {
  fn from(r: MultipartRejection) -> Self { ApiError::BadRequest(r.body_text()) }
}

impl From<MultipartError> for ApiError {
  fn from(e: MultipartError) -> Self { ApiError::BadRequest(e.body_text()) }
}

impl From<std::io::Error> for ApiError {
  fn from(e: std::io::Error) -> Self { ApiError::Store(Box::new(e)) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_owned()),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "request failed on storage");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
      }
    };

    let mut res = (status, Json(json!({ "message": message }))).into_response();
    if matches!(self, ApiError::Unauthorized) {
      res.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static("Basic realm=\"grievance\""),
      );
    }
    res
  }
}
