//! Public complaint endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/complaints/submit` | multipart: `email`, `category`, `description`, optional `pdf` |
//! | `GET`  | `/complaints/status/{id}` | 404 if not found |
//! | `PUT`  | `/complaints/resolve/{id}` | sets status `Resolved` |

use axum::{
  Json,
  extract::{
    Multipart, Path, State,
    multipart::MultipartRejection,
  },
  http::StatusCode,
  response::IntoResponse,
};
use grievance_core::{
  complaint::{Complaint, NewComplaint},
  store::ComplaintStore,
};

use crate::{
  AppState,
  attachments::PDF_CONTENT_TYPE,
  error::ApiError,
  handlers::{ComplaintResponse, parse_complaint_id},
};

// ─── Submit ───────────────────────────────────────────────────────────────────

/// An uploaded file waiting to be handed to the attachment store.
struct PendingPdf {
  file_name: String,
  data:      axum::body::Bytes,
}

/// `POST /complaints/submit`. Returns 201 + `{message, complaint}`.
pub async fn submit<S>(
  State(state): State<AppState<S>>,
  multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ComplaintStore + Clone + 'static,
{
  let mut multipart = multipart?;
  let mut input = NewComplaint::default();
  let mut pdf = None;

  while let Some(field) = multipart.next_field().await? {
    let name = field.name().unwrap_or_default().to_owned();
    match name.as_str() {
      "email" => input.email = field.text().await?,
      "category" => input.category = field.text().await?,
      "description" => input.description = field.text().await?,
      "pdf" => {
        let file_name = field.file_name().unwrap_or_default().to_owned();
        let is_pdf = field.content_type() == Some(PDF_CONTENT_TYPE);
        let data = field.bytes().await?;
        // Browsers send an empty, unnamed part when no file was chosen.
        if file_name.is_empty() && data.is_empty() {
          continue;
        }
        if !is_pdf {
          return Err(ApiError::BadRequest("Only PDF files are allowed!".into()));
        }
        pdf = Some(PendingPdf { file_name, data });
      }
      _ => {}
    }
  }

  if [&input.email, &input.category, &input.description].iter().any(|f| f.trim().is_empty()) {
    return Err(ApiError::BadRequest(
      "email, category and description are required".into(),
    ));
  }

  if let Some(p) = pdf {
    input.pdf_file = Some(state.uploads.store(&p.file_name, &p.data).await?);
  }

  let stored_pdf = input.pdf_file.clone();
  let complaint = match state.tracker.submit(input).await {
    Ok(c) => c,
    Err(e) => {
      if let Some(name) = stored_pdf {
        state.uploads.discard(&name).await;
      }
      return Err(e.into());
    }
  };
  tracing::info!(complaint_id = %complaint.id, category = %complaint.category, "complaint submitted");

  Ok((
    StatusCode::CREATED,
    Json(ComplaintResponse { message: "Complaint submitted successfully", complaint }),
  ))
}

// ─── Status ───────────────────────────────────────────────────────────────────

/// `GET /complaints/status/{id}`
pub async fn status<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
) -> Result<Json<Complaint>, ApiError>
where
  S: ComplaintStore + Clone + 'static,
{
  let id = parse_complaint_id(&id)?;
  Ok(Json(state.tracker.get(id).await?))
}

// ─── Resolve ──────────────────────────────────────────────────────────────────

/// `PUT /complaints/resolve/{id}`
pub async fn resolve<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
) -> Result<Json<ComplaintResponse>, ApiError>
where
  S: ComplaintStore + Clone + 'static,
{
  let id = parse_complaint_id(&id)?;
  let complaint = state.tracker.resolve(id).await?;
  tracing::info!(complaint_id = %id, "complaint resolved");
  Ok(Json(ComplaintResponse { message: "Complaint resolved", complaint }))
}
