//! Staff endpoints. Every handler requires [`Staff`] credentials; the
//! authenticated username is recorded as the actor on anything it writes.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/complaints/admin/stats` | `{open, resolved, avgResolutionTime}` |
//! | `GET`  | `/complaints/admin/recent` | Optional `?limit=`; default 5 |
//! | `GET`  | `/complaints/admin/all` | Insertion order |
//! | `PUT`  | `/complaints/admin/update/{id}` | Body: [`UpdateBody`] |
//! | `POST` | `/complaints/admin/escalate/{id}` | Body: [`EscalateBody`] |
//! | `GET`  | `/complaints/admin/escalated` | Current or past escalations |
//! | `POST` | `/complaints/admin/check-escalations` | One sweep |

use axum::{
  Json,
  extract::{
    Path, Query, State,
    rejection::{JsonRejection, QueryRejection},
  },
};
use chrono::Local;
use grievance_core::{
  complaint::Complaint,
  escalation::EscalationRequest,
  lifecycle::ComplaintUpdate,
  report::{DEFAULT_RECENT, RecentComplaint, Stats},
  store::ComplaintStore,
};
use serde::{Deserialize, Serialize};

use crate::{
  AppState,
  auth::Staff,
  error::ApiError,
  handlers::{ComplaintResponse, EscalationResponse, parse_complaint_id},
};

// ─── Reporting ────────────────────────────────────────────────────────────────

/// `GET /complaints/admin/stats`
pub async fn stats<S>(
  State(state): State<AppState<S>>,
  _staff: Staff,
) -> Result<Json<Stats>, ApiError>
where
  S: ComplaintStore + Clone + 'static,
{
  Ok(Json(state.tracker.stats().await?))
}

#[derive(Debug, Deserialize)]
pub struct RecentParams {
  pub limit: Option<usize>,
}

/// `GET /complaints/admin/recent[?limit=<n>]`
///
/// Display ids are derived from the server's local date at query time.
pub async fn recent<S>(
  State(state): State<AppState<S>>,
  _staff: Staff,
  params: Result<Query<RecentParams>, QueryRejection>,
) -> Result<Json<Vec<RecentComplaint>>, ApiError>
where
  S: ComplaintStore + Clone + 'static,
{
  let Query(params) = params?;
  let today = Local::now().date_naive();
  let limit = params.limit.unwrap_or(DEFAULT_RECENT);
  Ok(Json(state.tracker.recent(limit, today).await?))
}

/// `GET /complaints/admin/all`
pub async fn all<S>(
  State(state): State<AppState<S>>,
  _staff: Staff,
) -> Result<Json<Vec<Complaint>>, ApiError>
where
  S: ComplaintStore + Clone + 'static,
{
  Ok(Json(state.tracker.list().await?))
}

/// `GET /complaints/admin/escalated`
pub async fn escalated<S>(
  State(state): State<AppState<S>>,
  _staff: Staff,
) -> Result<Json<Vec<Complaint>>, ApiError>
where
  S: ComplaintStore + Clone + 'static,
{
  Ok(Json(state.tracker.escalated().await?))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `PUT /complaints/admin/update/{id}`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBody {
  pub status:         Option<String>,
  pub assigned_to:    Option<String>,
  /// A single note to append, despite the plural name.
  pub internal_notes: Option<String>,
  pub public_reply:   Option<String>,
}

impl From<UpdateBody> for ComplaintUpdate {
  fn from(b: UpdateBody) -> Self {
    ComplaintUpdate {
      status:        b.status,
      assigned_to:   b.assigned_to,
      internal_note: b.internal_notes,
      public_reply:  b.public_reply,
    }
  }
}

/// `PUT /complaints/admin/update/{id}`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  Staff(actor): Staff,
  Path(id): Path<String>,
  body: Result<Json<UpdateBody>, JsonRejection>,
) -> Result<Json<ComplaintResponse>, ApiError>
where
  S: ComplaintStore + Clone + 'static,
{
  let id = parse_complaint_id(&id)?;
  let Json(body) = body?;

  let complaint = state.tracker.apply_update(id, body.into(), actor.clone()).await?;
  tracing::info!(complaint_id = %id, actor = %actor, "complaint updated");

  Ok(Json(ComplaintResponse { message: "Complaint updated successfully", complaint }))
}

// ─── Escalate ─────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /complaints/admin/escalate/{id}`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EscalateBody {
  pub escalate_to:    Option<String>,
  pub reason:         Option<String>,
  pub notify_parties: Option<bool>,
}

impl From<EscalateBody> for EscalationRequest {
  fn from(b: EscalateBody) -> Self {
    EscalationRequest {
      escalate_to:    b.escalate_to.unwrap_or_default(),
      reason:         b.reason.unwrap_or_default(),
      notify_parties: b.notify_parties.unwrap_or(false),
    }
  }
}

/// `POST /complaints/admin/escalate/{id}`
///
/// Missing `escalateTo` or `reason` is a 400 and leaves the complaint as is.
pub async fn escalate<S>(
  State(state): State<AppState<S>>,
  Staff(actor): Staff,
  Path(id): Path<String>,
  body: Result<Json<EscalateBody>, JsonRejection>,
) -> Result<Json<EscalationResponse>, ApiError>
where
  S: ComplaintStore + Clone + 'static,
{
  let id = parse_complaint_id(&id)?;
  let Json(body) = body?;

  let (complaint, escalation) = state.tracker.escalate(id, body.into(), actor.clone()).await?;
  tracing::info!(
    complaint_id = %id,
    actor        = %actor,
    escalated_to = %escalation.escalated_to,
    "complaint escalated"
  );

  Ok(Json(EscalationResponse {
    message: "Complaint escalated successfully",
    complaint,
    escalation,
  }))
}

// ─── Sweep ────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepResponse {
  pub message:         String,
  pub escalated_count: usize,
}

/// `POST /complaints/admin/check-escalations`
pub async fn check_escalations<S>(
  State(state): State<AppState<S>>,
  Staff(actor): Staff,
) -> Result<Json<SweepResponse>, ApiError>
where
  S: ComplaintStore + Clone + 'static,
{
  let escalated_count = state.tracker.check_auto_escalations().await?;
  tracing::info!(escalated = escalated_count, requested_by = %actor, "escalation sweep completed");

  Ok(Json(SweepResponse {
    message: format!("Auto-escalation check completed. {escalated_count} complaints escalated."),
    escalated_count,
  }))
}
