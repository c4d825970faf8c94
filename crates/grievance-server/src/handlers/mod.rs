//! HTTP handlers, grouped by audience.

pub mod accounts;
pub mod admin;
pub mod complaints;

use grievance_core::complaint::{Complaint, Escalation};
use serde::Serialize;
use uuid::Uuid;

use crate::error::ApiError;

/// `{message}`, the body of every acknowledgement without a payload.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
  pub message: String,
}

impl MessageResponse {
  pub fn new(message: impl Into<String>) -> Self { Self { message: message.into() } }
}

/// `{message, complaint}`
#[derive(Debug, Serialize)]
pub struct ComplaintResponse {
  pub message:   &'static str,
  pub complaint: Complaint,
}

/// `{message, complaint, escalation}`
#[derive(Debug, Serialize)]
pub struct EscalationResponse {
  pub message:    &'static str,
  pub complaint:  Complaint,
  pub escalation: Escalation,
}

/// Unknown and unparseable ids are both reported as a missing complaint.
pub(crate) fn parse_complaint_id(raw: &str) -> Result<Uuid, ApiError> {
  Uuid::parse_str(raw).map_err(|_| ApiError::NotFound("Complaint not found".into()))
}
