//! The complaint record and its append-only audit entries.
//!
//! Field names serialise in camelCase; this is the JSON contract consumed by
//! the presentation layer and the on-disk representation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::actor::Actor;

// ─── Status ──────────────────────────────────────────────────────────────────

/// Well-known status strings.
///
/// The status field itself is caller-defined free text; these are only the
/// values the engines write or compare against. Comparisons are exact unless a
/// caller says otherwise.
pub mod status {
  pub const SUBMITTED: &str = "Submitted";
  /// Written by the resolve endpoint. Note the capital `R`: the escalation
  /// sweep only skips the lowercase form.
  pub const RESOLVED: &str = "Resolved";
  pub const ESCALATED: &str = "escalated";

  /// Statuses the escalation sweep never touches (case-sensitive).
  pub const SWEEP_EXEMPT: [&str; 3] = ["resolved", "closed", ESCALATED];

  /// Statuses the reporting layer counts as finished (case-insensitive).
  pub const FINISHED: [&str; 2] = ["resolved", "closed"];
}

// ─── Audit entries ───────────────────────────────────────────────────────────

/// A staff-only note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalNote {
  pub note:      String,
  pub timestamp: DateTime<Utc>,
  pub added_by:  String,
}

/// A reply visible to the submitter. `added_by` is the system actor for
/// replies generated by an escalation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicReply {
  pub reply:     String,
  pub timestamp: DateTime<Utc>,
  pub added_by:  String,
}

impl PublicReply {
  pub fn new(reply: impl Into<String>, actor: &Actor, at: DateTime<Utc>) -> Self {
    Self { reply: reply.into(), timestamp: at, added_by: actor.to_string() }
  }
}

/// How an escalation came about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EscalationKind {
  /// Requested by a staff member.
  Escalated,
  /// Produced by the age-based sweep.
  AutoEscalated,
}

/// An immutable record of one escalation event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Escalation {
  pub escalation_id:  Uuid,
  pub escalated_to:   String,
  pub reason:         String,
  pub escalated_by:   String,
  pub escalated_at:   DateTime<Utc>,
  pub notify_parties: bool,
  pub status:         EscalationKind,
}

// ─── Complaint ───────────────────────────────────────────────────────────────

/// The central tracked entity.
///
/// `id`, `email`, `category`, `description` and `pdf_file` never change after
/// creation. The three audit sequences are append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Complaint {
  pub id:             Uuid,
  pub email:          String,
  pub category:       String,
  pub description:    String,
  /// Opaque reference into the attachment store.
  #[serde(default)]
  pub pdf_file:       Option<String>,
  /// Free text; absent on some legacy records.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub status:         Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub assigned_to:    Option<String>,
  #[serde(default)]
  pub internal_notes: Vec<InternalNote>,
  #[serde(default)]
  pub public_replies: Vec<PublicReply>,
  #[serde(default)]
  pub escalations:    Vec<Escalation>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub escalated_to:   Option<String>,
  /// Refreshed by every mutation; also the anchor for escalation aging.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub last_updated:   Option<DateTime<Utc>>,
}

/// Submitter-provided fields for a new complaint.
#[derive(Debug, Clone, Default)]
pub struct NewComplaint {
  pub email:       String,
  pub category:    String,
  pub description: String,
  pub pdf_file:    Option<String>,
}

impl Complaint {
  /// Build a freshly submitted complaint. Submission counts as a mutation, so
  /// `last_updated` starts at `now`.
  pub fn submit(input: NewComplaint, now: DateTime<Utc>) -> Self {
    Self {
      id:             Uuid::new_v4(),
      email:          input.email,
      category:       input.category,
      description:    input.description,
      pdf_file:       input.pdf_file,
      status:         Some(status::SUBMITTED.to_owned()),
      assigned_to:    None,
      internal_notes: Vec::new(),
      public_replies: Vec::new(),
      escalations:    Vec::new(),
      escalated_to:   None,
      last_updated:   Some(now),
    }
  }

  pub fn status(&self) -> Option<&str> { self.status.as_deref() }

  pub fn touch(&mut self, now: DateTime<Utc>) { self.last_updated = Some(now); }
}
