//! Lifecycle engine: applies staff mutations to a single complaint.
//!
//! No transition graph is enforced: any non-empty string is accepted as the
//! new status. The functions here are pure; persistence is the caller's job.

use chrono::{DateTime, Utc};

use crate::{
  actor::Actor,
  complaint::{Complaint, InternalNote, PublicReply, status},
};

/// A partial update. Each field is applied independently; `None` and empty
/// strings leave the complaint untouched in that respect.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComplaintUpdate {
  pub status:        Option<String>,
  pub assigned_to:   Option<String>,
  pub internal_note: Option<String>,
  pub public_reply:  Option<String>,
}

impl ComplaintUpdate {
  /// The update issued by the public resolve endpoint.
  pub fn resolve() -> Self {
    Self { status: Some(status::RESOLVED.to_owned()), ..Self::default() }
  }
}

fn provided(field: &Option<String>) -> Option<&str> {
  field.as_deref().filter(|s| !s.is_empty())
}

/// Apply `update` to `complaint` on behalf of `actor`.
///
/// `last_updated` is refreshed unconditionally, even for an empty update.
pub fn apply_update(
  complaint: &mut Complaint,
  update: &ComplaintUpdate,
  actor: &Actor,
  now: DateTime<Utc>,
) {
  if let Some(s) = provided(&update.status) {
    complaint.status = Some(s.to_owned());
  }
  if let Some(a) = provided(&update.assigned_to) {
    complaint.assigned_to = Some(a.to_owned());
  }
  if let Some(note) = provided(&update.internal_note) {
    complaint.internal_notes.push(InternalNote {
      note:      note.to_owned(),
      timestamp: now,
      added_by:  actor.to_string(),
    });
  }
  if let Some(reply) = provided(&update.public_reply) {
    complaint.public_replies.push(PublicReply::new(reply, actor, now));
  }
  complaint.touch(now);
}
