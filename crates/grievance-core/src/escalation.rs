//! Escalation engine: manual escalation and the age-based sweep.
//!
//! Both paths funnel through [`apply_escalation`], which performs the three
//! effects of an escalation together: append the record, append a
//! system-authored public reply, and move the complaint to `escalated`.
//!
//! Aging is measured from `last_updated`, not from submission. Any mutation,
//! including an internal note, restarts the clock.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  Error, Result,
  actor::Actor,
  complaint::{Complaint, Escalation, EscalationKind, PublicReply, status},
};

/// Target of every automatic escalation.
pub const AUTO_ESCALATION_TARGET: &str = "Senior Management";

/// Days without an update before the sweep escalates a complaint.
pub const DEFAULT_THRESHOLD_DAYS: i64 = 7;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

// ─── Manual ──────────────────────────────────────────────────────────────────

/// A staff request to escalate one complaint.
#[derive(Debug, Clone, Default)]
pub struct EscalationRequest {
  pub escalate_to:    String,
  pub reason:         String,
  pub notify_parties: bool,
}

impl EscalationRequest {
  /// Reject blank targets or reasons.
  pub fn validate(&self) -> Result<()> {
    if self.escalate_to.trim().is_empty() {
      return Err(Error::InvalidArgument("escalateTo is required".into()));
    }
    if self.reason.trim().is_empty() {
      return Err(Error::InvalidArgument("reason is required".into()));
    }
    Ok(())
  }
}

/// Escalate `complaint` on behalf of `actor`.
///
/// The generated public reply is attributed to `system`. Nothing is modified
/// if the request fails validation.
pub fn escalate(
  complaint: &mut Complaint,
  request: &EscalationRequest,
  actor: &Actor,
  system: &Actor,
  now: DateTime<Utc>,
) -> Result<Escalation> {
  request.validate()?;

  let escalation = Escalation {
    escalation_id:  Uuid::new_v4(),
    escalated_to:   request.escalate_to.clone(),
    reason:         request.reason.clone(),
    escalated_by:   actor.to_string(),
    escalated_at:   now,
    notify_parties: request.notify_parties,
    status:         EscalationKind::Escalated,
  };
  let reply = format!(
    "Your complaint has been escalated to {} for further review and resolution.",
    request.escalate_to
  );

  apply_escalation(complaint, escalation.clone(), reply, system, now);
  Ok(escalation)
}

// ─── Automatic ───────────────────────────────────────────────────────────────

/// Parameters of the age-based sweep.
#[derive(Debug, Clone)]
pub struct AutoEscalationPolicy {
  pub threshold_days: i64,
  pub target:         String,
}

impl Default for AutoEscalationPolicy {
  fn default() -> Self {
    Self {
      threshold_days: DEFAULT_THRESHOLD_DAYS,
      target:         AUTO_ESCALATION_TARGET.to_owned(),
    }
  }
}

/// One complaint escalated by a sweep.
#[derive(Debug, Clone)]
pub struct AutoEscalated {
  pub complaint_id: Uuid,
  pub age_days:     i64,
  pub escalation:   Escalation,
}

/// Whole days elapsed since `last_updated`, rounded down.
///
/// Records that were never stamped are treated as just updated.
pub fn age_days(complaint: &Complaint, now: DateTime<Utc>) -> i64 {
  complaint
    .last_updated
    .map(|at| (now - at).num_milliseconds().div_euclid(MILLIS_PER_DAY))
    .unwrap_or(0)
}

/// Whether the sweep may consider `complaint` at all.
///
/// The exemption list is matched exactly, so `"Resolved"` is still eligible.
pub fn sweep_eligible(complaint: &Complaint) -> bool {
  !complaint
    .status()
    .is_some_and(|s| status::SWEEP_EXEMPT.contains(&s))
}

/// Run one sweep over `complaints`, escalating every eligible record whose
/// age has reached the policy threshold. Returns what was escalated, in
/// collection order.
pub fn sweep(
  complaints: &mut [Complaint],
  policy: &AutoEscalationPolicy,
  system: &Actor,
  now: DateTime<Utc>,
) -> Vec<AutoEscalated> {
  let mut escalated = Vec::new();

  for complaint in complaints.iter_mut().filter(|c| sweep_eligible(c)) {
    let age = age_days(complaint, now);
    if age < policy.threshold_days {
      continue;
    }

    let escalation = Escalation {
      escalation_id:  Uuid::new_v4(),
      escalated_to:   policy.target.clone(),
      reason:         format!("Auto-escalated: Unresolved for {age} days"),
      escalated_by:   system.to_string(),
      escalated_at:   now,
      notify_parties: true,
      status:         EscalationKind::AutoEscalated,
    };
    let reply = format!(
      "Your complaint has been automatically escalated to {} due to extended \
       resolution time ({age} days). We apologize for the delay and will \
       prioritize your case.",
      policy.target
    );

    apply_escalation(complaint, escalation.clone(), reply, system, now);
    escalated.push(AutoEscalated { complaint_id: complaint.id, age_days: age, escalation });
  }

  escalated
}

// ─── Shared ──────────────────────────────────────────────────────────────────

fn apply_escalation(
  complaint: &mut Complaint,
  escalation: Escalation,
  reply: String,
  system: &Actor,
  now: DateTime<Utc>,
) {
  complaint.escalated_to = Some(escalation.escalated_to.clone());
  complaint.status = Some(status::ESCALATED.to_owned());
  complaint.escalations.push(escalation);
  complaint.public_replies.push(PublicReply::new(reply, system, now));
  complaint.touch(now);
}
