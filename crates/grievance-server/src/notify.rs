//! Escalation notifications, delivered to the log.

use grievance_core::{
  complaint::{Complaint, Escalation},
  notify::Notifier,
};

/// Emits one structured event per escalation that asked for notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
  fn escalated(&self, complaint: &Complaint, escalation: &Escalation) {
    tracing::info!(
      complaint_id  = %complaint.id,
      escalation_id = %escalation.escalation_id,
      escalated_to  = %escalation.escalated_to,
      submitter     = %complaint.email,
      "notifying parties of escalation"
    );
  }
}
