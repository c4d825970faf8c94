//! Notification capability invoked after an escalation is persisted.
//!
//! Delivery (email, SMS, ...) is out of scope; implementors decide what
//! "notify the parties" means.

use crate::complaint::{Complaint, Escalation};

pub trait Notifier: Send + Sync {
  /// Called once per escalation whose `notify_parties` flag is set, after the
  /// escalated complaint has been written to the store.
  fn escalated(&self, complaint: &Complaint, escalation: &Escalation);
}

/// Discards every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
  fn escalated(&self, _complaint: &Complaint, _escalation: &Escalation) {}
}
