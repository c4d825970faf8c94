//! Periodic driver for the automatic-escalation sweep.
//!
//! The sweep itself runs once per call; this task only decides when to call.

use std::time::Duration;

use grievance_core::{store::ComplaintStore, tracker::Tracker};
use tokio::{task::JoinHandle, time::MissedTickBehavior};

/// Run a sweep every `every`, starting immediately.
pub fn spawn_sweeper<S>(tracker: Tracker<S>, every: Duration) -> JoinHandle<()>
where
  S: ComplaintStore + 'static,
{
  tokio::spawn(async move {
    tracing::debug!(actor = %tracker.system_actor(), "escalation sweeper started");
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
      ticker.tick().await;
      match tracker.check_auto_escalations().await {
        Ok(0) => tracing::debug!("escalation sweep: nothing due"),
        Ok(n) => tracing::info!(escalated = n, "escalation sweep completed"),
        Err(e) => tracing::error!(error = %e, "escalation sweep failed"),
      }
    }
  })
}
