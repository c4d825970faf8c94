//! Query and reporting: read-only views derived from the full collection.

use chrono::NaiveDate;
use serde::Serialize;

use crate::complaint::{Complaint, status};

/// Reported in place of a real average until resolution times are tracked.
pub const AVG_RESOLUTION_PLACEHOLDER: &str = "3 days";

/// How many complaints [`recent`] returns by default.
pub const DEFAULT_RECENT: usize = 5;

// ─── Stats ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
  pub open:                usize,
  pub resolved:            usize,
  pub avg_resolution_time: String,
}

/// Count open and finished complaints.
///
/// Finished means `resolved` or `closed`, compared case-insensitively. A
/// complaint with no (or an empty) status lands in neither bucket.
pub fn stats(complaints: &[Complaint]) -> Stats {
  let (mut open, mut resolved) = (0, 0);
  for s in complaints.iter().filter_map(|c| c.status()).filter(|s| !s.is_empty()) {
    let lower = s.to_lowercase();
    if status::FINISHED.contains(&lower.as_str()) {
      resolved += 1;
    } else {
      open += 1;
    }
  }
  Stats { open, resolved, avg_resolution_time: AVG_RESOLUTION_PLACEHOLDER.to_owned() }
}

// ─── Recent ──────────────────────────────────────────────────────────────────

/// A complaint annotated with its dashboard display identifier.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentComplaint {
  #[serde(flatten)]
  pub complaint:  Complaint,
  pub display_id: String,
}

/// `YYYYMMDD-XXX`: the query date followed by the first three characters of
/// the id, uppercased. The date is *today*, not the submission date, so the
/// same complaint shows a different display id on different days.
pub fn display_id(complaint: &Complaint, today: NaiveDate) -> String {
  let prefix: String = complaint.id.to_string().chars().take(3).collect();
  format!("{}-{}", today.format("%Y%m%d"), prefix.to_uppercase())
}

/// The last `n` complaints in insertion order, most recent first.
pub fn recent(complaints: &[Complaint], n: usize, today: NaiveDate) -> Vec<RecentComplaint> {
  complaints
    .iter()
    .rev()
    .take(n)
    .map(|c| RecentComplaint { complaint: c.clone(), display_id: display_id(c, today) })
    .collect()
}

// ─── Escalated ───────────────────────────────────────────────────────────────

/// Complaints currently `escalated`, plus any that were ever escalated.
pub fn escalated(complaints: &[Complaint]) -> Vec<Complaint> {
  complaints
    .iter()
    .filter(|c| c.status() == Some(status::ESCALATED) || !c.escalations.is_empty())
    .cloned()
    .collect()
}
