//! Integration tests for `SqliteStore` and the tracker against an in-memory
//! database.

use std::sync::{Arc, Mutex};

use chrono::{Duration, NaiveDate, Utc};
use grievance_core::{
  Error as CoreError,
  actor::Actor,
  complaint::{Complaint, Escalation, EscalationKind, NewComplaint},
  escalation::EscalationRequest,
  lifecycle::ComplaintUpdate,
  notify::Notifier,
  store::{AccountStore, ComplaintStore},
  tracker::Tracker,
};
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn tracker() -> Tracker<SqliteStore> { Tracker::new(Arc::new(store().await)) }

fn new_complaint(category: &str) -> NewComplaint {
  NewComplaint {
    email:       "citizen@example.com".into(),
    category:    category.into(),
    description: "streetlight out on Elm St".into(),
    pdf_file:    None,
  }
}

/// Insert a complaint whose last update was `days` ago.
async fn seed_aged(s: &SqliteStore, status: &str, days: i64) -> Complaint {
  let mut c = Complaint::submit(new_complaint("lighting"), Utc::now() - Duration::days(days));
  c.status = Some(status.to_owned());
  s.insert(c.clone()).await.unwrap();
  c
}

#[derive(Default)]
struct RecordingNotifier {
  seen: Mutex<Vec<(Uuid, Uuid)>>,
}

impl Notifier for RecordingNotifier {
  fn escalated(&self, complaint: &Complaint, escalation: &Escalation) {
    self.seen.lock().unwrap().push((complaint.id, escalation.escalation_id));
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn empty_store_loads_empty() {
  let s = store().await;
  assert!(s.load().await.unwrap().is_empty());
}

#[tokio::test]
async fn insert_and_find() {
  let s = store().await;
  let c = Complaint::submit(new_complaint("roads"), Utc::now());
  s.insert(c.clone()).await.unwrap();

  assert_eq!(s.find_by_id(c.id).await.unwrap(), Some(c));
  assert!(s.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_insert_is_rejected() {
  let s = store().await;
  let c = Complaint::submit(new_complaint("roads"), Utc::now());
  s.insert(c.clone()).await.unwrap();

  let err = s.insert(c.clone()).await.unwrap_err();
  assert!(matches!(err, Error::DuplicateComplaint(id) if id == c.id));
  assert_eq!(s.load().await.unwrap().len(), 1);
}

#[tokio::test]
async fn load_preserves_insertion_order() {
  let s = store().await;
  let mut ids = Vec::new();
  for cat in ["a", "b", "c"] {
    let c = Complaint::submit(new_complaint(cat), Utc::now());
    ids.push(c.id);
    s.insert(c).await.unwrap();
  }
  let loaded: Vec<Uuid> = s.load().await.unwrap().iter().map(|c| c.id).collect();
  assert_eq!(loaded, ids);
}

#[tokio::test]
async fn save_of_load_is_a_no_op() {
  let s = store().await;
  for cat in ["a", "b", "c"] {
    s.insert(Complaint::submit(new_complaint(cat), Utc::now())).await.unwrap();
  }
  let t = Tracker::new(Arc::new(s.clone()));
  let first = s.load().await.unwrap()[0].id;
  t.escalate(
    first,
    EscalationRequest { escalate_to: "Council".into(), reason: "slow".into(), notify_parties: true },
    Actor::new("alice"),
  )
  .await
  .unwrap();

  let before = s.raw_rows().await.unwrap();
  s.save(s.load().await.unwrap()).await.unwrap();
  assert_eq!(s.raw_rows().await.unwrap(), before);

  // Appending after a rewrite still lands at the end.
  let late = Complaint::submit(new_complaint("d"), Utc::now());
  s.insert(late.clone()).await.unwrap();
  assert_eq!(s.load().await.unwrap().last().map(|c| c.id), Some(late.id));
}

#[tokio::test]
async fn save_replaces_whole_collection() {
  let s = store().await;
  let a = seed_aged(&s, "Submitted", 0).await;
  let _b = seed_aged(&s, "Submitted", 0).await;

  s.save(vec![a.clone()]).await.unwrap();
  assert_eq!(s.load().await.unwrap(), vec![a]);
}

#[tokio::test]
async fn save_with_duplicate_ids_leaves_store_unchanged() {
  let s = store().await;
  let a = seed_aged(&s, "Submitted", 0).await;
  let before = s.raw_rows().await.unwrap();

  let mut twin = Complaint::submit(new_complaint("x"), Utc::now());
  twin.id = Uuid::new_v4();
  let err = s.save(vec![twin.clone(), a.clone(), twin]).await.unwrap_err();

  assert!(matches!(err, Error::DuplicateComplaint(_)));
  assert_eq!(s.raw_rows().await.unwrap(), before);
}

#[tokio::test]
async fn modify_missing_id_returns_none() {
  let s = store().await;
  let out = s.modify(Uuid::new_v4(), |c| c.status = Some("x".into())).await.unwrap();
  assert!(out.is_none());
}

#[tokio::test]
async fn modify_all_without_changes_writes_nothing() {
  let s = store().await;
  seed_aged(&s, "Submitted", 0).await;
  let before = s.raw_rows().await.unwrap();

  let changes: Vec<()> = s
    .modify_all(|all| {
      // Mutate but report nothing: the write must be skipped.
      all[0].status = Some("tampered".into());
      Vec::new()
    })
    .await
    .unwrap();

  assert!(changes.is_empty());
  assert_eq!(s.raw_rows().await.unwrap(), before);
}

// ─── Accounts ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn accounts_are_unique_by_email() {
  let s = store().await;
  assert!(s.create_account("a@example.com".into(), "$argon2id$hash".into()).await.unwrap());
  assert!(!s.create_account("a@example.com".into(), "$argon2id$other".into()).await.unwrap());
  assert_eq!(
    s.password_hash("a@example.com".into()).await.unwrap().as_deref(),
    Some("$argon2id$hash")
  );
  assert!(s.password_hash("b@example.com".into()).await.unwrap().is_none());
}

// ─── Tracker: lifecycle ──────────────────────────────────────────────────────

#[tokio::test]
async fn submit_starts_in_submitted_state() {
  let t = tracker().await;
  let c = t.submit(new_complaint("noise")).await.unwrap();
  assert_eq!(c.status(), Some("Submitted"));
  assert!(c.last_updated.is_some());
  assert_eq!(t.get(c.id).await.unwrap(), c);
}

#[tokio::test]
async fn get_unknown_is_not_found() {
  let t = tracker().await;
  let id = Uuid::new_v4();
  assert!(matches!(t.get(id).await, Err(CoreError::ComplaintNotFound(x)) if x == id));
}

#[tokio::test]
async fn update_persists_only_named_fields() {
  let t = tracker().await;
  let c = t.submit(new_complaint("noise")).await.unwrap();

  let updated = t
    .apply_update(
      c.id,
      ComplaintUpdate { assigned_to: Some("dave".into()), ..Default::default() },
      Actor::new("alice"),
    )
    .await
    .unwrap();

  let stored = t.get(c.id).await.unwrap();
  assert_eq!(stored, updated);
  assert_eq!(stored.assigned_to.as_deref(), Some("dave"));
  assert_eq!(stored.status, c.status);
  assert_eq!(stored.email, c.email);
  assert_eq!(stored.internal_notes, c.internal_notes);
  assert_eq!(stored.public_replies, c.public_replies);
  assert!(stored.last_updated >= c.last_updated);
}

#[tokio::test]
async fn update_unknown_is_not_found() {
  let t = tracker().await;
  let res = t.apply_update(Uuid::new_v4(), ComplaintUpdate::default(), Actor::new("a")).await;
  assert!(matches!(res, Err(CoreError::ComplaintNotFound(_))));
}

#[tokio::test]
async fn resolve_sets_resolved() {
  let t = tracker().await;
  let c = t.submit(new_complaint("noise")).await.unwrap();
  let r = t.resolve(c.id).await.unwrap();
  assert_eq!(r.status(), Some("Resolved"));
}

// ─── Tracker: escalation ─────────────────────────────────────────────────────

#[tokio::test]
async fn escalate_appends_exactly_one_record_and_reply() {
  let notifier = Arc::new(RecordingNotifier::default());
  let t = tracker().await.with_notifier(notifier.clone());
  let c = t.submit(new_complaint("water")).await.unwrap();

  let (after, escalation) = t
    .escalate(
      c.id,
      EscalationRequest {
        escalate_to:    "Water Board".into(),
        reason:         "no action in 2 weeks".into(),
        notify_parties: true,
      },
      Actor::new("alice"),
    )
    .await
    .unwrap();

  assert_eq!(after.escalations.len(), c.escalations.len() + 1);
  assert_eq!(after.public_replies.len(), c.public_replies.len() + 1);
  assert_eq!(after.status(), Some("escalated"));
  assert_eq!(after.escalated_to.as_deref(), Some("Water Board"));
  assert_eq!(escalation.escalated_by, "alice");
  assert_eq!(t.get(c.id).await.unwrap(), after);
  assert_eq!(*notifier.seen.lock().unwrap(), vec![(c.id, escalation.escalation_id)]);
}

#[tokio::test]
async fn escalate_without_notify_stays_quiet() {
  let notifier = Arc::new(RecordingNotifier::default());
  let t = tracker().await.with_notifier(notifier.clone());
  let c = t.submit(new_complaint("water")).await.unwrap();
  t.escalate(
    c.id,
    EscalationRequest { escalate_to: "Board".into(), reason: "r".into(), notify_parties: false },
    Actor::new("alice"),
  )
  .await
  .unwrap();
  assert!(notifier.seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn escalate_unknown_leaves_store_unchanged() {
  let s = Arc::new(store().await);
  let t = Tracker::new(s.clone());
  t.submit(new_complaint("water")).await.unwrap();
  let before = s.raw_rows().await.unwrap();

  let res = t
    .escalate(
      Uuid::new_v4(),
      EscalationRequest { escalate_to: "Board".into(), reason: "r".into(), notify_parties: false },
      Actor::new("alice"),
    )
    .await;

  assert!(matches!(res, Err(CoreError::ComplaintNotFound(_))));
  assert_eq!(s.raw_rows().await.unwrap(), before);
}

#[tokio::test]
async fn escalate_with_blank_fields_leaves_store_unchanged() {
  let s = Arc::new(store().await);
  let t = Tracker::new(s.clone());
  let c = t.submit(new_complaint("water")).await.unwrap();
  let before = s.raw_rows().await.unwrap();

  for (to, reason) in [("", "because"), ("Board", "")] {
    let res = t
      .escalate(
        c.id,
        EscalationRequest { escalate_to: to.into(), reason: reason.into(), notify_parties: false },
        Actor::new("alice"),
      )
      .await;
    assert!(matches!(res, Err(CoreError::InvalidArgument(_))));
  }
  assert_eq!(s.raw_rows().await.unwrap(), before);
}

#[tokio::test]
async fn sweep_escalates_stale_complaint_to_senior_management() {
  let s = Arc::new(store().await);
  let notifier = Arc::new(RecordingNotifier::default());
  let t = Tracker::new(s.clone())
    .with_notifier(notifier.clone())
    .with_system_actor(Actor::new("scheduler"));
  let stale = seed_aged(&s, "under-review", 8).await;
  let fresh = seed_aged(&s, "under-review", 2).await;

  let count = t.check_auto_escalations_at(Utc::now()).await.unwrap();
  assert_eq!(count, 1);

  let stale = t.get(stale.id).await.unwrap();
  assert_eq!(stale.status(), Some("escalated"));
  assert_eq!(stale.escalated_to.as_deref(), Some("Senior Management"));
  let e = &stale.escalations[0];
  assert_eq!(e.status, EscalationKind::AutoEscalated);
  assert!(e.reason.contains("8 days"));
  assert_eq!(e.escalated_by, "scheduler");
  assert_eq!(stale.public_replies[0].added_by, "scheduler");

  assert_eq!(t.get(fresh.id).await.unwrap(), fresh);
  assert_eq!(notifier.seen.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn sweep_twice_with_same_now_escalates_nothing_the_second_time() {
  let s = Arc::new(store().await);
  let t = Tracker::new(s.clone());
  seed_aged(&s, "Submitted", 9).await;
  seed_aged(&s, "Open", 30).await;
  let now = Utc::now();

  assert_eq!(t.check_auto_escalations_at(now).await.unwrap(), 2);
  let after_first = s.raw_rows().await.unwrap();
  assert_eq!(t.check_auto_escalations_at(now).await.unwrap(), 0);
  assert_eq!(s.raw_rows().await.unwrap(), after_first);
}

#[tokio::test]
async fn note_resets_escalation_clock() {
  let s = Arc::new(store().await);
  let t = Tracker::new(s.clone());
  let c = seed_aged(&s, "under-review", 20).await;

  t.apply_update(
    c.id,
    ComplaintUpdate { internal_note: Some("chasing vendor".into()), ..Default::default() },
    Actor::new("bob"),
  )
  .await
  .unwrap();

  assert_eq!(t.check_auto_escalations().await.unwrap(), 0);
}

#[tokio::test]
async fn custom_threshold_is_honoured() {
  let s = Arc::new(store().await);
  let t = Tracker::new(s.clone()).with_policy(grievance_core::escalation::AutoEscalationPolicy {
    threshold_days: 3,
    ..Default::default()
  });
  seed_aged(&s, "Submitted", 3).await;
  assert_eq!(t.check_auto_escalations().await.unwrap(), 1);
}

// ─── Tracker: concurrent writers ─────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_updates_and_sweep_lose_nothing() {
  let s = Arc::new(store().await);
  let t = Tracker::new(s.clone());
  let a = seed_aged(&s, "under-review", 1).await;
  let b = seed_aged(&s, "under-review", 1).await;
  let stale = seed_aged(&s, "under-review", 10).await;

  let mut handles = Vec::new();
  for i in 0..50 {
    let tw = t.clone();
    let id = if i % 2 == 0 { a.id } else { b.id };
    handles.push(tokio::spawn(async move {
      tw.apply_update(
        id,
        ComplaintUpdate { internal_note: Some(format!("note {i}")), ..Default::default() },
        Actor::new("clerk"),
      )
      .await
      .map(|_| 0)
    }));
    if i == 25 {
      let t = t.clone();
      handles.push(tokio::spawn(async move { t.check_auto_escalations().await }));
    }
  }
  let mut swept = 0;
  for h in handles {
    swept += h.await.unwrap().unwrap();
  }

  assert_eq!(swept, 1);
  assert_eq!(t.get(a.id).await.unwrap().internal_notes.len(), 25);
  assert_eq!(t.get(b.id).await.unwrap().internal_notes.len(), 25);
  assert_eq!(t.get(stale.id).await.unwrap().status(), Some("escalated"));
}

// ─── Tracker: reporting ──────────────────────────────────────────────────────

#[tokio::test]
async fn reporting_views() {
  let s = Arc::new(store().await);
  let t = Tracker::new(s.clone());
  let a = seed_aged(&s, "resolved", 0).await;
  let b = seed_aged(&s, "Open", 0).await;
  let mut c = Complaint::submit(new_complaint("misc"), Utc::now());
  c.status = None;
  s.insert(c.clone()).await.unwrap();

  let stats = t.stats().await.unwrap();
  assert_eq!((stats.open, stats.resolved), (1, 1));

  let today = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
  let recent = t.recent(2, today).await.unwrap();
  let ids: Vec<_> = recent.iter().map(|r| r.complaint.id).collect();
  assert_eq!(ids, vec![c.id, b.id]);
  assert!(recent[0].display_id.starts_with("20250131-"));

  t.escalate(
    a.id,
    EscalationRequest { escalate_to: "Board".into(), reason: "r".into(), notify_parties: false },
    Actor::new("alice"),
  )
  .await
  .unwrap();
  t.resolve(a.id).await.unwrap();
  let escalated: Vec<_> = t.escalated().await.unwrap().iter().map(|c| c.id).collect();
  assert_eq!(escalated, vec![a.id]);
}
