//! [`Tracker`], the service facade that binds the engines to a store.
//!
//! Every mutating operation is a single [`ComplaintStore::modify`] or
//! [`ComplaintStore::modify_all`] call, so a failed write never leaves a
//! half-applied change behind. Notifications go out only after the write
//! succeeds.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::{
  Error, Result,
  actor::Actor,
  complaint::{Complaint, Escalation, NewComplaint},
  escalation::{self, AutoEscalationPolicy, EscalationRequest},
  lifecycle::{self, ComplaintUpdate},
  notify::{NoopNotifier, Notifier},
  report::{self, RecentComplaint, Stats},
  store::ComplaintStore,
};

pub struct Tracker<S> {
  store:    Arc<S>,
  notifier: Arc<dyn Notifier>,
  system:   Actor,
  policy:   AutoEscalationPolicy,
}

impl<S> Clone for Tracker<S> {
  fn clone(&self) -> Self {
    Self {
      store:    Arc::clone(&self.store),
      notifier: Arc::clone(&self.notifier),
      system:   self.system.clone(),
      policy:   self.policy.clone(),
    }
  }
}

impl<S: ComplaintStore> Tracker<S> {
  pub fn new(store: Arc<S>) -> Self {
    Self {
      store,
      notifier: Arc::new(NoopNotifier),
      system: Actor::default(),
      policy: AutoEscalationPolicy::default(),
    }
  }

  pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
    self.notifier = notifier;
    self
  }

  /// The actor recorded on sweeps and system-generated replies.
  pub fn with_system_actor(mut self, actor: Actor) -> Self {
    self.system = actor;
    self
  }

  pub fn with_policy(mut self, policy: AutoEscalationPolicy) -> Self {
    self.policy = policy;
    self
  }

  pub fn store(&self) -> &Arc<S> { &self.store }

  pub fn system_actor(&self) -> &Actor { &self.system }

  // ── Submission ────────────────────────────────────────────────────────

  pub async fn submit(&self, input: NewComplaint) -> Result<Complaint> {
    let complaint = Complaint::submit(input, Utc::now());
    self.store.insert(complaint.clone()).await.map_err(Error::store)?;
    Ok(complaint)
  }

  // ── Reads ─────────────────────────────────────────────────────────────

  pub async fn get(&self, id: Uuid) -> Result<Complaint> {
    self
      .store
      .find_by_id(id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::ComplaintNotFound(id))
  }

  pub async fn list(&self) -> Result<Vec<Complaint>> {
    self.store.load().await.map_err(Error::store)
  }

  // ── Lifecycle ─────────────────────────────────────────────────────────

  /// Apply a partial update on behalf of `actor`.
  pub async fn apply_update(
    &self,
    id: Uuid,
    update: ComplaintUpdate,
    actor: Actor,
  ) -> Result<Complaint> {
    let now = Utc::now();
    let (complaint, ()) = self
      .store
      .modify(id, move |c| lifecycle::apply_update(c, &update, &actor, now))
      .await
      .map_err(Error::store)?
      .ok_or(Error::ComplaintNotFound(id))?;
    Ok(complaint)
  }

  pub async fn resolve(&self, id: Uuid) -> Result<Complaint> {
    self.apply_update(id, ComplaintUpdate::resolve(), self.system.clone()).await
  }

  // ── Escalation ────────────────────────────────────────────────────────

  /// Escalate one complaint on behalf of `actor`.
  pub async fn escalate(
    &self,
    id: Uuid,
    request: EscalationRequest,
    actor: Actor,
  ) -> Result<(Complaint, Escalation)> {
    request.validate()?;

    let system = self.system.clone();
    let now = Utc::now();
    let (complaint, escalation) = self
      .store
      .modify(id, move |c| escalation::escalate(c, &request, &actor, &system, now))
      .await
      .map_err(Error::store)?
      .ok_or(Error::ComplaintNotFound(id))?;
    let escalation = escalation?;

    if escalation.notify_parties {
      self.notifier.escalated(&complaint, &escalation);
    }
    Ok((complaint, escalation))
  }

  /// Run one automatic-escalation sweep as of now.
  pub async fn check_auto_escalations(&self) -> Result<usize> {
    self.check_auto_escalations_at(Utc::now()).await
  }

  /// Run one sweep as of `now` and return how many complaints it escalated.
  /// The collection is written once, and only if something changed.
  pub async fn check_auto_escalations_at(&self, now: DateTime<Utc>) -> Result<usize> {
    let policy = self.policy.clone();
    let system = self.system.clone();

    let escalated = self
      .store
      .modify_all(move |all| {
        escalation::sweep(all, &policy, &system, now)
          .into_iter()
          .filter_map(|hit| {
            let complaint = all.iter().find(|c| c.id == hit.complaint_id)?.clone();
            Some((complaint, hit.escalation))
          })
          .collect()
      })
      .await
      .map_err(Error::store)?;

    for (complaint, escalation) in escalated.iter().filter(|(_, e)| e.notify_parties) {
      self.notifier.escalated(complaint, escalation);
    }
    Ok(escalated.len())
  }

  // ── Reporting ─────────────────────────────────────────────────────────

  pub async fn stats(&self) -> Result<Stats> { Ok(report::stats(&self.list().await?)) }

  /// The newest `n` complaints with display ids derived from `today`.
  pub async fn recent(&self, n: usize, today: NaiveDate) -> Result<Vec<RecentComplaint>> {
    Ok(report::recent(&self.list().await?, n, today))
  }

  pub async fn escalated(&self) -> Result<Vec<Complaint>> {
    Ok(report::escalated(&self.list().await?))
  }
}
