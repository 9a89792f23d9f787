use std::sync::Arc;

use chrono::{DateTime, Utc};
use common::{BusinessCalendar, Clock, Counters};
use domain::{
    Assignment, AssignmentId, AssignmentStatus, AssignOutcome, AssignmentEvent, AssignmentOutcome,
    CallerId, CallerRepository, DailyCounterStore, EventSink, FairnessStore, Lead, LeadId,
    LeadStore, ReasonCode, RoutingKey, ValidatedLead,
};
use sqlx::{PgConnection, PgPool};
use tracing::instrument;

use crate::error::EngineError;
use crate::selection::rotate_from_last;

/// The transactional core described by the assignment algorithm. Holds no
/// pool of its own state beyond the injected adapters — every method that
/// needs a transaction either takes one (`*_in_tx`) or opens and owns one
/// (the convenience wrappers).
pub struct AssignmentEngine {
    callers: Arc<dyn CallerRepository>,
    fairness: Arc<dyn FairnessStore>,
    counters: Arc<dyn DailyCounterStore>,
    leads: Arc<dyn LeadStore>,
    events: Arc<dyn EventSink>,
    clock: Arc<dyn Clock>,
    calendar: BusinessCalendar,
    metrics: Counters,
    max_transient_retries: u32,
}

impl AssignmentEngine {
    pub fn new(
        callers: Arc<dyn CallerRepository>,
        fairness: Arc<dyn FairnessStore>,
        counters: Arc<dyn DailyCounterStore>,
        leads: Arc<dyn LeadStore>,
        events: Arc<dyn EventSink>,
        clock: Arc<dyn Clock>,
        calendar: BusinessCalendar,
        metrics: Counters,
        max_transient_retries: u32,
    ) -> Self {
        Self {
            callers,
            fairness,
            counters,
            leads,
            events,
            clock,
            calendar,
            metrics,
            max_transient_retries,
        }
    }

    /// Read-only handle to this engine's operational counters, for
    /// exposing in a health/metrics endpoint outside this crate's scope.
    pub fn metrics(&self) -> &Counters {
        &self.metrics
    }

    /// The literal `assign(lead, tx) -> AssignmentOutcome` contract: runs
    /// entirely within the caller's transaction, never commits, never
    /// emits an event. The caller owns transaction lifecycle and, on
    /// success, post-commit emission.
    #[instrument(skip_all, target = "engine", fields(phone = %lead.phone))]
    pub async fn assign_in_tx(
        &self,
        tx: &mut PgConnection,
        lead: Lead,
        now: DateTime<Utc>,
    ) -> Result<AssignOutcome, EngineError> {
        let (validated, replayed) = self.leads.validate_or_replay(tx, lead).await?;

        if replayed {
            let assignment = self.current_assignment_or_err(tx, validated.id).await?;
            return Ok(AssignOutcome::replay(outcome_from(assignment)));
        }

        let business_date = self.calendar.business_date(now);
        let outcome = self.select_and_persist(tx, &validated, business_date, now).await?;
        Ok(AssignOutcome::fresh(outcome))
    }

    /// Owns the full commit+emit lifecycle. Intended for callers that
    /// aren't themselves already inside a transaction (there is no
    /// ingestion transport in scope to supply one). Retries the whole
    /// transaction a bounded number of times on a serialization failure or
    /// deadlock, per §7's "transient conflict" handling.
    pub async fn assign(&self, pool: &PgPool, lead: Lead) -> Result<AssignOutcome, EngineError> {
        let now = self.clock.now();

        let mut attempt = 0;
        loop {
            let mut tx = pool.begin().await?;
            match self.assign_in_tx(&mut tx, lead.clone(), now).await {
                Ok(result) => {
                    tx.commit().await?;

                    if result.replayed {
                        self.metrics.incr_replayed();
                    } else {
                        self.record_outcome(&result.outcome);
                        self.publish(result.outcome.assignment().clone(), now).await;
                    }
                    return Ok(result);
                }
                Err(err) if is_transient_conflict(&err) && attempt < self.max_transient_retries => {
                    attempt += 1;
                    self.metrics.incr_transient_retry();
                    continue;
                }
                Err(err) if is_transient_conflict(&err) => {
                    return Err(EngineError::TransientConflictExhausted(self.max_transient_retries));
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// `reassign(lead_id, target_caller_id | null, tx)`. Null target reruns
    /// auto-selection; an explicit target bypasses cap and routing checks
    /// entirely (manual override).
    #[instrument(skip(self, tx), target = "engine", fields(lead_id = %lead_id))]
    pub async fn reassign_in_tx(
        &self,
        tx: &mut PgConnection,
        lead_id: LeadId,
        target: Option<CallerId>,
        now: DateTime<Utc>,
    ) -> Result<AssignmentOutcome, EngineError> {
        let validated = self
            .leads
            .find_by_id(tx, lead_id)
            .await?
            .ok_or(EngineError::NoSuchAssignment(lead_id))?;
        let previous = self.current_assignment_or_err(tx, lead_id).await?;

        let business_date = self.calendar.business_date(now);

        let outcome = match target {
            None => self.select_and_persist(tx, &validated, business_date, now).await?,
            Some(caller_id) => {
                if !self.callers.is_active(tx, caller_id).await? {
                    return Err(EngineError::InactiveTarget(caller_id));
                }
                let assignment = self
                    .persist_assignment(
                        tx,
                        lead_id,
                        Some(caller_id),
                        AssignmentStatus::Assigned,
                        ReasonCode::ManualReassign,
                        business_date,
                        now,
                    )
                    .await?;
                self.counters.increment(tx, caller_id, business_date).await?;
                AssignmentOutcome::Assigned(assignment)
            }
        };

        // Historical days are never retroactively adjusted: only decrement
        // the previous caller's counter if the original assignment happened
        // on today's business date.
        if let (Some(prev_caller), true) = (previous.caller_id, previous.business_date == business_date) {
            self.counters.decrement(tx, prev_caller, previous.business_date).await?;
        }

        self.mark_superseded(tx, previous.id).await?;
        Ok(outcome)
    }

    pub async fn reassign(
        &self,
        pool: &PgPool,
        lead_id: LeadId,
        target: Option<CallerId>,
    ) -> Result<AssignmentOutcome, EngineError> {
        let now = self.clock.now();

        let mut attempt = 0;
        loop {
            let mut tx = pool.begin().await?;
            match self.reassign_in_tx(&mut tx, lead_id, target, now).await {
                Ok(outcome) => {
                    tx.commit().await?;
                    self.record_outcome(&outcome);
                    self.publish(outcome.assignment().clone(), now).await;
                    return Ok(outcome);
                }
                Err(err) if is_transient_conflict(&err) && attempt < self.max_transient_retries => {
                    attempt += 1;
                    self.metrics.incr_transient_retry();
                    continue;
                }
                Err(err) if is_transient_conflict(&err) => {
                    return Err(EngineError::TransientConflictExhausted(self.max_transient_retries));
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn record_outcome(&self, outcome: &AssignmentOutcome) {
        match outcome {
            AssignmentOutcome::Assigned(_) => self.metrics.incr_assigned(),
            AssignmentOutcome::Unassigned(_) => self.metrics.incr_unassigned(),
        }
    }

    /// Steps 1–5 of the selection algorithm: state-scoped round robin,
    /// global fallback, then unassigned.
    async fn select_and_persist(
        &self,
        tx: &mut PgConnection,
        lead: &ValidatedLead,
        business_date: chrono::NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<AssignmentOutcome, EngineError> {
        let state_key = RoutingKey::for_state(lead.state_ref());

        if let RoutingKey::State(_) = &state_key {
            if let Some(caller_id) = self
                .walk_and_select(tx, &state_key, business_date)
                .await?
                .selected
            {
                let assignment = self
                    .persist_assignment(
                        tx,
                        lead.id,
                        Some(caller_id),
                        AssignmentStatus::Assigned,
                        ReasonCode::StateRoundRobin,
                        business_date,
                        now,
                    )
                    .await?;
                return Ok(AssignmentOutcome::Assigned(assignment));
            }
        }

        let global_key = RoutingKey::global();
        let global_walk = self.walk_and_select(tx, &global_key, business_date).await?;
        if let Some(caller_id) = global_walk.selected {
            let assignment = self
                .persist_assignment(
                    tx,
                    lead.id,
                    Some(caller_id),
                    AssignmentStatus::Assigned,
                    ReasonCode::GlobalRoundRobin,
                    business_date,
                    now,
                )
                .await?;
            return Ok(AssignmentOutcome::Assigned(assignment));
        }

        let reason = if global_walk.had_candidates {
            ReasonCode::UnassignedCapReached
        } else {
            ReasonCode::UnassignedNoEligible
        };
        let assignment = self
            .persist_assignment(tx, lead.id, None, AssignmentStatus::Unassigned, reason, business_date, now)
            .await?;
        Ok(AssignmentOutcome::Unassigned(assignment))
    }

    /// Locks `key`'s pointer, rotates the eligible candidates after it, and
    /// walks the rotated order for the first uncapped candidate. On a hit,
    /// advances the pointer and increments the candidate's counter before
    /// returning it. Reports whether any candidates existed at all, so a
    /// caller doesn't need a second `eligible_candidates` round trip just
    /// to distinguish "none eligible" from "all capped".
    async fn walk_and_select(
        &self,
        tx: &mut PgConnection,
        key: &RoutingKey,
        business_date: chrono::NaiveDate,
    ) -> Result<WalkOutcome, EngineError> {
        let candidates = self.callers.eligible_candidates(tx, key).await?;
        if candidates.is_empty() {
            return Ok(WalkOutcome { selected: None, had_candidates: false });
        }

        let last = self.fairness.last_assigned(tx, key).await?;
        let order = rotate_from_last(&candidates, last);

        for candidate in order {
            let count = self.counters.count(tx, candidate.id, business_date).await?;
            if candidate.uncapped(count) {
                self.counters.increment(tx, candidate.id, business_date).await?;
                self.fairness.advance(tx, key, candidate.id).await?;
                return Ok(WalkOutcome { selected: Some(candidate.id), had_candidates: true });
            }
        }
        Ok(WalkOutcome { selected: None, had_candidates: true })
    }

    async fn persist_assignment(
        &self,
        tx: &mut PgConnection,
        lead_id: LeadId,
        caller_id: Option<CallerId>,
        status: AssignmentStatus,
        reason: ReasonCode,
        business_date: chrono::NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<Assignment, EngineError> {
        let assignment = Assignment {
            id: AssignmentId::new(),
            lead_id,
            caller_id,
            status,
            reason,
            business_date,
            created_at: now,
        };
        crate::store::insert_assignment(tx, &assignment).await?;
        Ok(assignment)
    }

    async fn mark_superseded(&self, tx: &mut PgConnection, assignment_id: AssignmentId) -> Result<(), EngineError> {
        crate::store::mark_superseded(tx, assignment_id).await?;
        Ok(())
    }

    async fn current_assignment_or_err(
        &self,
        tx: &mut PgConnection,
        lead_id: LeadId,
    ) -> Result<Assignment, EngineError> {
        crate::store::current_assignment(tx, lead_id)
            .await?
            .ok_or(EngineError::NoSuchAssignment(lead_id))
    }

    async fn publish(&self, assignment: Assignment, now: DateTime<Utc>) {
        self.events.publish(AssignmentEvent::new(assignment, now)).await;
    }
}

/// Result of walking a routing key's rotated candidate order once.
struct WalkOutcome {
    selected: Option<CallerId>,
    had_candidates: bool,
}

fn outcome_from(assignment: Assignment) -> AssignmentOutcome {
    match assignment.status {
        AssignmentStatus::Assigned => AssignmentOutcome::Assigned(assignment),
        _ => AssignmentOutcome::Unassigned(assignment),
    }
}

/// Postgres surfaces a busy row lock as either a deadlock (`40P01`) or,
/// under higher isolation levels, a serialization failure (`40001`).
/// Both are transient: the same transaction retried fresh is expected to
/// succeed once the competing transaction clears.
fn is_transient_conflict(err: &EngineError) -> bool {
    let EngineError::Transaction(sqlx::Error::Database(db_err)) = err else {
        return false;
    };
    matches!(db_err.code().as_deref(), Some("40001") | Some("40P01"))
}
