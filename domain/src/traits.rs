use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgConnection;

use crate::caller::CallerSummary;
use crate::error::StoreError;
use crate::event::AssignmentEvent;
use crate::ids::{CallerId, LeadId};
use crate::lead::{Lead, ValidatedLead};
use crate::routing::RoutingKey;

type StoreResult<T> = Result<T, StoreError>;

/// Read access to caller eligibility and ordering. All methods take the
/// transaction they run in explicitly, since selection and the daily-cap
/// check must see a consistent snapshot under the same row locks.
#[async_trait]
pub trait CallerRepository: Send + Sync {
    /// Active callers eligible for `key`, oldest-`created_at`-first,
    /// locked `FOR UPDATE` so a concurrent assignment can't reorder them
    /// mid-selection.
    async fn eligible_candidates(
        &self,
        tx: &mut PgConnection,
        key: &RoutingKey,
    ) -> StoreResult<Vec<CallerSummary>>;

    async fn is_active(&self, tx: &mut PgConnection, caller_id: CallerId) -> StoreResult<bool>;

    /// The caller's display name, for event emission / notification.
    async fn name_of(&self, tx: &mut PgConnection, caller_id: CallerId) -> StoreResult<Option<String>>;
}

/// The round-robin pointer for one routing key. One row per key; the
/// engine reads, advances and writes it back inside the same transaction
/// that performed the selection.
#[async_trait]
pub trait FairnessStore: Send + Sync {
    async fn last_assigned(
        &self,
        tx: &mut PgConnection,
        key: &RoutingKey,
    ) -> StoreResult<Option<CallerId>>;

    async fn advance(
        &self,
        tx: &mut PgConnection,
        key: &RoutingKey,
        caller_id: CallerId,
    ) -> StoreResult<()>;
}

/// Per-caller, per-business-day assignment counts used for cap
/// enforcement. Incremented only after a candidate has been tentatively
/// selected (§4.5.1 step 2 — the cap is evaluated lazily, not against
/// every candidate up front).
#[async_trait]
pub trait DailyCounterStore: Send + Sync {
    async fn count(
        &self,
        tx: &mut PgConnection,
        caller_id: CallerId,
        business_date: NaiveDate,
    ) -> StoreResult<i64>;

    async fn increment(
        &self,
        tx: &mut PgConnection,
        caller_id: CallerId,
        business_date: NaiveDate,
    ) -> StoreResult<()>;

    async fn decrement(
        &self,
        tx: &mut PgConnection,
        caller_id: CallerId,
        business_date: NaiveDate,
    ) -> StoreResult<()>;
}

/// Lead persistence and the idempotency boundary: `validate_or_replay`
/// either inserts a brand-new lead or, on a natural-key collision, returns
/// the lead that already owns `(phone, source_timestamp)`.
#[async_trait]
pub trait LeadStore: Send + Sync {
    async fn validate_or_replay(
        &self,
        tx: &mut PgConnection,
        lead: Lead,
    ) -> StoreResult<(ValidatedLead, bool)>;

    async fn find_by_id(
        &self,
        tx: &mut PgConnection,
        lead_id: LeadId,
    ) -> StoreResult<Option<ValidatedLead>>;
}

/// Fire-and-forget publication of freshly computed assignment decisions.
/// Never called for replayed outcomes.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn publish(&self, event: AssignmentEvent);
}
