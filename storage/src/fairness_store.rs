use async_trait::async_trait;
use domain::{CallerId, FairnessStore, RoutingKey, StoreError};
use sqlx::{PgConnection, Row};
use tracing::instrument;

pub struct PgFairnessStore;

impl PgFairnessStore {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PgFairnessStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FairnessStore for PgFairnessStore {
    #[instrument(skip(self, tx), target = "fairness")]
    async fn last_assigned(
        &self,
        tx: &mut PgConnection,
        key: &RoutingKey,
    ) -> Result<Option<CallerId>, StoreError> {
        // Upsert-then-return so the row is created with a ⊥ pointer (and
        // locked) on first use instead of leaving a brand-new routing key
        // unserialized between concurrent callers.
        let row = sqlx::query(
            r#"
INSERT INTO rr_pointers (routing_key, last_caller_id)
VALUES ($1, NULL)
ON CONFLICT (routing_key) DO UPDATE SET routing_key = EXCLUDED.routing_key
RETURNING last_caller_id
"#,
        )
        .bind(key.to_string())
        .fetch_one(&mut *tx)
        .await?;

        Ok(row.try_get::<Option<uuid::Uuid>, _>("last_caller_id")?.map(CallerId))
    }

    #[instrument(skip(self, tx), target = "fairness")]
    async fn advance(
        &self,
        tx: &mut PgConnection,
        key: &RoutingKey,
        caller_id: CallerId,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
INSERT INTO rr_pointers (routing_key, last_caller_id)
VALUES ($1, $2)
ON CONFLICT (routing_key) DO UPDATE SET last_caller_id = EXCLUDED.last_caller_id
"#,
        )
        .bind(key.to_string())
        .bind(caller_id.0)
        .execute(tx)
        .await?;
        Ok(())
    }
}
