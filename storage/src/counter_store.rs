use async_trait::async_trait;
use chrono::NaiveDate;
use domain::{CallerId, DailyCounterStore, StoreError};
use sqlx::{PgConnection, Row};
use tracing::instrument;

pub struct PgDailyCounterStore;

impl PgDailyCounterStore {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PgDailyCounterStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DailyCounterStore for PgDailyCounterStore {
    #[instrument(skip(self, tx), target = "counters")]
    async fn count(
        &self,
        tx: &mut PgConnection,
        caller_id: CallerId,
        business_date: NaiveDate,
    ) -> Result<i64, StoreError> {
        // Upsert-then-return so the row is created with count=0 (and
        // locked) on first use instead of leaving a caller's first counter
        // of the day unserialized between concurrent callers.
        let row = sqlx::query(
            r#"
INSERT INTO daily_counters (caller_id, business_date, count)
VALUES ($1, $2, 0)
ON CONFLICT (caller_id, business_date) DO UPDATE SET caller_id = EXCLUDED.caller_id
RETURNING count
"#,
        )
        .bind(caller_id.0)
        .bind(business_date)
        .fetch_one(&mut *tx)
        .await?;

        Ok(row.try_get("count")?)
    }

    #[instrument(skip(self, tx), target = "counters")]
    async fn increment(
        &self,
        tx: &mut PgConnection,
        caller_id: CallerId,
        business_date: NaiveDate,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
INSERT INTO daily_counters (caller_id, business_date, count)
VALUES ($1, $2, 1)
ON CONFLICT (caller_id, business_date) DO UPDATE SET count = daily_counters.count + 1
"#,
        )
        .bind(caller_id.0)
        .bind(business_date)
        .execute(tx)
        .await?;
        Ok(())
    }

    #[instrument(skip(self, tx), target = "counters")]
    async fn decrement(
        &self,
        tx: &mut PgConnection,
        caller_id: CallerId,
        business_date: NaiveDate,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
UPDATE daily_counters
SET count = GREATEST(count - 1, 0)
WHERE caller_id = $1 AND business_date = $2
"#,
        )
        .bind(caller_id.0)
        .bind(business_date)
        .execute(tx)
        .await?;
        Ok(())
    }
}
