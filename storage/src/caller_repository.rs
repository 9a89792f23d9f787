use async_trait::async_trait;
use domain::{CallerId, CallerRepository, CallerSummary, RoutingKey, StoreError};
use sqlx::{PgConnection, Row};
use tracing::instrument;

pub struct PgCallerRepository;

impl PgCallerRepository {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PgCallerRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CallerRepository for PgCallerRepository {
    #[instrument(skip(self, tx), target = "repository", fields(key = %key))]
    async fn eligible_candidates(
        &self,
        tx: &mut PgConnection,
        key: &RoutingKey,
    ) -> Result<Vec<CallerSummary>, StoreError> {
        // Caller configuration is read unlocked: §5 tolerates a caller's
        // config changing between candidate computation and pointer
        // commit, so only the pointer and counter rows are lock points.
        let rows = match key {
            RoutingKey::State(state) => {
                sqlx::query(
                    r#"
SELECT c.id, c.daily_limit, c.created_at
FROM callers c
JOIN caller_states cs ON cs.caller_id = c.id
WHERE c.status = 'active' AND cs.state = $1
ORDER BY c.created_at ASC, c.id ASC
"#,
                )
                .bind(state)
                .fetch_all(&mut *tx)
                .await?
            }
            RoutingKey::Global => {
                sqlx::query(
                    r#"
SELECT id, daily_limit, created_at
FROM callers
WHERE status = 'active'
ORDER BY created_at ASC, id ASC
"#,
                )
                .fetch_all(&mut *tx)
                .await?
            }
        };

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(CallerSummary {
                id: CallerId(row.try_get("id")?),
                daily_limit: row.try_get("daily_limit")?,
                created_at: row.try_get("created_at")?,
            });
        }
        Ok(out)
    }

    async fn is_active(&self, tx: &mut PgConnection, caller_id: CallerId) -> Result<bool, StoreError> {
        let row = sqlx::query("SELECT status FROM callers WHERE id = $1")
            .bind(caller_id.0)
            .fetch_optional(tx)
            .await?;
        Ok(match row {
            Some(r) => r.try_get::<String, _>("status")? == "active",
            None => false,
        })
    }

    async fn name_of(&self, tx: &mut PgConnection, caller_id: CallerId) -> Result<Option<String>, StoreError> {
        let row = sqlx::query("SELECT name FROM callers WHERE id = $1")
            .bind(caller_id.0)
            .fetch_optional(tx)
            .await?;
        Ok(match row {
            Some(r) => Some(r.try_get("name")?),
            None => None,
        })
    }
}
