use async_trait::async_trait;
use domain::{Lead, LeadId, LeadStore, StoreError, ValidatedLead};
use sqlx::{PgConnection, Row};

const UNIQUE_VIOLATION: &str = "23505";

pub struct PgLeadStore;

impl PgLeadStore {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PgLeadStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LeadStore for PgLeadStore {
    async fn validate_or_replay(
        &self,
        tx: &mut PgConnection,
        lead: Lead,
    ) -> Result<(ValidatedLead, bool), StoreError> {
        let id = LeadId::new();
        let insert = sqlx::query(
            r#"
INSERT INTO leads (id, phone, source_timestamp, state, payload)
VALUES ($1, $2, $3, $4, $5)
"#,
        )
        .bind(id.0)
        .bind(&lead.phone)
        .bind(lead.source_timestamp)
        .bind(&lead.state)
        .bind(&lead.payload)
        .execute(&mut *tx)
        .await;

        match insert {
            Ok(_) => Ok((
                ValidatedLead {
                    id,
                    phone: lead.phone,
                    source_timestamp: lead.source_timestamp,
                    state: lead.state,
                    payload: lead.payload,
                },
                false,
            )),
            Err(sqlx::Error::Database(ref db_err)) if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                let existing = fetch_by_natural_key(tx, &lead.phone, lead.source_timestamp).await?;
                Ok((existing, true))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_id(
        &self,
        tx: &mut PgConnection,
        lead_id: LeadId,
    ) -> Result<Option<ValidatedLead>, StoreError> {
        let row = sqlx::query("SELECT id, phone, source_timestamp, state, payload FROM leads WHERE id = $1")
            .bind(lead_id.0)
            .fetch_optional(tx)
            .await?;

        let Some(row) = row else { return Ok(None) };
        Ok(Some(row_to_lead(row)?))
    }
}

async fn fetch_by_natural_key(
    tx: &mut PgConnection,
    phone: &str,
    source_timestamp: chrono::DateTime<chrono::Utc>,
) -> Result<ValidatedLead, StoreError> {
    let row = sqlx::query(
        "SELECT id, phone, source_timestamp, state, payload FROM leads WHERE phone = $1 AND source_timestamp = $2",
    )
    .bind(phone)
    .bind(source_timestamp)
    .fetch_one(tx)
    .await?;
    row_to_lead(row)
}

fn row_to_lead(row: sqlx::postgres::PgRow) -> Result<ValidatedLead, StoreError> {
    Ok(ValidatedLead {
        id: LeadId(row.try_get("id")?),
        phone: row.try_get("phone")?,
        source_timestamp: row.try_get("source_timestamp")?,
        state: row.try_get("state")?,
        payload: row.try_get("payload")?,
    })
}
