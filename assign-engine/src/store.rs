//! Raw persistence for the `assignments` table. Unlike caller/fairness/
//! counter/lead access, assignment rows are the engine's own bookkeeping
//! and aren't routed through an injected trait — there's exactly one
//! schema for them and no adapter to swap.

use domain::{Assignment, AssignmentId, AssignmentStatus, LeadId, ReasonCode};
use sqlx::{PgConnection, Row};

pub async fn insert_assignment(tx: &mut PgConnection, assignment: &Assignment) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
INSERT INTO assignments (id, lead_id, caller_id, status, reason, business_date, created_at)
VALUES ($1, $2, $3, $4, $5, $6, $7)
"#,
    )
    .bind(assignment.id.0)
    .bind(assignment.lead_id.0)
    .bind(assignment.caller_id.map(|c| c.0))
    .bind(assignment.status.as_str())
    .bind(assignment.reason.as_str())
    .bind(assignment.business_date)
    .bind(assignment.created_at)
    .execute(tx)
    .await?;
    Ok(())
}

/// Marks a previously-current assignment row as superseded. Does not touch
/// `caller_id`/`reason` — the row stays as a faithful record of what was
/// true at the time.
pub async fn mark_superseded(tx: &mut PgConnection, assignment_id: AssignmentId) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE assignments SET status = $1 WHERE id = $2")
        .bind(AssignmentStatus::Superseded.as_str())
        .bind(assignment_id.0)
        .execute(tx)
        .await?;
    Ok(())
}

/// The row a reader currently sees for `lead_id`: the one not yet
/// superseded. Relies on the partial unique index allowing at most one
/// such row per lead.
pub async fn current_assignment(tx: &mut PgConnection, lead_id: LeadId) -> Result<Option<Assignment>, sqlx::Error> {
    let row = sqlx::query(
        r#"
SELECT id, lead_id, caller_id, status, reason, business_date, created_at
FROM assignments
WHERE lead_id = $1 AND status IN ('assigned', 'unassigned')
"#,
    )
    .bind(lead_id.0)
    .fetch_optional(tx)
    .await?;

    let Some(row) = row else { return Ok(None) };
    Ok(Some(Assignment {
        id: AssignmentId(row.try_get("id")?),
        lead_id: LeadId(row.try_get("lead_id")?),
        caller_id: row.try_get::<Option<uuid::Uuid>, _>("caller_id")?.map(domain::CallerId),
        status: AssignmentStatus::from_str_strict(row.try_get::<String, _>("status")?.as_str())
            .unwrap_or(AssignmentStatus::Unassigned),
        reason: ReasonCode::from_str_strict(row.try_get::<String, _>("reason")?.as_str())
            .unwrap_or(ReasonCode::UnassignedNoEligible),
        business_date: row.try_get("business_date")?,
        created_at: row.try_get("created_at")?,
    }))
}
