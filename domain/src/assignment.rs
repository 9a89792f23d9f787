use chrono::{DateTime, Utc};

use crate::ids::{AssignmentId, CallerId, LeadId};
use crate::reason::ReasonCode;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssignmentStatus {
    Assigned,
    Unassigned,
    Superseded,
}

impl AssignmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentStatus::Assigned => "assigned",
            AssignmentStatus::Unassigned => "unassigned",
            AssignmentStatus::Superseded => "superseded",
        }
    }

    pub fn from_str_strict(s: &str) -> Option<Self> {
        match s {
            "assigned" => Some(AssignmentStatus::Assigned),
            "unassigned" => Some(AssignmentStatus::Unassigned),
            "superseded" => Some(AssignmentStatus::Superseded),
            _ => None,
        }
    }
}

/// A single row of assignment history. Reassignment inserts a new row and
/// marks the prior one `Superseded` rather than mutating it in place, so
/// the table is its own audit trail.
#[derive(Clone, Debug)]
pub struct Assignment {
    pub id: AssignmentId,
    pub lead_id: LeadId,
    pub caller_id: Option<CallerId>,
    pub status: AssignmentStatus,
    pub reason: ReasonCode,
    pub business_date: chrono::NaiveDate,
    pub created_at: DateTime<Utc>,
}
