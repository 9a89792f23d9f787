use chrono::{DateTime, Utc};

use crate::assignment::Assignment;

/// Emitted once per freshly-computed (non-replayed) assignment decision.
/// Downstream notification/CRM-sync consumers subscribe to these; the
/// engine itself never blocks on delivery.
#[derive(Clone, Debug)]
pub struct AssignmentEvent {
    pub assignment: Assignment,
    pub emitted_at: DateTime<Utc>,
}

impl AssignmentEvent {
    pub fn new(assignment: Assignment, emitted_at: DateTime<Utc>) -> Self {
        Self {
            assignment,
            emitted_at,
        }
    }
}
