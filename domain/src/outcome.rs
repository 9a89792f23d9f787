use crate::assignment::Assignment;

/// What the engine decided for a lead, independent of whether this call
/// actually persisted it (see `AssignOutcome::replayed`).
#[derive(Clone, Debug)]
pub enum AssignmentOutcome {
    Assigned(Assignment),
    Unassigned(Assignment),
}

impl AssignmentOutcome {
    pub fn assignment(&self) -> &Assignment {
        match self {
            AssignmentOutcome::Assigned(a) => a,
            AssignmentOutcome::Unassigned(a) => a,
        }
    }
}

/// Wraps an `AssignmentOutcome` with whether it was freshly computed or
/// replayed from an existing row matched on `(phone, source_timestamp)`.
/// A duplicate lead is not an error, so callers branch on this flag
/// instead of matching on `Result`.
#[derive(Clone, Debug)]
pub struct AssignOutcome {
    pub outcome: AssignmentOutcome,
    pub replayed: bool,
}

impl AssignOutcome {
    pub fn fresh(outcome: AssignmentOutcome) -> Self {
        Self {
            outcome,
            replayed: false,
        }
    }

    pub fn replay(outcome: AssignmentOutcome) -> Self {
        Self {
            outcome,
            replayed: true,
        }
    }
}
