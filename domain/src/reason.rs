use std::fmt;

/// The closed set of reason codes an assignment outcome may carry.
///
/// Deliberately exhaustive and non-`#[non_exhaustive]`: §6 calls this set
/// closed, and a routing decision must never be able to invent a new reason.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReasonCode {
    StateRoundRobin,
    GlobalRoundRobin,
    ManualReassign,
    UnassignedCapReached,
    UnassignedNoEligible,
}

impl ReasonCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasonCode::StateRoundRobin => "state_round_robin",
            ReasonCode::GlobalRoundRobin => "global_round_robin",
            ReasonCode::ManualReassign => "manual_reassign",
            ReasonCode::UnassignedCapReached => "unassigned_cap_reached",
            ReasonCode::UnassignedNoEligible => "unassigned_no_eligible",
        }
    }

    pub fn from_str_strict(s: &str) -> Option<Self> {
        Some(match s {
            "state_round_robin" => ReasonCode::StateRoundRobin,
            "global_round_robin" => ReasonCode::GlobalRoundRobin,
            "manual_reassign" => ReasonCode::ManualReassign,
            "unassigned_cap_reached" => ReasonCode::UnassignedCapReached,
            "unassigned_no_eligible" => ReasonCode::UnassignedNoEligible,
            _ => return None,
        })
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
