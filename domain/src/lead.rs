use chrono::{DateTime, Utc};

use crate::ids::LeadId;

/// A lead as received from the (out-of-scope) ingestion transport.
#[derive(Clone, Debug)]
pub struct Lead {
    pub phone: String,
    pub source_timestamp: DateTime<Utc>,
    pub state: Option<String>,
    pub payload: serde_json::Value,
}

/// A lead that has passed the natural-key uniqueness check and is ready
/// for selection. Constructed only by `LeadStore::validate_or_replay`.
#[derive(Clone, Debug)]
pub struct ValidatedLead {
    pub id: LeadId,
    pub phone: String,
    pub source_timestamp: DateTime<Utc>,
    pub state: Option<String>,
    pub payload: serde_json::Value,
}

impl ValidatedLead {
    pub fn state_ref(&self) -> Option<&str> {
        self.state.as_deref()
    }
}
