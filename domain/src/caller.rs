use chrono::{DateTime, Utc};

use crate::ids::CallerId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallerStatus {
    Active,
    Paused,
}

impl CallerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallerStatus::Active => "active",
            CallerStatus::Paused => "paused",
        }
    }

    pub fn from_str_strict(s: &str) -> Option<Self> {
        match s {
            "active" => Some(CallerStatus::Active),
            "paused" => Some(CallerStatus::Paused),
            _ => None,
        }
    }
}

/// Full caller profile, as administered outside the engine's scope.
/// The engine only ever reads this through `CallerRepository`.
#[derive(Clone, Debug)]
pub struct Caller {
    pub id: CallerId,
    pub name: String,
    pub role: Option<String>,
    pub languages: Vec<String>,
    /// 0 means unlimited.
    pub daily_limit: i32,
    pub assigned_states: Vec<String>,
    pub status: CallerStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Caller {
    pub fn is_active(&self) -> bool {
        self.status == CallerStatus::Active
    }
}

/// The minimal projection the selection algorithm actually needs: identity
/// plus the stable ordering key. Repository reads never hand the full
/// `Caller` to the engine — only this summary — so that candidate lists
/// stay cheap even when caller profiles grow large fields later.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallerSummary {
    pub id: CallerId,
    pub daily_limit: i32,
    pub created_at: DateTime<Utc>,
}

impl CallerSummary {
    /// True iff `daily_limit` is unlimited or `count` hasn't reached it yet.
    pub fn uncapped(&self, count: i64) -> bool {
        self.daily_limit == 0 || count < self.daily_limit as i64
    }
}
