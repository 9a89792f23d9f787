use std::fmt;

/// Identifies which fairness pointer and candidate set govern a selection.
///
/// Stringifies to `state:<lowercased, trimmed name>` or the literal
/// `global` — §6 requires `"Maharashtra"` and `"maharashtra "` to share a
/// pointer, so normalization happens once here rather than at every call
/// site.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum RoutingKey {
    State(String),
    Global,
}

impl RoutingKey {
    /// Builds the key for a lead's state, or `Global` if no state is given.
    /// Empty/whitespace-only state strings are treated as absent.
    pub fn for_state(state: Option<&str>) -> Self {
        match state.map(str::trim).filter(|s| !s.is_empty()) {
            Some(s) => RoutingKey::State(normalize_state(s)),
            None => RoutingKey::Global,
        }
    }

    pub fn global() -> Self {
        RoutingKey::Global
    }

    pub fn as_state(&self) -> Option<&str> {
        match self {
            RoutingKey::State(s) => Some(s),
            RoutingKey::Global => None,
        }
    }
}

/// Trims and lowercases a raw state name for use as a routing/candidate key.
pub fn normalize_state(raw: &str) -> String {
    raw.trim().to_lowercase()
}

impl fmt::Display for RoutingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoutingKey::State(s) => write!(f, "state:{s}"),
            RoutingKey::Global => write!(f, "global"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_and_whitespace() {
        let a = RoutingKey::for_state(Some("Maharashtra"));
        let b = RoutingKey::for_state(Some("maharashtra "));
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "state:maharashtra");
    }

    #[test]
    fn missing_or_blank_state_routes_global() {
        assert_eq!(RoutingKey::for_state(None), RoutingKey::Global);
        assert_eq!(RoutingKey::for_state(Some("   ")), RoutingKey::Global);
        assert_eq!(RoutingKey::Global.to_string(), "global");
    }
}
