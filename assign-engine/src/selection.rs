//! Pure candidate ordering. No I/O: given a candidate list and the last
//! pointer value, produce the walk order the caller should try. Kept
//! separate from the transactional engine so the rotation logic itself is
//! trivially unit-testable.

use domain::{CallerId, CallerSummary};

/// Rotates `candidates` (assumed already in stable repository order — by
/// `created_at`) so that the element immediately after `last` comes first.
/// If `last` is `None` or not present in `candidates`, the list is
/// returned unrotated.
pub fn rotate_from_last(candidates: &[CallerSummary], last: Option<CallerId>) -> Vec<&CallerSummary> {
    let n = candidates.len();
    if n == 0 {
        return Vec::new();
    }

    let pivot = match last {
        Some(id) => candidates.iter().position(|c| c.id == id),
        None => None,
    };

    let start = match pivot {
        Some(idx) => (idx + 1) % n,
        None => 0,
    };

    let mut order = Vec::with_capacity(n);
    for i in 0..n {
        order.push(&candidates[(start + i) % n]);
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn summary(id: CallerId) -> CallerSummary {
        CallerSummary {
            id,
            daily_limit: 0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn no_last_returns_unrotated_order() {
        let ids: Vec<CallerId> = (0..3).map(|_| CallerId::new()).collect();
        let candidates: Vec<_> = ids.iter().map(|id| summary(*id)).collect();

        let order = rotate_from_last(&candidates, None);
        let got: Vec<CallerId> = order.iter().map(|c| c.id).collect();
        assert_eq!(got, ids);
    }

    #[test]
    fn rotates_to_element_after_last() {
        let ids: Vec<CallerId> = (0..4).map(|_| CallerId::new()).collect();
        let candidates: Vec<_> = ids.iter().map(|id| summary(*id)).collect();

        let order = rotate_from_last(&candidates, Some(ids[1]));
        let got: Vec<CallerId> = order.iter().map(|c| c.id).collect();
        assert_eq!(got, vec![ids[2], ids[3], ids[0], ids[1]]);
    }

    #[test]
    fn last_at_tail_wraps_to_head() {
        let ids: Vec<CallerId> = (0..3).map(|_| CallerId::new()).collect();
        let candidates: Vec<_> = ids.iter().map(|id| summary(*id)).collect();

        let order = rotate_from_last(&candidates, Some(ids[2]));
        let got: Vec<CallerId> = order.iter().map(|c| c.id).collect();
        assert_eq!(got, ids);
    }

    #[test]
    fn last_absent_from_candidates_is_unrotated() {
        let ids: Vec<CallerId> = (0..3).map(|_| CallerId::new()).collect();
        let candidates: Vec<_> = ids.iter().map(|id| summary(*id)).collect();

        let stranger = CallerId::new();
        let order = rotate_from_last(&candidates, Some(stranger));
        let got: Vec<CallerId> = order.iter().map(|c| c.id).collect();
        assert_eq!(got, ids);
    }

    #[test]
    fn empty_candidates_yields_empty_order() {
        let order = rotate_from_last(&[], None);
        assert!(order.is_empty());
    }
}
