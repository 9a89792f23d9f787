//! End-to-end scenarios against a real Postgres container, exercising
//! actual row locking rather than an in-memory stand-in.

mod support;

use chrono::{TimeZone, Utc};
use support::Harness;
use domain::{AssignmentOutcome, Lead, ReasonCode, RoutingKey};

fn lead(phone: &str, ts: chrono::DateTime<Utc>, state: Option<&str>) -> Lead {
    Lead {
        phone: phone.to_string(),
        source_timestamp: ts,
        state: state.map(str::to_string),
        payload: serde_json::json!({}),
    }
}

#[tokio::test]
async fn scenario_a_state_round_robin() {
    let now = Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap();
    let h = Harness::new(now).await;

    let c1 = h.seed_caller("c1", 10, &["maharashtra"]).await;
    let c2 = h.seed_caller("c2", 10, &["maharashtra"]).await;

    let o1 = h.engine.assign(&h.pool, lead("+91100", now, Some("Maharashtra"))).await.unwrap();
    let o2 = h.engine.assign(&h.pool, lead("+91101", now, Some("maharashtra"))).await.unwrap();
    let o3 = h.engine.assign(&h.pool, lead("+91102", now, Some(" Maharashtra "))).await.unwrap();

    let assigned_to = |o: &domain::AssignOutcome| match &o.outcome {
        AssignmentOutcome::Assigned(a) => (a.caller_id.unwrap(), a.reason),
        AssignmentOutcome::Unassigned(_) => panic!("expected assignment"),
    };

    assert_eq!(assigned_to(&o1), (c1, ReasonCode::StateRoundRobin));
    assert_eq!(assigned_to(&o2), (c2, ReasonCode::StateRoundRobin));
    assert_eq!(assigned_to(&o3), (c1, ReasonCode::StateRoundRobin));

    let date = now.date_naive();
    assert_eq!(h.counter(c1, date).await, 2);
    assert_eq!(h.counter(c2, date).await, 1);
    assert_eq!(
        h.pointer(&RoutingKey::for_state(Some("maharashtra"))).await,
        Some(c1)
    );
}

#[tokio::test]
async fn scenario_b_cap_fallback_to_global() {
    let now = Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap();
    let h = Harness::new(now).await;

    let c1 = h.seed_caller("c1", 1, &["karnataka"]).await;
    let c2 = h.seed_caller("c2", 10, &[]).await;

    let o1 = h.engine.assign(&h.pool, lead("+91200", now, Some("karnataka"))).await.unwrap();
    let o2 = h.engine.assign(&h.pool, lead("+91201", now, Some("karnataka"))).await.unwrap();

    match &o1.outcome {
        AssignmentOutcome::Assigned(a) => {
            assert_eq!(a.caller_id, Some(c1));
            assert_eq!(a.reason, ReasonCode::StateRoundRobin);
        }
        _ => panic!("expected assignment"),
    }

    match &o2.outcome {
        AssignmentOutcome::Assigned(a) => {
            assert_eq!(a.caller_id, Some(c2));
            assert_eq!(a.reason, ReasonCode::GlobalRoundRobin);
        }
        _ => panic!("expected assignment"),
    }
}

#[tokio::test]
async fn scenario_c_all_capped() {
    let now = Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap();
    let h = Harness::new(now).await;

    h.seed_caller("c1", 1, &[]).await;

    let o1 = h.engine.assign(&h.pool, lead("+91300", now, None)).await.unwrap();
    let o2 = h.engine.assign(&h.pool, lead("+91301", now, None)).await.unwrap();

    assert!(matches!(o1.outcome, AssignmentOutcome::Assigned(_)));
    match &o2.outcome {
        AssignmentOutcome::Unassigned(a) => {
            assert_eq!(a.caller_id, None);
            assert_eq!(a.reason, ReasonCode::UnassignedCapReached);
        }
        _ => panic!("expected unassigned"),
    }
}

#[tokio::test]
async fn scenario_d_no_eligible_callers() {
    let now = Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap();
    let h = Harness::new(now).await;

    let outcome = h.engine.assign(&h.pool, lead("+91400", now, None)).await.unwrap();
    match &outcome.outcome {
        AssignmentOutcome::Unassigned(a) => {
            assert_eq!(a.caller_id, None);
            assert_eq!(a.reason, ReasonCode::UnassignedNoEligible);
        }
        _ => panic!("expected unassigned"),
    }
}

#[tokio::test]
async fn scenario_e_idempotent_retry() {
    let now = Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap();
    let h = Harness::new(now).await;
    h.seed_caller("c1", 10, &[]).await;

    let ts = Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap();
    let first = h.engine.assign(&h.pool, lead("+911234", ts, None)).await.unwrap();
    assert!(!first.replayed);

    let replay = h.engine.assign(&h.pool, lead("+911234", ts, None)).await.unwrap();
    assert!(replay.replayed);
    assert_eq!(
        first.outcome.assignment().lead_id,
        replay.outcome.assignment().lead_id
    );
    assert_eq!(
        first.outcome.assignment().caller_id,
        replay.outcome.assignment().caller_id
    );
}

#[tokio::test]
async fn scenario_f_manual_reassignment_same_day() {
    let now = Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap();
    let h = Harness::new(now).await;

    let c1 = h.seed_caller("c1", 10, &[]).await;
    let c2 = h.seed_caller("c2", 10, &[]).await;

    let assigned = h.engine.assign(&h.pool, lead("+91500", now, None)).await.unwrap();
    let lead_id = assigned.outcome.assignment().lead_id;
    let date = now.date_naive();
    assert_eq!(h.counter(c1, date).await, 1);

    let outcome = h.engine.reassign(&h.pool, lead_id, Some(c2)).await.unwrap();
    match &outcome {
        AssignmentOutcome::Assigned(a) => {
            assert_eq!(a.caller_id, Some(c2));
            assert_eq!(a.reason, ReasonCode::ManualReassign);
        }
        _ => panic!("expected assignment"),
    }

    assert_eq!(h.counter(c1, date).await, 0);
    assert_eq!(h.counter(c2, date).await, 1);
}
