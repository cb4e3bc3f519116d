//! Tests for the pull-request event model.

use super::*;

fn branch_updated() -> PullReqEvent {
    PullReqEvent::BranchUpdated(PullReqBranchUpdated {
        principal_id: PrincipalId::new(7),
        pull_req_id: PullReqId::new(42),
        old_sha: "aaa".to_string(),
        new_sha: "bbb".to_string(),
        forced: true,
    })
}

#[test]
fn kind_matches_variant() {
    let created = PullReqEvent::Created(PullReqCreated {
        principal_id: PrincipalId::new(7),
        pull_req_id: PullReqId::new(42),
        source_sha: "abc123".to_string(),
    });
    assert_eq!(created.kind(), PullReqEventKind::Created);
    assert_eq!(branch_updated().kind(), PullReqEventKind::BranchUpdated);
}

#[test]
fn all_kinds_covers_every_variant() {
    assert_eq!(PullReqEventKind::ALL.len(), 5);
    let names: Vec<&str> = PullReqEventKind::ALL.iter().map(|k| k.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "pullreq_created",
            "pullreq_reopened",
            "pullreq_branch_updated",
            "pullreq_closed",
            "pullreq_merged",
        ]
    );
}

#[test]
fn event_ids_are_unique_and_sortable() {
    let first = EventId::new();
    // ULIDs only order by their millisecond timestamp prefix, so leave one
    // tick between the two ids.
    std::thread::sleep(std::time::Duration::from_millis(2));
    let second = EventId::new();
    assert_ne!(first, second);
    assert!(first.to_string() < second.to_string());
}

#[test]
fn event_round_trips_through_json() {
    let event = Event {
        id: EventId::new(),
        payload: branch_updated(),
    };
    let json = serde_json::to_string(&event).unwrap();
    let back: Event<PullReqEvent> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, event);
}

#[test]
fn branch_updated_wire_shape_is_tagged() {
    let value = serde_json::to_value(branch_updated()).unwrap();
    assert_eq!(value["kind"], "branch_updated");
    assert_eq!(value["data"]["old_sha"], "aaa");
    assert_eq!(value["data"]["new_sha"], "bbb");
    assert_eq!(value["data"]["forced"], true);
}
