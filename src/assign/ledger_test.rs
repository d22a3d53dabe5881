use super::*;

fn member(id: &str, capacity: f64, committed: f64, open: usize) -> TeamMember {
    TeamMember {
        id: id.to_string(),
        capacity_hours: capacity,
        committed_hours: committed,
        current_assignments: (0..open).map(|i| format!("X-{i}")).collect(),
        ..TeamMember::default()
    }
}

#[test]
fn starts_from_roster() {
    let ledger = CapacityLedger::new(&[member("a", 40.0, 10.0, 2), member("b", 20.0, 0.0, 0)]);
    let a = ledger.load("a").unwrap();
    assert_eq!(a.available_hours, 30.0);
    assert_eq!(a.open_assignments, 2);
    assert_eq!(ledger.average_open(), 1.0);
    assert!(ledger.load("zed").is_none());
}

#[test]
fn commit_consumes_hours_and_counts() {
    let mut ledger = CapacityLedger::new(&[member("a", 40.0, 30.0, 0)]);
    ledger.commit("a", 4.0);
    assert_eq!(ledger.load("a").unwrap().available_hours, 6.0);
    ledger.commit("a", 50.0);
    let a = ledger.load("a").unwrap();
    assert_eq!(a.available_hours, 0.0);
    assert_eq!(a.open_assignments, 2);
    assert_eq!(ledger.assigned_counts()["a"], 2);
}

#[test]
fn unknown_member_commit_is_ignored() {
    let mut ledger = CapacityLedger::new(&[member("a", 40.0, 0.0, 0)]);
    ledger.commit("ghost", 8.0);
    assert_eq!(ledger.assigned_counts().len(), 1);
    assert_eq!(CapacityLedger::default().average_open(), 0.0);
}
