use super::*;
use crate::assign::record::{FactorBreakdown, Outcome, RiskLevel};
use crate::team::Priority;
use chrono::{TimeZone, Utc};

fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn record(item: &str, who: &str, domains: &[&str], collab: &[&str], outcome: Option<(bool, u8)>) -> Assignment {
    let at = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    Assignment {
        id: Assignment::make_id(item, who),
        work_item_id: item.to_string(),
        assignee_id: who.to_string(),
        confidence: 0.8,
        risk_level: RiskLevel::Low,
        score: 0.7,
        factors: FactorBreakdown::default(),
        alternatives: vec![],
        domains: domains.iter().map(|d| d.to_string()).collect(),
        collaborators: collab.iter().map(|c| c.to_string()).collect(),
        flags: vec![],
        estimated_hours: 8.0,
        priority: Priority::Medium,
        timestamp: at,
        outcome: outcome.map(|(completed, quality)| Outcome {
            completed,
            quality,
            recorded_at: at,
        }),
    }
}

#[test]
fn jaccard_values() {
    assert_eq!(jaccard(&set(&[]), &set(&[])), 0.0);
    assert_eq!(jaccard(&set(&["a", "b"]), &set(&["a", "b"])), 1.0);
    assert!((jaccard(&set(&["a", "b"]), &set(&["b", "c"])) - 1.0 / 3.0).abs() < 1e-9);
}

#[test]
fn only_resolved_records_count() {
    let index = PerformanceIndex::from_records(&[
        record("W1", "alice", &["api"], &[], Some((true, 5))),
        record("W2", "alice", &["api"], &[], Some((true, 3))),
        record("W3", "alice", &["api"], &[], Some((false, 5))),
        record("W4", "alice", &["api"], &[], None),
    ]);
    // quality >= 4 and completed: 1 of 3 resolved
    assert!((index.success_rate("alice").unwrap() - 1.0 / 3.0).abs() < 1e-9);
    assert_eq!(index.success_rate("bob"), None);
}

#[test]
fn similar_successes_need_jaccard_above_half() {
    let index = PerformanceIndex::from_records(&[
        record("W1", "alice", &["api", "database"], &[], Some((true, 4))),
        record("W2", "alice", &["api", "frontend"], &[], Some((true, 4))),
        record("W3", "alice", &["mobile"], &[], Some((true, 5))),
    ]);
    let target = set(&["api", "database", "security"]);
    // W1: 2/3 similar; W2: 1/4 not
    assert_eq!(index.similar_successes("alice", &target), 1);
    assert_eq!(index.similar_successes("bob", &target), 0);
    assert_eq!(index.similar_accuracy(&target), Some(1.0));
    assert_eq!(index.similar_accuracy(&set(&["data"])), None);
}

#[test]
fn collaboration_pairs_are_symmetric_and_success_only() {
    let index = PerformanceIndex::from_records(&[
        record("W1", "alice", &["api"], &["bob", "alice"], Some((true, 5))),
        record("W2", "carol", &["api"], &["dave"], Some((false, 2))),
    ]);
    assert!(index.worked_well_with("alice", "bob"));
    assert!(index.worked_well_with("bob", "alice"));
    assert!(!index.worked_well_with("alice", "alice"));
    assert!(!index.worked_well_with("carol", "dave"));
}
