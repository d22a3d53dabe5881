use super::*;
use crate::config::FactorWeights;
use crate::matrix::build;
use crate::team::Priority;
use chrono::TimeZone;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

fn member(id: &str, expertise: &[&str], capacity: f64, committed: f64) -> TeamMember {
    TeamMember {
        id: id.to_string(),
        name: id.to_string(),
        expertise: expertise.iter().map(|s| s.to_string()).collect(),
        capacity_hours: capacity,
        committed_hours: committed,
        ..TeamMember::default()
    }
}

fn item(id: &str, required: &[&str], preferred: &[&str], hours: f64, priority: Priority) -> WorkItem {
    WorkItem {
        id: id.to_string(),
        title: format!("item {id}"),
        required_domains: Some(required.iter().map(|s| s.to_string()).collect()),
        preferred_domains: Some(preferred.iter().map(|s| s.to_string()).collect()),
        estimated_hours: Some(hours),
        priority,
        ..WorkItem::default()
    }
}

fn item_id(d: &Decision) -> &str {
    match d {
        Decision::Assigned(a) => &a.work_item_id,
        Decision::Unassignable(u) => &u.work_item_id,
    }
}

#[test]
fn missing_expertise_is_unassignable() {
    let team = vec![member("alice", &["api"], 40.0, 0.0), member("bob", &["frontend"], 40.0, 0.0)];
    let config = Config::default();
    let matrix = build(&team, &[], &config.matrix);
    let mut engine = AssignmentEngine::new(&team, &matrix, &[], &config, now());

    let decision = engine.assign(&item("SEC-1", &["security"], &[], 8.0, Priority::High));
    let Decision::Unassignable(u) = decision else {
        panic!("expected unassignable, got {decision:?}");
    };
    assert_eq!(u.reason, NO_SUITABLE_CANDIDATES);
    assert_eq!(u.work_item_id, "SEC-1");
    assert!(u.suggestions.iter().any(|s| s.starts_with("loosen requirements")));
    assert!(u.suggestions.iter().any(|s| s.contains("security") && s.starts_with("add expertise")));
    assert!(u.suggestions.iter().any(|s| s.starts_with("decompose")));
    assert_eq!(engine.ledger().assigned_counts()["alice"], 0);
}

#[test]
fn over_capacity_candidate_loses_to_feasible_one() {
    let team = vec![
        member("alice", &["api", "backend"], 40.0, 38.0),
        member("bob", &["api"], 40.0, 0.0),
    ];
    let mut config = Config::default();
    config.scoring.weights = FactorWeights {
        expertise: 1.0,
        capacity: 0.0,
        workload: 0.0,
        history: 0.0,
        collaboration: 0.0,
    };
    config.scoring.min_score = 0.0;
    let matrix = build(&team, &[], &config.matrix);
    let mut engine = AssignmentEngine::new(&team, &matrix, &[], &config, now());

    let decision = engine.assign(&item("API-1", &["api"], &["backend"], 8.0, Priority::Medium));
    let a = decision.assignment().unwrap();
    assert_eq!(a.assignee_id, "bob");
    assert!(!a.has_flag(Flag::OverCapacity));
    // alice outscored bob but could not take the hours
    assert_eq!(a.alternatives[0].member_id, "alice");
    assert!(a.alternatives[0].over_capacity);
    assert!(a.alternatives[0].score > a.score);
}

#[test]
fn priority_order_consumes_capacity_first() {
    let team = vec![member("alice", &["api"], 40.0, 0.0)];
    let config = Config::default();
    let matrix = build(&team, &[], &config.matrix);
    let mut engine = AssignmentEngine::new(&team, &matrix, &[], &config, now());

    let items = vec![
        item("LOW-1", &["api"], &[], 30.0, Priority::Low),
        item("CRIT-1", &["api"], &[], 30.0, Priority::Critical),
        item("LOW-2", &["api"], &[], 1.0, Priority::Low),
    ];
    let decisions = engine.assign_all(&items);
    let order: Vec<&str> = decisions.iter().map(item_id).collect();
    assert_eq!(order, vec!["CRIT-1", "LOW-1", "LOW-2"]);

    let crit = decisions[0].assignment().unwrap();
    assert!(!crit.has_flag(Flag::OverCapacity));
    // only 10h left: still assigned, but flagged and high risk
    let low = decisions[1].assignment().unwrap();
    assert_eq!(low.assignee_id, "alice");
    assert!(low.has_flag(Flag::OverCapacity));
    assert_eq!(low.risk_level, RiskLevel::High);
    assert_eq!(engine.ledger().assigned_counts()["alice"], 3);
}

#[test]
fn weak_evidence_needs_manual_review() {
    let team = vec![member("alice", &["api"], 40.0, 0.0)];
    let config = Config::default();
    let matrix = build(&team, &[], &config.matrix);
    let mut engine = AssignmentEngine::new(&team, &matrix, &[], &config, now());

    let decision = engine.assign(&item("API-2", &["api"], &[], 4.0, Priority::Medium));
    let a = decision.assignment().unwrap();
    assert!(a.confidence < 0.8);
    assert!(a.has_flag(Flag::ManualReviewRecommended));
    // declared-only score 21 is under the expert floor
    assert!(a.has_flag(Flag::CoverageGap));
    assert_eq!(a.id, "API-2@alice");
    assert_eq!(a.timestamp, now());
    assert_eq!(a.domains, vec!["api".to_string()]);
    assert!(a.factors.expertise > 0.0);
}

#[test]
fn items_without_domains_consider_everyone() {
    let team = vec![member("alice", &[], 40.0, 0.0), member("bob", &[], 40.0, 0.0)];
    let config = Config::default();
    let matrix = build(&team, &[], &config.matrix);
    let mut engine = AssignmentEngine::new(&team, &matrix, &[], &config, now());

    let chore = WorkItem {
        id: "CHORE-1".to_string(),
        title: "rename a variable".to_string(),
        ..WorkItem::default()
    };
    let a = engine.assign(&chore);
    let a = a.assignment().unwrap();
    // tie on score, broken by id
    assert_eq!(a.assignee_id, "alice");
    assert_eq!(a.factors.expertise, 0.5);
    assert!(!a.has_flag(Flag::InferredDomains));
    assert_eq!(a.alternatives.len(), 1);
}

#[test]
fn preferred_domain_gap_raises_risk() {
    let team = vec![member("alice", &[], 40.0, 0.0)];
    let config = Config::default();
    let matrix = build(&team, &[], &config.matrix);
    let mut engine = AssignmentEngine::new(&team, &matrix, &[], &config, now());

    let decision = engine.assign(&item("OPS-1", &[], &["security"], 2.0, Priority::Medium));
    let a = decision.assignment().unwrap();
    assert_eq!(a.assignee_id, "alice");
    assert!(a.has_flag(Flag::CoverageGap));
    assert!(!a.has_flag(Flag::OverCapacity));
    assert_eq!(a.risk_level, assess_risk(a.confidence, false, true));
    assert_ne!(a.risk_level, RiskLevel::Low);
}

#[test]
fn empty_roster_is_unassignable() {
    let config = Config::default();
    let matrix = build(&[], &[], &config.matrix);
    let mut engine = AssignmentEngine::new(&[], &matrix, &[], &config, now());
    let decision = engine.assign(&item("X-1", &[], &[], 1.0, Priority::Low));
    assert!(matches!(decision, Decision::Unassignable(_)));
}

#[test]
fn confidence_and_risk() {
    assert!((assignment_confidence(1.0, 3, Some(1.0)) - 1.0).abs() < 1e-9);
    assert!((assignment_confidence(0.5, 0, None) - 0.375).abs() < 1e-9);
    assert_eq!(assignment_confidence(f64::NAN, 0, None), 0.0);

    assert_eq!(assess_risk(0.9, false, false), RiskLevel::Low);
    assert_eq!(assess_risk(0.7, false, false), RiskLevel::Medium);
    assert_eq!(assess_risk(0.9, true, false), RiskLevel::Medium);
    assert_eq!(assess_risk(0.5, false, true), RiskLevel::High);
    assert_eq!(assess_risk(0.7, true, false), RiskLevel::High);
}

#[test]
fn processing_order_is_stable() {
    let items = vec![
        item("a", &[], &[], 1.0, Priority::Medium),
        item("b", &[], &[], 1.0, Priority::High),
        item("c", &[], &[], 1.0, Priority::Medium),
        item("d", &[], &[], 1.0, Priority::Critical),
    ];
    let ids: Vec<&str> = processing_order(&items).iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["d", "b", "a", "c"]);
}
