use super::*;
use crate::assign::record::{CandidateScore, Flag, RiskLevel};
use crate::assign::summary::summarize;
use crate::team::Priority;
use chrono::{TimeZone, Utc};

fn sample() -> Vec<Decision> {
    vec![
        Decision::Assigned(Assignment {
            id: "W1@alice".to_string(),
            work_item_id: "W1".to_string(),
            assignee_id: "alice".to_string(),
            confidence: 0.123456,
            risk_level: RiskLevel::High,
            score: 0.654321,
            factors: FactorBreakdown::default(),
            alternatives: vec![CandidateScore {
                member_id: "bob".to_string(),
                score: 0.3333333,
                factors: FactorBreakdown::default(),
                over_capacity: true,
                missing_required: vec!["api".to_string()],
                sources: 0,
            }],
            domains: vec!["api".to_string()],
            collaborators: vec![],
            flags: vec![Flag::ManualReviewRecommended, Flag::CoverageGap],
            estimated_hours: 8.0,
            priority: Priority::High,
            timestamp: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            outcome: None,
        }),
        Decision::Unassignable(Unassignable {
            work_item_id: "W2".to_string(),
            reason: "no_suitable_candidates",
            detail: "no team member has expertise in security".to_string(),
            suggestions: vec!["decompose the item".to_string()],
            domains: vec!["security".to_string()],
            priority: Priority::Low,
        }),
    ]
}

#[test]
fn flags_joined() {
    let d = sample();
    assert_eq!(flags_text(d[0].assignment().unwrap()), "manual review, coverage gap");
}

#[test]
fn rounding_only_touches_assignments() {
    let d = sample();
    let Decision::Assigned(a) = rounded(&d[0]) else {
        panic!("expected assignment");
    };
    assert_eq!(a.score, 0.654);
    assert_eq!(a.confidence, 0.123);
    assert_eq!(a.alternatives[0].score, 0.333);
    assert_eq!(rounded(&d[1]), d[1]);
}

#[test]
fn decisions_serialize_with_status_tag() {
    let d = sample();
    let v = serde_json::to_value(&d).unwrap();
    assert_eq!(v[0]["status"], "assigned");
    assert_eq!(v[0]["risk_level"], "high");
    assert_eq!(v[1]["status"], "unassignable");
    assert_eq!(v[1]["reason"], "no_suitable_candidates");
}

#[test]
fn print_report_does_not_panic() {
    let d = sample();
    let summary = summarize(&d, Default::default());
    print_report(&d, &summary, Some(1));
    print_report(&d, &summary, None);
    print_report(&[], &summary, None);
}

#[test]
fn print_json_does_not_panic() {
    let d = sample();
    let summary = summarize(&d, Default::default());
    print_json(&d, &summary, Some(1)).unwrap();
}
