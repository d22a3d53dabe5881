use std::collections::BTreeMap;

use serde::Serialize;

use super::record::{Decision, Flag};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConfidenceBuckets {
    /// >= 0.8
    pub high: usize,
    /// >= 0.6
    pub medium: usize,
    /// >= 0.4
    pub low: usize,
    /// < 0.4
    pub manual_review: usize,
}

impl ConfidenceBuckets {
    fn add(&mut self, confidence: f64) {
        if confidence >= 0.8 {
            self.high += 1;
        } else if confidence >= 0.6 {
            self.medium += 1;
        } else if confidence >= 0.4 {
            self.low += 1;
        } else {
            self.manual_review += 1;
        }
    }
}

/// Run-level totals over every decision made.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub assigned: usize,
    pub unassignable: usize,
    pub confidence: ConfidenceBuckets,
    pub over_capacity: usize,
    pub flagged_for_review: usize,
    /// Assignments made this run, per member (members with none included).
    pub per_member: BTreeMap<String, usize>,
    /// Coefficient of variation of `per_member`; 0 is perfectly even.
    pub workload_cv: f64,
}

/// Population coefficient of variation; 0 for empty or all-zero input.
pub fn coefficient_of_variation(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    if mean <= 0.0 {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt() / mean
}

pub fn summarize(decisions: &[Decision], per_member: BTreeMap<String, usize>) -> RunSummary {
    let mut confidence = ConfidenceBuckets::default();
    let mut over_capacity = 0;
    let mut flagged_for_review = 0;
    let mut assigned = 0;

    for a in decisions.iter().filter_map(Decision::assignment) {
        assigned += 1;
        confidence.add(a.confidence);
        if a.has_flag(Flag::OverCapacity) {
            over_capacity += 1;
        }
        if a.has_flag(Flag::ManualReviewRecommended) {
            flagged_for_review += 1;
        }
    }

    let counts: Vec<f64> = per_member.values().map(|c| *c as f64).collect();
    RunSummary {
        total: decisions.len(),
        assigned,
        unassignable: decisions.len() - assigned,
        confidence,
        over_capacity,
        flagged_for_review,
        workload_cv: coefficient_of_variation(&counts),
        per_member,
    }
}

#[cfg(test)]
#[path = "summary_test.rs"]
mod tests;
