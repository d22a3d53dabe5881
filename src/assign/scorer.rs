//! Candidate suitability: five independent factors in [0, 1], combined
//! with configurable weights. Every function here is pure and total.

use std::collections::{BTreeMap, BTreeSet};

use super::ledger::CapacityLedger;
use super::performance::PerformanceIndex;
use super::record::{CandidateScore, FactorBreakdown};
use crate::config::{FactorWeights, ScoringConfig};
use crate::matrix::{ExpertiseEntry, ExpertiseMatrix, Source};
use crate::team::{TaskProfile, TeamMember};
use crate::util::clamp_finite;

const REQUIRED_WEIGHT: f64 = 2.0;
const PREFERRED_WEIGHT: f64 = 1.0;
/// Expertise factor for items that name no domains at all.
const NEUTRAL: f64 = 0.5;

/// Read-only view shared by every candidate scored for one item.
pub struct ScoringContext<'a> {
    pub matrix: &'a ExpertiseMatrix,
    pub ledger: &'a CapacityLedger,
    pub performance: &'a PerformanceIndex,
    pub config: &'a ScoringConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpertiseMatch {
    pub factor: f64,
    pub missing_required: Vec<String>,
    pub sources: usize,
}

fn entry_value(entry: &ExpertiseEntry) -> f64 {
    clamp_finite(entry.score / 100.0, 0.0, 1.0) * clamp_finite(entry.confidence / 100.0, 0.0, 1.0)
}

/// Weighted mean of `score × confidence` over the item's domains, with
/// required domains counted twice. A required domain the candidate has no
/// entry for still adds its weight to the denominator.
pub fn expertise_factor(
    entries: Option<&BTreeMap<String, ExpertiseEntry>>,
    profile: &TaskProfile,
) -> ExpertiseMatch {
    let lookup = |d: &str| entries.and_then(|e| e.get(d));
    let mut weighted = 0.0;
    let mut total = 0.0;
    let mut missing_required = Vec::new();
    let mut sources: BTreeSet<Source> = BTreeSet::new();

    for domain in &profile.required {
        total += REQUIRED_WEIGHT;
        match lookup(domain) {
            Some(entry) => {
                weighted += REQUIRED_WEIGHT * entry_value(entry);
                sources.extend(entry.sources.iter().copied());
            }
            None => missing_required.push(domain.clone()),
        }
    }
    for domain in &profile.preferred {
        total += PREFERRED_WEIGHT;
        if let Some(entry) = lookup(domain) {
            weighted += PREFERRED_WEIGHT * entry_value(entry);
            sources.extend(entry.sources.iter().copied());
        }
    }

    let factor = if total > 0.0 { weighted / total } else { NEUTRAL };
    ExpertiseMatch {
        factor: clamp_finite(factor, 0.0, 1.0),
        missing_required,
        sources: sources.len(),
    }
}

/// Capacity factor and whether the item would push the member over.
///
/// Nothing left scores 0; not enough left scores a fixed 0.2. Otherwise
/// 0.5 rising to 1.0 as the hours left after the item reach the safety
/// buffer (`safety_buffer × capacity`).
pub fn capacity_factor(available: f64, capacity: f64, hours: f64, safety_buffer: f64) -> (f64, bool) {
    if available.is_nan() || available <= 0.0 {
        return (0.0, true);
    }
    if hours > available {
        return (0.2, true);
    }
    let buffer = safety_buffer * capacity;
    if buffer.is_nan() || buffer <= 0.0 {
        return (1.0, false);
    }
    let after = available - hours.max(0.0);
    let factor = 0.5 + 0.5 * (after / buffer).min(1.0);
    (clamp_finite(factor, 0.0, 1.0), false)
}

/// Step function of open assignments relative to the team average.
pub fn workload_factor(open: usize, team_average: f64) -> f64 {
    let ratio = if team_average > 0.0 {
        open as f64 / team_average
    } else {
        0.0
    };
    if ratio > 1.5 {
        0.3
    } else if ratio > 1.2 {
        0.6
    } else {
        1.0
    }
}

/// Success rate (neutral 0.5 without a record) plus 0.1 per similar
/// success, that bonus capped at 0.3.
pub fn history_factor(success_rate: Option<f64>, similar_successes: usize) -> f64 {
    let base = success_rate.unwrap_or(0.5);
    let bonus = (0.1 * similar_successes as f64).min(0.3);
    clamp_finite(base + bonus, 0.0, 1.0)
}

pub fn collaboration_factor(proven_pairs: usize) -> f64 {
    clamp_finite(0.5 + 0.1 * proven_pairs as f64, 0.0, 1.0)
}

pub fn combine(factors: &FactorBreakdown, weights: &FactorWeights) -> f64 {
    let score = weights.expertise * factors.expertise
        + weights.capacity * factors.capacity
        + weights.workload * factors.workload
        + weights.history * factors.history
        + weights.collaboration * factors.collaboration;
    clamp_finite(score, 0.0, 1.0)
}

/// Whether `member` may be considered at all: with required domains, they
/// need an entry in at least one of them at or above `min_skill`.
pub fn is_candidate(
    entries: Option<&BTreeMap<String, ExpertiseEntry>>,
    profile: &TaskProfile,
    min_skill: f64,
) -> bool {
    if profile.required.is_empty() {
        return true;
    }
    let Some(entries) = entries else {
        return false;
    };
    profile
        .required
        .iter()
        .filter_map(|d| entries.get(d))
        .any(|e| e.score >= min_skill)
}

/// Score one candidate against one item.
pub fn score_candidate(
    member: &TeamMember,
    profile: &TaskProfile,
    collaborators: &[String],
    ctx: &ScoringContext<'_>,
) -> CandidateScore {
    let entries = ctx.matrix.member_domains(&member.id);
    let expertise = expertise_factor(entries, profile);

    let (available, capacity, open) = match ctx.ledger.load(&member.id) {
        Some(l) => (l.available_hours, l.capacity_hours, l.open_assignments),
        None => (
            member.available_hours(),
            member.capacity_hours,
            member.current_assignments.len(),
        ),
    };
    let (capacity_score, over_capacity) =
        capacity_factor(available, capacity, profile.hours, ctx.config.safety_buffer);

    let domains = profile.all_domains();
    let proven = collaborators
        .iter()
        .filter(|c| ctx.performance.worked_well_with(&member.id, c))
        .count();

    let factors = FactorBreakdown {
        expertise: expertise.factor,
        capacity: capacity_score,
        workload: workload_factor(open, ctx.ledger.average_open()),
        history: history_factor(
            ctx.performance.success_rate(&member.id),
            ctx.performance.similar_successes(&member.id, &domains),
        ),
        collaboration: collaboration_factor(proven),
    };

    CandidateScore {
        member_id: member.id.clone(),
        score: combine(&factors, &ctx.config.weights),
        factors,
        over_capacity,
        missing_required: expertise.missing_required,
        sources: expertise.sources,
    }
}

/// Drop candidates at or below the floor and order the rest best first,
/// ties by member id.
pub fn rank(mut scores: Vec<CandidateScore>, min_score: f64) -> Vec<CandidateScore> {
    scores.retain(|s| s.score > min_score);
    scores.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.member_id.cmp(&b.member_id))
    });
    scores
}

#[cfg(test)]
#[path = "scorer_test.rs"]
mod tests;
