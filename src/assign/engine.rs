//! Per-item state machine and the single-writer commit step.
//!
//! Each work item moves Unassigned -> CandidatesGathered -> Scored ->
//! Assigned | Unassignable. Candidate scoring reads a frozen snapshot and
//! runs in parallel; committing the chosen assignee to the capacity ledger
//! is strictly sequential, in priority order.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use tracing::{debug, info};

use super::ledger::CapacityLedger;
use super::performance::PerformanceIndex;
use super::record::{Assignment, CandidateScore, Decision, Flag, RiskLevel, Unassignable};
use super::scorer::{ScoringContext, is_candidate, rank, score_candidate};
use crate::config::Config;
use crate::matrix::ExpertiseMatrix;
use crate::team::{TaskProfile, TeamMember, WorkItem};
use crate::util::clamp_finite;

pub const NO_SUITABLE_CANDIDATES: &str = "no_suitable_candidates";

enum ItemState<'m> {
    Unassigned,
    CandidatesGathered(Vec<&'m TeamMember>),
    Scored(Vec<CandidateScore>),
    Done(Decision),
}

/// Confidence in a decision: mostly the suitability score, then how many
/// evidence sources back it, then how similar past assignments went.
pub fn assignment_confidence(score: f64, sources: usize, similar_accuracy: Option<f64>) -> f64 {
    let corroboration = (sources as f64 / 3.0).min(1.0);
    let accuracy = similar_accuracy.unwrap_or(0.5);
    clamp_finite(0.6 * score + 0.25 * corroboration + 0.15 * accuracy, 0.0, 1.0)
}

/// Points: confidence below 0.6 (+2) or 0.8 (+1), over capacity (+2),
/// any required or preferred domain with a coverage gap (+1). 0 is low,
/// 3+ is high.
pub fn assess_risk(confidence: f64, over_capacity: bool, touches_gap: bool) -> RiskLevel {
    let mut points = 0;
    if confidence < 0.6 {
        points += 2;
    } else if confidence < 0.8 {
        points += 1;
    }
    if over_capacity {
        points += 2;
    }
    if touches_gap {
        points += 1;
    }
    match points {
        0 => RiskLevel::Low,
        1 | 2 => RiskLevel::Medium,
        _ => RiskLevel::High,
    }
}

/// Stable priority order: critical first, input order within a priority.
pub fn processing_order(items: &[WorkItem]) -> Vec<&WorkItem> {
    let mut ordered: Vec<&WorkItem> = items.iter().collect();
    ordered.sort_by_key(|i| i.priority.sort_key());
    ordered
}

pub struct AssignmentEngine<'a> {
    members: &'a [TeamMember],
    matrix: &'a ExpertiseMatrix,
    config: &'a Config,
    performance: PerformanceIndex,
    ledger: CapacityLedger,
    now: DateTime<Utc>,
}

impl<'a> AssignmentEngine<'a> {
    /// `history` is the assignment log; only records with an outcome
    /// feed the history and collaboration factors.
    pub fn new(
        members: &'a [TeamMember],
        matrix: &'a ExpertiseMatrix,
        history: &[Assignment],
        config: &'a Config,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            members,
            matrix,
            config,
            performance: PerformanceIndex::from_records(history),
            ledger: CapacityLedger::new(members),
            now,
        }
    }

    pub fn ledger(&self) -> &CapacityLedger {
        &self.ledger
    }

    /// Decide every item, committing capacity as it goes. Decisions come
    /// back in processing order.
    pub fn assign_all(&mut self, items: &[WorkItem]) -> Vec<Decision> {
        processing_order(items)
            .into_iter()
            .map(|item| self.assign(item))
            .collect()
    }

    pub fn assign(&mut self, item: &WorkItem) -> Decision {
        let profile = item.profile(&self.config.domains, &self.config.effort);
        let mut state = ItemState::Unassigned;
        loop {
            state = match state {
                ItemState::Unassigned => ItemState::CandidatesGathered(self.gather(&profile)),
                ItemState::CandidatesGathered(found) if found.is_empty() => {
                    let detail = if profile.required.is_empty() {
                        "the roster is empty".to_string()
                    } else {
                        format!("no team member has expertise in {}", join(&profile.required))
                    };
                    ItemState::Done(Decision::Unassignable(self.unassignable(item, &profile, detail)))
                }
                ItemState::CandidatesGathered(found) => {
                    ItemState::Scored(self.score(&found, &profile, &item.collaborators))
                }
                ItemState::Scored(ranked) if ranked.is_empty() => {
                    let detail = format!(
                        "every candidate scored at or below {:.2}",
                        self.config.scoring.min_score
                    );
                    ItemState::Done(Decision::Unassignable(self.unassignable(item, &profile, detail)))
                }
                ItemState::Scored(ranked) => {
                    ItemState::Done(Decision::Assigned(self.commit(item, &profile, ranked)))
                }
                ItemState::Done(decision) => return decision,
            };
        }
    }

    fn gather(&self, profile: &TaskProfile) -> Vec<&'a TeamMember> {
        let members: &'a [TeamMember] = self.members;
        members
            .iter()
            .filter(|m| {
                is_candidate(
                    self.matrix.member_domains(&m.id),
                    profile,
                    self.config.scoring.min_required_skill,
                )
            })
            .collect()
    }

    fn score(
        &self,
        candidates: &[&TeamMember],
        profile: &TaskProfile,
        collaborators: &[String],
    ) -> Vec<CandidateScore> {
        let ctx = ScoringContext {
            matrix: self.matrix,
            ledger: &self.ledger,
            performance: &self.performance,
            config: &self.config.scoring,
        };
        let scores: Vec<CandidateScore> = candidates
            .par_iter()
            .map(|m| score_candidate(m, profile, collaborators, &ctx))
            .collect();
        rank(scores, self.config.scoring.min_score)
    }

    /// Pick the best candidate that fits in their remaining hours, or the
    /// best overall when nobody fits, and consume their capacity.
    fn commit(&mut self, item: &WorkItem, profile: &TaskProfile, mut ranked: Vec<CandidateScore>) -> Assignment {
        let pick = ranked.iter().position(|c| !c.over_capacity).unwrap_or(0);
        let chosen = ranked.remove(pick);
        ranked.truncate(self.config.scoring.max_alternatives);

        let domains = profile.all_domains();
        let confidence = assignment_confidence(
            chosen.score,
            chosen.sources,
            self.performance.similar_accuracy(&domains),
        );
        let touches_gap = domains.iter().any(|d| self.matrix.is_gap(d));

        let mut flags = Vec::new();
        if confidence < self.config.scoring.confidence_threshold {
            flags.push(Flag::ManualReviewRecommended);
        }
        if chosen.over_capacity {
            flags.push(Flag::OverCapacity);
        }
        if touches_gap {
            flags.push(Flag::CoverageGap);
        }
        if profile.inferred && !profile.required.is_empty() {
            flags.push(Flag::InferredDomains);
        }

        self.ledger.commit(&chosen.member_id, profile.hours);
        info!(
            "assigned {} to {} (score {:.2}, confidence {:.2})",
            item.id, chosen.member_id, chosen.score, confidence
        );

        Assignment {
            id: Assignment::make_id(&item.id, &chosen.member_id),
            work_item_id: item.id.clone(),
            assignee_id: chosen.member_id,
            confidence,
            risk_level: assess_risk(confidence, chosen.over_capacity, touches_gap),
            score: chosen.score,
            factors: chosen.factors,
            alternatives: ranked,
            domains: domains.into_iter().collect(),
            collaborators: item.collaborators.clone(),
            flags,
            estimated_hours: profile.hours,
            priority: item.priority,
            timestamp: self.now,
            outcome: None,
        }
    }

    fn unassignable(&self, item: &WorkItem, profile: &TaskProfile, detail: String) -> Unassignable {
        debug!("{} is unassignable: {detail}", item.id);
        let mut suggestions = Vec::new();
        if !profile.required.is_empty() {
            suggestions.push(format!(
                "loosen requirements: move some of {} to preferred domains",
                join(&profile.required)
            ));
        }
        let gaps: BTreeSet<&String> = profile
            .required
            .iter()
            .filter(|d| self.matrix.is_gap(d))
            .collect();
        if !gaps.is_empty() {
            let names: Vec<&str> = gaps.iter().map(|s| s.as_str()).collect();
            suggestions.push(format!(
                "add expertise: declare, train or hire for {}",
                names.join(", ")
            ));
        }
        suggestions.push(format!(
            "decompose the item: split the {:.0}h of work into smaller pieces",
            profile.hours
        ));

        Unassignable {
            work_item_id: item.id.clone(),
            reason: NO_SUITABLE_CANDIDATES,
            detail,
            suggestions,
            domains: profile.all_domains().into_iter().collect(),
            priority: item.priority,
        }
    }
}

fn join(domains: &BTreeSet<String>) -> String {
    domains.iter().map(|s| s.as_str()).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
#[path = "engine_test.rs"]
mod tests;
