//! Track record derived from the assignment log: who delivered, on what
//! kind of work, and alongside whom. Only records with an outcome count.

use std::collections::{BTreeSet, HashMap, HashSet};

use super::record::Assignment;

/// Jaccard index of two domain sets; 0 when both are empty.
pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

/// Above this Jaccard index two items count as similar work.
pub const SIMILARITY_THRESHOLD: f64 = 0.5;

struct Resolved {
    assignee: String,
    domains: BTreeSet<String>,
    success: bool,
}

#[derive(Default)]
pub struct PerformanceIndex {
    resolved: Vec<Resolved>,
    totals: HashMap<String, (usize, usize)>,
    pairs: HashSet<(String, String)>,
}

fn pair(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

impl PerformanceIndex {
    pub fn from_records(records: &[Assignment]) -> Self {
        let mut index = Self::default();
        for r in records {
            let Some(outcome) = r.outcome else { continue };
            let success = outcome.is_success();
            let slot = index.totals.entry(r.assignee_id.clone()).or_default();
            slot.0 += 1;
            if success {
                slot.1 += 1;
                for c in r.collaborators.iter().filter(|c| **c != r.assignee_id) {
                    index.pairs.insert(pair(&r.assignee_id, c));
                }
            }
            index.resolved.push(Resolved {
                assignee: r.assignee_id.clone(),
                domains: r.domains.iter().cloned().collect(),
                success,
            });
        }
        index
    }

    /// Successes over resolved assignments; `None` for members with no
    /// track record yet.
    pub fn success_rate(&self, member: &str) -> Option<f64> {
        self.totals
            .get(member)
            .filter(|(total, _)| *total > 0)
            .map(|(total, ok)| *ok as f64 / *total as f64)
    }

    /// Successful past assignments of `member` on similar domain sets.
    pub fn similar_successes(&self, member: &str, domains: &BTreeSet<String>) -> usize {
        self.resolved
            .iter()
            .filter(|r| {
                r.assignee == member
                    && r.success
                    && jaccard(&r.domains, domains) > SIMILARITY_THRESHOLD
            })
            .count()
    }

    /// Success rate across everyone on similar work, used as the engine's
    /// historical accuracy.
    pub fn similar_accuracy(&self, domains: &BTreeSet<String>) -> Option<f64> {
        let similar: Vec<&Resolved> = self
            .resolved
            .iter()
            .filter(|r| jaccard(&r.domains, domains) > SIMILARITY_THRESHOLD)
            .collect();
        if similar.is_empty() {
            return None;
        }
        let ok = similar.iter().filter(|r| r.success).count();
        Some(ok as f64 / similar.len() as f64)
    }

    pub fn worked_well_with(&self, a: &str, b: &str) -> bool {
        self.pairs.contains(&pair(a, b))
    }
}

#[cfg(test)]
#[path = "performance_test.rs"]
mod tests;
