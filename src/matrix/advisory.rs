use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::builder::ExpertiseEntry;
use crate::config::MatrixConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvisoryKind {
    SinglePointOfFailure,
    CoverageGap,
    DominantExpert,
}

impl AdvisoryKind {
    pub fn label(&self) -> &'static str {
        match self {
            AdvisoryKind::SinglePointOfFailure => "SINGLE POINT OF FAILURE",
            AdvisoryKind::CoverageGap => "COVERAGE GAP",
            AdvisoryKind::DominantExpert => "DOMINANT EXPERT",
        }
    }

    pub fn sort_key(&self) -> u8 {
        match self {
            AdvisoryKind::CoverageGap => 0,
            AdvisoryKind::SinglePointOfFailure => 1,
            AdvisoryKind::DominantExpert => 2,
        }
    }
}

/// Informational finding about a domain. Never a hard constraint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Advisory {
    pub kind: AdvisoryKind,
    pub domain: String,
    /// Members involved: the lone or dominant expert, or whoever has
    /// sub-floor entries for a gap.
    pub members: Vec<String>,
    pub message: String,
}

/// Gap analysis over every materialized domain.
pub fn analyze_gaps(
    entries: &BTreeMap<String, BTreeMap<String, ExpertiseEntry>>,
    config: &MatrixConfig,
) -> Vec<Advisory> {
    let domains: BTreeSet<&String> = entries.values().flat_map(|d| d.keys()).collect();
    let mut out = Vec::new();

    for domain in domains {
        let mut ranked: Vec<(&String, f64)> = entries
            .iter()
            .filter_map(|(m, d)| d.get(domain).map(|e| (m, e.score)))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));

        let experts: Vec<&(&String, f64)> = ranked
            .iter()
            .filter(|(_, s)| *s >= config.expert_floor)
            .collect();

        match experts.len() {
            0 => out.push(Advisory {
                kind: AdvisoryKind::CoverageGap,
                domain: domain.clone(),
                members: ranked.iter().map(|(m, _)| (*m).clone()).collect(),
                message: format!(
                    "no one scores {:.0} or more in {domain}",
                    config.expert_floor
                ),
            }),
            1 => out.push(Advisory {
                kind: AdvisoryKind::SinglePointOfFailure,
                domain: domain.clone(),
                members: vec![experts[0].0.clone()],
                message: format!("{} is the only expert in {domain}", experts[0].0),
            }),
            _ => {}
        }

        if let [(top, top_score), (_, second), ..] = ranked.as_slice()
            && top_score - second > config.dominance_gap
        {
            out.push(Advisory {
                kind: AdvisoryKind::DominantExpert,
                domain: domain.clone(),
                members: vec![(*top).clone()],
                message: format!(
                    "{top} leads {domain} by {:.0} points over the next expert",
                    top_score - second
                ),
            });
        }
    }

    out.sort_by(|a, b| {
        a.kind
            .sort_key()
            .cmp(&b.kind.sort_key())
            .then_with(|| a.domain.cmp(&b.domain))
    });
    out
}

#[cfg(test)]
#[path = "advisory_test.rs"]
mod tests;
