use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::advisory::{Advisory, AdvisoryKind, analyze_gaps};
use super::reconcile::{Reconciliation, reconcile};
use crate::config::MatrixConfig;
use crate::owners::{OwnerKind, OwnershipRule};
use crate::repo::RepoAnalysis;
use crate::team::{TeamMember, normalize_domain};
use crate::util::clamp_finite;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Declared,
    Ownership,
    Commits,
}

/// Per-source sub-scores behind an entry, each 0-100 when present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SourceScores {
    pub declared: Option<f64>,
    pub ownership: Option<f64>,
    pub commits: Option<f64>,
}

/// Skill estimate for one (member, domain) pair. Only built when at least
/// one source backs it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpertiseEntry {
    pub score: f64,
    pub confidence: f64,
    pub sources: BTreeSet<Source>,
    pub components: SourceScores,
    pub domain_commits: usize,
    pub recent_commits: usize,
}

/// Combined (member × domain) expertise across every repository in scope.
/// Read-only once built.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExpertiseMatrix {
    /// member id -> domain -> entry
    pub entries: BTreeMap<String, BTreeMap<String, ExpertiseEntry>>,
    pub reconciliation: Reconciliation,
    pub advisories: Vec<Advisory>,
    #[serde(skip)]
    expert_floor: f64,
}

impl ExpertiseMatrix {
    pub fn entry(&self, member: &str, domain: &str) -> Option<&ExpertiseEntry> {
        self.entries.get(member).and_then(|d| d.get(domain))
    }

    pub fn member_domains(&self, member: &str) -> Option<&BTreeMap<String, ExpertiseEntry>> {
        self.entries.get(member)
    }

    pub fn domains(&self) -> BTreeSet<&str> {
        self.entries
            .values()
            .flat_map(|d| d.keys().map(|k| k.as_str()))
            .collect()
    }

    /// Everyone with an entry for `domain`, highest score first.
    pub fn experts(&self, domain: &str) -> Vec<(&str, &ExpertiseEntry)> {
        let mut out: Vec<(&str, &ExpertiseEntry)> = self
            .entries
            .iter()
            .filter_map(|(m, d)| d.get(domain).map(|e| (m.as_str(), e)))
            .collect();
        out.sort_by(|a, b| b.1.score.total_cmp(&a.1.score).then_with(|| a.0.cmp(b.0)));
        out
    }

    /// No one reaches the expert floor in `domain`, including domains
    /// nobody has any entry for.
    pub fn is_gap(&self, domain: &str) -> bool {
        let advised = self
            .advisories
            .iter()
            .any(|a| a.kind == AdvisoryKind::CoverageGap && a.domain == domain);
        advised || !self.experts(domain).iter().any(|(_, e)| e.score >= self.expert_floor)
    }

    pub fn unmatched_authors(&self) -> usize {
        self.reconciliation.unmatched.len()
    }
}

/// Whether `member` is one of the rule's owners.
pub fn owns(member: &TeamMember, rule: &OwnershipRule) -> bool {
    rule.owners.iter().any(|o| match o.kind {
        OwnerKind::User => o.identifier == member.handle().to_lowercase(),
        OwnerKind::Email => member.email.as_deref() == Some(o.identifier.as_str()),
        OwnerKind::Team => member.teams.iter().any(|t| *t == o.identifier),
    })
}

/// Average of `(min(100, specificity) + confidence) / 2` over the rules a
/// member owns, per domain token.
fn ownership_scores(
    member: &TeamMember,
    rules: &[&OwnershipRule],
) -> BTreeMap<String, f64> {
    let mut acc: BTreeMap<String, (f64, usize)> = BTreeMap::new();
    for rule in rules.iter().filter(|r| owns(member, r)) {
        let value = (f64::from(rule.specificity.min(100)) + f64::from(rule.confidence)) / 2.0;
        let domains: BTreeSet<String> = rule
            .domain_tokens()
            .iter()
            .map(|t| normalize_domain(t))
            .filter(|d| !d.is_empty())
            .collect();
        for domain in domains {
            let slot = acc.entry(domain).or_default();
            slot.0 += value;
            slot.1 += 1;
        }
    }
    acc.into_iter()
        .map(|(d, (sum, n))| (d, clamp_finite(sum / n as f64, 0.0, 100.0)))
        .collect()
}

#[derive(Default)]
struct CommitAcc {
    weighted: f64,
    commits: usize,
    recent: usize,
}

/// Per-domain commit evidence for one member: the contributor expertise
/// score of each matched author, weighted by that author's commits in the
/// domain.
fn commit_scores(
    member: &TeamMember,
    repos: &[RepoAnalysis],
    reconciliation: &Reconciliation,
) -> BTreeMap<String, CommitAcc> {
    let mut acc: BTreeMap<String, CommitAcc> = BTreeMap::new();
    for repo in repos {
        for stats in &repo.history.contributors {
            let c = &stats.contributor;
            if reconciliation.member_for(&repo.name, &c.key) != Some(member.id.as_str()) {
                continue;
            }
            for (domain, activity) in &c.domains {
                let slot = acc.entry(domain.clone()).or_default();
                slot.weighted += stats.scores.expertise * activity.commits as f64;
                slot.commits += activity.commits;
                slot.recent += activity.recent_commits;
            }
        }
    }
    acc
}

/// Confidence: base 50, +15 per source, up to +20 for the recent share of
/// domain commits, -20 with no commit evidence at all.
pub fn entry_confidence(sources: usize, domain_commits: usize, recent_commits: usize) -> f64 {
    let mut confidence = 50.0 + 15.0 * sources as f64;
    if domain_commits == 0 {
        confidence -= 20.0;
    } else {
        confidence += 20.0 * (recent_commits as f64 / domain_commits as f64).min(1.0);
    }
    clamp_finite(confidence, 0.0, 100.0)
}

/// Merge one member's three evidence sources into entries.
fn member_entries(
    member: &TeamMember,
    rules: &[&OwnershipRule],
    repos: &[RepoAnalysis],
    reconciliation: &Reconciliation,
    config: &MatrixConfig,
) -> BTreeMap<String, ExpertiseEntry> {
    let declared = member.declared_domains();
    let ownership = ownership_scores(member, rules);
    let commits = commit_scores(member, repos, reconciliation);

    let domains: BTreeSet<&String> = declared
        .iter()
        .chain(ownership.keys())
        .chain(commits.keys())
        .collect();

    domains
        .into_iter()
        .filter_map(|domain| {
            let commit = commits.get(domain);
            let components = SourceScores {
                declared: declared
                    .contains(domain)
                    .then_some(clamp_finite(config.declared_base, 0.0, 100.0)),
                ownership: ownership.get(domain).copied(),
                commits: commit
                    .filter(|c| c.commits > 0)
                    .map(|c| clamp_finite(c.weighted / c.commits as f64, 0.0, 100.0)),
            };

            let mut sources = BTreeSet::new();
            let mut score = 0.0;
            if let Some(v) = components.declared {
                sources.insert(Source::Declared);
                score += config.declared_weight * v;
            }
            if let Some(v) = components.ownership {
                sources.insert(Source::Ownership);
                score += config.ownership_weight * v;
            }
            if let Some(v) = components.commits {
                sources.insert(Source::Commits);
                score += config.commit_weight * v;
            }
            if sources.is_empty() {
                return None;
            }

            let domain_commits = commit.map_or(0, |c| c.commits);
            let recent_commits = commit.map_or(0, |c| c.recent);
            Some((
                domain.clone(),
                ExpertiseEntry {
                    score: clamp_finite(score, 0.0, 100.0),
                    confidence: entry_confidence(sources.len(), domain_commits, recent_commits),
                    sources,
                    components,
                    domain_commits,
                    recent_commits,
                },
            ))
        })
        .collect()
}

/// Build the team matrix from per-repository analyses. Single-threaded
/// fan-in; the repository analyses themselves are done beforehand.
pub fn build(
    members: &[TeamMember],
    repos: &[RepoAnalysis],
    config: &MatrixConfig,
) -> ExpertiseMatrix {
    let reconciliation = reconcile(
        members,
        repos
            .iter()
            .map(|r| (r.name.as_str(), r.history.contributors.as_slice())),
    );
    let rules: Vec<&OwnershipRule> = repos
        .iter()
        .filter_map(|r| r.owners.as_ref())
        .flat_map(|o| o.rules.iter())
        .collect();

    let entries: BTreeMap<String, BTreeMap<String, ExpertiseEntry>> = members
        .iter()
        .map(|m| {
            (
                m.id.clone(),
                member_entries(m, &rules, repos, &reconciliation, config),
            )
        })
        .collect();

    let advisories = analyze_gaps(&entries, config);
    ExpertiseMatrix {
        entries,
        reconciliation,
        advisories,
        expert_floor: config.expert_floor,
    }
}

#[cfg(test)]
#[path = "builder_test.rs"]
mod tests;
