use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use super::commit::{CommitRecord, DroppedRecord, estimate_lines_tenths};
use super::language::language_for_path;
use crate::config::HistoryConfig;
use crate::team::normalize_domain;
use crate::util::clamp_finite;

const WEEK_SECS: i64 = 7 * 86_400;

/// Activity of one contributor in one domain (language or directory
/// segment). Each commit counts at most once per domain.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DomainActivity {
    pub commits: usize,
    pub recent_commits: usize,
    pub last_commit: Option<DateTime<Utc>>,
}

impl DomainActivity {
    fn record(&mut self, at: DateTime<Utc>, recent: bool) {
        self.commits += 1;
        if recent {
            self.recent_commits += 1;
        }
        self.last_commit = Some(self.last_commit.map_or(at, |t| t.max(at)));
    }
}

/// Per-repository aggregate for one normalized author identity.
///
/// Every field is a commutative fold (counts, sums, min/max, sorted maps)
/// so the result does not depend on the order commits arrive in.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Contributor {
    pub key: String,
    pub names: BTreeSet<String>,
    pub emails: BTreeSet<String>,
    pub total_commits: usize,
    pub recent_commits: usize,
    /// Commits per touched file.
    pub files: BTreeMap<String, usize>,
    /// Commits per parent directory.
    pub directories: BTreeMap<String, usize>,
    /// Commits per derived language tag.
    pub languages: BTreeMap<String, usize>,
    /// Languages and directory segments as skill domains.
    pub domains: BTreeMap<String, DomainActivity>,
    /// Estimated lines changed, in tenths of a line.
    pub lines_changed_tenths: u64,
    pub first_commit: Option<DateTime<Utc>>,
    pub last_commit: Option<DateTime<Utc>>,
    /// Commit count per week index since the Unix epoch.
    pub weekly_commits: BTreeMap<i64, usize>,
}

impl Contributor {
    fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            ..Self::default()
        }
    }

    pub fn display_name(&self) -> &str {
        self.names.iter().next().map_or(self.key.as_str(), |n| n.as_str())
    }

    pub fn lines_changed(&self) -> f64 {
        self.lines_changed_tenths as f64 / 10.0
    }

    pub fn active_span_days(&self) -> f64 {
        match (self.first_commit, self.last_commit) {
            (Some(first), Some(last)) => (last - first).num_seconds() as f64 / 86_400.0,
            _ => 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ContributorScores {
    pub recency_ratio: f64,
    pub consistency: f64,
    pub expertise: f64,
    pub recency: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContributorStats {
    #[serde(flatten)]
    pub contributor: Contributor,
    pub scores: ContributorScores,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileExpert {
    pub author: String,
    pub commits: usize,
    /// `commits × expertise`, the ranking key.
    pub weight: f64,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileExperts {
    pub path: String,
    pub experts: Vec<FileExpert>,
}

/// Result of analysing one repository's history. Immutable once built.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryReport {
    pub repo: String,
    pub analyzed_at: DateTime<Utc>,
    pub window_days: i64,
    pub commits_analyzed: usize,
    pub dropped: Vec<DroppedRecord>,
    /// Sorted by expertise score, highest first.
    pub contributors: Vec<ContributorStats>,
    /// Contributors removed for having fewer than `min_commits` commits.
    pub below_threshold: usize,
    pub file_experts: Vec<FileExperts>,
}

/// Incremental fold of commit records into contributor aggregates.
pub struct HistoryAnalyzer {
    now: DateTime<Utc>,
    window: Duration,
    min_commits: usize,
    contributors: HashMap<String, Contributor>,
    /// Valid records by trimmed hash, waiting to be folded in `finish`.
    pending: HashMap<String, (String, CommitRecord)>,
    dropped: Vec<DroppedRecord>,
    commits_analyzed: usize,
}

impl HistoryAnalyzer {
    pub fn new(config: &HistoryConfig, now: DateTime<Utc>) -> Self {
        Self {
            now,
            window: Duration::days(config.recent_window_days.max(0)),
            min_commits: config.min_commits,
            contributors: HashMap::new(),
            pending: HashMap::new(),
            dropped: Vec::new(),
            commits_analyzed: 0,
        }
    }

    /// Accept one record. Invalid records are dropped and remembered. When
    /// several records share a hash, the smallest by (author, record) is
    /// kept and the rest are dropped, whatever order they arrive in.
    pub fn add(&mut self, record: &CommitRecord) {
        let author_key = match record.validate() {
            Ok(v) => v.author_key,
            Err(reason) => {
                warn!(hash = %record.hash, %reason, "dropping commit record");
                self.dropped.push(DroppedRecord {
                    hash: record.hash.clone(),
                    reason,
                });
                return;
            }
        };
        let candidate = (author_key, record.clone());
        let hash = record.hash.trim().to_string();
        let loser = match self.pending.entry(hash) {
            Entry::Vacant(slot) => {
                slot.insert(candidate);
                return;
            }
            Entry::Occupied(mut slot) if candidate < *slot.get() => slot.insert(candidate).1,
            Entry::Occupied(_) => candidate.1,
        };
        debug!(hash = %loser.hash, "duplicate commit record");
        self.dropped.push(DroppedRecord {
            hash: loser.hash,
            reason: "duplicate hash".to_string(),
        });
    }

    fn fold(&mut self, record: &CommitRecord) {
        let Ok(valid) = record.validate() else {
            return;
        };
        self.commits_analyzed += 1;

        let at = valid.at;
        let recent = self.now.signed_duration_since(at) <= self.window;
        let c = self
            .contributors
            .entry(valid.author_key.clone())
            .or_insert_with(|| Contributor::new(&valid.author_key));

        let name = record.author_name.trim();
        if !name.is_empty() {
            c.names.insert(name.to_string());
        }
        let email = record.author_email.trim();
        if email.contains('@') {
            c.emails.insert(email.to_lowercase());
        }

        c.total_commits += 1;
        if recent {
            c.recent_commits += 1;
        }
        c.first_commit = Some(c.first_commit.map_or(at, |t| t.min(at)));
        c.last_commit = Some(c.last_commit.map_or(at, |t| t.max(at)));
        *c.weekly_commits
            .entry(at.timestamp().div_euclid(WEEK_SECS))
            .or_default() += 1;

        let paths: BTreeSet<&str> = record
            .files
            .iter()
            .map(|f| clean_path(&f.path))
            .filter(|p| !p.is_empty())
            .collect();
        c.lines_changed_tenths += estimate_lines_tenths(paths.len(), &record.message);

        let mut dirs = BTreeSet::new();
        let mut langs = BTreeSet::new();
        let mut domains = BTreeSet::new();
        for path in &paths {
            *c.files.entry(path.to_string()).or_default() += 1;
            if let Some((dir, _)) = path.rsplit_once('/') {
                dirs.insert(dir);
                domains.extend(dir.split('/').map(normalize_domain).filter(|d| !d.is_empty()));
            }
            if let Some(lang) = language_for_path(path) {
                langs.insert(lang);
                domains.insert(lang.to_string());
            }
        }
        for dir in dirs {
            *c.directories.entry(dir.to_string()).or_default() += 1;
        }
        for lang in langs {
            *c.languages.entry(lang.to_string()).or_default() += 1;
        }
        for domain in domains {
            c.domains.entry(domain).or_default().record(at, recent);
        }
    }

    /// Score every contributor, apply the minimum-commit threshold and
    /// rank file experts.
    pub fn finish(mut self, repo: &str) -> HistoryReport {
        let pending: Vec<CommitRecord> = std::mem::take(&mut self.pending)
            .into_values()
            .map(|(_, record)| record)
            .collect();
        for record in &pending {
            self.fold(record);
        }

        let now = self.now;
        let min_commits = self.min_commits;
        let total = self.contributors.len();
        let mut contributors: Vec<ContributorStats> = self
            .contributors
            .into_values()
            .filter(|c| c.total_commits >= min_commits)
            .map(|c| {
                let scores = score_contributor(&c, now);
                ContributorStats {
                    contributor: c,
                    scores,
                }
            })
            .collect();
        let below_threshold = total - contributors.len();
        contributors.sort_by(|a, b| {
            b.scores
                .expertise
                .total_cmp(&a.scores.expertise)
                .then_with(|| a.contributor.key.cmp(&b.contributor.key))
        });

        self.dropped
            .sort_by(|a, b| a.hash.cmp(&b.hash).then_with(|| a.reason.cmp(&b.reason)));

        HistoryReport {
            repo: repo.to_string(),
            analyzed_at: now,
            window_days: self.window.num_days(),
            commits_analyzed: self.commits_analyzed,
            dropped: self.dropped,
            file_experts: rank_file_experts(&contributors),
            contributors,
            below_threshold,
        }
    }
}

/// Fold a whole log in one call.
pub fn analyze(
    repo: &str,
    records: &[CommitRecord],
    config: &HistoryConfig,
    now: DateTime<Utc>,
) -> HistoryReport {
    let mut analyzer = HistoryAnalyzer::new(config, now);
    for r in records {
        analyzer.add(r);
    }
    analyzer.finish(repo)
}

fn clean_path(path: &str) -> &str {
    let p = path.trim();
    let p = p.strip_prefix("./").unwrap_or(p);
    p.trim_start_matches('/')
}

pub fn score_contributor(c: &Contributor, now: DateTime<Utc>) -> ContributorScores {
    let recency_ratio = recency_ratio(c.recent_commits, c.total_commits);
    let consistency = consistency_score(c.total_commits, c.active_span_days());
    let days_since = c
        .last_commit
        .map_or(i64::MAX, |t| now.signed_duration_since(t).num_days());
    ContributorScores {
        recency_ratio,
        consistency,
        expertise: expertise_score(recency_ratio, c.total_commits, c.lines_changed(), consistency),
        recency: recency_score(days_since),
    }
}

/// Share of commits inside the recent window, in [0, 1].
pub fn recency_ratio(recent: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    clamp_finite(recent as f64 / total as f64, 0.0, 1.0)
}

/// `min(100, 20 × commits per week)` over the active span, span floored at
/// one day. Zero below two commits.
pub fn consistency_score(total_commits: usize, span_days: f64) -> f64 {
    if total_commits < 2 {
        return 0.0;
    }
    let weeks = clamp_finite(span_days, 1.0, f64::MAX) / 7.0;
    clamp_finite(20.0 * total_commits as f64 / weeks, 0.0, 100.0)
}

/// Weighted blend of recency, volume, size and consistency, each term
/// clamped to [0, 100] before weighting.
pub fn expertise_score(
    recency_ratio: f64,
    total_commits: usize,
    lines_changed: f64,
    consistency: f64,
) -> f64 {
    let recency = clamp_finite(recency_ratio * 100.0, 0.0, 100.0);
    let volume = clamp_finite((total_commits as f64 + 1.0).log10() * 25.0, 0.0, 100.0);
    let size = clamp_finite((lines_changed.max(0.0) + 1.0).log10() * 15.0, 0.0, 100.0);
    let consistency = clamp_finite(consistency, 0.0, 100.0);
    clamp_finite(
        0.4 * recency + 0.3 * volume + 0.2 * size + 0.1 * consistency,
        0.0,
        100.0,
    )
}

/// Step function of days since the last commit.
pub fn recency_score(days_since: i64) -> f64 {
    match days_since {
        d if d < 7 => 100.0,
        d if d < 30 => 80.0,
        d if d < 90 => 60.0,
        d if d < 180 => 40.0,
        d if d < 365 => 20.0,
        _ => 10.0,
    }
}

/// More commits and fewer competitors both raise confidence.
pub fn file_confidence(commits: usize, competitors: usize) -> f64 {
    let volume = (15.0 * commits as f64).min(60.0);
    let exclusivity = 40.0 / competitors.max(1) as f64;
    clamp_finite(volume + exclusivity, 0.0, 100.0)
}

fn rank_file_experts(contributors: &[ContributorStats]) -> Vec<FileExperts> {
    let mut by_file: BTreeMap<&str, Vec<(&ContributorStats, usize)>> = BTreeMap::new();
    for stats in contributors {
        for (path, commits) in &stats.contributor.files {
            by_file.entry(path).or_default().push((stats, *commits));
        }
    }

    by_file
        .into_iter()
        .map(|(path, entries)| {
            let competitors = entries.len();
            let mut experts: Vec<FileExpert> = entries
                .into_iter()
                .map(|(stats, commits)| FileExpert {
                    author: stats.contributor.key.clone(),
                    commits,
                    weight: commits as f64 * stats.scores.expertise,
                    confidence: file_confidence(commits, competitors),
                })
                .collect();
            experts.sort_by(|a, b| {
                b.weight
                    .total_cmp(&a.weight)
                    .then_with(|| a.author.cmp(&b.author))
            });
            FileExperts {
                path: path.to_string(),
                experts,
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "analyzer_test.rs"]
mod tests;
