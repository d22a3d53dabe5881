//! Commit history analysis: folds commit records into per-contributor
//! aggregates (files, directories, languages, volume, recency) and scores
//! them. Invalid records are dropped individually, never fatally.

pub mod analyzer;
pub mod commit;
pub mod language;
mod report;

use std::error::Error;

use chrono::Utc;

use crate::config::Config;
use crate::repo::{self, RepoSpec};
use crate::util::parse_since;
pub use analyzer::{
    Contributor, ContributorStats, DomainActivity, HistoryAnalyzer, HistoryReport, analyze,
};
pub use commit::{ChangeKind, CommitRecord, FileChange, parse_timestamp};
use report::{print_json, print_report};

/// Analyse each repository's history in parallel and print contributor
/// statistics and file experts, `top` rows per repository.
pub fn run(
    repos: &[RepoSpec],
    since: Option<&str>,
    top: usize,
    json: bool,
    config: &Config,
) -> Result<(), Box<dyn Error>> {
    if repos.is_empty() {
        return Err("at least one --repo is required".into());
    }
    let since_ts = since.map(parse_since).transpose()?;
    let analyses = repo::analyze_all(repos, since_ts, &config.history, Utc::now())?;
    let reports: Vec<HistoryReport> = analyses.into_iter().map(|a| a.history).collect();

    if json {
        print_json(&reports, top)
    } else {
        print_report(&reports, top);
        Ok(())
    }
}
