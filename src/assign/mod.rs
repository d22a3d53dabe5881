//! Candidate scoring and the assignment engine: decides who takes each
//! work item, explains why, and keeps an append-only log of decisions
//! that later feeds the history and collaboration factors.

pub mod engine;
pub mod ledger;
pub mod log;
pub mod performance;
pub mod record;
mod report;
pub mod scorer;
pub mod summary;

use std::error::Error;
use std::path::Path;

use chrono::Utc;
use tracing::info;

use crate::config::Config;
use crate::matrix;
use crate::repo::{self, RepoSpec};
use crate::team::{load_roster, load_work_items};
pub use engine::AssignmentEngine;
pub use log::AssignmentLog;
pub use record::{Assignment, Decision};
use report::{print_json, print_report};

/// Plan assignments for a batch of work items and, unless `dry_run`,
/// append them to the log.
pub fn run(
    team: &Path,
    items: &Path,
    repos: &[RepoSpec],
    log: Option<&Path>,
    dry_run: bool,
    json: bool,
    config: &Config,
) -> Result<(), Box<dyn Error>> {
    let members = load_roster(team)?;
    let work = load_work_items(items)?;
    let now = Utc::now();
    let analyses = repo::analyze_all(repos, None, &config.history, now)?;
    let matrix = matrix::build(&members, &analyses, &config.matrix);

    let log = log.map(AssignmentLog::new);
    let history = match &log {
        Some(l) => l.load()?,
        None => Vec::new(),
    };

    let mut engine = AssignmentEngine::new(&members, &matrix, &history, config, now);
    let decisions = engine.assign_all(&work);
    let summary = summary::summarize(&decisions, engine.ledger().assigned_counts());

    let logged = match (&log, dry_run) {
        (Some(l), false) => {
            let records: Vec<Assignment> = decisions
                .iter()
                .filter_map(Decision::assignment)
                .cloned()
                .collect();
            let n = l.append(&records)?;
            info!("logged {n} assignment(s) to {}", l.path().display());
            Some(n)
        }
        _ => None,
    };

    if json {
        print_json(&decisions, &summary, logged)
    } else {
        print_report(&decisions, &summary, logged);
        Ok(())
    }
}

/// Record how a logged assignment turned out.
pub fn run_outcome(
    id: &str,
    log: &Path,
    quality: u8,
    completed: bool,
) -> Result<(), Box<dyn Error>> {
    let log = AssignmentLog::new(log);
    let record = log.record_outcome(id, completed, quality, Utc::now())?;
    let verdict = match record.outcome {
        Some(o) if o.is_success() => "success",
        _ => "not a success",
    };
    println!(
        "Recorded outcome for {} ({} on {}): quality {quality}, {}, {verdict}",
        record.id,
        record.assignee_id,
        record.work_item_id,
        if completed { "completed" } else { "not completed" },
    );
    Ok(())
}
