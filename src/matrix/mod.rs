//! Expertise matrix: merges declared skills, ownership rules and commit
//! history into one confidence-scored (member × domain) map, reconciles
//! commit authors to team members, and flags coverage risks.

pub mod advisory;
pub mod builder;
pub mod reconcile;
mod report;

use std::error::Error;
use std::path::Path;

use chrono::Utc;

use crate::config::Config;
use crate::repo::{self, RepoSpec};
use crate::team::load_roster;
pub use advisory::{Advisory, AdvisoryKind};
pub use builder::{ExpertiseEntry, ExpertiseMatrix, Source, SourceScores, build};
pub use reconcile::Reconciliation;
use report::{print_json, print_report};

/// Build and print the matrix for a roster across repositories.
pub fn run(
    team: &Path,
    repos: &[RepoSpec],
    json: bool,
    config: &Config,
) -> Result<(), Box<dyn Error>> {
    let members = load_roster(team)?;
    let analyses = repo::analyze_all(repos, None, &config.history, Utc::now())?;
    let matrix = build(&members, &analyses, &config.matrix);

    if json {
        print_json(&matrix)
    } else {
        print_report(&matrix, &members);
        Ok(())
    }
}
