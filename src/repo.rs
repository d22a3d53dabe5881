//! Repository inputs: `NAME=HISTORY[,CODEOWNERS]` specs, loading, and
//! per-repository analysis fanned out across threads.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::config::HistoryConfig;
use crate::error::{InputError, read_to_string};
use crate::git::GitRepo;
use crate::history::{self, CommitRecord, HistoryReport, parse_timestamp};
use crate::owners::OwnershipFile;

/// Where CODEOWNERS is looked up inside a git checkout when no explicit
/// path is given, in GitHub's order.
const CODEOWNERS_LOCATIONS: &[&str] = &[".github/CODEOWNERS", "CODEOWNERS", "docs/CODEOWNERS"];

/// One `--repo` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSpec {
    pub name: String,
    /// A JSON commit log, or a directory inside a git checkout.
    pub history: PathBuf,
    pub codeowners: Option<PathBuf>,
}

impl FromStr for RepoSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, rest) = s
            .split_once('=')
            .ok_or_else(|| format!("expected NAME=HISTORY[,CODEOWNERS], got {s:?}"))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(format!("empty repository name in {s:?}"));
        }
        let (history, codeowners) = match rest.split_once(',') {
            Some((h, c)) => (h.trim(), Some(c.trim())),
            None => (rest.trim(), None),
        };
        if history.is_empty() {
            return Err(format!("empty history path in {s:?}"));
        }
        Ok(Self {
            name: name.to_string(),
            history: PathBuf::from(history),
            codeowners: codeowners.filter(|c| !c.is_empty()).map(PathBuf::from),
        })
    }
}

/// Raw inputs for one repository.
pub struct RepoInput {
    pub name: String,
    pub commits: Vec<CommitRecord>,
    pub owners: Option<OwnershipFile>,
}

/// Analysis results for one repository, read-only once built.
pub struct RepoAnalysis {
    pub name: String,
    pub history: HistoryReport,
    pub owners: Option<OwnershipFile>,
}

/// Parse a JSON commit log. Records with a timestamp before `since` are
/// skipped; records with a bad timestamp are kept so the analyzer can
/// report them as dropped.
pub fn load_commit_log(path: &Path, since: Option<i64>) -> Result<Vec<CommitRecord>, InputError> {
    let text = read_to_string(path)?;
    let values: Vec<serde_json::Value> =
        serde_json::from_str(&text).map_err(|e| InputError::json(path, e))?;
    let mut records: Vec<CommitRecord> = values
        .into_iter()
        .enumerate()
        .filter_map(|(i, value)| {
            let hash = value
                .get("hash")
                .and_then(|h| h.as_str())
                .unwrap_or_default()
                .to_string();
            match serde_json::from_value(value) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        index = i,
                        %hash,
                        error = %e,
                        "skipping malformed commit record"
                    );
                    None
                }
            }
        })
        .collect();
    if let Some(since) = since {
        records.retain(|r| parse_timestamp(&r.timestamp).is_none_or(|t| t.timestamp() >= since));
    }
    Ok(records)
}

pub fn load(spec: &RepoSpec, since: Option<i64>) -> Result<RepoInput, InputError> {
    let (commits, root) = if spec.history.is_dir() {
        let git = GitRepo::open(&spec.history)?;
        (git.commit_records(since)?, Some(git.root().to_path_buf()))
    } else {
        (load_commit_log(&spec.history, since)?, None)
    };

    let codeowners = spec.codeowners.clone().or_else(|| {
        root.as_ref().and_then(|root| {
            CODEOWNERS_LOCATIONS
                .iter()
                .map(|loc| root.join(loc))
                .find(|p| p.is_file())
        })
    });
    let owners = match codeowners {
        Some(path) => {
            debug!(repo = %spec.name, path = %path.display(), "loading ownership file");
            Some(OwnershipFile::load(&path, &spec.name)?)
        }
        None => None,
    };

    info!(repo = %spec.name, commits = commits.len(), "loaded repository");
    Ok(RepoInput {
        name: spec.name.clone(),
        commits,
        owners,
    })
}

/// Load and analyse every repository independently, one task per
/// repository. Output order follows `specs`.
pub fn analyze_all(
    specs: &[RepoSpec],
    since: Option<i64>,
    config: &HistoryConfig,
    now: DateTime<Utc>,
) -> Result<Vec<RepoAnalysis>, InputError> {
    specs
        .par_iter()
        .map(|spec| {
            let input = load(spec, since)?;
            let history = history::analyze(&input.name, &input.commits, config, now);
            Ok(RepoAnalysis {
                name: input.name,
                history,
                owners: input.owners,
            })
        })
        .collect()
}

#[cfg(test)]
#[path = "repo_test.rs"]
mod tests;
