//! Local commit-record extraction. Produces the same records a caller
//! would otherwise supply as JSON; no cloning or fetching happens here.

use std::path::{Path, PathBuf};

use chrono::DateTime;
use git2::{Delta, DiffOptions, Repository, Sort};

use crate::error::InputError;
use crate::history::{ChangeKind, CommitRecord, FileChange};

pub struct GitRepo {
    repo: Repository,
    root: PathBuf,
}

impl GitRepo {
    pub fn open(path: &Path) -> Result<Self, InputError> {
        let repo = Repository::discover(path)?;
        let root = repo
            .workdir()
            .ok_or_else(|| InputError::Invalid("bare repositories are not supported".into()))?
            .to_path_buf();
        Ok(Self { repo, root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Walk HEAD newest-first and emit one record per non-merge commit at
    /// or after `since` (Unix seconds).
    pub fn commit_records(&self, since: Option<i64>) -> Result<Vec<CommitRecord>, InputError> {
        let mut result = Vec::new();
        let mut revwalk = self.repo.revwalk()?;
        revwalk.push_head()?;
        revwalk.set_sorting(Sort::TIME)?;

        for oid in revwalk {
            let oid = oid?;
            let commit = self.repo.find_commit(oid)?;

            // Skip merge commits
            if commit.parent_count() > 1 {
                continue;
            }

            let time = commit.time();
            if let Some(since_ts) = since
                && time.seconds() < since_ts
            {
                continue;
            }

            let author = commit.author();
            let timestamp = DateTime::from_timestamp(time.seconds(), 0)
                .map(|t| t.to_rfc3339())
                .unwrap_or_default();

            result.push(CommitRecord {
                hash: oid.to_string(),
                author_name: author.name().unwrap_or_default().to_string(),
                author_email: author.email().unwrap_or_default().to_string(),
                timestamp,
                message: commit.summary().unwrap_or_default().to_string(),
                files: self.changed_files(&commit)?,
            });
        }

        Ok(result)
    }

    fn changed_files(&self, commit: &git2::Commit) -> Result<Vec<FileChange>, InputError> {
        let tree = commit.tree()?;
        let parent_tree = if commit.parent_count() > 0 {
            Some(commit.parent(0)?.tree()?)
        } else {
            None
        };

        let mut opts = DiffOptions::new();
        let mut diff =
            self.repo
                .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), Some(&mut opts))?;
        diff.find_similar(None)?;

        let mut files = Vec::new();
        for delta in diff.deltas() {
            let change = match delta.status() {
                Delta::Added => ChangeKind::Added,
                Delta::Deleted => ChangeKind::Deleted,
                Delta::Renamed => ChangeKind::Renamed,
                Delta::Copied => ChangeKind::Copied,
                _ => ChangeKind::Modified,
            };
            let file = match change {
                ChangeKind::Deleted => delta.old_file(),
                _ => delta.new_file(),
            };
            if let Some(path) = file.path().and_then(|p| p.to_str()) {
                files.push(FileChange {
                    path: path.replace('\\', "/"),
                    change,
                });
            }
        }
        Ok(files)
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
