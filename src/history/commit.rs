//! Commit records as supplied by the caller (JSON or local git extraction),
//! and the validation that turns them into something safe to aggregate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    #[default]
    Modified,
    Deleted,
    Renamed,
    Copied,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FileChange {
    pub path: String,
    #[serde(default, alias = "changeKind", alias = "kind")]
    pub change: ChangeKind,
}

/// One commit as extracted from a repository log. Every field defaults so
/// that incomplete records deserialize and can be rejected individually
/// instead of failing the whole log.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(default)]
pub struct CommitRecord {
    pub hash: String,
    #[serde(alias = "authorName")]
    pub author_name: String,
    #[serde(alias = "authorEmail")]
    pub author_email: String,
    /// ISO-8601 / RFC 3339, or git's `--date=iso` form.
    pub timestamp: String,
    pub message: String,
    pub files: Vec<FileChange>,
}

/// A record that passed validation.
#[derive(Debug, Clone)]
pub struct ValidCommit<'a> {
    pub record: &'a CommitRecord,
    pub author_key: String,
    pub at: DateTime<Utc>,
}

/// Why a record was left out of aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DroppedRecord {
    pub hash: String,
    pub reason: String,
}

impl CommitRecord {
    /// Check required fields, normalize the author and parse the timestamp.
    pub fn validate(&self) -> Result<ValidCommit<'_>, String> {
        if self.hash.trim().is_empty() {
            return Err("missing hash".to_string());
        }
        let author_key = normalize_author(&self.author_name, &self.author_email);
        if author_key.is_empty() {
            return Err("missing author".to_string());
        }
        let at = parse_timestamp(&self.timestamp)
            .ok_or_else(|| format!("unparseable timestamp {:?}", self.timestamp))?;
        Ok(ValidCommit {
            record: self,
            author_key,
            at,
        })
    }
}

/// Accepts RFC 3339 (`2024-05-01T10:00:00Z`) and git's ISO-like output
/// (`2024-05-01 10:00:00 +0200`).
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc3339(s)
        .or_else(|_| DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S %z"))
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

/// Normalized author identity: the lowercased email when one is present,
/// otherwise a name-derived key (lowercase words joined by `-`). Empty when
/// neither is usable.
pub fn normalize_author(name: &str, email: &str) -> String {
    let email = email.trim();
    if email.contains('@') && email.len() > 1 {
        return email.to_lowercase();
    }
    normalize_name(name)
}

/// Lowercase, keep alphanumerics, join words with `-`.
pub fn normalize_name(name: &str) -> String {
    name.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}

/// Keyword multipliers in tenths, checked in order; first hit wins.
const SIZE_KEYWORDS: &[(&str, u64)] = &[("refactor", 20), ("rewrite", 20), ("fix", 5), ("typo", 1)];

/// Estimated lines changed, in tenths of a line: `10 × files`, scaled ×2 for
/// refactor/rewrite, ×0.5 for fix, ×0.1 for typo. Kept integral so that
/// summing is exact and independent of commit order.
pub fn estimate_lines_tenths(file_count: usize, message: &str) -> u64 {
    let msg = message.to_lowercase();
    let multiplier = SIZE_KEYWORDS
        .iter()
        .find(|(kw, _)| msg.contains(kw))
        .map(|(_, m)| *m)
        .unwrap_or(10);
    10 * file_count as u64 * multiplier
}

#[cfg(test)]
#[path = "commit_test.rs"]
mod tests;
