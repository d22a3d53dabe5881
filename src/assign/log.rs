//! Append-only JSON Lines log of assignment decisions.
//!
//! Records are keyed by id. Reading merges lines by id with the last line
//! winning, so an outcome update appended later supersedes the original.
//! Appending skips ids already present, which makes re-running the same
//! plan idempotent.

use std::collections::{HashMap, HashSet};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::record::{Assignment, Outcome};
use crate::error::InputError;

pub struct AssignmentLog {
    path: PathBuf,
}

/// Parse log text. Returns merged records in first-seen order and the
/// number of malformed lines skipped.
pub fn parse_lines(text: &str) -> (Vec<Assignment>, usize) {
    let mut records: Vec<Assignment> = Vec::new();
    let mut position: HashMap<String, usize> = HashMap::new();
    let mut skipped = 0;

    for (n, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<Assignment>(line) {
            Ok(record) => match position.get(&record.id) {
                Some(&i) => records[i] = record,
                None => {
                    position.insert(record.id.clone(), records.len());
                    records.push(record);
                }
            },
            Err(e) => {
                warn!("assignment log line {}: {e}, skipping", n + 1);
                skipped += 1;
            }
        }
    }
    (records, skipped)
}

impl AssignmentLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file is an empty log.
    pub fn load(&self) -> Result<Vec<Assignment>, InputError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(t) => t,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("no assignment log at {}", self.path.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(InputError::io(&self.path, e)),
        };
        Ok(parse_lines(&text).0)
    }

    fn write_lines(&self, records: &[&Assignment]) -> Result<(), InputError> {
        let mut buf = String::new();
        for r in records {
            let line = serde_json::to_string(r).map_err(|e| InputError::json(&self.path, e))?;
            buf.push_str(&line);
            buf.push('\n');
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| InputError::io(&self.path, e))?;
        file.write_all(buf.as_bytes())
            .and_then(|_| file.flush())
            .and_then(|_| file.sync_all())
            .map_err(|e| InputError::io(&self.path, e))
    }

    /// Append records whose ids are not yet in the log. Returns how many
    /// were written.
    pub fn append(&self, records: &[Assignment]) -> Result<usize, InputError> {
        let existing: HashSet<String> = self.load()?.into_iter().map(|r| r.id).collect();
        let mut seen = HashSet::new();
        let fresh: Vec<&Assignment> = records
            .iter()
            .filter(|r| !existing.contains(&r.id) && seen.insert(r.id.as_str()))
            .collect();
        if fresh.is_empty() {
            return Ok(0);
        }
        self.write_lines(&fresh)?;
        debug!("appended {} records to {}", fresh.len(), self.path.display());
        Ok(fresh.len())
    }

    /// Attach an outcome to a logged assignment by appending an updated
    /// copy of it.
    pub fn record_outcome(
        &self,
        id: &str,
        completed: bool,
        quality: u8,
        now: DateTime<Utc>,
    ) -> Result<Assignment, InputError> {
        if !(1..=5).contains(&quality) {
            return Err(InputError::Invalid(format!(
                "quality must be between 1 and 5, got {quality}"
            )));
        }
        let mut record = self
            .load()?
            .into_iter()
            .find(|r| r.id == id)
            .ok_or_else(|| {
                InputError::Invalid(format!(
                    "no assignment {id:?} in {}",
                    self.path.display()
                ))
            })?;
        record.outcome = Some(Outcome {
            completed,
            quality,
            recorded_at: now,
        });
        self.write_lines(&[&record])?;
        Ok(record)
    }
}

#[cfg(test)]
#[path = "log_test.rs"]
mod tests;
