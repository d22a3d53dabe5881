//! Team roster and work item inputs, plus the domain vocabulary and
//! effort heuristics used to interpret them.

pub mod domain;
pub mod work_item;

use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{InputError, read_to_string};
pub use domain::{infer_domains, normalize_all, normalize_domain};
pub use work_item::{Priority, TaskProfile, WorkItem, estimate_hours};

/// A person who can receive work.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamMember {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    /// Code-host handle without `@`. Defaults to `id`.
    pub handle: Option<String>,
    /// Teams as written in ownership files, e.g. `org/platform`.
    pub teams: Vec<String>,
    #[serde(alias = "declared_expertise", alias = "declaredExpertise")]
    pub expertise: Vec<String>,
    #[serde(alias = "capacityHoursPerWeek", alias = "capacity_hours_per_week")]
    pub capacity_hours: f64,
    #[serde(alias = "committedHours")]
    pub committed_hours: f64,
    #[serde(alias = "currentAssignments")]
    pub current_assignments: Vec<String>,
    pub timezone: Option<String>,
    pub role: Option<String>,
}

impl TeamMember {
    pub fn handle(&self) -> &str {
        self.handle.as_deref().unwrap_or(&self.id)
    }

    pub fn declared_domains(&self) -> BTreeSet<String> {
        normalize_all(&self.expertise)
    }

    /// Hours left this week before any new assignment.
    pub fn available_hours(&self) -> f64 {
        (self.capacity_hours - self.committed_hours).max(0.0)
    }

    pub fn display_name(&self) -> &str {
        if self.name.is_empty() { &self.id } else { &self.name }
    }

    /// Trim and lowercase identity fields, strip `@` from handles and
    /// teams, and repair impossible hour values.
    fn normalize(&mut self) {
        self.id = self.id.trim().to_string();
        self.handle = self
            .handle
            .take()
            .map(|h| h.trim().trim_start_matches('@').to_lowercase())
            .filter(|h| !h.is_empty());
        self.email = self
            .email
            .take()
            .map(|e| e.trim().to_lowercase())
            .filter(|e| !e.is_empty());
        self.teams = self
            .teams
            .iter()
            .map(|t| t.trim().trim_start_matches('@').to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        if !self.capacity_hours.is_finite() || self.capacity_hours < 0.0 {
            self.capacity_hours = 0.0;
        }
        if !self.committed_hours.is_finite() || self.committed_hours < 0.0 {
            self.committed_hours = 0.0;
        }
    }
}

#[derive(Deserialize)]
struct TomlRoster {
    #[serde(default, rename = "member")]
    members: Vec<TeamMember>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonList<T> {
    Bare(Vec<T>),
    Members { members: Vec<T> },
    Items { items: Vec<T> },
}

impl<T> JsonList<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            JsonList::Bare(v) | JsonList::Members { members: v } | JsonList::Items { items: v } => v,
        }
    }
}

fn is_toml(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("toml"))
}

fn check_ids<'a>(kind: &str, ids: impl Iterator<Item = &'a str>) -> Result<(), InputError> {
    let mut seen = HashSet::new();
    for id in ids {
        if id.is_empty() {
            return Err(InputError::Invalid(format!("{kind} with an empty id")));
        }
        if !seen.insert(id) {
            return Err(InputError::Invalid(format!("duplicate {kind} id {id:?}")));
        }
    }
    Ok(())
}

/// Load a roster from TOML (`[[member]]` tables) or JSON (an array, or an
/// object with a `members` array).
pub fn load_roster(path: &Path) -> Result<Vec<TeamMember>, InputError> {
    let text = read_to_string(path)?;
    let mut members = if is_toml(path) {
        toml::from_str::<TomlRoster>(&text)
            .map_err(|e| InputError::toml(path, e))?
            .members
    } else {
        serde_json::from_str::<JsonList<TeamMember>>(&text)
            .map_err(|e| InputError::json(path, e))?
            .into_vec()
    };
    members.iter_mut().for_each(TeamMember::normalize);
    check_ids("team member", members.iter().map(|m| m.id.as_str()))?;
    Ok(members)
}

/// Load work items from JSON (an array, or an object with an `items`
/// array).
pub fn load_work_items(path: &Path) -> Result<Vec<WorkItem>, InputError> {
    let text = read_to_string(path)?;
    let mut items = serde_json::from_str::<JsonList<WorkItem>>(&text)
        .map_err(|e| InputError::json(path, e))?
        .into_vec();
    for item in &mut items {
        item.id = item.id.trim().to_string();
    }
    check_ids("work item", items.iter().map(|i| i.id.as_str()))?;
    Ok(items)
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
