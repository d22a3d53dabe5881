use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::domain::{infer_domains, normalize_all};
use crate::config::{DomainConfig, EffortConfig};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Critical,
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub fn label(&self) -> &'static str {
        match self {
            Priority::Critical => "critical",
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }

    /// Processing order: lower runs first.
    pub fn sort_key(&self) -> u8 {
        match self {
            Priority::Critical => 0,
            Priority::High => 1,
            Priority::Medium => 2,
            Priority::Low => 3,
        }
    }
}

/// A unit of work to be assigned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkItem {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(alias = "requiredDomains")]
    pub required_domains: Option<Vec<String>>,
    #[serde(alias = "preferredDomains")]
    pub preferred_domains: Option<Vec<String>>,
    #[serde(alias = "estimatedHours")]
    pub estimated_hours: Option<f64>,
    pub priority: Priority,
    pub collaborators: Vec<String>,
    pub labels: Vec<String>,
    pub repository: Option<String>,
}

/// What the engine needs from a work item once domains and effort are
/// resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskProfile {
    pub required: BTreeSet<String>,
    pub preferred: BTreeSet<String>,
    pub hours: f64,
    /// Required domains came from keyword scanning, not the item itself.
    pub inferred: bool,
}

impl TaskProfile {
    pub fn all_domains(&self) -> BTreeSet<String> {
        self.required.union(&self.preferred).cloned().collect()
    }
}

impl WorkItem {
    /// Resolve domains and effort. Explicit lists win. Without required
    /// domains, keywords in title and description supply them; without
    /// preferred domains, keyword hits not already required become
    /// preferred.
    pub fn profile(&self, domains: &DomainConfig, effort: &EffortConfig) -> TaskProfile {
        let text = format!("{} {}", self.title, self.description);
        let scanned = infer_domains(&text, domains);

        let (required, inferred) = match &self.required_domains {
            Some(list) => (normalize_all(list), false),
            None => (scanned.clone(), true),
        };
        let preferred = match &self.preferred_domains {
            Some(list) => normalize_all(list),
            None => scanned,
        };
        let preferred = preferred.difference(&required).cloned().collect();

        TaskProfile {
            required,
            preferred,
            hours: estimate_hours(self, effort),
            inferred,
        }
    }
}

/// Explicit estimate, else the largest hours among sizing labels, else
/// the configured default.
pub fn estimate_hours(item: &WorkItem, effort: &EffortConfig) -> f64 {
    if let Some(h) = item.estimated_hours.filter(|h| h.is_finite() && *h >= 0.0) {
        return h;
    }
    item.labels
        .iter()
        .filter_map(|l| effort.labels.get(&l.trim().to_lowercase()))
        .copied()
        .reduce(f64::max)
        .unwrap_or(effort.default_hours)
}

#[cfg(test)]
#[path = "work_item_test.rs"]
mod tests;
