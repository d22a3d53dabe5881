use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::team::Priority;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Flag {
    ManualReviewRecommended,
    OverCapacity,
    CoverageGap,
    InferredDomains,
}

impl Flag {
    pub fn label(&self) -> &'static str {
        match self {
            Flag::ManualReviewRecommended => "manual review",
            Flag::OverCapacity => "over capacity",
            Flag::CoverageGap => "coverage gap",
            Flag::InferredDomains => "inferred domains",
        }
    }
}

/// The five suitability factors, each in [0, 1].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FactorBreakdown {
    pub expertise: f64,
    pub capacity: f64,
    pub workload: f64,
    pub history: f64,
    pub collaboration: f64,
}

/// One candidate's suitability for one work item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateScore {
    pub member_id: String,
    pub score: f64,
    pub factors: FactorBreakdown,
    #[serde(default)]
    pub over_capacity: bool,
    /// Required domains the candidate has no entry for.
    #[serde(default)]
    pub missing_required: Vec<String>,
    /// Distinct evidence sources behind the candidate's matching entries.
    #[serde(default)]
    pub sources: usize,
}

/// What happened after the work was done.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub completed: bool,
    /// 1 (poor) to 5 (excellent).
    pub quality: u8,
    pub recorded_at: DateTime<Utc>,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        self.completed && self.quality >= 4
    }
}

/// A committed assignment decision. Immutable once written; outcome
/// updates are appended as a new copy with the same id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: String,
    pub work_item_id: String,
    pub assignee_id: String,
    pub confidence: f64,
    pub risk_level: RiskLevel,
    pub score: f64,
    pub factors: FactorBreakdown,
    #[serde(default)]
    pub alternatives: Vec<CandidateScore>,
    #[serde(default)]
    pub domains: Vec<String>,
    #[serde(default)]
    pub collaborators: Vec<String>,
    #[serde(default)]
    pub flags: Vec<Flag>,
    #[serde(default)]
    pub estimated_hours: f64,
    #[serde(default)]
    pub priority: Priority,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub outcome: Option<Outcome>,
}

impl Assignment {
    pub fn make_id(work_item_id: &str, assignee_id: &str) -> String {
        format!("{work_item_id}@{assignee_id}")
    }

    pub fn has_flag(&self, flag: Flag) -> bool {
        self.flags.contains(&flag)
    }
}

/// A work item no candidate could take.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Unassignable {
    pub work_item_id: String,
    pub reason: &'static str,
    pub detail: String,
    pub suggestions: Vec<String>,
    pub domains: Vec<String>,
    pub priority: Priority,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Decision {
    Assigned(Assignment),
    Unassignable(Unassignable),
}

impl Decision {
    pub fn assignment(&self) -> Option<&Assignment> {
        match self {
            Decision::Assigned(a) => Some(a),
            Decision::Unassignable(_) => None,
        }
    }
}
