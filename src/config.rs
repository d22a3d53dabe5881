//! Tunable parameters for the engine, loaded from an optional TOML file.
//!
//! Every keyword list and numeric weight the heuristics use lives here so
//! teams can retune them without a rebuild. A missing file means defaults;
//! a present but unreadable or malformed file is an error.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{InputError, read_to_string};

/// File looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "ownmap.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub history: HistoryConfig,
    pub matrix: MatrixConfig,
    pub scoring: ScoringConfig,
    pub domains: DomainConfig,
    pub effort: EffortConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Rolling window, in days, that counts a commit as "recent".
    pub recent_window_days: i64,
    /// Contributors with fewer commits are dropped from the final result.
    pub min_commits: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            recent_window_days: 182,
            min_commits: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatrixConfig {
    pub declared_weight: f64,
    pub ownership_weight: f64,
    pub commit_weight: f64,
    /// Score assigned to a self-declared domain.
    pub declared_base: f64,
    /// Minimum score for someone to count as an expert in gap analysis.
    pub expert_floor: f64,
    /// Lead over the runner-up that makes the top expert "dominant".
    pub dominance_gap: f64,
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self {
            declared_weight: 0.3,
            ownership_weight: 0.4,
            commit_weight: 0.3,
            declared_base: 70.0,
            expert_floor: 30.0,
            dominance_gap: 30.0,
        }
    }
}

/// Weights of the five candidate factors. Normalized to sum to 1.0 on load.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactorWeights {
    pub expertise: f64,
    pub capacity: f64,
    pub workload: f64,
    pub history: f64,
    pub collaboration: f64,
}

impl Default for FactorWeights {
    fn default() -> Self {
        Self {
            expertise: 0.40,
            capacity: 0.25,
            workload: 0.20,
            history: 0.10,
            collaboration: 0.05,
        }
    }
}

impl FactorWeights {
    fn all(&self) -> [f64; 5] {
        [
            self.expertise,
            self.capacity,
            self.workload,
            self.history,
            self.collaboration,
        ]
    }

    pub fn validate(&self) -> Result<(), String> {
        if let Some(w) = self.all().iter().find(|w| !w.is_finite() || **w < 0.0) {
            return Err(format!("weight {w} is not a non-negative number"));
        }
        if self.all().iter().sum::<f64>() <= 0.0 {
            return Err("weights sum to zero".to_string());
        }
        Ok(())
    }

    /// Rescale so the weights sum to exactly 1.0. Call after `validate`.
    pub fn normalize(&mut self) {
        let sum: f64 = self.all().iter().sum();
        if sum > 0.0 {
            self.expertise /= sum;
            self.capacity /= sum;
            self.workload /= sum;
            self.history /= sum;
            self.collaboration /= sum;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub weights: FactorWeights,
    /// Candidates at or below this combined score are excluded.
    pub min_score: f64,
    /// Fraction of weekly capacity kept free as a safety buffer.
    pub safety_buffer: f64,
    /// Assignments below this confidence are flagged for manual review.
    pub confidence_threshold: f64,
    /// Minimum expertise score (0-100) a candidate needs in at least one
    /// required domain to be gathered at all.
    pub min_required_skill: f64,
    /// Ranked alternatives kept on each assignment.
    pub max_alternatives: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: FactorWeights::default(),
            min_score: 0.2,
            safety_buffer: 0.10,
            confidence_threshold: 0.8,
            min_required_skill: 0.0,
            max_alternatives: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DomainConfig {
    /// Domain name -> whole-word keywords that imply it.
    pub vocabulary: BTreeMap<String, Vec<String>>,
}

impl Default for DomainConfig {
    fn default() -> Self {
        let table: &[(&str, &[&str])] = &[
            (
                "frontend",
                &["frontend", "ui", "ux", "react", "vue", "angular", "css", "html", "component"],
            ),
            ("backend", &["backend", "server", "service", "microservice"]),
            ("api", &["api", "endpoint", "rest", "graphql", "grpc"]),
            (
                "database",
                &["database", "db", "sql", "postgres", "mysql", "migration", "schema", "query"],
            ),
            ("mobile", &["mobile", "ios", "android", "swift", "kotlin"]),
            (
                "devops",
                &["devops", "deploy", "deployment", "ci", "cd", "docker", "kubernetes", "pipeline", "infrastructure", "terraform"],
            ),
            ("testing", &["test", "tests", "testing", "qa", "e2e", "coverage"]),
            (
                "security",
                &["security", "auth", "authentication", "authorization", "vulnerability", "encryption", "xss", "csrf"],
            ),
            ("documentation", &["docs", "documentation", "readme", "guide"]),
            ("performance", &["performance", "latency", "optimize", "profiling", "cache"]),
            ("data", &["analytics", "etl", "pipeline", "ml", "model"]),
        ];
        let vocabulary = table
            .iter()
            .map(|(domain, words)| {
                (
                    domain.to_string(),
                    words.iter().map(|w| w.to_string()).collect(),
                )
            })
            .collect();
        Self { vocabulary }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EffortConfig {
    /// Hours assumed when neither an estimate nor a sizing label is present.
    pub default_hours: f64,
    /// Label text (case-insensitive) -> estimated hours.
    pub labels: BTreeMap<String, f64>,
}

impl Default for EffortConfig {
    fn default() -> Self {
        let labels = [
            ("size:xs", 2.0),
            ("size:s", 4.0),
            ("size:m", 8.0),
            ("size:l", 16.0),
            ("size:xl", 32.0),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
        Self {
            default_hours: 8.0,
            labels,
        }
    }
}

impl Config {
    /// Load from an explicit path, or from `ownmap.toml` in the working
    /// directory when present, or fall back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, InputError> {
        match path {
            Some(p) => Self::from_file(p),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.is_file() {
                    Self::from_file(fallback)
                } else {
                    debug!("no {DEFAULT_CONFIG_FILE} found, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, InputError> {
        let contents = read_to_string(path)?;
        let config = Self::parse(&contents).map_err(|e| InputError::toml(path, e))?;
        debug!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        let mut config: Config = toml::from_str(contents)?;
        config.sanitize();
        Ok(config)
    }

    /// Repair out-of-range values in place so downstream scoring stays total.
    fn sanitize(&mut self) {
        if let Err(e) = self.scoring.weights.validate() {
            warn!("invalid scoring weights ({e}), using defaults");
            self.scoring.weights = FactorWeights::default();
        }
        self.scoring.weights.normalize();

        let m = &mut self.matrix;
        let source_sum = m.declared_weight + m.ownership_weight + m.commit_weight;
        let sources_valid = [m.declared_weight, m.ownership_weight, m.commit_weight]
            .iter()
            .all(|w| w.is_finite() && *w >= 0.0);
        if !sources_valid || source_sum <= 0.0 {
            warn!("invalid matrix source weights, using defaults");
            let d = MatrixConfig::default();
            m.declared_weight = d.declared_weight;
            m.ownership_weight = d.ownership_weight;
            m.commit_weight = d.commit_weight;
        }

        let s = &mut self.scoring;
        s.min_score = clamp_unit(s.min_score);
        s.safety_buffer = clamp_unit(s.safety_buffer);
        s.confidence_threshold = clamp_unit(s.confidence_threshold);
        s.min_required_skill = s.min_required_skill.clamp(0.0, 100.0);

        self.history.recent_window_days = self.history.recent_window_days.max(1);
        self.domains.vocabulary = std::mem::take(&mut self.domains.vocabulary)
            .into_iter()
            .map(|(domain, words)| {
                let words = words.into_iter().map(|w| w.to_lowercase()).collect();
                (crate::team::normalize_domain(&domain), words)
            })
            .collect();
        self.effort.labels = std::mem::take(&mut self.effort.labels)
            .into_iter()
            .map(|(label, hours)| (label.to_lowercase(), hours.max(0.0)))
            .collect();
        if !self.effort.default_hours.is_finite() || self.effort.default_hours < 0.0 {
            self.effort.default_hours = EffortConfig::default().default_hours;
        }
    }
}

fn clamp_unit(v: f64) -> f64 {
    if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
