//! Ownership rules: CODEOWNERS-compatible parsing, most-specific-wins
//! lookup, and an advisory coverage estimate.

mod matcher;
pub mod parser;
mod report;

use std::error::Error;
use std::path::Path;

use serde::Serialize;

use crate::error::read_to_string;
pub use parser::{OwnerKind, OwnerRef, OwnershipRule, ParseWarning};
use report::{LookupRow, print_json, print_report};

/// A parsed ownership file for one repository.
#[derive(Debug, Clone, Serialize)]
pub struct OwnershipFile {
    pub source_repo: String,
    pub rules: Vec<OwnershipRule>,
    /// Global owner declarations: apply to every path at specificity 0.
    pub global: Vec<OwnershipRule>,
    pub warnings: Vec<ParseWarning>,
}

impl OwnershipFile {
    /// Parse ownership text. Never fails: malformed lines become warnings.
    pub fn parse(text: &str, source_repo: &str) -> Self {
        let parsed = parser::parse(text, source_repo);
        Self {
            source_repo: source_repo.to_string(),
            rules: parsed.rules,
            global: parsed.global,
            warnings: parsed.warnings,
        }
    }

    pub fn load(path: &Path, source_repo: &str) -> Result<Self, crate::error::InputError> {
        Ok(Self::parse(&read_to_string(path)?, source_repo))
    }

    /// Every rule matching `path`, most specific first. Equal specificity
    /// is broken by file order, later lines first, the same way the
    /// ownership-file format lets a later line override an earlier one.
    /// Global declarations come last.
    pub fn lookup(&self, path: &str) -> Vec<&OwnershipRule> {
        let mut hits: Vec<&OwnershipRule> =
            self.rules.iter().filter(|r| r.is_match(path)).collect();
        hits.sort_by(|a, b| {
            b.specificity
                .cmp(&a.specificity)
                .then_with(|| b.line.cmp(&a.line))
        });
        hits.extend(self.global.iter().rev());
        hits
    }

    /// Explicit and global rules together.
    pub fn all_rules(&self) -> impl Iterator<Item = &OwnershipRule> {
        self.rules.iter().chain(self.global.iter())
    }

    /// Heuristic 0-100 coverage estimate. Advisory only.
    pub fn coverage(&self) -> u32 {
        let mut score = 0;
        if !self.global.is_empty() || self.rules.iter().any(|r| is_root_pattern(&r.pattern)) {
            score += 30;
        }
        if self.rules.iter().any(|r| is_source_pattern(&r.pattern)) {
            score += 20;
        }
        if self.rules.iter().any(|r| is_config_pattern(&r.pattern)) {
            score += 15;
        }
        if self.rules.iter().any(|r| is_docs_pattern(&r.pattern)) {
            score += 10;
        }
        let specific = self
            .rules
            .iter()
            .filter(|r| !is_root_pattern(&r.pattern))
            .count() as u32;
        score += (5 * specific).min(25);
        score.min(100)
    }
}

const SOURCE_DIRS: &[&str] = &["src", "lib", "app", "pkg", "cmd", "internal", "source"];
const CONFIG_EXTS: &[&str] = &["json", "yml", "yaml", "toml", "ini", "cfg", "conf", "env"];
const DOC_DIRS: &[&str] = &["docs", "doc", "documentation"];
const DOC_EXTS: &[&str] = &["md", "rst", "adoc", "txt"];

fn segments(pattern: &str) -> impl Iterator<Item = String> + '_ {
    pattern
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|s| s.to_lowercase())
}

fn is_root_pattern(pattern: &str) -> bool {
    matches!(pattern, "*" | "/*" | "**" | "/**" | "/" | "**/*")
}

fn is_source_pattern(pattern: &str) -> bool {
    segments(pattern)
        .find(|s| !s.contains('*'))
        .is_some_and(|s| SOURCE_DIRS.contains(&s.as_str()))
}

fn is_config_pattern(pattern: &str) -> bool {
    let ext_hit = parser::extension(pattern)
        .is_some_and(|e| CONFIG_EXTS.contains(&e.to_lowercase().as_str()));
    ext_hit || segments(pattern).any(|s| s.contains("config") || s == ".github")
}

fn is_docs_pattern(pattern: &str) -> bool {
    let ext_hit =
        parser::extension(pattern).is_some_and(|e| DOC_EXTS.contains(&e.to_lowercase().as_str()));
    ext_hit || segments(pattern).any(|s| DOC_DIRS.contains(&s.as_str()) || s.starts_with("readme"))
}

/// Parse an ownership file, report its rules and coverage, and resolve
/// owners for each of `paths`.
pub fn run(file: &Path, paths: &[String], json: bool) -> Result<(), Box<dyn Error>> {
    let repo = file
        .parent()
        .and_then(|p| p.file_name())
        .and_then(|n| n.to_str())
        .unwrap_or("repo");
    let owners = OwnershipFile::load(file, repo)?;

    let lookups: Vec<LookupRow> = paths
        .iter()
        .map(|p| {
            let hit = owners.lookup(p).into_iter().next();
            LookupRow {
                path: p.clone(),
                pattern: hit.map(|r| r.pattern.clone()),
                owners: hit
                    .map(|r| r.owners.iter().map(|o| o.to_string()).collect())
                    .unwrap_or_default(),
                specificity: hit.map(|r| r.specificity),
            }
        })
        .collect();

    if json {
        print_json(&owners, &lookups)
    } else {
        print_report(&owners, &lookups);
        Ok(())
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
