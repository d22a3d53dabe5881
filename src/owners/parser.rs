//! CODEOWNERS-style ownership file parsing.
//!
//! One rule per non-blank, non-comment line: `pattern owner [owner...]`.
//! Each rule gets a specificity (used to resolve overlapping rules,
//! most-specific wins) and a confidence. A line whose first token carries
//! no path (no `/` and no `*`) is a global owner declaration that applies
//! to every path at specificity 0. Malformed lines never abort parsing:
//! they are dropped and reported as warnings.

use std::collections::BTreeSet;
use std::fmt;

use globset::GlobSet;
use serde::Serialize;
use tracing::warn;

use super::matcher;
use crate::history::language::language_for_extension;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OwnerKind {
    User,
    Team,
    Email,
}

/// A single owner reference. Identifiers are stored lowercased and
/// without the leading `@` (`@org/team` -> `org/team`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct OwnerRef {
    pub kind: OwnerKind,
    pub identifier: String,
}

impl OwnerRef {
    /// Parse one owner token. Returns `None` for tokens that are not
    /// owners at all (no `@`).
    pub fn parse(token: &str) -> Option<Self> {
        let token = token.trim();
        if let Some(rest) = token.strip_prefix('@') {
            if rest.is_empty() {
                return None;
            }
            let kind = match rest.split_once('/') {
                Some((org, team)) if !org.is_empty() && !team.is_empty() => OwnerKind::Team,
                Some(_) => return None,
                None => OwnerKind::User,
            };
            return Some(Self {
                kind,
                identifier: rest.to_lowercase(),
            });
        }
        match token.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Some(Self {
                kind: OwnerKind::Email,
                identifier: token.to_lowercase(),
            }),
            _ => None,
        }
    }
}

impl fmt::Display for OwnerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            OwnerKind::User | OwnerKind::Team => write!(f, "@{}", self.identifier),
            OwnerKind::Email => f.write_str(&self.identifier),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OwnershipRule {
    pub pattern: String,
    pub owners: Vec<OwnerRef>,
    pub specificity: u32,
    /// 0-100.
    pub confidence: u32,
    pub source_repo: String,
    /// 1-based line in the ownership file.
    pub line: usize,
    /// True for a global owner declaration (applies to every path).
    pub global: bool,
    #[serde(skip)]
    pub(crate) matcher: Option<GlobSet>,
}

impl OwnershipRule {
    pub fn is_match(&self, path: &str) -> bool {
        if self.global {
            return true;
        }
        self.matcher
            .as_ref()
            .is_some_and(|m| m.is_match(matcher::normalize_path(path)))
    }

    /// Skill-domain tokens this rule speaks for: the language and raw
    /// extension of a file-type pattern, plus its literal directory
    /// segments. Global declarations carry no tokens.
    pub fn domain_tokens(&self) -> BTreeSet<String> {
        let mut tokens = BTreeSet::new();
        if self.global {
            return tokens;
        }
        let dir_only = self.pattern.ends_with('/');
        let segments: Vec<&str> = self.pattern.split('/').filter(|s| !s.is_empty()).collect();

        if let Some(ext) = extension(&self.pattern) {
            tokens.insert(ext.to_lowercase());
            if let Some(lang) = language_for_extension(ext) {
                tokens.insert(lang.to_string());
            }
        }

        let dir_count = if dir_only || extension(&self.pattern).is_none() {
            segments.len()
        } else {
            segments.len().saturating_sub(1)
        };
        for seg in &segments[..dir_count] {
            if !seg.contains(['*', '?', '[']) {
                tokens.insert(seg.to_lowercase());
            }
        }
        tokens
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ParseWarning {
    pub line: usize,
    pub text: String,
    pub reason: String,
}

/// Count wildcard tokens: `**`, `*` and `?` each count once.
pub fn wildcard_count(pattern: &str) -> usize {
    let bytes = pattern.as_bytes();
    let mut count = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'*' => {
                count += 1;
                i += if bytes.get(i + 1) == Some(&b'*') { 2 } else { 1 };
            }
            b'?' => {
                count += 1;
                i += 1;
            }
            _ => i += 1,
        }
    }
    count
}

/// Explicit file extension of the last path segment, if any. Hidden
/// names (`.github`) and directory-only patterns have none.
pub fn extension(pattern: &str) -> Option<&str> {
    if pattern.ends_with('/') {
        return None;
    }
    let last = pattern.rsplit('/').next()?;
    let dot = last.rfind('.')?;
    if dot == 0 {
        return None;
    }
    let ext = &last[dot + 1..];
    (!ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric())).then_some(ext)
}

/// `10 × segments − 5 × wildcards + 15 (extension) + 5 (trailing /)`,
/// plus 20 for plain literal paths, floored at 1.
pub fn specificity(pattern: &str) -> u32 {
    let dir_only = pattern.ends_with('/');
    let segments = pattern.split('/').filter(|s| !s.is_empty()).count() as i64;
    let wildcards = wildcard_count(pattern) as i64;

    let mut score = 10 * segments - 5 * wildcards;
    if extension(pattern).is_some() {
        score += 15;
    }
    if dir_only {
        score += 5;
    }
    if wildcards == 0 && !dir_only {
        score += 20;
    }
    score.max(1) as u32
}

/// `50 + min(30, 10 × owners) + min(20, 2 × specificity) + 10 (team owner)`,
/// capped at 100.
pub fn confidence(owners: &[OwnerRef], specificity: u32) -> u32 {
    let owner_bonus = (10 * owners.len() as u32).min(30);
    let spec_bonus = specificity.saturating_mul(2).min(20);
    let team_bonus = if owners.iter().any(|o| o.kind == OwnerKind::Team) {
        10
    } else {
        0
    };
    (50 + owner_bonus + spec_bonus + team_bonus).min(100)
}

fn is_path_token(token: &str) -> bool {
    token.contains('/') || token.contains('*')
}

/// Drop everything from the first token that starts a `#` comment.
fn strip_comment(line: &str) -> &str {
    let mut prev_ws = true;
    for (i, c) in line.char_indices() {
        if c == '#' && prev_ws {
            return &line[..i];
        }
        prev_ws = c.is_whitespace();
    }
    line
}

pub(super) struct Parsed {
    pub rules: Vec<OwnershipRule>,
    pub global: Vec<OwnershipRule>,
    pub warnings: Vec<ParseWarning>,
}

pub(super) fn parse(text: &str, source_repo: &str) -> Parsed {
    let mut rules = Vec::new();
    let mut global = Vec::new();
    let mut warnings = Vec::new();

    let mut warn_line = |line: usize, raw: &str, reason: String| {
        warn!("{source_repo}: ownership line {line} dropped: {reason}");
        warnings.push(ParseWarning {
            line,
            text: raw.trim().to_string(),
            reason,
        });
    };

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let content = strip_comment(raw).trim();
        if content.is_empty() {
            continue;
        }
        let tokens: Vec<&str> = content.split_whitespace().collect();
        let first = tokens[0];

        let (pattern, owner_tokens) = if is_path_token(first) {
            (Some(first), &tokens[1..])
        } else if OwnerRef::parse(first).is_some() {
            (None, &tokens[..])
        } else {
            (None, &tokens[1..])
        };

        let mut owners: Vec<OwnerRef> = Vec::new();
        for tok in owner_tokens {
            match OwnerRef::parse(tok) {
                Some(o) if !owners.contains(&o) => owners.push(o),
                Some(_) => {}
                None => warn!("{source_repo}: line {line_no}: ignoring non-owner token {tok:?}"),
            }
        }
        if owners.is_empty() {
            warn_line(line_no, raw, "no owners".to_string());
            continue;
        }

        match pattern {
            None => {
                let confidence = confidence(&owners, 0);
                global.push(OwnershipRule {
                    pattern: first.to_string(),
                    owners,
                    specificity: 0,
                    confidence,
                    source_repo: source_repo.to_string(),
                    line: line_no,
                    global: true,
                    matcher: None,
                });
            }
            Some(p) => {
                let compiled = match matcher::compile(p) {
                    Ok(m) => m,
                    Err(e) => {
                        warn_line(line_no, raw, format!("invalid pattern {p:?}: {e}"));
                        continue;
                    }
                };
                let specificity = specificity(p);
                rules.push(OwnershipRule {
                    pattern: p.to_string(),
                    confidence: confidence(&owners, specificity),
                    owners,
                    specificity,
                    source_repo: source_repo.to_string(),
                    line: line_no,
                    global: false,
                    matcher: Some(compiled),
                });
            }
        }
    }

    Parsed {
        rules,
        global,
        warnings,
    }
}

#[cfg(test)]
#[path = "parser_test.rs"]
mod tests;
