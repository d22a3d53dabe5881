use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{debug, warn};

use crate::history::{Contributor, ContributorStats};
use crate::history::commit::normalize_name;
use crate::team::TeamMember;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
    /// Commit email equals the member's declared email.
    Email,
    /// Commit email local part equals the member's handle.
    Handle,
    /// Normalized author name equals the member's normalized name.
    Name,
}

impl MatchMethod {
    pub fn label(&self) -> &'static str {
        match self {
            MatchMethod::Email => "email",
            MatchMethod::Handle => "handle",
            MatchMethod::Name => "name",
        }
    }

    /// Name matches are the weakest signal and want a human to confirm.
    pub fn needs_confirmation(&self) -> bool {
        matches!(self, MatchMethod::Name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthorMatch {
    pub repo: String,
    pub author: String,
    pub member_id: String,
    pub method: MatchMethod,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AmbiguousAuthor {
    pub repo: String,
    pub author: String,
    pub candidates: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnmatchedAuthor {
    pub repo: String,
    pub author: String,
    pub commits: usize,
}

/// How every commit author of every repository maps to team members.
/// Unmatched and ambiguous authors contribute nothing to the matrix.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Reconciliation {
    pub matches: Vec<AuthorMatch>,
    pub ambiguous: Vec<AmbiguousAuthor>,
    pub unmatched: Vec<UnmatchedAuthor>,
}

impl Reconciliation {
    pub fn member_for(&self, repo: &str, author: &str) -> Option<&str> {
        self.matches
            .iter()
            .find(|m| m.repo == repo && m.author == author)
            .map(|m| m.member_id.as_str())
    }

    pub fn to_confirm(&self) -> impl Iterator<Item = &AuthorMatch> {
        self.matches.iter().filter(|m| m.method.needs_confirmation())
    }
}

/// Local part of an address, with GitHub's `12345+` noreply prefix removed.
fn local_part(email: &str) -> Option<&str> {
    let (local, _) = email.split_once('@')?;
    let local = match local.split_once('+') {
        Some((id, rest)) if id.chars().all(|c| c.is_ascii_digit()) => rest,
        _ => local,
    };
    (!local.is_empty()).then_some(local)
}

enum Outcome<'a> {
    One(&'a TeamMember),
    Many(Vec<&'a TeamMember>),
    None,
}

fn pick<'a>(members: &'a [TeamMember], pred: impl Fn(&TeamMember) -> bool) -> Outcome<'a> {
    let hits: Vec<&TeamMember> = members.iter().filter(|m| pred(*m)).collect();
    match hits.len() {
        0 => Outcome::None,
        1 => Outcome::One(hits[0]),
        _ => Outcome::Many(hits),
    }
}

/// Resolve one contributor, trying each method in order of strength.
fn resolve<'a>(members: &'a [TeamMember], c: &Contributor) -> (Outcome<'a>, MatchMethod) {
    let by_email = pick(members, |m| {
        m.email.as_ref().is_some_and(|e| c.emails.contains(e))
    });
    if !matches!(by_email, Outcome::None) {
        return (by_email, MatchMethod::Email);
    }

    let locals: BTreeSet<String> = c
        .emails
        .iter()
        .filter_map(|e| local_part(e))
        .map(|l| l.to_lowercase())
        .collect();
    let by_handle = pick(members, |m| locals.contains(&m.handle().to_lowercase()));
    if !matches!(by_handle, Outcome::None) {
        return (by_handle, MatchMethod::Handle);
    }

    let names: BTreeSet<String> = c
        .names
        .iter()
        .map(|n| normalize_name(n))
        .filter(|n| !n.is_empty())
        .collect();
    let by_name = pick(members, |m| {
        let name = normalize_name(&m.name);
        !name.is_empty() && names.contains(&name)
    });
    (by_name, MatchMethod::Name)
}

/// Map every contributor of every repository to at most one member.
pub fn reconcile<'a>(
    members: &[TeamMember],
    repos: impl IntoIterator<Item = (&'a str, &'a [ContributorStats])>,
) -> Reconciliation {
    let mut out = Reconciliation::default();
    for (repo, contributors) in repos {
        for stats in contributors {
            let c = &stats.contributor;
            match resolve(members, c) {
                (Outcome::One(m), method) => {
                    if method.needs_confirmation() {
                        warn!(repo, author = %c.key, member = %m.id, "author matched by name only, confirm manually");
                    } else {
                        debug!(repo, author = %c.key, member = %m.id, method = method.label(), "author matched");
                    }
                    out.matches.push(AuthorMatch {
                        repo: repo.to_string(),
                        author: c.key.clone(),
                        member_id: m.id.clone(),
                        method,
                    });
                }
                (Outcome::Many(ms), method) => {
                    let candidates: Vec<String> = ms.iter().map(|m| m.id.clone()).collect();
                    warn!(repo, author = %c.key, method = method.label(), ?candidates, "ambiguous author, excluded");
                    out.ambiguous.push(AmbiguousAuthor {
                        repo: repo.to_string(),
                        author: c.key.clone(),
                        candidates,
                    });
                }
                (Outcome::None, _) => {
                    debug!(repo, author = %c.key, "author is not a team member");
                    out.unmatched.push(UnmatchedAuthor {
                        repo: repo.to_string(),
                        author: c.key.clone(),
                        commits: c.total_commits,
                    });
                }
            }
        }
    }
    out
}

#[cfg(test)]
#[path = "reconcile_test.rs"]
mod tests;
