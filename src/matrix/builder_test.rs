use super::*;
use crate::config::HistoryConfig;
use crate::history::commit::{ChangeKind, CommitRecord, FileChange};
use crate::history::analyze;
use crate::owners::OwnershipFile;
use chrono::{Duration, TimeZone, Utc};

fn now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()
}

fn member(id: &str, email: &str, teams: &[&str], expertise: &[&str]) -> TeamMember {
    TeamMember {
        id: id.to_string(),
        name: id.to_string(),
        email: Some(email.to_string()),
        teams: teams.iter().map(|t| t.to_string()).collect(),
        expertise: expertise.iter().map(|t| t.to_string()).collect(),
        capacity_hours: 40.0,
        ..TeamMember::default()
    }
}

fn commits(email: &str, n: usize, days_ago: i64, path: &str) -> Vec<CommitRecord> {
    (0..n)
        .map(|i| CommitRecord {
            hash: format!("{email}-{path}-{i}"),
            author_name: "x".to_string(),
            author_email: email.to_string(),
            timestamp: (now() - Duration::days(days_ago)).to_rfc3339(),
            message: "work".to_string(),
            files: vec![FileChange {
                path: path.to_string(),
                change: ChangeKind::Modified,
            }],
        })
        .collect()
}

fn repo(name: &str, records: &[CommitRecord], codeowners: Option<&str>) -> RepoAnalysis {
    RepoAnalysis {
        name: name.to_string(),
        history: analyze(name, records, &HistoryConfig::default(), now()),
        owners: codeowners.map(|text| OwnershipFile::parse(text, name)),
    }
}

fn team() -> Vec<TeamMember> {
    vec![
        member("alice", "alice@corp.io", &["acme/web"], &["Frontend"]),
        member("bob", "bob@corp.io", &[], &[]),
    ]
}

#[test]
fn declared_only_entry() {
    let m = build(&team(), &[], &MatrixConfig::default());
    let e = m.entry("alice", "frontend").unwrap();
    assert_eq!(e.sources, BTreeSet::from([Source::Declared]));
    assert!((e.score - 21.0).abs() < 1e-9);
    // 50 + 15 - 20 (no commit activity)
    assert!((e.confidence - 45.0).abs() < 1e-9);
    assert!(m.member_domains("bob").unwrap().is_empty());
}

#[test]
fn ownership_rules_feed_domains() {
    let r = repo(
        "web",
        &[],
        Some("*.js @acme/web\nsrc/payments/ @bob bob@corp.io\n"),
    );
    let m = build(&team(), &[r], &MatrixConfig::default());

    let js = m.entry("alice", "javascript").unwrap();
    assert!(js.sources.contains(&Source::Ownership));
    let ownership = js.components.ownership.unwrap();
    assert!(ownership > 0.0 && ownership <= 100.0);
    assert!((js.score - 0.4 * ownership).abs() < 1e-9);

    let pay = m.entry("bob", "payments").unwrap();
    assert_eq!(pay.sources, BTreeSet::from([Source::Ownership]));
    assert!(m.entry("alice", "payments").is_none());
}

#[test]
fn commit_history_feeds_languages_and_directories() {
    let r = repo("svc", &commits("alice@corp.io", 10, 3, "svc/api/main.go"), None);
    let m = build(&team(), &[r], &MatrixConfig::default());

    let go = m.entry("alice", "golang").unwrap();
    assert_eq!(go.sources, BTreeSet::from([Source::Commits]));
    assert_eq!(go.domain_commits, 10);
    assert_eq!(go.recent_commits, 10);
    // 50 + 15 + 20 (all recent)
    assert!((go.confidence - 85.0).abs() < 1e-9);
    assert!(m.entry("alice", "api").is_some());
    assert!(m.entry("alice", "svc").is_some());
}

#[test]
fn unmatched_authors_never_enter_the_matrix() {
    let mut records = commits("alice@corp.io", 2, 3, "a.rs");
    records.extend(commits("stranger@else.io", 50, 1, "a.rs"));
    let r = repo("core", &records, None);
    let m = build(&team(), &[r], &MatrixConfig::default());

    assert!(!m.entries.contains_key("stranger@else.io"));
    assert_eq!(m.unmatched_authors(), 1);
    let rust = m.entry("alice", "rust").unwrap();
    assert_eq!(rust.domain_commits, 2);
}

#[test]
fn sources_combine_across_repositories() {
    let web = repo("web", &commits("alice@corp.io", 4, 10, "ui/app.js"), None);
    let lib = repo(
        "lib",
        &commits("alice@corp.io", 6, 400, "lib/util.js"),
        Some("*.js @alice\n"),
    );
    let mut members = team();
    members[0].expertise.push("javascript".to_string());
    let m = build(&members, &[web, lib], &MatrixConfig::default());

    let js = m.entry("alice", "javascript").unwrap();
    assert_eq!(js.sources.len(), 3);
    assert_eq!(js.domain_commits, 10);
    assert_eq!(js.recent_commits, 4);
    // 50 + 45 + 20 * 0.4
    assert!((js.confidence - 100.0).abs() < 1e-9);
    assert!(js.score <= 100.0);
}

#[test]
fn gap_checks() {
    let m = build(&team(), &[], &MatrixConfig::default());
    // Declared-only scores 21, under the default floor of 30
    assert!(m.is_gap("frontend"));
    assert!(m.is_gap("security"));
    assert!(m.experts("security").is_empty());
}

#[test]
fn entry_confidence_bounds() {
    assert_eq!(entry_confidence(0, 0, 0), 30.0);
    assert_eq!(entry_confidence(3, 10, 10), 100.0);
    assert_eq!(entry_confidence(1, 10, 0), 65.0);
}

#[test]
fn owns_by_user_email_and_team() {
    let members = team();
    let alice = &members[0];
    let f = OwnershipFile::parse(
        "a/ @alice\nb/ alice@corp.io\nc/ @acme/web\nd/ @acme/other\n",
        "r",
    );
    let owned: Vec<bool> = f.rules.iter().map(|r| owns(alice, r)).collect();
    assert_eq!(owned, vec![true, true, true, false]);
}
