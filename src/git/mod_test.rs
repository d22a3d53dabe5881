use super::*;
use std::fs;

fn is_git_repo(path: &Path) -> bool {
    Repository::discover(path).is_ok()
}

fn create_test_repo() -> (tempfile::TempDir, Repository) {
    let dir = tempfile::tempdir().unwrap();
    let repo = Repository::init(dir.path()).unwrap();

    // Configure identity for commits
    let mut config = repo.config().unwrap();
    config.set_str("user.name", "Test").unwrap();
    config.set_str("user.email", "test@test.com").unwrap();

    (dir, repo)
}

fn commit_as(
    repo: &Repository,
    author: (&str, &str),
    files: &[(&str, Option<&str>)],
    message: &str,
    epoch: i64,
) -> git2::Oid {
    let sig = git2::Signature::new(author.0, author.1, &git2::Time::new(epoch, 0)).unwrap();
    let mut index = repo.index().unwrap();

    for (path, content) in files {
        let full_path = repo.workdir().unwrap().join(path);
        match content {
            Some(content) => {
                if let Some(parent) = full_path.parent() {
                    fs::create_dir_all(parent).unwrap();
                }
                fs::write(&full_path, content).unwrap();
                index.add_path(Path::new(path)).unwrap();
            }
            None => {
                fs::remove_file(&full_path).unwrap();
                index.remove_path(Path::new(path)).unwrap();
            }
        }
    }

    index.write().unwrap();
    let tree_oid = index.write_tree().unwrap();
    let tree = repo.find_tree(tree_oid).unwrap();

    let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
    let parents: Vec<&git2::Commit> = parent.iter().collect();

    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
        .unwrap()
}

fn make_commit_at(repo: &Repository, files: &[(&str, &str)], message: &str, epoch: i64) -> git2::Oid {
    let files: Vec<(&str, Option<&str>)> = files.iter().map(|(p, c)| (*p, Some(*c))).collect();
    commit_as(repo, ("Test", "test@test.com"), &files, message, epoch)
}

#[test]
fn test_open_repo() {
    let (dir, _repo) = create_test_repo();
    let git_repo = GitRepo::open(dir.path()).unwrap();
    assert!(is_git_repo(dir.path()));
    assert_eq!(
        git_repo.root().canonicalize().unwrap(),
        dir.path().canonicalize().unwrap()
    );
}

#[test]
fn test_open_not_repo() {
    let dir = tempfile::tempdir().unwrap();
    // Don't init git — just a plain directory
    let sub = dir.path().join("not_a_repo");
    fs::create_dir_all(&sub).unwrap();
    assert!(GitRepo::open(&sub).is_err());
    assert!(!is_git_repo(&sub));
}

#[test]
fn test_commit_records() {
    let (dir, repo) = create_test_repo();

    make_commit_at(&repo, &[("src/a.rs", "fn a() {}")], "add a", 1_700_000_000);
    commit_as(
        &repo,
        ("Alice", "alice@x.io"),
        &[("src/a.rs", Some("fn a() { 1 }")), ("b.go", Some("package b"))],
        "refactor a\n\nlong body",
        1_700_001_000,
    );

    let git_repo = GitRepo::open(dir.path()).unwrap();
    let records = git_repo.commit_records(None).unwrap();
    assert_eq!(records.len(), 2);

    // Newest first
    let latest = &records[0];
    assert_eq!(latest.author_name, "Alice");
    assert_eq!(latest.author_email, "alice@x.io");
    assert_eq!(latest.message, "refactor a");
    assert_eq!(latest.hash.len(), 40);
    assert!(latest.validate().is_ok());

    let a = latest.files.iter().find(|f| f.path == "src/a.rs").unwrap();
    assert_eq!(a.change, ChangeKind::Modified);
    let b = latest.files.iter().find(|f| f.path == "b.go").unwrap();
    assert_eq!(b.change, ChangeKind::Added);

    assert_eq!(records[1].files[0].change, ChangeKind::Added);
}

#[test]
fn test_commit_records_deleted_file() {
    let (dir, repo) = create_test_repo();
    make_commit_at(&repo, &[("gone.rs", "x")], "add", 1_700_000_000);
    commit_as(
        &repo,
        ("Test", "test@test.com"),
        &[("gone.rs", None)],
        "remove",
        1_700_000_100,
    );

    let git_repo = GitRepo::open(dir.path()).unwrap();
    let records = git_repo.commit_records(None).unwrap();
    assert_eq!(records[0].files.len(), 1);
    assert_eq!(records[0].files[0].path, "gone.rs");
    assert_eq!(records[0].files[0].change, ChangeKind::Deleted);
}

#[test]
fn test_commit_records_since() {
    let (dir, repo) = create_test_repo();

    make_commit_at(&repo, &[("a.rs", "v1")], "first", 1_000_000);
    make_commit_at(&repo, &[("b.rs", "v1")], "second", 2_000_000);

    let git_repo = GitRepo::open(dir.path()).unwrap();
    // Filter: only commits at or after 1_500_000 → only the second commit
    let records = git_repo.commit_records(Some(1_500_000)).unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].message, "second");
    assert_eq!(records[0].files[0].path, "b.rs");
}

#[test]
fn test_timestamps_are_rfc3339_utc() {
    let (dir, repo) = create_test_repo();
    make_commit_at(&repo, &[("a.rs", "v1")], "first", 1_700_000_000);

    let git_repo = GitRepo::open(dir.path()).unwrap();
    let records = git_repo.commit_records(None).unwrap();
    assert_eq!(records[0].timestamp, "2023-11-14T22:13:20+00:00");
}

#[test]
fn test_empty_repo() {
    let (dir, _repo) = create_test_repo();
    let git_repo = GitRepo::open(dir.path()).unwrap();

    // Empty repo has no HEAD, revwalk.push_head() will fail
    let records = git_repo.commit_records(None);
    assert!(records.is_err() || records.unwrap().is_empty());
}
