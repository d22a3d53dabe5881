use super::*;

fn owners_of(file: &OwnershipFile, path: &str) -> Vec<String> {
    file.lookup(path)
        .first()
        .map(|r| r.owners.iter().map(|x| x.to_string()).collect())
        .unwrap_or_default()
}

#[test]
fn most_specific_wins() {
    let file = OwnershipFile::parse("* @a\nsrc/* @b\nsrc/api/users.ts @c\n", "repo");
    assert_eq!(owners_of(&file, "src/api/users.ts"), vec!["@c"]);
}

#[test]
fn directory_beats_extension() {
    let file = OwnershipFile::parse("*.js @js-team\nsrc/payments/ @finance-team\n", "repo");
    assert_eq!(owners_of(&file, "src/payments/charge.js"), vec!["@finance-team"]);
    assert_eq!(owners_of(&file, "src/web/app.js"), vec!["@js-team"]);
}

#[test]
fn order_of_lines_does_not_change_the_winner() {
    let file = OwnershipFile::parse("src/payments/ @finance-team\n*.js @js-team\n", "repo");
    assert_eq!(owners_of(&file, "src/payments/charge.js"), vec!["@finance-team"]);
}

#[test]
fn equal_specificity_later_line_wins() {
    let file = OwnershipFile::parse("*.rs @first\n*.rs @second\n", "repo");
    assert_eq!(owners_of(&file, "lib.rs"), vec!["@second"]);
}

#[test]
fn lookup_returns_all_matches_most_specific_first() {
    let file = OwnershipFile::parse("* @a\nsrc/* @b\nsrc/api/users.ts @c\n", "repo");
    let hits = file.lookup("src/api/users.ts");
    let specs: Vec<u32> = hits.iter().map(|r| r.specificity).collect();
    assert!(specs.windows(2).all(|w| w[0] >= w[1]), "got {specs:?}");
    // `src/*` is single-segment and does not reach src/api/users.ts
    assert_eq!(hits.len(), 2);
}

#[test]
fn global_owners_apply_when_nothing_else_matches() {
    let file = OwnershipFile::parse("@org/core\ndocs/ @writers\n", "repo");
    assert_eq!(owners_of(&file, "src/main.rs"), vec!["@org/core"]);
    assert_eq!(owners_of(&file, "docs/intro.md"), vec!["@writers"]);
    let hits = file.lookup("docs/intro.md");
    assert!(hits.last().unwrap().global);
}

#[test]
fn unowned_path() {
    let file = OwnershipFile::parse("docs/ @writers\n", "repo");
    assert!(file.lookup("src/main.rs").is_empty());
}

#[test]
fn coverage_empty_file() {
    assert_eq!(OwnershipFile::parse("", "repo").coverage(), 0);
}

#[test]
fn coverage_full_file_caps_at_100() {
    let text = "\
* @org/core
src/ @dev
config/ @ops
*.toml @ops
docs/ @writers
src/api/ @api
src/web/ @web
";
    let file = OwnershipFile::parse(text, "repo");
    // 30 root + 20 src + 15 config + 10 docs + min(25, 5*6)
    assert_eq!(file.coverage(), 100);
}

#[test]
fn coverage_partial() {
    let file = OwnershipFile::parse("src/ @dev\n", "repo");
    // source bonus + one specific rule
    assert_eq!(file.coverage(), 20 + 5);
}

#[test]
fn coverage_counts_global_declaration_as_root() {
    let file = OwnershipFile::parse("@org/core\n", "repo");
    assert_eq!(file.coverage(), 30);
}

#[test]
fn malformed_lines_are_reported_not_fatal() {
    let file = OwnershipFile::parse("src/ nobody\n*.rs @rust\n", "repo");
    assert_eq!(file.rules.len(), 1);
    assert_eq!(file.warnings.len(), 1);
}

#[test]
fn load_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("CODEOWNERS");
    std::fs::write(&path, "*.go @gophers\n").unwrap();
    let file = OwnershipFile::load(&path, "svc").unwrap();
    assert_eq!(file.rules.len(), 1);
    assert_eq!(file.rules[0].source_repo, "svc");
}

#[test]
fn run_on_file_with_lookups() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("CODEOWNERS");
    std::fs::write(&path, "* @org/core\nsrc/ @alice\n").unwrap();
    let paths = vec!["src/lib.rs".to_string()];
    assert!(run(&path, &paths, false).is_ok());
    assert!(run(&path, &paths, true).is_ok());
}

#[test]
fn run_on_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    assert!(run(&dir.path().join("missing"), &[], false).is_err());
}

mod properties {
    use super::super::parser::specificity;
    use proptest::prelude::*;

    fn segment() -> impl Strategy<Value = String> {
        "[a-z]{1,8}"
    }

    fn literal_path() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec(segment(), 1..6)
    }

    proptest! {
        #[test]
        fn literal_beats_single_star_generalization(
            segs in literal_path(),
            idx in any::<prop::sample::Index>(),
        ) {
            let literal = segs.join("/");
            let mut generalized = segs.clone();
            let i = idx.index(generalized.len());
            generalized[i] = "*".to_string();
            prop_assert!(specificity(&literal) > specificity(&generalized.join("/")));
        }

        #[test]
        fn literal_beats_double_star_tail(segs in literal_path(), keep in 0usize..5) {
            let literal = segs.join("/");
            let keep = keep.min(segs.len() - 1);
            let mut prefix: Vec<String> = segs[..keep].to_vec();
            prefix.push("**".to_string());
            prop_assert!(specificity(&literal) > specificity(&prefix.join("/")));
        }

        #[test]
        fn literal_beats_enclosing_directory(segs in literal_path()) {
            prop_assume!(segs.len() >= 2);
            let literal = segs.join("/");
            let dir = format!("{}/", segs[..segs.len() - 1].join("/"));
            prop_assert!(specificity(&literal) > specificity(&dir));
        }

        #[test]
        fn specificity_never_zero(pattern in "[a-z*/?.]{0,20}") {
            prop_assert!(specificity(&pattern) >= 1);
        }
    }
}
