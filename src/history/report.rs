use serde::Serialize;

use super::analyzer::{ContributorStats, FileExperts, HistoryReport};
use crate::report_helpers;
use crate::util::round_to;

fn top_languages(c: &ContributorStats, n: usize) -> String {
    let mut langs: Vec<(&String, &usize)> = c.contributor.languages.iter().collect();
    langs.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    langs
        .iter()
        .take(n)
        .map(|(l, _)| l.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

pub fn print_report(reports: &[HistoryReport], top: usize) {
    if reports.is_empty() {
        println!("No repositories analyzed.");
        return;
    }

    for (i, report) in reports.iter().enumerate() {
        if i > 0 {
            println!();
        }
        print_repo(report, top);
    }
}

fn print_repo(report: &HistoryReport, top: usize) {
    let contributors = &report.contributors[..report.contributors.len().min(top)];
    let name_w = report_helpers::max_text_width(
        contributors.iter().map(|c| c.contributor.display_name()),
        11,
    );
    // name + commits(7) + recent(7) + lines(8) + expert(7) + recency(8) + langs(~20)
    let separator = report_helpers::separator((name_w + 62).max(78));

    println!(
        "Commit History — {} ({} commits, {} dropped)",
        report.repo,
        report.commits_analyzed,
        report.dropped.len()
    );
    println!("{separator}");
    println!(
        " {:<nw$}  {:>7} {:>7} {:>8} {:>7} {:>8}  Languages",
        "Contributor",
        "Commits",
        "Recent",
        "Lines",
        "Expert",
        "Recency",
        nw = name_w
    );
    println!("{separator}");

    if contributors.is_empty() {
        println!(" (no contributors)");
    }
    for c in contributors {
        println!(
            " {}  {:>7} {:>7} {:>8.0} {:>7.1} {:>8.0}  {}",
            report_helpers::pad_right(c.contributor.display_name(), name_w),
            c.contributor.total_commits,
            c.contributor.recent_commits,
            c.contributor.lines_changed(),
            c.scores.expertise,
            c.scores.recency,
            top_languages(c, 3),
        );
    }
    println!("{separator}");

    if report.below_threshold > 0 {
        println!(
            " {} contributor(s) below the minimum commit threshold omitted",
            report.below_threshold
        );
    }
    if report.contributors.len() > contributors.len() {
        println!(
            " Showing {} of {} contributors",
            contributors.len(),
            report.contributors.len()
        );
    }

    let files = busiest_files(&report.file_experts, top);
    if !files.is_empty() {
        println!();
        println!("File experts (most contested first):");
        for f in files {
            let experts: Vec<String> = f
                .experts
                .iter()
                .take(3)
                .map(|e| format!("{} ({} commits, conf {:.0})", e.author, e.commits, e.confidence))
                .collect();
            println!("  {}: {}", f.path, experts.join(", "));
        }
    }
}

/// Files touched by the most contributors, then by total commits.
fn busiest_files(files: &[FileExperts], top: usize) -> Vec<&FileExperts> {
    let mut sorted: Vec<&FileExperts> = files.iter().collect();
    sorted.sort_by_key(|f| {
        let commits: usize = f.experts.iter().map(|e| e.commits).sum();
        (std::cmp::Reverse(f.experts.len()), std::cmp::Reverse(commits))
    });
    sorted.truncate(top);
    sorted
}

#[derive(Serialize)]
struct JsonContributor<'a> {
    key: &'a str,
    names: Vec<&'a str>,
    total_commits: usize,
    recent_commits: usize,
    lines_changed: f64,
    languages: &'a std::collections::BTreeMap<String, usize>,
    directories: &'a std::collections::BTreeMap<String, usize>,
    recency_ratio: f64,
    consistency: f64,
    expertise: f64,
    recency: f64,
}

#[derive(Serialize)]
struct JsonRepo<'a> {
    repo: &'a str,
    analyzed_at: String,
    window_days: i64,
    commits_analyzed: usize,
    dropped: &'a [super::commit::DroppedRecord],
    below_threshold: usize,
    contributors: Vec<JsonContributor<'a>>,
    file_experts: Vec<&'a FileExperts>,
}

pub fn print_json(reports: &[HistoryReport], top: usize) -> Result<(), Box<dyn std::error::Error>> {
    let repos: Vec<JsonRepo> = reports
        .iter()
        .map(|r| JsonRepo {
            repo: &r.repo,
            analyzed_at: r.analyzed_at.to_rfc3339(),
            window_days: r.window_days,
            commits_analyzed: r.commits_analyzed,
            dropped: &r.dropped,
            below_threshold: r.below_threshold,
            contributors: r
                .contributors
                .iter()
                .take(top)
                .map(|c| JsonContributor {
                    key: &c.contributor.key,
                    names: c.contributor.names.iter().map(|n| n.as_str()).collect(),
                    total_commits: c.contributor.total_commits,
                    recent_commits: c.contributor.recent_commits,
                    lines_changed: round_to(c.contributor.lines_changed(), 1),
                    languages: &c.contributor.languages,
                    directories: &c.contributor.directories,
                    recency_ratio: round_to(c.scores.recency_ratio, 3),
                    consistency: round_to(c.scores.consistency, 1),
                    expertise: round_to(c.scores.expertise, 1),
                    recency: c.scores.recency,
                })
                .collect(),
            file_experts: busiest_files(&r.file_experts, top),
        })
        .collect();
    report_helpers::print_json_stdout(&repos)
}

#[cfg(test)]
#[path = "report_test.rs"]
mod tests;
