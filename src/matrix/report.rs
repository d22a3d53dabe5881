use serde::Serialize;

use super::builder::{ExpertiseMatrix, Source};
use crate::report_helpers;
use crate::team::TeamMember;
use crate::util::round_to;

fn sources_text(sources: &std::collections::BTreeSet<Source>) -> String {
    sources
        .iter()
        .map(|s| match s {
            Source::Declared => "D",
            Source::Ownership => "O",
            Source::Commits => "C",
        })
        .collect()
}

pub fn print_report(matrix: &ExpertiseMatrix, members: &[TeamMember]) {
    let rows: Vec<(&TeamMember, &String, &super::ExpertiseEntry)> = members
        .iter()
        .flat_map(|m| {
            matrix
                .member_domains(&m.id)
                .into_iter()
                .flat_map(move |d| d.iter().map(move |(domain, e)| (m, domain, e)))
        })
        .collect();

    if rows.is_empty() {
        println!("No expertise found for any team member.");
    } else {
        let name_w = report_helpers::max_text_width(rows.iter().map(|r| r.0.display_name()), 6);
        let dom_w = report_helpers::max_text_width(rows.iter().map(|r| r.1.as_str()), 6);
        let separator = report_helpers::separator((name_w + dom_w + 36).max(78));

        println!("Expertise Matrix");
        println!("{separator}");
        println!(
            " {:<nw$}  {:<dw$}  {:>6} {:>6}  {:<4} {:>8}",
            "Member",
            "Domain",
            "Score",
            "Conf",
            "Src",
            "Commits",
            nw = name_w,
            dw = dom_w
        );
        println!("{separator}");
        for (m, domain, e) in &rows {
            println!(
                " {}  {}  {:>6.1} {:>6.0}  {:<4} {:>8}",
                report_helpers::pad_right(m.display_name(), name_w),
                report_helpers::pad_right(domain, dom_w),
                e.score,
                e.confidence,
                sources_text(&e.sources),
                e.domain_commits,
            );
        }
        println!("{separator}");
        println!(" Sources: D=declared O=ownership C=commits");
    }

    let rec = &matrix.reconciliation;
    println!();
    println!(
        "Authors: {} matched, {} not on the team, {} ambiguous",
        rec.matches.len(),
        matrix.unmatched_authors(),
        rec.ambiguous.len()
    );
    for m in rec.to_confirm() {
        println!(
            "  confirm: {} in {} matched {} by name",
            m.author, m.repo, m.member_id
        );
    }
    for a in &rec.ambiguous {
        println!(
            "  ambiguous: {} in {} could be {}",
            a.author,
            a.repo,
            a.candidates.join(", ")
        );
    }

    if !matrix.advisories.is_empty() {
        println!();
        println!("Advisories:");
        for a in &matrix.advisories {
            println!("  [{}] {}", a.kind.label(), a.message);
        }
    }
}

#[derive(Serialize)]
struct JsonEntry<'a> {
    member: &'a str,
    domain: &'a str,
    score: f64,
    confidence: f64,
    sources: &'a std::collections::BTreeSet<Source>,
    components: super::SourceScores,
    domain_commits: usize,
    recent_commits: usize,
}

#[derive(Serialize)]
struct JsonMatrix<'a> {
    entries: Vec<JsonEntry<'a>>,
    reconciliation: &'a super::Reconciliation,
    advisories: &'a [super::Advisory],
}

pub fn print_json(matrix: &ExpertiseMatrix) -> Result<(), Box<dyn std::error::Error>> {
    let entries = matrix
        .entries
        .iter()
        .flat_map(|(member, domains)| {
            domains.iter().map(move |(domain, e)| JsonEntry {
                member,
                domain,
                score: round_to(e.score, 1),
                confidence: round_to(e.confidence, 1),
                sources: &e.sources,
                components: e.components,
                domain_commits: e.domain_commits,
                recent_commits: e.recent_commits,
            })
        })
        .collect();
    report_helpers::print_json_stdout(&JsonMatrix {
        entries,
        reconciliation: &matrix.reconciliation,
        advisories: &matrix.advisories,
    })
}

#[cfg(test)]
#[path = "report_test.rs"]
mod tests;
