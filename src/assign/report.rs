use serde::Serialize;

use super::record::{Assignment, Decision, FactorBreakdown, Unassignable};
use super::summary::RunSummary;
use crate::report_helpers;
use crate::util::round_to;

fn factors_text(f: &FactorBreakdown) -> String {
    format!(
        "exp {:.2} cap {:.2} load {:.2} hist {:.2} collab {:.2}",
        f.expertise, f.capacity, f.workload, f.history, f.collaboration
    )
}

fn flags_text(a: &Assignment) -> String {
    a.flags.iter().map(|f| f.label()).collect::<Vec<_>>().join(", ")
}

fn print_assigned(rows: &[&Assignment]) {
    let item_w = report_helpers::max_text_width(rows.iter().map(|a| a.work_item_id.as_str()), 4);
    let who_w = report_helpers::max_text_width(rows.iter().map(|a| a.assignee_id.as_str()), 8);
    let separator = report_helpers::separator((item_w + who_w + 48).max(78));

    println!("Assignments");
    println!("{separator}");
    println!(
        " {:<iw$}  {:<8}  {:<ww$}  {:>5} {:>5}  {:<6}  Flags",
        "Item",
        "Priority",
        "Assignee",
        "Score",
        "Conf",
        "Risk",
        iw = item_w,
        ww = who_w
    );
    println!("{separator}");
    for a in rows {
        println!(
            " {}  {:<8}  {}  {:>5.2} {:>5.2}  {:<6}  {}",
            report_helpers::pad_right(&a.work_item_id, item_w),
            a.priority.label(),
            report_helpers::pad_right(&a.assignee_id, who_w),
            a.score,
            a.confidence,
            a.risk_level.label(),
            flags_text(a),
        );
        println!("   {}", factors_text(&a.factors));
        if !a.alternatives.is_empty() {
            let alts: Vec<String> = a
                .alternatives
                .iter()
                .map(|c| format!("{} ({:.2})", c.member_id, c.score))
                .collect();
            println!("   alternatives: {}", alts.join(", "));
        }
    }
    println!("{separator}");
}

fn print_unassignable(rows: &[&Unassignable]) {
    println!();
    println!("Unassignable:");
    for u in rows {
        println!("  {} [{}] {}: {}", u.work_item_id, u.priority.label(), u.reason, u.detail);
        for s in &u.suggestions {
            println!("    - {s}");
        }
    }
}

fn print_summary(summary: &RunSummary) {
    let c = &summary.confidence;
    println!();
    println!(
        "{} items: {} assigned, {} unassignable",
        summary.total, summary.assigned, summary.unassignable
    );
    println!(
        "Confidence: {} high, {} medium, {} low, {} manual review",
        c.high, c.medium, c.low, c.manual_review
    );
    println!(
        "Flagged for review: {}   Over capacity: {}   Workload CV: {:.2}",
        summary.flagged_for_review, summary.over_capacity, summary.workload_cv
    );
    let loads: Vec<String> = summary
        .per_member
        .iter()
        .filter(|(_, n)| **n > 0)
        .map(|(m, n)| format!("{m}={n}"))
        .collect();
    if !loads.is_empty() {
        println!("Per member: {}", loads.join(" "));
    }
}

/// `logged` is the number of records appended, or `None` on a dry run.
pub fn print_report(decisions: &[Decision], summary: &RunSummary, logged: Option<usize>) {
    let assigned: Vec<&Assignment> = decisions.iter().filter_map(Decision::assignment).collect();
    let unassignable: Vec<&Unassignable> = decisions
        .iter()
        .filter_map(|d| match d {
            Decision::Unassignable(u) => Some(u),
            Decision::Assigned(_) => None,
        })
        .collect();

    if decisions.is_empty() {
        println!("No work items to assign.");
        return;
    }
    if !assigned.is_empty() {
        print_assigned(&assigned);
    }
    if !unassignable.is_empty() {
        print_unassignable(&unassignable);
    }
    print_summary(summary);
    match logged {
        Some(n) => println!("Logged {n} new assignment(s)."),
        None => println!("Dry run: nothing logged."),
    }
}

#[derive(Serialize)]
struct JsonRun<'a> {
    decisions: Vec<Decision>,
    summary: &'a RunSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    logged: Option<usize>,
}

fn rounded(d: &Decision) -> Decision {
    let mut d = d.clone();
    if let Decision::Assigned(a) = &mut d {
        a.score = round_to(a.score, 3);
        a.confidence = round_to(a.confidence, 3);
        for c in &mut a.alternatives {
            c.score = round_to(c.score, 3);
        }
    }
    d
}

pub fn print_json(
    decisions: &[Decision],
    summary: &RunSummary,
    logged: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    report_helpers::print_json_stdout(&JsonRun {
        decisions: decisions.iter().map(rounded).collect(),
        summary,
        logged,
    })
}

#[cfg(test)]
#[path = "report_test.rs"]
mod tests;
