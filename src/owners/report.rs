use serde::Serialize;

use super::OwnershipFile;
use crate::report_helpers;

/// Resolved owner for one requested path.
#[derive(Serialize)]
pub struct LookupRow {
    pub path: String,
    pub pattern: Option<String>,
    pub owners: Vec<String>,
    pub specificity: Option<u32>,
}

fn owners_text(owners: &[super::OwnerRef]) -> String {
    owners
        .iter()
        .map(|o| o.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn print_report(file: &OwnershipFile, lookups: &[LookupRow]) {
    if file.rules.is_empty() && file.global.is_empty() {
        println!("No ownership rules found.");
    } else {
        let pat_w = report_helpers::max_text_width(file.all_rules().map(|r| r.pattern.as_str()), 7);
        let separator = report_helpers::separator((pat_w + 40).max(78));

        println!("Ownership Rules — {}", file.source_repo);
        println!("{separator}");
        println!(
            " {:>5}  {:<pw$}  {:>5} {:>5}  Owners",
            "Line",
            "Pattern",
            "Spec",
            "Conf",
            pw = pat_w
        );
        println!("{separator}");
        for r in file.all_rules() {
            let pattern = if r.global {
                format!("{} (global)", r.pattern)
            } else {
                r.pattern.clone()
            };
            println!(
                " {:>5}  {}  {:>5} {:>5}  {}",
                r.line,
                report_helpers::pad_right(&pattern, pat_w),
                r.specificity,
                r.confidence,
                owners_text(&r.owners),
            );
        }
        println!("{separator}");
        println!(" Coverage estimate: {}/100 (advisory)", file.coverage());
    }

    if !file.warnings.is_empty() {
        println!();
        println!("Dropped lines: {}", file.warnings.len());
        for w in &file.warnings {
            println!("  line {}: {} ({})", w.line, w.text, w.reason);
        }
    }

    if !lookups.is_empty() {
        println!();
        println!("Resolved owners:");
        for l in lookups {
            match &l.pattern {
                Some(p) => println!("  {} -> {} (via {p})", l.path, l.owners.join(" ")),
                None => println!("  {} -> (unowned)", l.path),
            }
        }
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    source_repo: &'a str,
    coverage: u32,
    rules: Vec<&'a super::OwnershipRule>,
    warnings: &'a [super::ParseWarning],
    lookups: &'a [LookupRow],
}

pub fn print_json(
    file: &OwnershipFile,
    lookups: &[LookupRow],
) -> Result<(), Box<dyn std::error::Error>> {
    report_helpers::print_json_stdout(&JsonReport {
        source_repo: &file.source_repo,
        coverage: file.coverage(),
        rules: file.all_rules().collect(),
        warnings: &file.warnings,
        lookups,
    })
}

#[cfg(test)]
#[path = "report_test.rs"]
mod tests;
