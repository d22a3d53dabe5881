use std::collections::BTreeSet;

use crate::config::DomainConfig;

/// Common short forms mapped to the canonical domain name.
const ALIASES: &[(&str, &str)] = &[
    ("go", "golang"),
    ("js", "javascript"),
    ("ts", "typescript"),
    ("py", "python"),
    ("k8s", "kubernetes"),
];

/// Canonical form of a domain name: trimmed, lowercase, inner whitespace
/// and underscores collapsed to `-`, then aliased.
pub fn normalize_domain(raw: &str) -> String {
    let joined = raw
        .trim()
        .to_lowercase()
        .split(|c: char| c.is_whitespace() || c == '_')
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    match ALIASES.iter().find(|(alias, _)| *alias == joined) {
        Some((_, canonical)) => canonical.to_string(),
        None => joined,
    }
}

/// Normalize a list of domain names, dropping empties and duplicates.
pub fn normalize_all<'a>(raw: impl IntoIterator<Item = &'a String>) -> BTreeSet<String> {
    raw.into_iter()
        .map(|d| normalize_domain(d))
        .filter(|d| !d.is_empty())
        .collect()
}

fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .collect()
}

/// Domains whose keywords appear in `text` as whole words. Multi-word
/// keywords must appear as a contiguous run of words.
pub fn infer_domains(text: &str, vocabulary: &DomainConfig) -> BTreeSet<String> {
    let tokens = words(text);
    vocabulary
        .vocabulary
        .iter()
        .filter(|(_, keywords)| {
            keywords.iter().any(|kw| {
                let kw = words(kw);
                !kw.is_empty() && tokens.windows(kw.len()).any(|w| w == kw.as_slice())
            })
        })
        .map(|(domain, _)| domain.clone())
        .collect()
}

#[cfg(test)]
#[path = "domain_test.rs"]
mod tests;
