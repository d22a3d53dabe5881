//! Pattern compilation for ownership rules.
//!
//! `*` matches within a single path segment, `**` spans any depth, literal
//! dots are literal. A leading `/` anchors the pattern at the repository
//! root; a pattern with no inner `/` floats and may match at any depth.
//! Directory-only patterns (trailing `/`) and plain literal paths also
//! match everything beneath them.

use globset::{Glob, GlobBuilder, GlobSet, GlobSetBuilder};

fn glob(pattern: &str) -> Result<Glob, globset::Error> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .backslash_escape(true)
        .build()
}

fn has_wildcard(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}

pub fn compile(pattern: &str) -> Result<GlobSet, globset::Error> {
    let anchored = pattern.starts_with('/');
    let dir_only = pattern.ends_with('/');
    let core = pattern.trim_start_matches('/').trim_end_matches('/');
    let core = if core.is_empty() { "**" } else { core };

    let base = if !anchored && !core.contains('/') && core != "**" {
        format!("**/{core}")
    } else {
        core.to_string()
    };

    let mut builder = GlobSetBuilder::new();
    builder.add(glob(&base)?);
    if (dir_only || !has_wildcard(core)) && !base.ends_with("**") {
        builder.add(glob(&format!("{base}/**"))?);
    }
    builder.build()
}

/// Strip `./` and leading `/` so lookups use repository-relative paths.
pub fn normalize_path(path: &str) -> &str {
    let mut p = path.trim();
    while let Some(rest) = p.strip_prefix("./") {
        p = rest;
    }
    p.trim_start_matches('/')
}

#[cfg(test)]
#[path = "matcher_test.rs"]
mod tests;
