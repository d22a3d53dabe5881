use std::path::Path;

/// Language tag -> file extensions. Tags double as skill domains, so they
/// use the names people declare (`golang`, not `go`).
const LANGUAGES: &[(&str, &[&str])] = &[
    ("rust", &["rs"]),
    ("golang", &["go"]),
    ("javascript", &["js", "jsx", "mjs", "cjs"]),
    ("typescript", &["ts", "tsx", "mts", "cts"]),
    ("python", &["py", "pyi"]),
    ("java", &["java"]),
    ("kotlin", &["kt", "kts"]),
    ("swift", &["swift"]),
    ("objective-c", &["m", "mm"]),
    ("ruby", &["rb"]),
    ("php", &["php"]),
    ("csharp", &["cs"]),
    ("c", &["c", "h"]),
    ("cpp", &["cc", "cpp", "cxx", "hpp", "hh", "hxx"]),
    ("scala", &["scala"]),
    ("elixir", &["ex", "exs"]),
    ("erlang", &["erl", "hrl"]),
    ("haskell", &["hs"]),
    ("dart", &["dart"]),
    ("lua", &["lua"]),
    ("shell", &["sh", "bash", "zsh"]),
    ("sql", &["sql"]),
    ("css", &["css", "scss", "sass", "less"]),
    ("html", &["html", "htm"]),
    ("vue", &["vue"]),
    ("svelte", &["svelte"]),
    ("markdown", &["md", "markdown"]),
    ("yaml", &["yml", "yaml"]),
    ("toml", &["toml"]),
    ("json", &["json"]),
    ("terraform", &["tf", "tfvars"]),
    ("protobuf", &["proto"]),
];

/// Well-known file names without a telling extension.
const FILENAMES: &[(&str, &str)] = &[
    ("Dockerfile", "docker"),
    ("Makefile", "make"),
    ("Jenkinsfile", "jenkins"),
    ("Gemfile", "ruby"),
    ("Rakefile", "ruby"),
    ("go.mod", "golang"),
    ("Cargo.toml", "rust"),
    ("package.json", "javascript"),
];

/// Language tag for a bare extension (case-insensitive, no leading dot).
pub fn language_for_extension(ext: &str) -> Option<&'static str> {
    let ext = ext.to_ascii_lowercase();
    LANGUAGES
        .iter()
        .find(|(_, exts)| exts.contains(&ext.as_str()))
        .map(|(name, _)| *name)
}

/// Language tag for a repository path, by well-known file name first and
/// extension second.
pub fn language_for_path(path: &str) -> Option<&'static str> {
    let p = Path::new(path);
    let file_name = p.file_name().and_then(|n| n.to_str())?;
    if let Some((_, lang)) = FILENAMES.iter().find(|(name, _)| *name == file_name) {
        return Some(lang);
    }
    p.extension()
        .and_then(|e| e.to_str())
        .and_then(language_for_extension)
}

#[cfg(test)]
#[path = "language_test.rs"]
mod tests;
