//! Hygiene: source-level checks on the canvas library.
//!
//! Every library file under `src/` (test modules excluded) is scanned for
//! patterns the crate does not allow. Each pattern has a budget; budgets only
//! ever go down.

use std::fs;
use std::path::{Path, PathBuf};

/// `(pattern, budget, reason)`
const RULES: &[(&str, usize, &str)] = &[
    (".unwrap()", 0, "panics on the error path"),
    (".expect(", 0, "panics on the error path"),
    ("panic!(", 0, "crashes the host"),
    ("unreachable!(", 0, "crashes the host"),
    ("todo!(", 0, "unfinished code"),
    ("unimplemented!(", 0, "unfinished code"),
    ("let _ =", 0, "discards a value without looking at it"),
    (".ok()", 0, "drops the error"),
    ("#[allow(dead_code)]", 0, "hides unused code"),
    ("println!(", 0, "libraries log through tracing"),
    ("eprintln!(", 0, "libraries log through tracing"),
    ("dbg!(", 0, "debugging leftover"),
    ("std::process::exit", 0, "only the binary decides when to exit"),
];

fn library_files() -> Vec<(PathBuf, String)> {
    let mut out = Vec::new();
    walk(Path::new("src"), &mut out);
    out.sort();
    out
}

fn walk(dir: &Path, out: &mut Vec<(PathBuf, String)>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for path in entries.flatten().map(|e| e.path()) {
        if path.is_dir() {
            walk(&path, out);
            continue;
        }
        let is_rust = path.extension().is_some_and(|e| e == "rs");
        let is_test = path.file_stem().is_some_and(|s| s.to_string_lossy().ends_with("_test"));
        if is_rust && !is_test {
            if let Ok(content) = fs::read_to_string(&path) {
                out.push((path, content));
            }
        }
    }
}

/// Lines outside `//` comments that contain `pattern`, per file.
fn hits(files: &[(PathBuf, String)], pattern: &str) -> Vec<(String, usize)> {
    files
        .iter()
        .filter_map(|(path, content)| {
            let count = content
                .lines()
                .filter(|line| !line.trim_start().starts_with("//"))
                .filter(|line| line.contains(pattern))
                .count();
            (count > 0).then(|| (path.display().to_string(), count))
        })
        .collect()
}

#[test]
fn library_sources_are_found() {
    let files = library_files();
    let names: Vec<_> = files.iter().map(|(p, _)| p.display().to_string()).collect();
    assert!(names.iter().any(|n| n.ends_with("lib.rs")), "no lib.rs under src/: {names:?}");
    assert!(names.iter().all(|n| !n.ends_with("_test.rs")));
}

#[test]
fn pattern_budgets() {
    let files = library_files();
    let mut report = Vec::new();
    for (pattern, budget, reason) in RULES {
        let found = hits(&files, pattern);
        let total: usize = found.iter().map(|(_, n)| n).sum();
        if total > *budget {
            report.push(format!("`{pattern}` ({reason}): {total} > {budget}"));
            report.extend(found.iter().map(|(path, n)| format!("    {path}: {n}")));
        }
    }
    assert!(report.is_empty(), "hygiene budgets exceeded:\n{}", report.join("\n"));
}
