//! Hygiene: source-level standards checked at test time.
//!
//! Scans the library's production sources (everything under `src/` except
//! `*_test.rs`) for patterns the board core must not contain. Event handlers
//! sanitize and log; they never crash the host or drop a result unseen.

use std::fs;
use std::path::Path;

/// Pattern, allowed count, what it means.
const BUDGETS: &[(&str, usize, &str)] = &[
    (".unwrap()", 0, "panics on None/Err"),
    (".expect(", 0, "panics on None/Err"),
    ("panic!(", 0, "crashes the host"),
    ("unreachable!(", 0, "crashes the host"),
    ("todo!(", 0, "unfinished stub"),
    ("unimplemented!(", 0, "unfinished stub"),
    ("let _ =", 0, "silently discards a result"),
    (".ok()", 0, "silently discards an error"),
    ("#[allow(dead_code)]", 0, "hides unused code"),
    ("println!(", 0, "use tracing instead"),
    ("eprintln!(", 0, "use tracing instead"),
    ("dbg!(", 0, "debug leftover"),
];

struct SourceFile {
    path: String,
    content: String,
}

fn source_files() -> Vec<SourceFile> {
    let mut files = Vec::new();
    collect_rs_files(Path::new(env!("CARGO_MANIFEST_DIR")).join("src").as_path(), &mut files);
    files
}

fn collect_rs_files(dir: &Path, out: &mut Vec<SourceFile>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_rs_files(&path, out);
        } else if path.extension().is_some_and(|e| e == "rs") {
            let path_str = path.to_string_lossy().to_string();
            if path_str.ends_with("_test.rs") {
                continue;
            }
            if let Ok(content) = fs::read_to_string(&path) {
                out.push(SourceFile { path: path_str, content });
            }
        }
    }
}

fn hits(files: &[SourceFile], pattern: &str) -> Vec<(String, usize)> {
    files
        .iter()
        .filter_map(|file| {
            let count = file.content.lines().filter(|line| line.contains(pattern)).count();
            (count > 0).then(|| (file.path.clone(), count))
        })
        .collect()
}

#[test]
fn sources_are_found() {
    let files = source_files();
    assert!(files.iter().any(|f| f.path.ends_with("lib.rs")), "no sources scanned");
    assert!(files.iter().all(|f| !f.path.ends_with("_test.rs")));
}

#[test]
fn pattern_budgets() {
    let files = source_files();
    let mut failures = Vec::new();
    for (pattern, max, why) in BUDGETS {
        let found = hits(&files, pattern);
        let count: usize = found.iter().map(|(_, c)| c).sum();
        if count > *max {
            let detail: Vec<String> = found.iter().map(|(path, c)| format!("    {path}: {c}")).collect();
            failures.push(format!("{pattern} ({why}): found {count}, max {max}\n{}", detail.join("\n")));
        }
    }
    assert!(failures.is_empty(), "hygiene budgets exceeded:\n{}", failures.join("\n"));
}

#[test]
fn every_module_has_sibling_tests_or_is_data_only() {
    // Modules that only declare types or the facade's wiring may skip a sibling test file.
    const DATA_ONLY: &[&str] = &["lib.rs", "consts.rs", "error.rs", "render.rs", "callbacks.rs", "style.rs"];
    let files = source_files();
    let missing: Vec<&str> = files
        .iter()
        .filter(|f| !DATA_ONLY.iter().any(|d| f.path.ends_with(d)))
        .filter(|f| {
            let stem = f.path.trim_end_matches(".rs");
            !Path::new(&format!("{stem}_test.rs")).exists()
        })
        .map(|f| f.path.as_str())
        .collect();
    assert!(missing.is_empty(), "modules without a sibling _test.rs: {missing:?}");
}
