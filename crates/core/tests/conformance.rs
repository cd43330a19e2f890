//! Runs the conformance suite at conformance/.
//!
//! Convention:
//!   positive/  -- *.wtfl + *.expected.json (decoded value)
//!   negative/  -- *.wtfl + *.expected-error.json (every listed field must
//!                 match the error's JSON form)

use serde_json::Value;
use std::path::{Path, PathBuf};

fn suite_dir(subdir: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../conformance")
        .join(subdir)
}

fn collect_wtfl_files(dir: &Path) -> Vec<PathBuf> {
    let mut paths: Vec<_> = std::fs::read_dir(dir)
        .unwrap_or_else(|e| panic!("cannot read {}: {}", dir.display(), e))
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|e| e == "wtfl"))
        .collect();
    paths.sort();
    paths
}

fn read_json(path: &Path) -> Value {
    let src = std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("missing {}: {}", path.display(), e));
    serde_json::from_str(&src).unwrap_or_else(|e| panic!("bad JSON in {}: {}", path.display(), e))
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let stem = path.file_stem().unwrap_or_default().to_string_lossy();
    path.with_file_name(format!("{}.{}", stem, suffix))
}

#[test]
fn positive_documents_decode_to_expected_values() {
    let files = collect_wtfl_files(&suite_dir("positive"));
    assert!(!files.is_empty());

    let mut failures = Vec::new();
    for path in &files {
        let src = std::fs::read_to_string(path).unwrap();
        let expected = read_json(&with_suffix(path, "expected.json"));
        match wtfl_core::read(&src) {
            Ok(got) if got == expected => {}
            Ok(got) => failures.push(format!(
                "{}: expected {}, got {}",
                path.display(),
                expected,
                got
            )),
            Err(e) => failures.push(format!("{}: unexpected error: {}", path.display(), e)),
        }
    }
    assert!(failures.is_empty(), "{}", failures.join("\n"));
}

#[test]
fn negative_documents_fail_with_expected_errors() {
    let files = collect_wtfl_files(&suite_dir("negative"));
    assert!(!files.is_empty());

    let mut failures = Vec::new();
    for path in &files {
        let src = std::fs::read_to_string(path).unwrap();
        let expected = read_json(&with_suffix(path, "expected-error.json"));
        let got = match wtfl_core::read(&src) {
            Ok(value) => {
                failures.push(format!("{}: expected an error, got {}", path.display(), value));
                continue;
            }
            Err(e) => e.to_json_value(),
        };
        let Some(fields) = expected.as_object() else {
            failures.push(format!("{}: expected-error is not an object", path.display()));
            continue;
        };
        for (field, want) in fields {
            if got.get(field) != Some(want) {
                failures.push(format!(
                    "{}: field {:?}: expected {}, got {}",
                    path.display(),
                    field,
                    want,
                    got.get(field).unwrap_or(&Value::Null)
                ));
            }
        }
    }
    assert!(failures.is_empty(), "{}", failures.join("\n"));
}
