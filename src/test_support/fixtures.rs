//! Test fixtures for common test scenarios.

use std::fs;
use std::path::Path;
use std::process::{Command, Stdio};

use chrono::{NaiveDate, NaiveDateTime};
use tempfile::TempDir;

/// Create an empty file, with parent directories.
pub fn touch(path: &Path) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("failed to create parent dir");
    }
    fs::write(path, "").expect("failed to create file");
}

/// Create a temporary directory holding empty files with these names.
pub fn source_tree(names: &[&str]) -> TempDir {
    let tmp = TempDir::new().expect("failed to create temp dir");
    for name in names {
        touch(&tmp.path().join(name));
    }
    tmp
}

/// Create a temporary directory holding files with the given contents.
pub fn source_tree_with(files: &[(&str, &str)]) -> TempDir {
    let tmp = TempDir::new().expect("failed to create temp dir");
    for (name, contents) in files {
        fs::write(tmp.path().join(name), contents).expect("failed to write file");
    }
    tmp
}

/// Check whether a compiler driver can be run.
pub fn compiler_available(program: &str) -> bool {
    Command::new(program)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// A fixed generation time: Thu Mar 4 05:06:07 2021.
pub fn fixed_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2021, 3, 4)
        .and_then(|d| d.and_hms_opt(5, 6, 7))
        .expect("valid fixed time")
}

