//! Test utilities and mocks for amake unit tests.
//!
//! This module provides a canned [`DependencyScanner`] so the pipeline can
//! be exercised without a compiler, plus fixtures for throwaway source
//! trees.
//!
//! # Example
//!
//! ```rust,ignore
//! use crate::test_support::{source_tree, MockScanner};
//!
//! #[test]
//! fn test_example() {
//!     let tmp = source_tree(&["main.c"]);
//!     let scanner = MockScanner::new().default_line("main.o: main.c");
//!
//!     // Hand the scanner to resolve_all or generate...
//! }
//! ```

pub mod fixtures;

use std::collections::HashMap;
use std::io;
use std::sync::Mutex;
use std::time::Duration;

use crate::builder::{DependencyLine, DependencyScanner, ScanError};
use crate::core::SourceUnit;

pub use fixtures::*;

/// Canned result for one source path.
#[derive(Debug, Clone)]
pub enum MockScan {
    /// Scan succeeds with this line.
    Line(String),
    /// The compiler exits with `code` and `stderr`.
    Failed { code: i32, stderr: String },
    /// The compiler never finishes.
    TimedOut,
    /// The compiler succeeds but its output cannot be read back.
    Unreadable,
}

impl MockScan {
    fn to_result(&self, command: String) -> Result<DependencyLine, ScanError> {
        match self {
            MockScan::Line(line) => Ok(DependencyLine::new(line.clone())),
            MockScan::Failed { code, stderr } => Err(ScanError::Failed {
                command,
                code: Some(*code),
                stderr: stderr.clone(),
            }),
            MockScan::TimedOut => Err(ScanError::TimedOut {
                command,
                after: Duration::from_secs(60),
            }),
            MockScan::Unreadable => Err(ScanError::IntermediateRead {
                command,
                source: io::Error::new(io::ErrorKind::NotFound, "capture file vanished"),
            }),
        }
    }
}

/// Mock dependency scanner.
///
/// Returns a canned result per source path and records every path it was
/// asked about, in call order. Paths without a canned result use the
/// default, or fail to spawn when there is none.
#[derive(Debug, Default)]
pub struct MockScanner {
    results: HashMap<String, MockScan>,
    default: Option<MockScan>,
    calls: Mutex<Vec<String>>,
}

impl MockScanner {
    pub fn new() -> Self {
        MockScanner::default()
    }

    /// Succeed for `path` with `line`.
    pub fn line(self, path: impl Into<String>, line: impl Into<String>) -> Self {
        self.with(path, MockScan::Line(line.into()))
    }

    /// Fail for `path` as if the compiler exited with `code`.
    pub fn failure(self, path: impl Into<String>, code: i32, stderr: impl Into<String>) -> Self {
        self.with(
            path,
            MockScan::Failed {
                code,
                stderr: stderr.into(),
            },
        )
    }

    /// Time out for `path`.
    pub fn timed_out(self, path: impl Into<String>) -> Self {
        self.with(path, MockScan::TimedOut)
    }

    /// Lose the captured output for `path`.
    pub fn unreadable(self, path: impl Into<String>) -> Self {
        self.with(path, MockScan::Unreadable)
    }

    /// Succeed with `line` for every path without a canned result.
    pub fn default_line(mut self, line: impl Into<String>) -> Self {
        self.default = Some(MockScan::Line(line.into()));
        self
    }

    pub fn with(mut self, path: impl Into<String>, scan: MockScan) -> Self {
        self.results.insert(path.into(), scan);
        self
    }

    /// Paths scanned so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl DependencyScanner for MockScanner {
    fn scan(&self, unit: &SourceUnit) -> Result<DependencyLine, ScanError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(unit.path.clone());
        }

        let command = format!("mock -MM {}", unit.path);
        match self.results.get(&unit.path).or(self.default.as_ref()) {
            Some(scan) => scan.to_result(command),
            None => Err(ScanError::Spawn {
                command,
                source: io::Error::new(io::ErrorKind::NotFound, "no canned result"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SourceKind;

    #[test]
    fn test_mock_scanner_records_calls() {
        let scanner = MockScanner::new()
            .line("./a.c", "a.o: a.c")
            .failure("./b.c", 2, "boom");

        let a = SourceUnit::new(SourceKind::C, "./a.c");
        let b = SourceUnit::new(SourceKind::C, "./b.c");

        assert_eq!(scanner.scan(&a).unwrap().as_str(), "a.o: a.c");
        assert!(matches!(
            scanner.scan(&b),
            Err(ScanError::Failed { code: Some(2), .. })
        ));
        assert_eq!(scanner.calls(), vec!["./a.c", "./b.c"]);
    }

    #[test]
    fn test_mock_scanner_without_result_fails() {
        let scanner = MockScanner::new();
        let unit = SourceUnit::new(SourceKind::C, "./x.c");

        assert!(matches!(scanner.scan(&unit), Err(ScanError::Spawn { .. })));
    }
}
