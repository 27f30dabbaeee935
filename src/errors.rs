//! Fatal generation errors.
//!
//! Anything here aborts the run before a Makefile is written. Non-fatal
//! conditions (unreadable source directory, unreadable scan output) are
//! logged where they happen and never reach this type.

use std::io;
use std::path::PathBuf;

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::builder::depscan::ScanError;
use crate::util::diagnostic::{suggestions, Diagnostic};

/// Error raised while generating a Makefile.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum GenerateError {
    #[error("cannot derive an object file name from `{path}`")]
    #[diagnostic(
        code(amake::objects::malformed_name),
        help("source files need a name and a .c, .cpp or .cc extension")
    )]
    MalformedSourceName { path: String },

    #[error("object file name for `{path}` is {len} bytes, the limit is {max}")]
    #[diagnostic(code(amake::objects::path_too_long), help("rename the source file"))]
    PathTooLong { path: String, len: usize, max: usize },

    #[error("dependency scan failed for `{source_path}`")]
    #[diagnostic(code(amake::depscan::failed))]
    DependencyScanFailed {
        source_path: String,
        #[source]
        reason: ScanError,
    },

    #[error("`{path}` is not a C or C++ source file")]
    #[diagnostic(code(amake::classify::invalid_kind))]
    InvalidSourceKind { path: String },

    #[error("failed to write `{}`", .path.display())]
    #[diagnostic(code(amake::output::write_failed))]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl GenerateError {
    /// Process exit status for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            GenerateError::MalformedSourceName { .. } | GenerateError::PathTooLong { .. } => 3,
            GenerateError::DependencyScanFailed { .. } => 4,
            GenerateError::InvalidSourceKind { .. } => 5,
            GenerateError::WriteFailed { .. } => 6,
        }
    }

    /// Convert to a user-friendly diagnostic.
    ///
    /// The miette code and help attached to each variant are carried over.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let mut diag = self.base_diagnostic();

        if let Some(help) = MietteDiagnostic::help(self) {
            diag = diag.with_suggestion(help.to_string());
        }
        if let Some(code) = MietteDiagnostic::code(self) {
            diag = diag.with_code(code.to_string());
        }

        diag
    }

    fn base_diagnostic(&self) -> Diagnostic {
        match self {
            GenerateError::MalformedSourceName { path } | GenerateError::PathTooLong { path, .. } => {
                Diagnostic::error(self.to_string()).with_location(path)
            }

            GenerateError::DependencyScanFailed {
                source_path,
                reason,
            } => {
                let mut diag = Diagnostic::error(self.to_string())
                    .with_location(source_path)
                    .with_context(reason.to_string());

                match reason {
                    ScanError::Failed { stderr, .. } => {
                        for line in stderr.lines().filter(|l| !l.trim().is_empty()).take(5) {
                            diag = diag.with_context(line.trim_end());
                        }
                        diag = diag.with_suggestion(format!(
                            "Check that the file preprocesses: `{}`",
                            reason.command()
                        ));
                    }
                    ScanError::Spawn { source, .. } => {
                        diag = diag
                            .with_context(source.to_string())
                            .with_suggestion(suggestions::COMPILER_NOT_FOUND);
                    }
                    ScanError::TimedOut { .. } => {
                        diag = diag.with_suggestion(suggestions::SCAN_TIMEOUT);
                    }
                    ScanError::Capture { source, .. }
                    | ScanError::IntermediateRead { source, .. } => {
                        diag = diag.with_context(source.to_string());
                    }
                }

                diag
            }

            GenerateError::InvalidSourceKind { path } => Diagnostic::error(self.to_string())
                .with_location(path)
                .with_suggestion("Only .c, .cpp and .cc files can be compiled"),

            GenerateError::WriteFailed { source, .. } => Diagnostic::error(self.to_string())
                .with_context(source.to_string())
                .with_suggestion(suggestions::WRITE_FAILED),
        }
    }
}
