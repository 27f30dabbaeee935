//! Header dependency resolution.
//!
//! Each source is handed to the compiler in `-MM` mode and the reported
//! make rule (`main.o: main.c util.h`) is used verbatim as the compile
//! rule's target and prerequisites.
//!
//! Scanning sits behind [`DependencyScanner`] so the pipeline can run
//! against canned results in tests. Failure policy is asymmetric:
//! - the compiler could not run, failed or timed out: fatal
//! - the compiler succeeded but its output could not be read back: the
//!   source gets an empty prerequisite list and a warning

use std::fmt;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use rayon::prelude::*;
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::builder::toolchain::dependency_scan_command;
use crate::core::build_config::BuildConfig;
use crate::core::source::{SourceSet, SourceUnit};
use crate::errors::GenerateError;
use crate::util::process::{ProcessBuilder, ProcessOutcome};

/// Compiler-reported dependency rule for one source, minus its trailing
/// newline. Empty when nothing usable was reported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyLine(String);

impl DependencyLine {
    pub fn new(line: impl Into<String>) -> Self {
        DependencyLine(line.into())
    }

    /// Build from raw scanner output, dropping one trailing line terminator.
    pub fn from_output(output: &str) -> Self {
        let line = output
            .strip_suffix("\r\n")
            .or_else(|| output.strip_suffix('\n'))
            .unwrap_or(output);
        DependencyLine(line.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for DependencyLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Why a dependency scan did not produce a line.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("could not create a capture file for `{command}`")]
    Capture {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to run `{command}`")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("`{command}` exited with {}", exit_label(.code))]
    Failed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("`{command}` did not finish within {}s", .after.as_secs())]
    TimedOut { command: String, after: Duration },

    #[error("could not read the output of `{command}`")]
    IntermediateRead {
        command: String,
        #[source]
        source: io::Error,
    },
}

impl ScanError {
    /// Whether the source can still be emitted, with no prerequisites.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ScanError::IntermediateRead { .. })
    }

    /// The command that was attempted.
    pub fn command(&self) -> &str {
        match self {
            ScanError::Capture { command, .. }
            | ScanError::Spawn { command, .. }
            | ScanError::Failed { command, .. }
            | ScanError::TimedOut { command, .. }
            | ScanError::IntermediateRead { command, .. } => command,
        }
    }
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "no status (killed by a signal)".to_string(),
    }
}

/// Something that can list the headers a source depends on.
pub trait DependencyScanner: Sync {
    fn scan(&self, unit: &SourceUnit) -> Result<DependencyLine, ScanError>;
}

/// Scanner that runs the configured compiler with `-MM`.
///
/// Output is captured through a uniquely named temporary file, so scans
/// may run concurrently. The file is removed when the scan returns, on
/// every path.
#[derive(Debug, Clone)]
pub struct CompilerScanner<'a> {
    config: &'a BuildConfig,
    capture_dir: PathBuf,
}

impl<'a> CompilerScanner<'a> {
    pub fn new(config: &'a BuildConfig) -> Self {
        CompilerScanner {
            config,
            capture_dir: std::env::temp_dir(),
        }
    }

    #[cfg(test)]
    fn with_capture_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.capture_dir = dir.into();
        self
    }
}

impl DependencyScanner for CompilerScanner<'_> {
    fn scan(&self, unit: &SourceUnit) -> Result<DependencyLine, ScanError> {
        let spec = dependency_scan_command(self.config, unit);
        let command = spec.display();
        tracing::debug!("running {}", command);

        let capture = tempfile::Builder::new()
            .prefix(".amake-dep-")
            .tempfile_in(&self.capture_dir)
            .map_err(|source| ScanError::Capture {
                command: command.clone(),
                source,
            })?;
        let stdout = capture.as_file().try_clone().map_err(|source| ScanError::Capture {
            command: command.clone(),
            source,
        })?;

        let outcome = ProcessBuilder::from_spec(&spec)
            .timeout(self.config.scan_timeout)
            .exec_with_stdout(stdout)
            .map_err(|source| ScanError::Spawn {
                command: command.clone(),
                source,
            })?;

        match outcome {
            ProcessOutcome::TimedOut { after } => {
                return Err(ScanError::TimedOut { command, after });
            }
            ProcessOutcome::Exited { status, stderr } if !status.success() => {
                return Err(ScanError::Failed {
                    command,
                    code: status.code(),
                    stderr,
                });
            }
            ProcessOutcome::Exited { .. } => {}
        }

        read_capture(&capture, &command)
            .map(|text| DependencyLine::from_output(&text))
            .map_err(|source| ScanError::IntermediateRead { command, source })
    }
}

/// Read the captured rule. Bytes that are not UTF-8 are replaced rather
/// than dropping the whole rule.
fn read_capture(capture: &NamedTempFile, command: &str) -> io::Result<String> {
    let bytes = fs::read(capture.path())?;
    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(err) => {
            tracing::warn!("output of `{}` is not valid UTF-8, replacing invalid bytes", command);
            Ok(String::from_utf8_lossy(err.as_bytes()).into_owned())
        }
    }
}

/// Resolve the dependency line for one unit, applying the failure policy.
pub fn resolve_dependency<S>(scanner: &S, unit: &SourceUnit) -> Result<DependencyLine, GenerateError>
where
    S: DependencyScanner + ?Sized,
{
    match scanner.scan(unit) {
        Ok(line) => {
            if line.is_empty() {
                tracing::warn!("{}: compiler reported no dependencies", unit.path);
            }
            Ok(line)
        }
        Err(err) if err.is_recoverable() => {
            tracing::warn!("{}: {}, emitting rule without prerequisites", unit.path, err);
            Ok(DependencyLine::default())
        }
        Err(reason) => Err(GenerateError::DependencyScanFailed {
            source_path: unit.path.clone(),
            reason,
        }),
    }
}

/// Resolve every unit, in set order.
///
/// With `jobs > 1` scans run on a dedicated rayon pool; results are still
/// returned in set order. `on_scanned` is called once per finished unit.
pub fn resolve_all<S>(
    scanner: &S,
    sources: &SourceSet,
    jobs: usize,
    on_scanned: &(dyn Fn(&SourceUnit) + Sync),
) -> Result<Vec<DependencyLine>, GenerateError>
where
    S: DependencyScanner + ?Sized,
{
    let resolve_one = |unit: &SourceUnit| {
        let line = resolve_dependency(scanner, unit);
        on_scanned(unit);
        line
    };

    if jobs > 1 && sources.len() > 1 {
        match rayon::ThreadPoolBuilder::new().num_threads(jobs).build() {
            Ok(pool) => {
                return pool.install(|| sources.as_slice().par_iter().map(&resolve_one).collect());
            }
            Err(e) => {
                tracing::warn!("could not start {} scan threads ({}), scanning sequentially", jobs, e);
            }
        }
    }

    sources.iter().map(&resolve_one).collect()
}
