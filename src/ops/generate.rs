//! Implementation of a generator run.
//!
//! Drives the whole pipeline: classify the source directory, derive object
//! names, pick the linker, scan header dependencies, then render and write
//! the Makefile. Every fatal error is raised before anything is written.

use std::path::PathBuf;

use chrono::{Local, NaiveDateTime};

use crate::builder::{
    derive_object_paths, emit, resolve_all, select_linker, DependencyScanner, LinkerKind,
    MakefilePlan,
};
use crate::core::{classify, BuildConfig, SourceUnit};
use crate::errors::GenerateError;
use crate::util::fs::write_atomic;

/// Default output file name.
pub const MAKEFILE_NAME: &str = "Makefile";

/// Options for a generator run.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// File to write; `None` only renders the text
    pub output: Option<PathBuf>,

    /// Timestamp for the header comment; `None` uses the local time
    pub generated_at: Option<NaiveDateTime>,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        GenerateOptions {
            output: Some(PathBuf::from(MAKEFILE_NAME)),
            generated_at: None,
        }
    }
}

impl GenerateOptions {
    /// Render without writing a file.
    pub fn render_only() -> Self {
        GenerateOptions {
            output: None,
            generated_at: None,
        }
    }

    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = Some(path.into());
        self
    }

    pub fn with_timestamp(mut self, at: NaiveDateTime) -> Self {
        self.generated_at = Some(at);
        self
    }
}

/// Hooks for reporting the scan phase.
///
/// All methods default to doing nothing; `()` is the silent observer.
pub trait GenerateObserver: Sync {
    /// Sources were classified; `total` scans are about to run.
    fn scan_started(&self, _total: usize) {}

    /// One source finished scanning (successfully or not).
    fn scanned(&self, _unit: &SourceUnit) {}

    /// The scan phase ended.
    fn scan_finished(&self) {}
}

impl GenerateObserver for () {}

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct GenerateReport {
    /// The rendered build description
    pub text: String,

    /// Number of compile rules
    pub sources: usize,

    /// Linker used by the link rule
    pub linker: LinkerKind,

    /// Compile rules emitted without compiler-reported prerequisites
    pub empty_dependencies: usize,

    /// File written, if any
    pub written: Option<PathBuf>,
}

/// Generate a Makefile for `config.src_dir`.
///
/// The text is fully rendered before the output file is touched, so a
/// fatal error never leaves a partial or half-replaced Makefile.
pub fn generate<S>(
    config: &BuildConfig,
    scanner: &S,
    opts: &GenerateOptions,
    observer: &dyn GenerateObserver,
) -> Result<GenerateReport, GenerateError>
where
    S: DependencyScanner + ?Sized,
{
    let generated_at = opts
        .generated_at
        .unwrap_or_else(|| Local::now().naive_local());

    let sources = classify(&config.src_dir);
    if sources.is_empty() {
        tracing::debug!("no C or C++ sources found in `{}`", config.src_dir);
    } else {
        tracing::info!("found {} source file(s) in `{}`", sources.len(), config.src_dir);
    }

    let objects = derive_object_paths(&sources)?;
    let linker = select_linker(&sources);
    tracing::debug!("linking with the {} driver", linker);

    observer.scan_started(sources.len());
    let deps = resolve_all(scanner, &sources, config.jobs, &|unit: &SourceUnit| {
        observer.scanned(unit)
    });
    observer.scan_finished();
    let deps = deps?;

    let empty_dependencies = deps.iter().filter(|d| d.is_empty()).count();
    let plan = MakefilePlan::new(config, &sources, objects, deps, linker, generated_at);
    let text = emit(&plan);

    if let Some(path) = &opts.output {
        write_atomic(path, &text).map_err(|source| GenerateError::WriteFailed {
            path: path.clone(),
            source,
        })?;
        tracing::info!("wrote {}", path.display());
    }

    Ok(GenerateReport {
        text,
        sources: sources.len(),
        linker,
        empty_dependencies,
        written: opts.output.clone(),
    })
}
