//! Resolved generator configuration.

use std::time::Duration;

use crate::core::language::SourceKind;

/// Flags written in front of every user flag.
pub const DEFAULT_FLAGS: &[&str] = &["-g", "-Wall"];

/// Flags appended by the `release` target.
pub const RELEASE_FLAGS: &[&str] = &["-O3", "-D_RELEASE"];

/// Everything the generator needs to know, resolved once at startup.
///
/// Built from defaults, configuration files and the command line, then
/// handed to the core by reference and never changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    /// Name of the linked executable
    pub exec_name: String,
    /// Directory object files are written to (resolved by make, not by us)
    pub obj_dir: String,
    /// Directory scanned for sources
    pub src_dir: String,
    /// Pass-through compiler flags, in input order
    pub flags: Vec<String>,
    /// `-l`/`-L` arguments, in input order
    pub libs: Vec<String>,
    /// C compiler driver
    pub c_compiler: String,
    /// C++ compiler driver
    pub cxx_compiler: String,
    /// Upper bound for a single dependency scan
    pub scan_timeout: Duration,
    /// Number of concurrent dependency scans
    pub jobs: usize,
}

impl Default for BuildConfig {
    fn default() -> Self {
        BuildConfig {
            exec_name: "out".to_string(),
            obj_dir: "obj".to_string(),
            src_dir: ".".to_string(),
            flags: Vec::new(),
            libs: Vec::new(),
            c_compiler: "gcc".to_string(),
            cxx_compiler: "g++".to_string(),
            scan_timeout: Duration::from_secs(60),
            jobs: 1,
        }
    }
}

impl BuildConfig {
    /// Check whether a pass-through token names a library or library path.
    ///
    /// Only `-l<name>` and `-L<dir>` with a non-empty suffix qualify.
    pub fn is_library_token(token: &str) -> bool {
        token.len() >= 3 && (token.starts_with("-l") || token.starts_with("-L"))
    }

    /// Route a pass-through token to the libraries or the flags.
    pub fn add_passthrough(&mut self, token: impl Into<String>) {
        let token = token.into();
        if Self::is_library_token(&token) {
            self.libs.push(token);
        } else {
            self.flags.push(token);
        }
    }

    /// Set the executable name.
    pub fn with_exec_name(mut self, name: impl Into<String>) -> Self {
        self.exec_name = name.into();
        self
    }

    /// Set the source directory.
    pub fn with_src_dir(mut self, dir: impl Into<String>) -> Self {
        self.src_dir = dir.into();
        self
    }

    /// Add pass-through tokens, routing each with [`add_passthrough`](Self::add_passthrough).
    pub fn with_passthrough<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for token in tokens {
            self.add_passthrough(token);
        }
        self
    }

    /// Value of the `FLAGS` variable: defaults followed by user flags.
    pub fn flags_line(&self) -> String {
        DEFAULT_FLAGS
            .iter()
            .copied()
            .chain(self.flags.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Value of the `LIBS` variable.
    pub fn libs_line(&self) -> String {
        self.libs.join(" ")
    }

    /// Compiler driver for a source kind.
    pub fn compiler_for(&self, kind: SourceKind) -> &str {
        match kind {
            SourceKind::C => &self.c_compiler,
            SourceKind::Cxx => &self.cxx_compiler,
        }
    }
}
