//! Source languages recognised by the classifier.

use std::fmt;

/// Kind of translation unit, decided by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SourceKind {
    /// C source (`.c`)
    #[default]
    C,
    /// C++ source (`.cpp`, `.cc`)
    Cxx,
}

impl SourceKind {
    /// Classify a file extension (without the leading dot), ignoring case.
    ///
    /// Returns `None` for anything that is not a compilable unit, including
    /// headers.
    pub fn from_extension(ext: &str) -> Option<Self> {
        if ext.eq_ignore_ascii_case("c") {
            Some(SourceKind::C)
        } else if ext.eq_ignore_ascii_case("cpp") || ext.eq_ignore_ascii_case("cc") {
            Some(SourceKind::Cxx)
        } else {
            None
        }
    }

    /// Name of the Makefile variable holding the compiler for this kind.
    pub fn compiler_var(&self) -> &'static str {
        match self {
            SourceKind::C => "CC",
            SourceKind::Cxx => "CPPC",
        }
    }

    /// Get the language name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::C => "c",
            SourceKind::Cxx => "c++",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
