//! Source discovery.
//!
//! The classifier walks a single directory (no recursion) and turns every
//! C or C++ translation unit it finds into a [`SourceUnit`]. Everything else
//! is ignored.

use std::fs;
use std::path::Path;

use crate::core::language::SourceKind;
use crate::errors::GenerateError;

/// One discovered translation unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceUnit {
    /// Language of the unit
    pub kind: SourceKind,
    /// Path as written into the Makefile, prefixed with the source directory
    pub path: String,
}

impl SourceUnit {
    /// Create a unit with an already known kind.
    pub fn new(kind: SourceKind, path: impl Into<String>) -> Self {
        SourceUnit {
            kind,
            path: path.into(),
        }
    }

    /// Create a unit from a path, inferring the kind from its extension.
    pub fn from_path(path: impl Into<String>) -> Result<Self, GenerateError> {
        let path = path.into();
        let kind = extension_of(basename(&path)).and_then(SourceKind::from_extension);

        match kind {
            Some(kind) => Ok(SourceUnit { kind, path }),
            None => Err(GenerateError::InvalidSourceKind { path }),
        }
    }

    /// The file name component of the path.
    pub fn basename(&self) -> &str {
        basename(&self.path)
    }
}

/// Ordered set of source units.
///
/// Order is the directory iteration order, which is OS dependent. Paths are
/// unique.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceSet {
    units: Vec<SourceUnit>,
}

impl SourceSet {
    /// Create an empty set.
    pub fn new() -> Self {
        SourceSet { units: Vec::new() }
    }

    /// Build a set from explicit paths, inferring each kind.
    #[cfg(test)]
    pub fn from_paths<I, S>(paths: I) -> Result<Self, GenerateError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = SourceSet::new();
        for path in paths {
            set.push(SourceUnit::from_path(path)?);
        }
        Ok(set)
    }

    /// Append a unit. Returns `false` if a unit with the same path is
    /// already present, in which case the set is unchanged.
    pub fn push(&mut self, unit: SourceUnit) -> bool {
        if self.units.iter().any(|u| u.path == unit.path) {
            tracing::debug!("ignoring duplicate source {}", unit.path);
            return false;
        }
        self.units.push(unit);
        true
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SourceUnit> {
        self.units.iter()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn as_slice(&self) -> &[SourceUnit] {
        &self.units
    }

    /// Whether any unit is C++.
    pub fn has_cxx(&self) -> bool {
        self.units.iter().any(|u| u.kind == SourceKind::Cxx)
    }
}

impl<'a> IntoIterator for &'a SourceSet {
    type Item = &'a SourceUnit;
    type IntoIter = std::slice::Iter<'a, SourceUnit>;

    fn into_iter(self) -> Self::IntoIter {
        self.units.iter()
    }
}

/// Scan `dir` for C and C++ sources.
///
/// Hidden entries, subdirectories and files with other extensions are
/// skipped. An unreadable directory yields an empty set and a warning
/// rather than an error.
pub fn classify(dir: &str) -> SourceSet {
    let mut set = SourceSet::new();

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("cannot read source directory {}: {}", dir, e);
            return set;
        }
    };

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("skipping unreadable entry in {}: {}", dir, e);
                continue;
            }
        };

        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            tracing::warn!(
                "skipping non UTF-8 file name in {}: {}",
                dir,
                file_name.to_string_lossy()
            );
            continue;
        };

        if is_hidden(name) {
            continue;
        }

        let Ok(unit) = SourceUnit::from_path(format!("{}/{}", dir, name)) else {
            continue;
        };

        if entry.path().is_dir() {
            tracing::debug!("skipping directory {}", unit.path);
            continue;
        }

        tracing::debug!("found {} source {}", unit.kind, unit.path);
        set.push(unit);
    }

    set
}

/// Hidden files and the `.`/`..` self references.
fn is_hidden(name: &str) -> bool {
    name.starts_with('.') || name == "." || name == ".."
}

/// Text after the last `.`, if any.
pub(crate) fn extension_of(name: &str) -> Option<&str> {
    name.rsplit_once('.').map(|(_, ext)| ext)
}

pub(crate) fn basename(path: &str) -> &str {
    Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path)
}
