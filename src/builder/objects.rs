//! Object file naming.

use std::fmt;

use crate::core::source::{SourceSet, SourceUnit};
use crate::errors::GenerateError;

/// Make variable reference that stands for the object directory.
pub const OBJDIR_VAR: &str = "$(OBJDIR)";

/// Extension given to object files.
pub const OBJECT_EXTENSION: &str = "o";

/// Longest object file name accepted, in bytes.
pub const MAX_OBJECT_NAME_LEN: usize = 255;

/// Object file path as written in the Makefile, e.g. `$(OBJDIR)/main.o`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectPath(String);

impl ObjectPath {
    /// Derive the object path for a single source unit.
    pub fn for_source(unit: &SourceUnit) -> Result<Self, GenerateError> {
        let name = object_name(unit)?;
        Ok(ObjectPath(format!("{}/{}", OBJDIR_VAR, name)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Map every source to its object path, preserving order.
///
/// Any unit that cannot be named aborts the whole derivation.
pub fn derive_object_paths(sources: &SourceSet) -> Result<Vec<ObjectPath>, GenerateError> {
    sources.iter().map(ObjectPath::for_source).collect()
}

/// Basename of the source with its extension swapped for `.o`.
fn object_name(unit: &SourceUnit) -> Result<String, GenerateError> {
    let base = unit.basename();

    let stem = match base.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => stem,
        _ => {
            return Err(GenerateError::MalformedSourceName {
                path: unit.path.clone(),
            })
        }
    };

    let name = format!("{}.{}", stem, OBJECT_EXTENSION);
    if name.len() > MAX_OBJECT_NAME_LEN {
        return Err(GenerateError::PathTooLong {
            path: unit.path.clone(),
            len: name.len(),
            max: MAX_OBJECT_NAME_LEN,
        });
    }

    Ok(name)
}
