//! Build graph construction and rule emission.
//!
//! This module turns a classified source set into Makefile text:
//! object naming, linker selection, dependency scanning, planning and
//! rendering.

pub mod depscan;
pub mod makefile;
pub mod objects;
pub mod plan;
pub mod toolchain;

pub use depscan::{
    resolve_all, resolve_dependency, CompilerScanner, DependencyLine, DependencyScanner,
    ScanError,
};
pub use makefile::emit;
pub use objects::{derive_object_paths, ObjectPath};
pub use plan::{CompileRule, MakefilePlan};
pub use toolchain::{select_linker, CommandSpec, LinkerKind};
