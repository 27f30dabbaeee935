//! amake - A simple Makefile generator for C and C++
//!
//! This crate provides the library behind the `amake` binary: source
//! discovery, object naming, header dependency scanning and Makefile
//! rule emission.

pub mod builder;
pub mod core;
pub mod errors;
pub mod ops;
pub mod util;

/// Test utilities and mocks for amake unit tests.
///
/// Only compiled for tests. Provides a canned dependency scanner and
/// helpers for building throwaway source trees.
#[cfg(test)]
pub mod test_support;

pub use crate::core::{classify, BuildConfig, SourceKind, SourceSet, SourceUnit};

pub use builder::{DependencyLine, DependencyScanner, LinkerKind, MakefilePlan, ObjectPath};
pub use errors::GenerateError;
pub use ops::generate::{generate, GenerateOptions};
