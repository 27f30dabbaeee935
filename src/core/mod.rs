//! Core data structures for amake.
//!
//! - Source kinds and discovered translation units
//! - The directory classifier
//! - The resolved, immutable build configuration

pub mod build_config;
pub mod language;
pub mod source;

pub use build_config::BuildConfig;
pub use language::SourceKind;
pub use source::{classify, SourceSet, SourceUnit};
