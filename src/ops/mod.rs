//! High-level operations.
//!
//! This module contains the implementation of amake runs.

pub mod generate;

pub use generate::{generate, GenerateObserver, GenerateOptions, GenerateReport, MAKEFILE_NAME};
