//! Makefile plan.
//!
//! A MakefilePlan gathers everything the emitter needs: the configuration,
//! one compile rule per source, the link driver and the generation time.
//! Once built it is plain data; rendering it never touches the filesystem
//! or the compiler.

use chrono::NaiveDateTime;

use crate::builder::depscan::DependencyLine;
use crate::builder::objects::ObjectPath;
use crate::builder::toolchain::LinkerKind;
use crate::core::build_config::BuildConfig;
use crate::core::source::{SourceSet, SourceUnit};

/// A complete Makefile plan.
#[derive(Debug, Clone)]
pub struct MakefilePlan<'a> {
    /// Resolved configuration
    pub config: &'a BuildConfig,

    /// Compile rules, in source set order
    pub rules: Vec<CompileRule<'a>>,

    /// Driver used for the link rule
    pub linker: LinkerKind,

    /// Local time written into the header comment
    pub generated_at: NaiveDateTime,
}

/// A single compile rule.
#[derive(Debug, Clone)]
pub struct CompileRule<'a> {
    /// Source being compiled
    pub unit: &'a SourceUnit,

    /// Object file it produces
    pub object: ObjectPath,

    /// Compiler-reported prerequisites (may be empty)
    pub deps: DependencyLine,
}

impl<'a> MakefilePlan<'a> {
    /// Assemble a plan from per-source results.
    ///
    /// `objects` and `deps` are parallel to `sources`: entry `i` belongs to
    /// the `i`-th source.
    pub fn new(
        config: &'a BuildConfig,
        sources: &'a SourceSet,
        objects: Vec<ObjectPath>,
        deps: Vec<DependencyLine>,
        linker: LinkerKind,
        generated_at: NaiveDateTime,
    ) -> Self {
        debug_assert_eq!(sources.len(), objects.len());
        debug_assert_eq!(sources.len(), deps.len());

        let rules = sources
            .iter()
            .zip(objects)
            .zip(deps)
            .map(|((unit, object), deps)| CompileRule { unit, object, deps })
            .collect();

        MakefilePlan {
            config,
            rules,
            linker,
            generated_at,
        }
    }

    /// Object paths in rule order.
    pub fn objects(&self) -> impl Iterator<Item = &ObjectPath> {
        self.rules.iter().map(|r| &r.object)
    }

    /// Number of compile rules.
    pub fn compile_count(&self) -> usize {
        self.rules.len()
    }
}
