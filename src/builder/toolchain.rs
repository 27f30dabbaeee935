//! Compiler and linker selection.
//!
//! amake never compiles anything itself. The toolchain only decides which
//! driver names end up in the Makefile and builds the one command we do
//! run: the header dependency scan.

use std::fmt;

use crate::core::build_config::BuildConfig;
use crate::core::language::SourceKind;
use crate::core::source::{SourceSet, SourceUnit};

/// Which driver performs the final link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkerKind {
    /// Link with the C compiler driver
    #[default]
    C,
    /// Link with the C++ compiler driver (pulls in the C++ runtime)
    Cxx,
}

impl LinkerKind {
    /// Driver name for this linker, taken from the configuration.
    pub fn driver<'a>(&self, config: &'a BuildConfig) -> &'a str {
        match self {
            LinkerKind::C => config.compiler_for(SourceKind::C),
            LinkerKind::Cxx => config.compiler_for(SourceKind::Cxx),
        }
    }
}

impl fmt::Display for LinkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkerKind::C => f.write_str("c"),
            LinkerKind::Cxx => f.write_str("c++"),
        }
    }
}

/// C++ linker if any unit is C++, otherwise (including no units) C.
pub fn select_linker(sources: &SourceSet) -> LinkerKind {
    if sources.has_cxx() {
        LinkerKind::Cxx
    } else {
        LinkerKind::C
    }
}

/// A command to execute, with program and arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// The program to run (e.g., "gcc")
    pub program: String,
    /// Command arguments
    pub args: Vec<String>,
}

impl CommandSpec {
    /// Create a new command spec.
    pub fn new(program: impl Into<String>) -> Self {
        CommandSpec {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Add an argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments.
    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(args.into_iter().map(|a| a.into()));
        self
    }

    /// Render as a shell-like string for logs and error messages.
    pub fn display(&self) -> String {
        let mut parts = vec![self.program.clone()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

/// `<driver> <user flags> -MM <source>` for one unit.
///
/// User flags are forwarded so include paths and defines influence which
/// headers are found.
pub fn dependency_scan_command(config: &BuildConfig, unit: &SourceUnit) -> CommandSpec {
    CommandSpec::new(config.compiler_for(unit.kind))
        .args(config.flags.iter().cloned())
        .arg("-MM")
        .arg(unit.path.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_linker_c_only() {
        let sources = SourceSet::from_paths(["./main.c", "./util.c"]).unwrap();
        assert_eq!(select_linker(&sources), LinkerKind::C);
    }

    #[test]
    fn test_select_linker_any_cxx_wins() {
        let sources = SourceSet::from_paths(["./main.c", "./util.cc", "./io.c"]).unwrap();
        assert_eq!(select_linker(&sources), LinkerKind::Cxx);
    }

    #[test]
    fn test_select_linker_empty_defaults_to_c() {
        assert_eq!(select_linker(&SourceSet::new()), LinkerKind::C);
    }

    #[test]
    fn test_linker_driver_names() {
        let config = BuildConfig::default();
        assert_eq!(LinkerKind::C.driver(&config), "gcc");
        assert_eq!(LinkerKind::Cxx.driver(&config), "g++");
    }

    #[test]
    fn test_dependency_scan_command() {
        let config = BuildConfig::default().with_passthrough(["-Iinclude", "-lm", "-DNDEBUG"]);
        let unit = SourceUnit::new(SourceKind::Cxx, "./main.cpp");

        let cmd = dependency_scan_command(&config, &unit);

        assert_eq!(cmd.display(), "g++ -Iinclude -DNDEBUG -MM ./main.cpp");
    }

    #[test]
    fn test_dependency_scan_command_uses_c_driver_for_c() {
        let config = BuildConfig::default();
        let unit = SourceUnit::new(SourceKind::C, "src/main.c");

        let cmd = dependency_scan_command(&config, &unit);

        assert_eq!(cmd.program, "gcc");
        assert_eq!(cmd.args, vec!["-MM", "src/main.c"]);
    }
}
