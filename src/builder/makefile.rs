//! Makefile rendering.
//!
//! Output layout, in order:
//! 1. header comment with the generation time
//! 2. variables (compilers, linker, directories, flags, libs, objects, exec, date)
//! 3. link rule
//! 4. one compile rule per source
//! 5. object directory setup rule
//! 6. `clean`, `bzip` and `release`

use std::fmt::{self, Display};

use crate::builder::objects::OBJDIR_VAR;
use crate::builder::plan::{CompileRule, MakefilePlan};
use crate::core::build_config::RELEASE_FLAGS;

/// Marker file whose rule creates the object directory.
pub const SETUP_MARKER: &str = "__setup_obj_dir";

/// Date expression evaluated by make when a target runs.
const DATE_EXPR: &str = "$(shell date +\"%Y-%m-%d\")";

/// Layout of the timestamp in the header, as printed by ctime(3).
const HEADER_TIME_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

/// Render a plan to Makefile text.
pub fn emit(plan: &MakefilePlan<'_>) -> String {
    Makefile(plan).to_string()
}

/// Display adapter that writes a plan as a Makefile.
pub struct Makefile<'p, 'a>(pub &'p MakefilePlan<'a>);

impl Display for Makefile<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plan = self.0;
        self.write_header(f)?;
        self.write_variables(f)?;
        self.write_link_rule(f)?;
        for rule in &plan.rules {
            write_compile_rule(f, rule)?;
        }
        write_setup_rule(f)?;
        write_utility_targets(f)
    }
}

impl Makefile<'_, '_> {
    fn write_header(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "#Makefile generated by amake")?;
        writeln!(f, "#On {}", self.0.generated_at.format(HEADER_TIME_FORMAT))?;
        writeln!(f, "#To print amake help use 'amake --help'.")
    }

    fn write_variables(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plan = self.0;
        let config = plan.config;

        let objects = plan
            .objects()
            .map(|o| o.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        writeln!(f, "CC={}", config.c_compiler)?;
        writeln!(f, "CPPC={}", config.cxx_compiler)?;
        writeln!(f, "LINK={}", plan.linker.driver(config))?;
        writeln!(f, "SRCDIR={}", config.src_dir)?;
        writeln!(f, "OBJDIR={}", config.obj_dir)?;
        writeln!(f, "FLAGS={}", config.flags_line())?;
        writeln!(f, "LIBS={}", config.libs_line())?;
        writeln!(f, "OBJS={}", objects)?;
        writeln!(f, "EXEC={}", config.exec_name)?;
        writeln!(f, "DATE={}", DATE_EXPR)?;
        writeln!(f)
    }

    fn write_link_rule(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "$(EXEC) : $(OBJS)")?;
        writeln!(f, "\t$(LINK) $(OBJS) -o $(EXEC) $(FLAGS) $(LIBS)")?;
        writeln!(f)
    }
}

fn write_compile_rule(f: &mut fmt::Formatter<'_>, rule: &CompileRule<'_>) -> fmt::Result {
    // The compiler's own `name.o: prereqs` line becomes the rule head. With
    // nothing reported, fall back to the bare object target.
    if rule.deps.is_empty() {
        write!(f, "{} :", rule.object)?;
    } else {
        write!(f, "{}/{}", OBJDIR_VAR, rule.deps)?;
    }
    writeln!(f, " | {}/{}", OBJDIR_VAR, SETUP_MARKER)?;

    writeln!(
        f,
        "\t$({}) $(FLAGS) {} -c -o $@",
        rule.unit.kind.compiler_var(),
        rule.unit.path
    )?;
    writeln!(f)
}

fn write_setup_rule(f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "{}/{} :", OBJDIR_VAR, SETUP_MARKER)?;
    writeln!(f, "\tmkdir -p {}", OBJDIR_VAR)?;
    writeln!(f, "\ttouch {}/{}", OBJDIR_VAR, SETUP_MARKER)?;
    writeln!(f)
}

fn write_utility_targets(f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, ".PHONY: clean bzip release")?;
    writeln!(f)?;

    writeln!(f, "clean :")?;
    writeln!(f, "\trm -rf {}/*.o", OBJDIR_VAR)?;
    writeln!(f, "\trm -rf $(EXEC)")?;
    writeln!(f)?;

    writeln!(f, "bzip :")?;
    writeln!(f, "\ttar -cvf \"$(DATE).$(EXEC).tar\" $(SRCDIR)/* Makefile")?;
    writeln!(f, "\tbzip2 \"$(DATE).$(EXEC).tar\"")?;
    writeln!(f)?;

    writeln!(f, "release : FLAGS +={}", RELEASE_FLAGS.join(" "))?;
    writeln!(f, "release : $(EXEC)")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::depscan::DependencyLine;
    use crate::builder::objects::derive_object_paths;
    use crate::builder::toolchain::select_linker;
    use crate::core::build_config::BuildConfig;
    use crate::core::source::SourceSet;
    use crate::test_support::fixed_time;

    fn render(config: &BuildConfig, sources: &SourceSet, deps: &[&str]) -> String {
        let objects = derive_object_paths(sources).unwrap();
        let deps = deps.iter().map(|d| DependencyLine::new(*d)).collect();
        let plan = MakefilePlan::new(
            config,
            sources,
            objects,
            deps,
            select_linker(sources),
            fixed_time(),
        );
        emit(&plan)
    }

    fn line_with<'t>(text: &'t str, prefix: &str) -> &'t str {
        text.lines()
            .find(|l| l.starts_with(prefix))
            .unwrap_or_else(|| panic!("no line starting with {prefix:?} in:\n{text}"))
    }

    #[test]
    fn test_single_c_source() {
        let config = BuildConfig::default();
        let sources = SourceSet::from_paths(["./main.c"]).unwrap();

        let text = render(&config, &sources, &["main.o: main.c"]);

        assert_eq!(line_with(&text, "LINK="), "LINK=gcc");
        assert_eq!(line_with(&text, "OBJS="), "OBJS=$(OBJDIR)/main.o");
        assert!(text.contains(
            "$(OBJDIR)/main.o: main.c | $(OBJDIR)/__setup_obj_dir\n\t$(CC) $(FLAGS) ./main.c -c -o $@\n"
        ));
    }

    #[test]
    fn test_mixed_sources_use_cxx_linker() {
        let config = BuildConfig::default();
        let sources = SourceSet::from_paths(["./main.cpp", "./util.c"]).unwrap();

        let text = render(
            &config,
            &sources,
            &["main.o: main.cpp util.h", "util.o: util.c util.h"],
        );

        assert_eq!(line_with(&text, "LINK="), "LINK=g++");
        assert_eq!(
            line_with(&text, "OBJS="),
            "OBJS=$(OBJDIR)/main.o $(OBJDIR)/util.o"
        );
        assert!(text.contains("\t$(CPPC) $(FLAGS) ./main.cpp -c -o $@\n"));
        assert!(text.contains("\t$(CC) $(FLAGS) ./util.c -c -o $@\n"));

        // Compile rules follow source order
        let main_at = text.find("$(OBJDIR)/main.o:").unwrap();
        let util_at = text.find("$(OBJDIR)/util.o:").unwrap();
        assert!(main_at < util_at);
    }

    #[test]
    fn test_empty_source_set_is_still_a_valid_makefile() {
        let config = BuildConfig::default();
        let sources = SourceSet::new();

        let text = render(&config, &sources, &[]);

        assert_eq!(line_with(&text, "OBJS="), "OBJS=");
        assert_eq!(line_with(&text, "LINK="), "LINK=gcc");
        assert!(text.contains("$(EXEC) : $(OBJS)\n"));
        assert!(text.contains("\nclean :\n"));
        assert!(text.contains("\nbzip :\n"));
        assert!(text.contains("\nrelease : $(EXEC)"));
    }

    #[test]
    fn test_flags_and_libs_in_input_order() {
        let config = BuildConfig::default().with_passthrough(["-O2", "-lm", "-std=c99", "-L/opt/lib"]);
        let sources = SourceSet::from_paths(["./main.c"]).unwrap();

        let text = render(&config, &sources, &["main.o: main.c"]);

        assert_eq!(line_with(&text, "FLAGS="), "FLAGS=-g -Wall -O2 -std=c99");
        assert_eq!(line_with(&text, "LIBS="), "LIBS=-lm -L/opt/lib");
        assert_eq!(text.matches("-O2").count(), 1);
        assert_eq!(text.matches("-lm").count(), 1);
    }

    #[test]
    fn test_empty_dependency_line_falls_back_to_object_target() {
        let config = BuildConfig::default();
        let sources = SourceSet::from_paths(["./main.c"]).unwrap();

        let text = render(&config, &sources, &[""]);

        assert!(text.contains("$(OBJDIR)/main.o : | $(OBJDIR)/__setup_obj_dir\n"));
        assert!(!text.contains("$(OBJDIR)/ "));
    }

    #[test]
    fn test_multiline_dependency_line_kept_verbatim() {
        let config = BuildConfig::default();
        let sources = SourceSet::from_paths(["./main.c"]).unwrap();

        let text = render(&config, &sources, &["main.o: main.c a.h \\\n b.h"]);

        assert!(text.contains("$(OBJDIR)/main.o: main.c a.h \\\n b.h | $(OBJDIR)/__setup_obj_dir\n"));
    }

    #[test]
    fn test_variable_block_and_fixed_sections() {
        let config = BuildConfig::default()
            .with_exec_name("app")
            .with_src_dir("src");
        let sources = SourceSet::from_paths(["src/main.c"]).unwrap();

        let text = render(&config, &sources, &["main.o: src/main.c"]);

        let expected_head = "\
#Makefile generated by amake
#On Thu Mar  4 05:06:07 2021
#To print amake help use 'amake --help'.
CC=gcc
CPPC=g++
LINK=gcc
SRCDIR=src
OBJDIR=obj
FLAGS=-g -Wall
LIBS=
OBJS=$(OBJDIR)/main.o
EXEC=app
DATE=$(shell date +\"%Y-%m-%d\")

$(EXEC) : $(OBJS)
\t$(LINK) $(OBJS) -o $(EXEC) $(FLAGS) $(LIBS)

";
        assert!(text.starts_with(expected_head), "{text}");

        let expected_tail = "\
$(OBJDIR)/__setup_obj_dir :
\tmkdir -p $(OBJDIR)
\ttouch $(OBJDIR)/__setup_obj_dir

.PHONY: clean bzip release

clean :
\trm -rf $(OBJDIR)/*.o
\trm -rf $(EXEC)

bzip :
\ttar -cvf \"$(DATE).$(EXEC).tar\" $(SRCDIR)/* Makefile
\tbzip2 \"$(DATE).$(EXEC).tar\"

release : FLAGS +=-O3 -D_RELEASE
release : $(EXEC)
";
        assert!(text.ends_with(expected_tail), "{text}");
    }

    #[test]
    fn test_emission_is_deterministic() {
        let config = BuildConfig::default();
        let sources = SourceSet::from_paths(["./a.c", "./b.cc"]).unwrap();
        let deps = ["a.o: a.c", "b.o: b.cc"];

        assert_eq!(render(&config, &sources, &deps), render(&config, &sources, &deps));
    }
}
