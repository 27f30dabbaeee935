//! CLI definitions using clap.
//!
//! amake keeps its historical single-dash grammar (`-src <dir>`,
//! `-o <name>`) and forwards every unrecognised token to the compiler, so
//! raw arguments are first split by [`split_args`]. Only the tool options
//! reach clap.

use std::time::Duration;

use amake::core::BuildConfig;
use amake::util::shell::ColorChoice;
use clap::Parser;

/// amake - Simple Makefile generator
#[derive(Debug, Parser)]
#[command(name = "amake")]
#[command(version, about = "amake - Simple Makefile generator", long_about = None)]
#[command(args_override_self = true)]
#[command(
    override_usage = "amake [-src <DIR>] [-o <NAME>] [OPTIONS] [COMPILER FLAGS...] [-l<LIB>|-L<DIR>...]"
)]
#[command(after_help = "Arguments starting with -l or -L are added to LIBS.\n\
                        Any other argument is passed to the compiler through FLAGS.")]
pub struct Cli {
    /// Directory to scan for sources (given as -src)
    #[arg(long = "src", value_name = "DIR")]
    pub src: Option<String>,

    /// Name of the linked executable
    #[arg(short = 'o', long = "output", value_name = "NAME")]
    pub output: Option<String>,

    /// Print the Makefile to stdout instead of writing ./Makefile
    #[arg(long)]
    pub stdout: bool,

    /// Number of concurrent dependency scans
    #[arg(long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Give up on a dependency scan after this many seconds
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub scan_timeout: Option<u64>,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Only print errors
    #[arg(long)]
    pub quiet: bool,

    /// Coloring: auto, always, never
    #[arg(long, value_name = "WHEN", default_value = "auto")]
    pub color: ColorChoice,

    /// Compiler flags and libraries, routed by `-l`/`-L` prefix
    #[arg(skip)]
    pub passthrough: Vec<String>,
}

impl Cli {
    /// Parse the process arguments.
    pub fn parse_args() -> Self {
        Self::parse_tokens(std::env::args())
    }

    /// Parse a full argument list, program name first.
    pub fn parse_tokens<I>(args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let split = split_args(args);
        let mut cli = Cli::parse_from(split.tool);
        cli.passthrough = split.passthrough;
        cli
    }

    /// Layer the command line on top of an already resolved configuration.
    pub fn apply(&self, mut config: BuildConfig) -> BuildConfig {
        if let Some(src) = &self.src {
            config.src_dir = src.clone();
        }
        if let Some(name) = &self.output {
            config.exec_name = name.clone();
        }
        if let Some(jobs) = self.jobs {
            config.jobs = jobs.max(1);
        }
        if let Some(secs) = self.scan_timeout {
            config.scan_timeout = Duration::from_secs(secs);
        }
        config.with_passthrough(self.passthrough.iter().cloned())
    }
}

/// Raw arguments split into tool options and compiler pass-through tokens.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SplitArgs {
    /// Program name followed by normalised tool options, for clap
    pub tool: Vec<String>,
    /// Everything else, in input order
    pub passthrough: Vec<String>,
}

const SWITCHES: &[&str] = &["--verbose", "--quiet", "--stdout", "--version"];
const VALUED: &[&str] = &["--color", "--jobs", "--scan-timeout"];

/// Split raw arguments, program name first.
///
/// `--help` and `-src` match case-insensitively. A trailing `-o` or `-src`
/// without a value is dropped.
pub fn split_args<I>(args: I) -> SplitArgs
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let mut split = SplitArgs {
        tool: vec![args.next().unwrap_or_else(|| "amake".to_string())],
        passthrough: Vec::new(),
    };

    while let Some(arg) = args.next() {
        if arg.eq_ignore_ascii_case("--help") {
            split.tool.push("--help".to_string());
        } else if arg.eq_ignore_ascii_case("-src") {
            if let Some(dir) = args.next() {
                split.tool.push(format!("--src={}", dir));
            }
        } else if arg == "-o" {
            if let Some(name) = args.next() {
                split.tool.push(format!("--output={}", name));
            }
        } else if SWITCHES.contains(&arg.as_str()) {
            split.tool.push(arg);
        } else if VALUED.contains(&arg.as_str()) {
            match args.next() {
                Some(value) => split.tool.push(format!("{}={}", arg, value)),
                None => split.tool.push(arg),
            }
        } else if VALUED
            .iter()
            .any(|opt| arg.starts_with(opt) && arg[opt.len()..].starts_with('='))
        {
            split.tool.push(arg);
        } else {
            split.passthrough.push(arg);
        }
    }

    split
}
