//! amake CLI - A simple Makefile generator for C and C++

use std::sync::{Arc, OnceLock};

use amake::builder::CompilerScanner;
use amake::core::SourceUnit;
use amake::ops::{generate, GenerateObserver, GenerateOptions};
use amake::util::config;
use amake::util::diagnostic;
use amake::util::shell::{Progress, Shell, Status};
use amake::GenerateError;
use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

mod cli;

use cli::Cli;

fn main() {
    let cli = Cli::parse_args();
    let shell = Arc::new(Shell::from_flags(cli.quiet, cli.verbose, cli.color));

    init_tracing(&cli);

    if let Err(e) = run(&cli, &shell) {
        match e.downcast_ref::<GenerateError>() {
            Some(err) => {
                diagnostic::emit(&err.to_diagnostic(), shell.use_color());
                std::process::exit(err.exit_code());
            }
            None => {
                shell.error(format!("{:#}", e));
                std::process::exit(1);
            }
        }
    }
}

fn init_tracing(cli: &Cli) {
    let default = if cli.quiet {
        "amake=error"
    } else if cli.verbose {
        "amake=debug"
    } else {
        "amake=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn run(cli: &Cli, shell: &Arc<Shell>) -> Result<()> {
    let cwd = std::env::current_dir().context("failed to determine current directory")?;

    let global = config::global_config_path();
    let file_config = config::load_config(global.as_deref(), &config::project_config_path(&cwd));
    let build = cli.apply(file_config.resolve(|key| std::env::var(key).ok()));
    tracing::debug!(?build, "resolved configuration");

    let opts = if cli.stdout {
        GenerateOptions::render_only()
    } else {
        GenerateOptions::default()
    };

    let span = shell.span();
    let scanner = CompilerScanner::new(&build);
    let progress = ScanProgress::new(shell);
    let report = generate(&build, &scanner, &opts, &progress)?;

    if report.sources == 0 {
        shell.warn(format!("no C or C++ sources in `{}`", build.src_dir));
    }
    if report.empty_dependencies > 0 {
        shell.warn(format!(
            "{} compile rule(s) have no header dependencies",
            report.empty_dependencies
        ));
    }

    match &report.written {
        Some(path) => {
            shell.status(
                Status::Generated,
                format!(
                    "{} ({} source file(s), {} link)",
                    path.display(),
                    report.sources,
                    report.linker
                ),
            );
            span.finish_with_message("generation");
        }
        None => print!("{}", report.text),
    }

    Ok(())
}

/// Shows the dependency scan on the shell.
struct ScanProgress {
    shell: Arc<Shell>,
    bar: OnceLock<Progress>,
}

impl ScanProgress {
    fn new(shell: &Arc<Shell>) -> Self {
        ScanProgress {
            shell: Arc::clone(shell),
            bar: OnceLock::new(),
        }
    }
}

impl GenerateObserver for ScanProgress {
    fn scan_started(&self, total: usize) {
        if total > 0 {
            self.shell
                .status(Status::Scanning, format!("{} source file(s)", total));
        }
        let _ = self.bar.set(self.shell.progress(total as u64, "Scanning"));
    }

    fn scanned(&self, unit: &SourceUnit) {
        if let Some(bar) = self.bar.get() {
            bar.inc(&unit.path);
        }
    }

    fn scan_finished(&self) {
        if let Some(bar) = self.bar.get() {
            bar.finish();
        }
    }
}
