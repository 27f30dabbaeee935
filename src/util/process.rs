//! Subprocess execution utilities.

use std::ffi::OsStr;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::builder::toolchain::CommandSpec;

/// How often a running child is polled while a timeout is armed.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// How a child process ended.
#[derive(Debug)]
pub enum ProcessOutcome {
    /// The child exited on its own.
    Exited {
        status: ExitStatus,
        /// Everything the child wrote to stderr
        stderr: String,
    },
    /// The child outlived its timeout and was killed.
    TimedOut { after: Duration },
}

/// Builder for subprocess execution.
#[derive(Debug, Clone)]
pub struct ProcessBuilder {
    program: PathBuf,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl ProcessBuilder {
    /// Create a new process builder for the given program.
    pub fn new(program: impl AsRef<Path>) -> Self {
        ProcessBuilder {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            timeout: None,
        }
    }

    /// Create a process builder from a command spec.
    pub fn from_spec(spec: &CommandSpec) -> Self {
        ProcessBuilder::new(&spec.program).args(&spec.args)
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_string_lossy().into_owned());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args.extend(
            args.into_iter()
                .map(|s| s.as_ref().to_string_lossy().into_owned()),
        );
        self
    }

    /// Kill the child if it runs longer than `timeout`.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }

    /// Run the command with stdout redirected into `stdout`.
    ///
    /// Stderr is captured in memory. Spawn and wait failures are returned as
    /// `Err`; a non-zero exit is a normal [`ProcessOutcome::Exited`].
    pub fn exec_with_stdout(&self, stdout: File) -> io::Result<ProcessOutcome> {
        let mut cmd = self.build_command();
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::from(stdout));
        cmd.stderr(Stdio::piped());

        let mut child = cmd.spawn()?;

        // Drain stderr on a side thread so a chatty child cannot fill the
        // pipe and stall while we poll.
        let stderr_reader = child.stderr.take().map(|mut pipe| {
            thread::spawn(move || {
                let mut buf = String::new();
                let _ = pipe.read_to_string(&mut buf);
                buf
            })
        });

        // A limit too far in the future to represent is no limit at all.
        let deadline = self
            .timeout
            .and_then(|limit| Instant::now().checked_add(limit).map(|at| (limit, at)));

        let status = match deadline {
            None => child.wait()?,
            Some((limit, deadline)) => {
                loop {
                    if let Some(status) = child.try_wait()? {
                        break status;
                    }
                    if Instant::now() >= deadline {
                        tracing::debug!("killing `{}` after {:?}", self.display_command(), limit);
                        let _ = child.kill();
                        let _ = child.wait();
                        return Ok(ProcessOutcome::TimedOut { after: limit });
                    }
                    thread::sleep(POLL_INTERVAL);
                }
            }
        };

        let stderr = stderr_reader
            .and_then(|handle| handle.join().ok())
            .unwrap_or_default();

        Ok(ProcessOutcome::Exited { status, stderr })
    }

    /// Display the command for error messages.
    pub fn display_command(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}
