use anyhow::Result;
use std::path::Path;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
/// Children killed by a signal are reported as `128 + signal`, like POSIX shells do.
pub type ExitCode = i32;

/// How a resolved command has to be run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandMode {
    /// Output is captured and shown once the child exits.
    Plain,
    /// The child gets the terminal (stdin/stdout/stderr are inherited).
    Interactive,
}

/// Everything a captured (plain) run produces.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: ExitCode,
}

impl CapturedOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Process execution collaborator.
///
/// The session never spawns anything itself; it hands the finished command string and the
/// working directory to an implementation of this trait. [`crate::ShellRunner`] is the real one.
pub trait ProcessRunner {
    /// Runs `command` with stdout/stderr captured and waits for it to exit.
    ///
    /// An `Err` means the process could not be started at all.
    fn run_captured(&mut self, command: &str, cwd: &Path) -> Result<CapturedOutput>;

    /// Runs `command` with the terminal inherited and waits for it to exit.
    fn run_interactive(&mut self, command: &str, cwd: &Path) -> Result<ExitCode>;
}
