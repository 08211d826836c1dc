use crate::command::{CapturedOutput, ExitCode, ProcessRunner};
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};
use tracing::{debug, info};

/// Runs menu commands through `sh -c`, so pipes, `&&` and globbing in menu commands work.
pub struct ShellRunner {
    shell: String,
    vars: HashMap<String, String>,
}

impl ShellRunner {
    /// Runner that sets `vars` on top of the inherited environment of every child.
    pub fn new(vars: HashMap<String, String>) -> Self {
        Self {
            shell: "sh".to_string(),
            vars,
        }
    }

    /// Use a different POSIX shell binary (for example `bash`).
    pub fn with_shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = shell.into();
        self
    }

    fn command(&self, command: &str, cwd: &Path) -> Command {
        let mut cmd = Command::new(&self.shell);
        cmd.arg("-c")
            .arg(command)
            .envs(self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .current_dir(cwd);
        cmd
    }
}

impl ProcessRunner for ShellRunner {
    fn run_captured(&mut self, command: &str, cwd: &Path) -> Result<CapturedOutput> {
        info!(command, cwd = %cwd.display(), "running captured command");
        let output = self
            .command(command, cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .with_context(|| format!("failed to spawn `{}`", command))?;

        let exit_code = exit_code_of(output.status);
        debug!(command, exit_code, "captured command finished");
        Ok(CapturedOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code,
        })
    }

    fn run_interactive(&mut self, command: &str, cwd: &Path) -> Result<ExitCode> {
        info!(command, cwd = %cwd.display(), "handing the terminal to command");
        let mut child = self
            .command(command, cwd)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .with_context(|| format!("failed to spawn `{}`", command))?;
        let status = child.wait()?;
        Ok(exit_code_of(status))
    }
}

fn exit_code_of(status: ExitStatus) -> ExitCode {
    match status.code() {
        Some(x) => x,
        None => terminated_by_signal(status),
    }
}

#[cfg(unix)]
fn terminated_by_signal(exit_status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    if let Some(signal) = ExitStatusExt::signal(&exit_status) {
        128 + signal
    } else if ExitStatusExt::core_dumped(&exit_status) {
        255
    } else {
        -1
    }
}

#[cfg(not(unix))]
fn terminated_by_signal(_exit_status: ExitStatus) -> i32 {
    -1
}
