//! Shell command execution with live output relay
//!
//! [`ShellRunner`] is the production [`CommandExecutor`]. It joins a batch of
//! command lines into one AND-chain, runs it through the platform shell,
//! attaches the child to the controlling terminal when one is available,
//! and otherwise streams every stdout/stderr line to the [`OutputSink`]
//! as it arrives.

use crate::environment::Environment;
use crate::error::Result;
use crate::output::OutputSink;
use async_trait::async_trait;
use std::fs::OpenOptions;
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command as TokioCommand;

/// Indent applied to every relayed line
pub const RELAY_INDENT: &str = "    ";

/// Flag appended when the output stream cannot render ANSI decoration
pub const NO_ANSI_FLAG: &str = "--no-ansi";

/// Flag appended when quiet mode was requested
pub const QUIET_FLAG: &str = "--quiet";

/// Commands that never receive the decoration/verbosity flags.
/// They either reject unknown options or have no such output to tame.
const PASSTHROUGH_PROGRAMS: &[&str] = &["chmod", "git", "gh", "rm", "rd"];

/// Outcome of a finished child process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessResult {
    /// Exit code, `-1` when the process was killed by a signal or never started
    pub exit_code: i32,
    /// Captured stdout and stderr lines in arrival order
    pub output: Vec<String>,
}

impl ProcessResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// First captured line, trimmed
    pub fn first_line(&self) -> Option<&str> {
        self.output
            .iter()
            .map(|l| l.trim())
            .find(|l| !l.is_empty())
    }

    fn not_started() -> Self {
        Self {
            exit_code: -1,
            output: Vec::new(),
        }
    }
}

/// The single capability every orchestrator uses to reach external processes
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Run shell command lines as one AND-chain.
    ///
    /// A non-zero exit is reported through [`ProcessResult::success`], never
    /// as an error; only spawn failures return `Err`.
    async fn run_commands(
        &self,
        commands: &[String],
        working_dir: Option<&Path>,
        suppress_output: bool,
    ) -> Result<ProcessResult>;

    /// Run one program with explicit arguments, relaying its output
    async fn run_program(
        &self,
        program: &str,
        args: &[String],
        working_dir: &Path,
    ) -> Result<ProcessResult>;

    /// Run a short-lived probe silently and capture its output.
    /// A program that cannot be started yields an unsuccessful result.
    async fn probe(&self, program: &str, args: &[&str], working_dir: Option<&Path>)
        -> ProcessResult;
}

/// Apply the flag mutation policy to each command line
pub fn prepare_commands(commands: &[String], decorated: bool, quiet: bool) -> Vec<String> {
    commands
        .iter()
        .map(|command| {
            if is_passthrough(command) {
                return command.clone();
            }
            let mut command = command.clone();
            if !decorated {
                command.push(' ');
                command.push_str(NO_ANSI_FLAG);
            }
            if quiet {
                command.push(' ');
                command.push_str(QUIET_FLAG);
            }
            command
        })
        .collect()
}

fn is_passthrough(command: &str) -> bool {
    let program = command.split_whitespace().next().unwrap_or("");
    PASSTHROUGH_PROGRAMS.contains(&program)
}

/// Quote one argument for the platform shell so it stays a single word
pub fn quote_arg(arg: &str, windows: bool) -> String {
    if windows {
        format!("\"{}\"", arg.replace('"', "\"\""))
    } else {
        format!("'{}'", arg.replace('\'', "'\\''"))
    }
}

/// Production executor backed by `tokio::process`
pub struct ShellRunner {
    env: Environment,
    sink: Arc<dyn OutputSink>,
    quiet: bool,
}

impl ShellRunner {
    pub fn new(env: Environment, sink: Arc<dyn OutputSink>) -> Self {
        Self {
            env,
            sink,
            quiet: false,
        }
    }

    /// Append the quiet flag to every eligible command
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    fn shell_command(&self, line: &str) -> TokioCommand {
        if self.env.platform.is_windows() {
            let mut command = TokioCommand::new("cmd");
            command.arg("/C").arg(line);
            command
        } else {
            let mut command = TokioCommand::new("sh");
            command.arg("-c").arg(line);
            command
        }
    }

    /// Attach stdio to the controlling terminal, if the host allows it
    fn attach_tty(&self, command: &mut TokioCommand) -> std::io::Result<bool> {
        if !self.env.tty || self.env.platform.is_windows() {
            return Ok(false);
        }
        let tty = OpenOptions::new().read(true).write(true).open("/dev/tty")?;
        command
            .stdin(tty.try_clone()?)
            .stdout(tty.try_clone()?)
            .stderr(tty);
        Ok(true)
    }

    async fn execute(&self, mut command: TokioCommand, suppress_output: bool) -> Result<ProcessResult> {
        command.kill_on_drop(true);

        if !suppress_output {
            match self.attach_tty(&mut command) {
                Ok(true) => {
                    tracing::debug!("child attached to /dev/tty");
                    let status = command.status().await?;
                    return Ok(ProcessResult {
                        exit_code: status.code().unwrap_or(-1),
                        output: Vec::new(),
                    });
                }
                Ok(false) => {}
                Err(e) => {
                    self.sink.warning(&format!(
                        "Warning: TTY mode requires /dev/tty to be read/writable ({})",
                        e
                    ));
                    command.stdin(Stdio::inherit());
                }
            }
        }

        let mut child = command
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| std::io::Error::other("Failed to capture stdout"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| std::io::Error::other("Failed to capture stderr"))?;

        let mut stdout_reader = BufReader::new(stdout).lines();
        let mut stderr_reader = BufReader::new(stderr).lines();
        let mut stdout_done = false;
        let mut stderr_done = false;
        let mut output = Vec::new();

        while !(stdout_done && stderr_done) {
            tokio::select! {
                line = stdout_reader.next_line(), if !stdout_done => match line {
                    Ok(Some(line)) => self.relay(line, suppress_output, &mut output),
                    Ok(None) => stdout_done = true,
                    Err(e) => {
                        tracing::debug!("error reading stdout: {}", e);
                        stdout_done = true;
                    }
                },
                line = stderr_reader.next_line(), if !stderr_done => match line {
                    Ok(Some(line)) => self.relay(line, suppress_output, &mut output),
                    Ok(None) => stderr_done = true,
                    Err(e) => {
                        tracing::debug!("error reading stderr: {}", e);
                        stderr_done = true;
                    }
                },
            }
        }

        let status = child.wait().await?;
        let exit_code = status.code().unwrap_or(-1);
        tracing::debug!(exit_code, "child exited");

        Ok(ProcessResult { exit_code, output })
    }

    fn relay(&self, line: String, suppress_output: bool, output: &mut Vec<String>) {
        if !suppress_output {
            self.sink.line(&format!("{}{}", RELAY_INDENT, line));
        }
        output.push(line);
    }
}

#[async_trait]
impl CommandExecutor for ShellRunner {
    async fn run_commands(
        &self,
        commands: &[String],
        working_dir: Option<&Path>,
        suppress_output: bool,
    ) -> Result<ProcessResult> {
        let prepared = prepare_commands(commands, self.env.decorated, self.quiet);
        let line = prepared.join(" && ");
        let dir = working_dir.unwrap_or(&self.env.cwd);
        tracing::debug!(command = %line, cwd = %dir.display(), "running command batch");

        let mut command = self.shell_command(&line);
        command.current_dir(dir);
        self.execute(command, suppress_output).await
    }

    async fn run_program(
        &self,
        program: &str,
        args: &[String],
        working_dir: &Path,
    ) -> Result<ProcessResult> {
        tracing::debug!(program, ?args, cwd = %working_dir.display(), "running program");

        let mut command = TokioCommand::new(program);
        command.args(args).current_dir(working_dir);
        self.execute(command, false).await
    }

    async fn probe(
        &self,
        program: &str,
        args: &[&str],
        working_dir: Option<&Path>,
    ) -> ProcessResult {
        let output = TokioCommand::new(program)
            .args(args)
            .current_dir(working_dir.unwrap_or(&self.env.cwd))
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await;

        match output {
            Ok(out) => {
                let mut lines: Vec<String> = String::from_utf8_lossy(&out.stdout)
                    .lines()
                    .map(str::to_string)
                    .collect();
                lines.extend(String::from_utf8_lossy(&out.stderr).lines().map(str::to_string));
                tracing::debug!(program, ?args, status = ?out.status.code(), "probe finished");
                ProcessResult {
                    exit_code: out.status.code().unwrap_or(-1),
                    output: lines,
                }
            }
            Err(e) => {
                tracing::debug!(program, "probe could not start: {}", e);
                ProcessResult::not_started()
            }
        }
    }
}
