use crate::error::CommandError;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Handles command execution with consistent error handling
#[derive(Debug, Clone, Default)]
pub struct CommandExecutor {
    current_dir: Option<PathBuf>,
}

impl CommandExecutor {
    /// Create a CommandExecutor that runs in the process working directory
    pub fn new() -> Self {
        Self { current_dir: None }
    }

    /// Create a CommandExecutor that runs every command inside `dir`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            current_dir: Some(dir.as_ref().to_path_buf()),
        }
    }

    /// Execute a command and return the result
    pub fn run(&self, args: &[&str]) -> Result<CommandOutput, CommandError> {
        self.run_with_check(args, true)
    }

    /// Execute a command with optional error checking
    pub fn run_with_check(&self, args: &[&str], check: bool) -> Result<CommandOutput, CommandError> {
        self.execute(args, &[], check)
    }

    /// Execute a command without checking the exit code
    pub fn run_unchecked(&self, args: &[&str]) -> Result<CommandOutput, CommandError> {
        self.run_with_check(args, false)
    }

    /// Execute a command with extra environment variables, without checking the exit code
    pub fn run_unchecked_with_env(
        &self,
        args: &[&str],
        env: &[(&str, &str)],
    ) -> Result<CommandOutput, CommandError> {
        self.execute(args, env, false)
    }

    fn execute(
        &self,
        args: &[&str],
        env: &[(&str, &str)],
        check: bool,
    ) -> Result<CommandOutput, CommandError> {
        let (program, rest) = args.split_first().ok_or(CommandError::Empty)?;
        let command_line = args.join(" ");

        tracing::debug!(command = %command_line, "executing");

        let mut command = Command::new(program);
        command.args(rest);
        if let Some(dir) = &self.current_dir {
            command.current_dir(dir);
        }
        for (key, value) in env {
            command.env(key, value);
        }

        let output = command.output().map_err(|source| CommandError::Spawn {
            command: command_line.clone(),
            source,
        })?;

        let result = CommandOutput::from(output);

        if check && !result.success() {
            tracing::debug!(
                command = %command_line,
                exit_code = result.exit_code,
                stdout = %result.stdout,
                stderr = %result.stderr,
                "command failed"
            );
            return Err(CommandError::Failed {
                command: command_line,
                exit_code: result.exit_code,
                stderr: result.stderr,
            });
        }

        Ok(result)
    }
}

/// Result of command execution, with both streams trimmed
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl CommandOutput {
    /// Check if the command was successful
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

impl From<Output> for CommandOutput {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            exit_code: output.status.code().unwrap_or(-1),
        }
    }
}
