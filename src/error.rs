use thiserror::Error;

/// Failure of a single external command
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("No command provided")]
    Empty,

    #[error("Failed to execute command: {command}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command failed with exit code {exit_code}: {command}\n{stderr}")]
    Failed {
        command: String,
        exit_code: i32,
        stderr: String,
    },
}

impl CommandError {
    /// Standard error text of a failed command, if it ran at all
    pub fn stderr(&self) -> Option<&str> {
        match self {
            CommandError::Failed { stderr, .. } => Some(stderr),
            _ => None,
        }
    }
}

/// Preconditions checked before any mutation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SquashError {
    #[error("Not in a git repository")]
    NotARepository,

    #[error("Working tree is not clean")]
    DirtyWorkingTree,

    #[error("Missing base branch. Specify it manually with the --base flag.")]
    MissingBase,

    #[error("You must have GitHub CLI installed to use this command: https://cli.github.com")]
    GhUnavailable,
}
