use crate::command::CommandExecutor;
use crate::constants::{GH_VERSION_MARKER, PR_JSON_FIELDS};
use crate::error::SquashError;
use crate::types::{PrReference, PullRequest};
use anyhow::{Context, Result};

/// Source of pull request records
pub trait PullRequestSource {
    /// Fail with [`SquashError::GhUnavailable`] when the source cannot be used
    fn ensure_available(&self) -> Result<()>;

    /// Look up a pull request by number, URL, or branch name
    fn fetch_pull_request(&self, reference: &PrReference) -> Result<PullRequest>;
}

/// Handles all GitHub operations via gh CLI
pub struct GitHubClient {
    executor: CommandExecutor,
}

impl GitHubClient {
    /// Create a new GitHubClient
    pub fn new(executor: CommandExecutor) -> Self {
        Self { executor }
    }
}

impl PullRequestSource for GitHubClient {
    fn ensure_available(&self) -> Result<()> {
        match self.executor.run_unchecked(&["gh", "--version"]) {
            Ok(output) if is_github_cli(&output.stdout) && output.success() => Ok(()),
            Ok(_) => Err(SquashError::GhUnavailable.into()),
            Err(err) => {
                tracing::debug!(error = %err, "gh probe failed");
                Err(SquashError::GhUnavailable.into())
            }
        }
    }

    fn fetch_pull_request(&self, reference: &PrReference) -> Result<PullRequest> {
        let output = self.executor.run(&[
            "gh",
            "pr",
            "view",
            reference.as_str(),
            "--json",
            PR_JSON_FIELDS,
        ])?;

        serde_json::from_str(&output.stdout)
            .with_context(|| format!("Failed to parse PR {reference} returned by gh"))
    }
}

fn is_github_cli(version_output: &str) -> bool {
    version_output.contains(GH_VERSION_MARKER)
}
