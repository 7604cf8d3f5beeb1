//! Squashing a pull request branch on the remote.
//!
//! The PR head is checked out into a temporary local branch, squashed against
//! the PR base, and force-pushed back over the head branch. Whatever happens in
//! between, the local checkout is put back on the original branch and the
//! temporary branch is deleted before returning.
//!
//! No remote-side locking is done: anything pushed to the head branch between
//! the fetch and the force-push is overwritten.

use crate::constants::{DETACHED_BRANCH_PREFIX, TEMP_BRANCH_SEPARATOR};
use crate::git::GitClient;
use crate::github::PullRequestSource;
use crate::squash::SquashEngine;
use crate::types::{HeadSnapshot, OriginalHead, PrReference, PrSquashOutcome, PullRequest};
use anyhow::{Context, Result};
use chrono::Utc;
use std::fmt;

/// Steps of a pull request squash, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrStep {
    AssertClean,
    FetchPr,
    FetchRemoteBranches,
    CreateTempBranch,
    RunSquash,
    PushRewrite,
    Cleanup,
}

impl fmt::Display for PrStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PrStep::AssertClean => "check working tree",
            PrStep::FetchPr => "fetch pull request",
            PrStep::FetchRemoteBranches => "fetch remote branches",
            PrStep::CreateTempBranch => "create temporary branch",
            PrStep::RunSquash => "squash pull request",
            PrStep::PushRewrite => "push squashed branch",
            PrStep::Cleanup => "restore original branch",
        };
        f.write_str(name)
    }
}

/// Main orchestrator for squashing a remote pull request
pub struct PrSquasher<S> {
    git: GitClient,
    source: S,
    remote: String,
}

impl<S: PullRequestSource> PrSquasher<S> {
    pub fn new(git: GitClient, source: S, remote: impl Into<String>) -> Self {
        Self {
            git,
            source,
            remote: remote.into(),
        }
    }

    /// Squash the pull request named by `reference` and force-push the result.
    ///
    /// An absent or empty `message` defaults to `"<title> (#<number>)"`.
    pub fn squash_pr(
        &self,
        reference: &PrReference,
        message: Option<&str>,
    ) -> Result<PrSquashOutcome> {
        self.git
            .assert_clean_tree()
            .with_context(|| failed(PrStep::AssertClean))?;
        self.source.ensure_available()?;

        tracing::info!("Fetching PR {reference}");
        let pull_request = self
            .source
            .fetch_pull_request(reference)
            .with_context(|| failed(PrStep::FetchPr))?;

        let head = self.git.head_snapshot()?;
        let message = message
            .filter(|message| !message.is_empty())
            .map(String::from)
            .unwrap_or_else(|| pull_request.default_message());

        tracing::info!("Fetching branches from remote {:?}", self.remote);
        self.git
            .fetch(
                &self.remote,
                &[
                    pull_request.base_ref_name.as_str(),
                    pull_request.head_ref_name.as_str(),
                ],
            )
            .with_context(|| failed(PrStep::FetchRemoteBranches))?;

        let temp_name = temporary_branch_name(&head, Utc::now().timestamp_millis());
        let temp = TemporaryBranch::new(&self.git, temp_name, head.original_head());

        let rewritten = self.rewrite(&temp, &pull_request, &message);
        let cleanup = temp.release();

        let new_commit = match (rewritten, cleanup) {
            (Ok(new_commit), Ok(())) => new_commit,
            (Ok(_), Err(cleanup_err)) => return Err(cleanup_err),
            (Err(err), Ok(())) => return Err(err),
            (Err(err), Err(cleanup_err)) => {
                tracing::warn!(
                    error = %format!("{cleanup_err:#}"),
                    "local repository may need manual recovery"
                );
                return Err(err);
            }
        };

        Ok(PrSquashOutcome {
            pull_request,
            remote: self.remote.clone(),
            message,
            new_commit,
        })
    }

    /// Check out, squash and push the PR head. Returns the pushed commit id.
    fn rewrite(
        &self,
        temp: &TemporaryBranch<'_>,
        pull_request: &PullRequest,
        message: &str,
    ) -> Result<String> {
        let remote_head = format!("{}/{}", self.remote, pull_request.head_ref_name);
        let remote_base = format!("{}/{}", self.remote, pull_request.base_ref_name);

        tracing::debug!(branch = temp.name(), start = %remote_head, "creating temporary branch");
        self.git
            .checkout_new_branch(&remote_head, temp.name())
            .with_context(|| failed(PrStep::CreateTempBranch))?;

        tracing::info!("Squashing PR");
        let outcome = SquashEngine::new(self.git.clone())
            .squash(&remote_base, message)
            .with_context(|| failed(PrStep::RunSquash))?;

        tracing::info!("Pushing to remote {:?}", self.remote);
        self.git
            .force_push(&self.remote, temp.name(), &pull_request.head_ref_name)
            .with_context(|| failed(PrStep::PushRewrite))?;

        Ok(outcome.new_commit)
    }
}

fn failed(step: PrStep) -> String {
    format!("Failed to {step}")
}

/// Name for the temporary branch: original branch plus a millisecond timestamp
pub fn temporary_branch_name(head: &HeadSnapshot, timestamp_millis: i64) -> String {
    let prefix = head.branch.as_deref().unwrap_or(DETACHED_BRANCH_PREFIX);
    format!("{prefix}{TEMP_BRANCH_SEPARATOR}{timestamp_millis}")
}

/// A temporary local branch that must not outlive the operation using it.
///
/// [`release`](Self::release) hard-resets, force-checks-out the original head
/// and deletes the branch. Dropping without releasing does the same, but can
/// only log failures.
pub struct TemporaryBranch<'a> {
    git: &'a GitClient,
    name: String,
    original: OriginalHead,
    released: bool,
}

impl<'a> TemporaryBranch<'a> {
    pub fn new(git: &'a GitClient, name: String, original: OriginalHead) -> Self {
        Self {
            git,
            name,
            original,
            released: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Restore the original head and delete the branch.
    ///
    /// Every step is attempted even if an earlier one fails; the first failure
    /// is returned.
    pub fn release(mut self) -> Result<()> {
        self.released = true;
        self.restore()
    }

    fn restore(&self) -> Result<()> {
        tracing::info!("Switching branch back to {:?}", self.original.to_string());

        // A failed commit can leave staged changes behind.
        let reset = self.git.reset_hard(None);
        let checkout = self.git.force_checkout(self.original.checkout_target());
        let delete = self.git.delete_branch(&self.name);

        let mut first_error = None;
        for (action, result) in [
            ("reset", reset),
            ("checkout", checkout),
            ("delete temporary branch", delete),
        ] {
            if let Err(err) = result {
                tracing::warn!(action, error = %format!("{err:#}"), "cleanup step failed");
                first_error.get_or_insert(err);
            }
        }

        match first_error {
            Some(err) => Err(err.context(failed(PrStep::Cleanup))),
            None => Ok(()),
        }
    }
}

impl Drop for TemporaryBranch<'_> {
    fn drop(&mut self) {
        if !self.released {
            self.released = true;
            if let Err(err) = self.restore() {
                tracing::warn!(
                    branch = %self.name,
                    error = %format!("{err:#}"),
                    "failed to clean up temporary branch"
                );
            }
        }
    }
}
