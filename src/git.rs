use crate::command::CommandExecutor;
use crate::constants::NOT_A_REPOSITORY_MARKER;
use crate::error::{CommandError, SquashError};
use crate::types::HeadSnapshot;
use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;

static REMOTE_HEAD_BRANCH_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r" {2}HEAD branch: (.*)").expect("Invalid remote HEAD regex"));

/// Value git reports when the remote HEAD cannot be determined
const UNKNOWN_REMOTE_HEAD: &str = "(unknown)";

/// Handles all git operations
#[derive(Debug, Clone)]
pub struct GitClient {
    executor: CommandExecutor,
}

impl GitClient {
    /// Create a new GitClient
    pub fn new(executor: CommandExecutor) -> Self {
        Self { executor }
    }

    fn git(&self, args: &[&str]) -> Result<String, CommandError> {
        let mut full = Vec::with_capacity(args.len() + 1);
        full.push("git");
        full.extend_from_slice(args);
        Ok(self.executor.run(&full)?.stdout)
    }

    /// Fail unless tracked files have no staged or unstaged modifications.
    /// Untracked files are ignored.
    pub fn assert_clean_tree(&self) -> Result<()> {
        let status = match self.git(&["status", "--porcelain", "--untracked-files=no"]) {
            Ok(status) => status,
            Err(err) => {
                // Fragile: git offers no structured signal for this case.
                if err
                    .stderr()
                    .is_some_and(|stderr| stderr.contains(NOT_A_REPOSITORY_MARKER))
                {
                    return Err(SquashError::NotARepository.into());
                }
                return Err(err.into());
            }
        };

        if !status.is_empty() {
            return Err(SquashError::DirtyWorkingTree.into());
        }
        Ok(())
    }

    /// Resolve a revision to a full commit id
    pub fn rev_parse(&self, rev: &str) -> Result<String> {
        self.git(&["rev-parse", rev])
            .with_context(|| format!("Failed to resolve {rev}"))
    }

    pub fn current_commit(&self) -> Result<String> {
        self.rev_parse("HEAD")
    }

    /// Full message of the HEAD commit
    pub fn current_commit_message(&self) -> Result<String> {
        Ok(self.git(&["--no-pager", "log", "-1", "--pretty=%B"])?)
    }

    /// Name of the checked out branch, `None` when HEAD is detached
    pub fn current_branch(&self) -> Result<Option<String>> {
        let branch = self.git(&["branch", "--show-current"])?;
        Ok(if branch.is_empty() { None } else { Some(branch) })
    }

    /// Read the current commit and branch name. Both are read-only, so they
    /// are queried in parallel.
    pub fn head_snapshot(&self) -> Result<HeadSnapshot> {
        let (commit, branch) = std::thread::scope(|scope| {
            let commit = scope.spawn(|| self.current_commit());
            let branch = scope.spawn(|| self.current_branch());
            (
                commit
                    .join()
                    .unwrap_or_else(|panic| std::panic::resume_unwind(panic)),
                branch
                    .join()
                    .unwrap_or_else(|panic| std::panic::resume_unwind(panic)),
            )
        });

        Ok(HeadSnapshot {
            commit: commit?,
            branch: branch?,
        })
    }

    /// Local branch names matching a `git branch --list` pattern
    pub fn list_branches(&self, pattern: &str) -> Result<Vec<String>> {
        let output = self.git(&["branch", "--list", "--format=%(refname:short)", pattern])?;
        Ok(output
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect())
    }

    /// Nearest common ancestor of two revisions
    pub fn merge_base(&self, a: &str, b: &str) -> Result<String> {
        self.git(&["merge-base", a, b])
            .with_context(|| format!("Failed to find a common ancestor of {a} and {b}"))
    }

    /// HEAD branch advertised by `remote`, if git can tell
    pub fn remote_default_branch(&self, remote: &str) -> Result<Option<String>> {
        let output = self
            .executor
            .run_unchecked_with_env(&["git", "remote", "show", remote], &[("LC_ALL", "C")])?;
        Ok(parse_remote_head_branch(&output.stdout))
    }

    pub fn fetch(&self, remote: &str, refs: &[&str]) -> Result<()> {
        let mut args = vec!["fetch", remote];
        args.extend_from_slice(refs);
        self.git(&args)?;
        Ok(())
    }

    /// Create `branch` at `start_point` and check it out
    pub fn checkout_new_branch(&self, start_point: &str, branch: &str) -> Result<()> {
        self.git(&["checkout", start_point, "-b", branch])?;
        Ok(())
    }

    /// Check out `target`, discarding local modifications
    pub fn force_checkout(&self, target: &str) -> Result<()> {
        self.git(&["checkout", "-f", target])?;
        Ok(())
    }

    /// Move the branch pointer to `commit`, leaving the index and working tree alone
    pub fn reset_soft(&self, commit: &str) -> Result<()> {
        self.git(&["reset", "--soft", commit])?;
        Ok(())
    }

    /// Reset index and working tree, to `commit` when given, otherwise to HEAD
    pub fn reset_hard(&self, commit: Option<&str>) -> Result<()> {
        match commit {
            Some(commit) => self.git(&["reset", "--hard", commit])?,
            None => self.git(&["reset", "--hard"])?,
        };
        Ok(())
    }

    /// Commit the index without running commit hooks
    pub fn commit_no_verify(&self, message: &str) -> Result<()> {
        self.git(&["commit", "--no-verify", "--message", message])?;
        Ok(())
    }

    /// Build a parentless commit object for `tree` and return its id
    pub fn commit_tree(&self, tree: &str, message: &str) -> Result<String> {
        Ok(self.git(&["commit-tree", tree, "-m", message])?)
    }

    /// Overwrite `remote_branch` on `remote` with `local_branch`
    pub fn force_push(&self, remote: &str, local_branch: &str, remote_branch: &str) -> Result<()> {
        let refspec = format!("{local_branch}:{remote_branch}");
        self.git(&["push", "--no-verify", "-f", remote, &refspec])?;
        Ok(())
    }

    pub fn delete_branch(&self, branch: &str) -> Result<()> {
        self.git(&["branch", "-D", branch])?;
        Ok(())
    }
}

fn parse_remote_head_branch(output: &str) -> Option<String> {
    REMOTE_HEAD_BRANCH_REGEX
        .captures(output)
        .map(|caps| caps[1].trim().to_string())
        .filter(|branch| !branch.is_empty() && branch != UNKNOWN_REMOTE_HEAD)
}
