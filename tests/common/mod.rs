#![allow(dead_code)]

use anyhow::Result;
use git_squash_branch::command::CommandExecutor;
use git_squash_branch::git::GitClient;
use git_squash_branch::github::PullRequestSource;
use git_squash_branch::types::{PrReference, PullRequest};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

// Constants for test Git user configuration
const TEST_USER_NAME: &str = "Test User";
const TEST_USER_EMAIL: &str = "test@example.com";

/// Git test repository wrapper with helper methods
pub struct TestRepo {
    dir: TempDir,
    executor: CommandExecutor,
}

impl TestRepo {
    /// Creates a new repository whose initial branch is `master`
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let executor = CommandExecutor::in_dir(dir.path());
        let repo = Self { dir, executor };

        repo.git(&["init"]);
        // Independent of the user's init.defaultBranch
        repo.git(&["symbolic-ref", "HEAD", "refs/heads/master"]);
        repo.git(&["config", "user.name", TEST_USER_NAME]);
        repo.git(&["config", "user.email", TEST_USER_EMAIL]);
        repo.git(&["config", "commit.gpgsign", "false"]);
        repo
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Client for the code under test
    pub fn client(&self) -> GitClient {
        GitClient::new(CommandExecutor::in_dir(self.path()))
    }

    /// Run git and return trimmed stdout, panicking on failure
    pub fn git(&self, args: &[&str]) -> String {
        let mut full = vec!["git"];
        full.extend_from_slice(args);
        self.executor
            .run(&full)
            .unwrap_or_else(|e| panic!("git {} failed: {e}", args.join(" ")))
            .stdout
    }

    pub fn write(&self, filename: &str, content: &str) {
        fs::write(self.path().join(filename), content).unwrap();
    }

    /// Write a file, stage it and commit. Returns the new commit id.
    pub fn commit_file(&self, filename: &str, content: &str, message: &str) -> String {
        self.write(filename, content);
        self.git(&["add", filename]);
        self.git(&["commit", "-m", message]);
        self.head()
    }

    pub fn head(&self) -> String {
        self.git(&["rev-parse", "HEAD"])
    }

    pub fn tree(&self, rev: &str) -> String {
        self.git(&["rev-parse", &format!("{rev}^{{tree}}")])
    }

    pub fn current_branch(&self) -> String {
        self.git(&["branch", "--show-current"])
    }

    /// Full log of HEAD, one message body per commit
    pub fn log_messages(&self) -> Vec<String> {
        self.git(&["log", "--format=%s"])
            .lines()
            .map(String::from)
            .collect()
    }

    pub fn parent_count(&self, rev: &str) -> usize {
        self.git(&["rev-list", "--parents", "-n", "1", rev])
            .split_whitespace()
            .count()
            - 1
    }

    pub fn commit_count(&self, range: &str) -> usize {
        self.git(&["rev-list", "--count", range]).parse().unwrap()
    }

    pub fn branches(&self, pattern: &str) -> Vec<String> {
        self.client().list_branches(pattern).unwrap()
    }

    /// Install an executable hook script
    #[cfg(unix)]
    pub fn install_hook(&self, name: &str, script: &str) {
        install_hook(&self.path().join(".git").join("hooks"), name, script);
    }

    /// Scenario used throughout: `master` with commit-1, `branch-a` with
    /// commit-2 and commit-3 on top.
    pub fn with_feature_branch() -> Self {
        let repo = Self::new();
        repo.commit_file("file", "", "commit-1");
        repo.git(&["checkout", "-b", "branch-a"]);
        repo.commit_file("file", "foo", "commit-2");
        repo.commit_file("file", "bar", "commit-3");
        repo
    }
}

/// Bare repository standing in for a hosted remote
pub struct BareRemote {
    dir: TempDir,
    executor: CommandExecutor,
}

impl BareRemote {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let executor = CommandExecutor::in_dir(dir.path());
        executor.run(&["git", "init", "--bare"]).unwrap();
        executor
            .run(&["git", "symbolic-ref", "HEAD", "refs/heads/master"])
            .unwrap();
        Self { dir, executor }
    }

    pub fn path_str(&self) -> &str {
        self.dir.path().to_str().unwrap()
    }

    pub fn rev_parse(&self, rev: &str) -> String {
        self.executor.run(&["git", "rev-parse", rev]).unwrap().stdout
    }

    pub fn commit_count(&self, range: &str) -> usize {
        self.executor
            .run(&["git", "rev-list", "--count", range])
            .unwrap()
            .stdout
            .parse()
            .unwrap()
    }

    pub fn subject(&self, rev: &str) -> String {
        self.executor
            .run(&["git", "log", "-1", "--format=%s", rev])
            .unwrap()
            .stdout
    }

    /// Make every push fail
    #[cfg(unix)]
    pub fn reject_pushes(&self) {
        install_hook(
            &self.dir.path().join("hooks"),
            "pre-receive",
            "#!/bin/sh\necho 'pushes are disabled' >&2\nexit 1\n",
        );
    }
}

#[cfg(unix)]
fn install_hook(hooks_dir: &Path, name: &str, script: &str) {
    use std::os::unix::fs::PermissionsExt;

    fs::create_dir_all(hooks_dir).unwrap();
    let hook = hooks_dir.join(name);
    fs::write(&hook, script).unwrap();
    fs::set_permissions(&hook, fs::Permissions::from_mode(0o755)).unwrap();
}

/// Pull request source that always returns the same record
pub struct FixedPullRequest {
    pub pull_request: PullRequest,
    pub available: bool,
}

impl FixedPullRequest {
    pub fn new(number: u32, base: &str, head: &str, head_oid: &str) -> Self {
        Self {
            pull_request: PullRequest {
                number,
                title: "Add feature".to_string(),
                base_ref_name: base.to_string(),
                head_ref_name: head.to_string(),
                head_ref_oid: head_oid.to_string(),
                url: format!("https://github.com/owner/repo/pull/{number}"),
            },
            available: true,
        }
    }
}

impl PullRequestSource for FixedPullRequest {
    fn ensure_available(&self) -> Result<()> {
        if self.available {
            Ok(())
        } else {
            Err(git_squash_branch::error::SquashError::GhUnavailable.into())
        }
    }

    fn fetch_pull_request(&self, _reference: &PrReference) -> Result<PullRequest> {
        Ok(self.pull_request.clone())
    }
}

/// Local clone state for PR tests: `master` with a base commit and a
/// `feature` branch with two commits, both pushed to `remote`.
pub struct PrFixture {
    pub remote: BareRemote,
    pub repo: TestRepo,
    pub feature_tip: String,
}

impl PrFixture {
    pub fn new() -> Self {
        let remote = BareRemote::new();
        let repo = TestRepo::new();
        repo.git(&["remote", "add", "origin", remote.path_str()]);

        repo.commit_file("base.txt", "base", "initial");
        repo.git(&["checkout", "-b", "feature"]);
        repo.commit_file("feature.txt", "one", "feature part 1");
        let feature_tip = repo.commit_file("feature.txt", "one\ntwo", "feature part 2");
        repo.git(&["push", "origin", "master", "feature"]);
        repo.git(&["checkout", "master"]);

        Self {
            remote,
            repo,
            feature_tip,
        }
    }

    pub fn pull_request(&self) -> FixedPullRequest {
        FixedPullRequest::new(7, "master", "feature", &self.feature_tip)
    }
}
