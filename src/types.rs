use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::fmt;

static PR_NUMBER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+$").expect("Invalid PR number regex"));

/// Pull request record as returned by `gh pr view --json`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequest {
    pub number: u32,
    #[serde(default)]
    pub title: String,
    pub base_ref_name: String,
    pub head_ref_name: String,
    pub head_ref_oid: String,
    #[serde(default)]
    pub url: String,
}

impl PullRequest {
    /// Commit message used when none is given on the command line
    pub fn default_message(&self) -> String {
        format!("{} (#{})", self.title, self.number)
    }
}

/// User-supplied pull request identifier: a number, a URL, or a branch name.
///
/// The raw text is forwarded untouched to the hosting CLI, which decides
/// what it refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrReference(String);

impl PrReference {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the reference is a bare PR number
    pub fn is_number(&self) -> bool {
        PR_NUMBER_REGEX.is_match(&self.0)
    }
}

impl fmt::Display for PrReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_number() {
            write!(f, "#{}", self.0)
        } else {
            f.write_str(&self.0)
        }
    }
}

/// Where HEAD points before an operation starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadSnapshot {
    pub commit: String,
    /// `None` when HEAD is detached
    pub branch: Option<String>,
}

impl HeadSnapshot {
    /// What to check out again once the operation is over
    pub fn original_head(&self) -> OriginalHead {
        match &self.branch {
            Some(branch) => OriginalHead::Branch(branch.clone()),
            None => OriginalHead::Detached(self.commit.clone()),
        }
    }
}

/// Checkout target restored after a pull request squash
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OriginalHead {
    Branch(String),
    Detached(String),
}

impl OriginalHead {
    /// Argument passed to `git checkout`
    pub fn checkout_target(&self) -> &str {
        match self {
            OriginalHead::Branch(name) => name,
            OriginalHead::Detached(commit) => commit,
        }
    }
}

impl fmt::Display for OriginalHead {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.checkout_target())
    }
}

/// Result of squashing the current branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SquashOutcome {
    pub original_commit: String,
    pub new_commit: String,
    pub message: String,
    /// True when history was collapsed into a parentless commit
    pub root: bool,
}

/// Result of squashing a pull request branch on the remote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrSquashOutcome {
    pub pull_request: PullRequest,
    pub remote: String,
    pub message: String,
    pub new_commit: String,
}
