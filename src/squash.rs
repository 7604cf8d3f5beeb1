use crate::git::GitClient;
use crate::types::SquashOutcome;
use anyhow::Result;

/// Rewrites the current branch into a single commit relative to a base.
///
/// The caller is responsible for checking that the working tree is clean.
pub struct SquashEngine {
    git: GitClient,
}

impl SquashEngine {
    pub fn new(git: GitClient) -> Self {
        Self { git }
    }

    /// Squash everything on the current branch since it diverged from `base`
    /// into one commit with `message`.
    ///
    /// When `base` names the current branch itself, the whole history is
    /// collapsed into a single root commit instead.
    pub fn squash(&self, base: &str, message: &str) -> Result<SquashOutcome> {
        let original_commit = self.git.current_commit()?;
        let current_branch = self.git.current_branch()?;

        let root = current_branch.as_deref() == Some(base);
        if root {
            self.squash_to_root(message)?;
        } else {
            self.squash_onto_merge_base(base, message)?;
        }

        let new_commit = self.git.current_commit()?;
        tracing::debug!(%original_commit, %new_commit, root, "squashed");

        Ok(SquashOutcome {
            original_commit,
            new_commit,
            message: message.to_string(),
            root,
        })
    }

    fn squash_onto_merge_base(&self, base: &str, message: &str) -> Result<()> {
        // Resetting to `base` itself would revert upstream changes to files this
        // branch never touched. The merge base keeps exactly this branch's diff.
        let merge_base = self.git.merge_base(base, "HEAD")?;

        // Soft keeps every change staged, so the commit picks them all up as-is.
        self.git.reset_soft(&merge_base)?;

        // Hooks already ran when the original commits were made.
        self.git.commit_no_verify(message)
    }

    fn squash_to_root(&self, message: &str) -> Result<()> {
        let tree = self.git.rev_parse("HEAD^{tree}")?;
        let root_commit = self.git.commit_tree(&tree, message)?;
        self.git.reset_hard(Some(&root_commit))
    }
}
