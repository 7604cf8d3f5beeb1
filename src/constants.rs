/// Constants used throughout the application

/// Default remote name
pub const DEFAULT_REMOTE: &str = "origin";

/// Environment variable that overrides the default remote
pub const REMOTE_ENV_VAR: &str = "GIT_SQUASH_REMOTE";

/// Substring git prints to stderr outside of a repository.
/// git has no structured exit code for this, so the match is on the message text.
pub const NOT_A_REPOSITORY_MARKER: &str = "not a git repository";

/// Substring present in `gh --version` output of a genuine GitHub CLI
pub const GH_VERSION_MARKER: &str = "https://github.com/cli/cli/releases/tag/";

/// Fields requested from `gh pr view --json`
pub const PR_JSON_FIELDS: &str = "title,number,baseRefName,headRefName,headRefOid,url";

/// Separator between the original branch name and the timestamp
pub const TEMP_BRANCH_SEPARATOR: char = '_';

/// Temporary branch prefix used when HEAD was detached
pub const DETACHED_BRANCH_PREFIX: &str = "detached";
