use crate::types::{PrSquashOutcome, SquashOutcome};

const SUCCESS_MARK: &str = "✔";

/// Summary printed after squashing the current branch
pub fn squash_summary(outcome: &SquashOutcome) -> String {
    format!(
        "{SUCCESS_MARK} Successfully squashed with message:\n{}\n\n\
         To revert back to the original commit:\n  git reset --hard {}",
        outcome.message, outcome.original_commit
    )
}

/// Summary printed after squashing a pull request on the remote
pub fn pr_squash_summary(outcome: &PrSquashOutcome) -> String {
    let pr = &outcome.pull_request;
    let remote = &outcome.remote;
    let head = &pr.head_ref_name;

    let mut title = format!("PR #{}", pr.number);
    if !pr.url.is_empty() {
        title.push_str(&format!(" ({})", pr.url));
    }

    format!(
        "{SUCCESS_MARK} Successfully squashed {title} with message:\n{}\n\n\
         To revert the PR back to the original commit:\n  git push -f {remote} {}:{head}\n\n\
         If you have the branch locally, hard-reset it to the squashed remote branch:\n  \
         git checkout {head} && git reset --hard {remote}/{head}",
        outcome.message, pr.head_ref_oid
    )
}
