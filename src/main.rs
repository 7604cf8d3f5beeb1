use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use dialoguer::Confirm;
use git_squash_branch::command::CommandExecutor;
use git_squash_branch::constants::{DEFAULT_REMOTE, REMOTE_ENV_VAR};
use git_squash_branch::error::SquashError;
use git_squash_branch::git::GitClient;
use git_squash_branch::github::GitHubClient;
use git_squash_branch::pr::PrSquasher;
use git_squash_branch::report;
use git_squash_branch::squash::SquashEngine;
use git_squash_branch::types::PrReference;
use tracing_subscriber::EnvFilter;

/// Squash the commits of a branch into a single commit
#[derive(Parser, Debug)]
#[command(
    name = "git-squash-branch",
    author,
    version,
    about,
    long_about = "git-squash-branch - Squash the commits of a branch into a single commit.
Squashes everything since the branch diverged from its base, or squashes a
pull request branch and force-pushes it back to the remote.",
    args_conflicts_with_subcommands = true
)]
#[command(after_help = "Examples:
  git-squash-branch -b main                # Squash current branch onto its merge base with main
  git-squash-branch -b main -m \"Feature\"   # ...with a custom commit message
  git-squash-branch pr 42                  # Squash PR #42 and force-push it")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(flatten)]
    squash: SquashArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args, Debug)]
struct SquashArgs {
    /// Remote to detect the base branch from
    #[arg(short, long, default_value = DEFAULT_REMOTE, env = REMOTE_ENV_VAR)]
    remote: String,

    /// Base branch to compare against. If not specified, will try to detect it from the remote
    #[arg(short, long)]
    base: Option<String>,

    /// Message for the squash commit (defaults to last commit message)
    #[arg(short, long)]
    message: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Squash a pull request and force-push it to its head branch
    Pr(PrArgs),
}

#[derive(Args, Debug)]
struct PrArgs {
    /// PR number, URL, or branch name
    #[arg(value_name = "NUMBER")]
    reference: String,

    /// Remote to fetch from and push to
    #[arg(short, long, default_value = DEFAULT_REMOTE, env = REMOTE_ENV_VAR)]
    remote: String,

    /// Message for the squash commit (defaults to PR title)
    #[arg(short, long)]
    message: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let executor = CommandExecutor::new();
    let git = GitClient::new(executor.clone());

    let result = match cli.command {
        Some(Commands::Pr(args)) => run_pr(args, git, executor),
        None => run_squash(cli.squash, git),
    };

    match result {
        Ok(()) => Ok(()),
        Err(e) => {
            eprintln!("error: {e:#}");
            std::process::exit(1);
        }
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "git_squash_branch=debug"
    } else {
        "git_squash_branch=warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn run_squash(args: SquashArgs, git: GitClient) -> Result<()> {
    git.assert_clean_tree()?;

    let base = match args.base {
        Some(base) => base,
        None => detect_base(&git, &args.remote)?,
    };

    let message = match args.message {
        Some(message) => message,
        None => git.current_commit_message()?,
    };

    let outcome = SquashEngine::new(git).squash(&base, &message)?;
    println!("{}", report::squash_summary(&outcome));
    Ok(())
}

fn run_pr(args: PrArgs, git: GitClient, executor: CommandExecutor) -> Result<()> {
    let squasher = PrSquasher::new(git, GitHubClient::new(executor), args.remote);
    let reference = PrReference::new(args.reference);

    let outcome = squasher.squash_pr(&reference, args.message.as_deref())?;
    println!("{}", report::pr_squash_summary(&outcome));
    Ok(())
}

/// Ask whether the remote's default branch should be used as the base
fn detect_base(git: &GitClient, remote: &str) -> Result<String> {
    let detected = git
        .remote_default_branch(remote)?
        .ok_or(SquashError::MissingBase)?;

    let confirmed = Confirm::new()
        .with_prompt(format!("Use branch {detected:?}?"))
        .default(true)
        .interact()
        .unwrap_or_else(|err| {
            // No terminal to ask on counts as not confirmed
            tracing::debug!(error = %err, "base branch confirmation unavailable");
            false
        });

    if confirmed {
        Ok(detected)
    } else {
        Err(SquashError::MissingBase.into())
    }
}
