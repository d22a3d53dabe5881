/// CLI argument definitions for the `om` command.
///
/// Defines all subcommands, their arguments, and long help text
/// using the `clap` derive macros.
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use crate::repo::RepoSpec;

const REPO_HELP: &str = "\
Repository to analyze, as NAME=HISTORY[,CODEOWNERS].

HISTORY is either a JSON file of commit records or a local git checkout.
For a checkout, CODEOWNERS is discovered in .github/, the root or docs/
when not given explicitly. Repeat for several repositories; each one is
analyzed in parallel.";

const ASSIGN_HELP: &str = "\
Assign work items to team members.

Each item is scored against every team member with expertise in at
least one of its required domains. Suitability combines five factors:

  expertise      required domains weigh double; score x confidence
  capacity       hours left this week after the item
  workload       open assignments relative to the team average
  history        past success rate, bonus for similar work
  collaboration  proven pairings with the item's collaborators

Items are processed critical first. Each assignment consumes the
assignee's hours before the next item is scored. Low-confidence
decisions are still made, but flagged for manual review.";

/// Top-level CLI parser with a single subcommand selector.
#[derive(Parser)]
#[command(
    name = "om",
    version,
    about = "Expertise discovery and task assignment from ownership rules and commit history"
)]
pub struct Cli {
    /// Config file (default: ownmap.toml in the current directory, if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log debug detail to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Repositories shared by the history, matrix and assign commands.
#[derive(Args)]
pub struct RepoArgs {
    #[arg(long = "repo", value_name = "NAME=HISTORY[,CODEOWNERS]", long_help = REPO_HELP)]
    pub repos: Vec<RepoSpec>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse a CODEOWNERS file: rules, specificity, coverage, path lookup
    Owners {
        /// Ownership file to parse
        file: PathBuf,

        /// Resolve owners for this path (repeatable)
        #[arg(long = "path", value_name = "PATH")]
        paths: Vec<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Per-contributor commit statistics and file-level experts
    History {
        #[command(flatten)]
        repos: RepoArgs,

        /// Only consider commits newer than this (e.g. 6m, 1y, 30d)
        #[arg(long)]
        since: Option<String>,

        /// Show only the top N contributors per repository
        #[arg(long, default_value = "20")]
        top: usize,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Build the team expertise matrix with advisories
    Matrix {
        /// Team roster (TOML or JSON)
        #[arg(long)]
        team: PathBuf,

        #[command(flatten)]
        repos: RepoArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Assign work items to team members
    #[command(long_about = ASSIGN_HELP)]
    Assign {
        /// Team roster (TOML or JSON)
        #[arg(long)]
        team: PathBuf,

        /// Work items (JSON)
        #[arg(long)]
        items: PathBuf,

        #[command(flatten)]
        repos: RepoArgs,

        /// Assignment log (JSON Lines); read for history, appended to
        #[arg(long)]
        log: Option<PathBuf>,

        /// Decide but do not append to the log
        #[arg(long)]
        dry_run: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Record the outcome of a logged assignment
    Outcome {
        /// Assignment id, e.g. API-12@alice
        id: String,

        /// Assignment log (JSON Lines)
        #[arg(long)]
        log: PathBuf,

        /// Delivered quality, 1 (poor) to 5 (excellent)
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
        quality: u8,

        /// The work was completed
        #[arg(long)]
        completed: bool,
    },

    /// Generate shell completions
    Completions {
        /// Target shell
        shell: Shell,
    },
}
