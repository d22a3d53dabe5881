mod assign;
mod cli;
mod config;
mod error;
mod git;
mod history;
mod matrix;
mod owners;
mod repo;
mod report_helpers;
mod team;
mod util;

use std::error::Error;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use config::Config;

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn dispatch(cli: Cli) -> Result<(), Box<dyn Error>> {
    if let Commands::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        clap_complete::generate(shell, &mut cmd, "om", &mut std::io::stdout());
        return Ok(());
    }

    let config = Config::load(cli.config.as_deref())?;
    match cli.command {
        Commands::Owners { file, paths, json } => owners::run(&file, &paths, json),
        Commands::History {
            repos,
            since,
            top,
            json,
        } => history::run(&repos.repos, since.as_deref(), top, json, &config),
        Commands::Matrix { team, repos, json } => matrix::run(&team, &repos.repos, json, &config),
        Commands::Assign {
            team,
            items,
            repos,
            log,
            dry_run,
            json,
        } => assign::run(
            &team,
            &items,
            &repos.repos,
            log.as_deref(),
            dry_run,
            json,
            &config,
        ),
        Commands::Outcome {
            id,
            log,
            quality,
            completed,
        } => assign::run_outcome(&id, &log, quality, completed),
        Commands::Completions { .. } => Ok(()),
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(err) = dispatch(cli) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
