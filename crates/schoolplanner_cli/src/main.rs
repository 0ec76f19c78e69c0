//! `schoolplanner` command-line host for the planner core.
//!
//! # Responsibility
//! - Resolve configuration, start logging and open the store.
//! - Dispatch subcommands; run the daily reminder loop for `daemon`.

mod cli;
mod commands;
mod config;
mod daemon;
mod notifier;
mod output;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use cli::{Cli, Command};
use config::{AppConfig, FileConfig, Overrides};
use log::info;
use notifier::ConsoleNotifier;
use output::Output;
use schoolplanner_core::{init_logging, open_db, LoggingConfig};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let file = FileConfig::load(cli.config.as_deref())?;
    let config = AppConfig::resolve(
        Overrides {
            db_path: cli.db,
            log_dir: cli.log_dir,
            log_level: cli.log_level,
        },
        file,
    )?;
    init_logging(
        &LoggingConfig::new(&config.log_level, &config.log_dir).with_stderr(true),
    )
    .context("failed to initialize logging")?;

    if let Some(parent) = config.db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create `{}`", parent.display()))?;
    }
    info!(
        "event=cli_start module=cli status=ok version={}",
        schoolplanner_core::core_version()
    );

    if let Command::Daemon = cli.command {
        return daemon::run(config.db_path, ConsoleNotifier::new(cli.json));
    }

    let conn = open_db(&config.db_path)
        .with_context(|| format!("failed to open `{}`", config.db_path.display()))?;
    let out = Output::new(cli.json, Local::now().date_naive());
    commands::dispatch(cli.command, &conn, &out)
}
