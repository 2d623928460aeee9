//! rTimeclock library root.
//! Exposes the CLI parser, the high-level run() function and the internal
//! modules (session core, watchdog, SQLite store) used by the tests.

pub mod cli;
pub mod config;
pub mod core;
pub mod db;
pub mod errors;
pub mod export;
pub mod models;
pub mod ui;
pub mod utils;

use clap::Parser;
use cli::parser::{Cli, Commands};
use config::Config;
use errors::AppResult;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Environment variable holding a `tracing` filter; overrides `log_level`.
pub const LOG_ENV: &str = "RTIMECLOCK_LOG";

/// Central command dispatcher
pub fn dispatch(cli: &Cli, cfg: &Config) -> AppResult<()> {
    use crate::cli::commands;

    match &cli.command {
        Commands::Init => commands::init::handle(cli),
        Commands::Config { .. } => commands::config::handle(&cli.command, cfg),
        Commands::Db { .. } => commands::db::handle(&cli.command, cfg),
        Commands::Log { .. } => commands::log::handle(&cli.command, cfg),
        Commands::Account { action } => commands::account::handle(action, cfg),
        Commands::ClockIn { .. }
        | Commands::ClockOut { .. }
        | Commands::Event { .. }
        | Commands::Today { .. } => commands::clock::handle(&cli.command, cfg),
        Commands::Track { user } => commands::track::handle(user, cfg),
        Commands::Sweep => commands::sweep::handle(cfg),
        Commands::Report { .. } => commands::report::handle(&cli.command, cfg),
        Commands::Feedback { action } => commands::feedback::handle(action, cfg),
    }
}

/// Diagnostics go to stderr so they never mix with command output.
fn init_tracing(cfg: &Config) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(&cfg.log_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init();
}

/// Entry point used by main.rs
pub fn run() -> AppResult<()> {
    let cli = Cli::parse();

    let mut cfg = Config::load()?;

    if let Some(custom_db) = &cli.db {
        cfg.database = Config::resolve_db_path(custom_db)
            .to_string_lossy()
            .to_string();
    }

    init_tracing(&cfg);

    dispatch(&cli, &cfg)
}
