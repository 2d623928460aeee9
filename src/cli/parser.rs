use crate::export::ExportFormat;
use clap::{Parser, Subcommand};

/// Command-line interface definition for rTimeclock
/// CLI application to clock work sessions and discount sleep/lock time
#[derive(Parser)]
#[command(
    name = "rtimeclock",
    version = env!("CARGO_PKG_VERSION"),
    about = "A time clock CLI: track work sessions, discount sleep/lock intervals, report totals using SQLite",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init,

    /// Show or check the configuration file
    Config {
        #[arg(long = "print", help = "Print the current configuration")]
        print_config: bool,

        #[arg(long = "check", help = "Check configuration file for missing fields")]
        check: bool,
    },

    /// Database maintenance
    Db {
        #[arg(long = "check", help = "Check database integrity")]
        check: bool,

        #[arg(long = "vacuum", help = "Optimize the database using VACUUM")]
        vacuum: bool,

        #[arg(long = "info", help = "Show database information")]
        info: bool,
    },

    /// Print the internal audit log
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,
    },

    /// Manage employee accounts
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },

    /// Open a work session for a user
    ClockIn { user: String },

    /// Close the user's open session and compute the worked minutes
    ClockOut { user: String },

    /// Record a sleep/resume/lock/unlock event on the user's open session
    Event {
        user: String,

        #[arg(help = "One of: sleep, resume, lock, unlock")]
        kind: String,
    },

    /// Clock in and stay in the foreground, reading events from stdin
    Track { user: String },

    /// Show today's sessions for a user
    Today { user: String },

    /// Close every session open longer than the configured maximum
    Sweep,

    /// Session report with sleep time computed in bulk
    Report {
        #[arg(long, short, help = "Filter by year/month/day or a custom range")]
        period: Option<String>,

        #[arg(long, short, help = "Only sessions of users whose name contains this text")]
        user: Option<String>,

        #[arg(long = "verify", help = "List sessions whose stored total disagrees")]
        verify: bool,

        #[arg(long, value_enum, help = "Export the report instead of printing it")]
        export: Option<ExportFormat>,

        #[arg(long, value_name = "FILE", requires = "export")]
        file: Option<String>,

        #[arg(long, short = 'f')]
        force: bool,

        #[arg(long = "json", help = "Print the report as JSON")]
        json: bool,
    },

    /// Employee feedback
    Feedback {
        #[command(subcommand)]
        action: FeedbackAction,
    },
}

#[derive(Subcommand)]
pub enum AccountAction {
    /// Create an account (inactive unless --active)
    Add {
        username: String,

        #[arg(long, default_value = "employee", help = "employee or admin")]
        role: String,

        #[arg(long)]
        active: bool,
    },

    /// List accounts
    List,

    /// Allow an account to clock in
    Enable { username: String },

    /// Prevent an account from clocking in
    Disable { username: String },

    /// Delete an account with all its sessions, events and feedback
    Del {
        username: String,

        #[arg(long, short = 'y', help = "Do not ask for confirmation")]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum FeedbackAction {
    /// Submit a feedback entry
    Submit {
        user: String,

        #[arg(long, help = "terrible, poor, good, great or excellent")]
        mood: String,

        #[arg(long, default_value = "")]
        comment: String,

        #[arg(long)]
        anonymous: bool,
    },

    /// List feedback entries
    List {
        #[arg(long, short)]
        period: Option<String>,

        #[arg(long)]
        mood: Option<String>,

        #[arg(long)]
        keyword: Option<String>,
    },
}
