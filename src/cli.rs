use std::path::PathBuf;

use clap::{Parser, Subcommand};

use dailytask::config::EmptyPolicy;

#[derive(Parser)]
#[command(name = "dailytask", about = "Daily task dashboard with email reminders")]
pub struct Cli {
    /// Path to the task CSV file [default: ~/.dailytask/tasks.csv]
    #[arg(long, env = "DAILYTASK_FILE", global = true)]
    pub file: Option<PathBuf>,

    /// Path to the config file [default: ~/.dailytask/config.toml]
    #[arg(long, env = "DAILYTASK_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Open the interactive dashboard (default)
    Dashboard {
        /// Key poll interval in milliseconds
        #[arg(long, default_value = "250")]
        poll_interval: u64,
    },

    /// Add a task, or update status and deadline of an existing one
    /// with the same date and description
    Add {
        /// Task description
        task: String,
        /// Task date (YYYY-MM-DD) [default: today]
        #[arg(short, long)]
        date: Option<String>,
        /// Task status
        #[arg(short, long, default_value = "Yet to Start")]
        status: String,
        /// Deadline (YYYY-MM-DD) [default: today]
        #[arg(short = 'D', long)]
        deadline: Option<String>,
    },

    /// List tasks
    List {
        /// Only tasks that are not completed
        #[arg(long)]
        pending: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Email the pending tasks to the configured recipients
    Remind {
        /// Print the message instead of sending it
        #[arg(long)]
        dry_run: bool,
        /// What to do when nothing is pending (overrides config)
        #[arg(long, value_enum)]
        when_empty: Option<EmptyPolicy>,
    },

    /// Send the reminder every day at a fixed local time
    Schedule {
        /// Time of day, HH:MM (overrides config)
        #[arg(long)]
        at: Option<String>,
    },
}
