mod cli;

use std::fs::OpenOptions;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use secrecy::{ExposeSecret, SecretString};

use cli::{Cli, Command};
use dailytask::config::{Config, Credentials, ReminderConfig, ReminderSettings};
use dailytask::mail::SmtpMailer;
use dailytask::ops::{self, Upserted};
use dailytask::reminder::{self, ReminderOutcome};
use dailytask::store::TaskStore;
use dailytask::validate::{parse_date, parse_time_of_day};
use dailytask::{output, paths, schedule, tui};

const LOG_ENV: &str = "DAILYTASK_LOG";

fn resolve_task_file(cli_file: Option<PathBuf>, config: &Config) -> PathBuf {
    cli_file
        .or_else(|| config.store.path.clone())
        .unwrap_or_else(paths::default_task_file)
}

/// CLI commands log to stderr, filtered by `DAILYTASK_LOG`.
fn setup_stderr_logging() {
    env_logger::Builder::from_env(env_logger::Env::new().filter_or(LOG_ENV, "warn"))
        .format_timestamp_secs()
        .init();
}

/// The dashboard owns the terminal, so its log goes to a file.
fn setup_file_logging() -> Result<()> {
    let log_path = paths::dashboard_log_file();
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open log file {}", log_path.display()))?;

    env_logger::Builder::from_env(env_logger::Env::new().filter_or(LOG_ENV, "info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .format_timestamp_secs()
        .init();
    Ok(())
}

fn reminder_config(settings: &ReminderSettings) -> Result<ReminderConfig> {
    let credentials = Credentials::from_env()?;
    Ok(ReminderConfig {
        settings: settings.clone(),
        credentials,
    })
}

fn send_reminder(config: &ReminderConfig, store: &TaskStore) -> Result<ReminderOutcome> {
    let mailer = SmtpMailer::new(
        &config.settings.smtp_host,
        config.settings.smtp_port,
        config.settings.security,
        config.credentials.sender.as_ref(),
        SecretString::new(config.credentials.password.expose_secret().into()),
    );
    reminder::send_daily_reminder(config, store, &mailer)
}

fn report(outcome: ReminderOutcome) {
    match outcome {
        ReminderOutcome::Sent {
            pending,
            recipients,
        } => eprintln!("Sent reminder with {pending} pending task(s) to {recipients} recipient(s)"),
        ReminderOutcome::Skipped => eprintln!("No pending tasks; nothing sent"),
    }
}

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Dashboard { poll_interval: 250 });

    if matches!(command, Command::Dashboard { .. }) {
        setup_file_logging()?;
    } else {
        setup_stderr_logging();
    }

    let config = Config::load(cli.config.as_deref())?;
    let store = TaskStore::new(resolve_task_file(cli.file, &config));
    log::info!("task file: {}", store.path().display());

    match command {
        Command::Dashboard { poll_interval } => {
            tui::run(&store, config.reminder.done_statuses(), poll_interval)?;
        }
        Command::Add {
            task,
            date,
            status,
            deadline,
        } => {
            let today = Local::now().date_naive();
            let date = match date {
                Some(d) => parse_date(&d).context("invalid --date")?,
                None => today,
            };
            let deadline = match deadline {
                Some(d) => parse_date(&d).context("invalid --deadline")?,
                None => today,
            };
            match ops::upsert_task(&store, date, &task, &status, deadline)? {
                Upserted::Added => eprintln!("Added '{task}'"),
                Upserted::Updated(_) => eprintln!("Updated '{task}'"),
            }
        }
        Command::List { pending, json } => {
            let mut tasks = store.load()?;
            ops::sort_for_display(&mut tasks);
            let done_statuses = config.reminder.done_statuses();
            if pending {
                tasks.retain(|t| !t.is_done(&done_statuses));
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&tasks)?);
            } else {
                print!("{}", output::format_task_list(&tasks, &done_statuses));
            }
        }
        Command::Remind {
            dry_run,
            when_empty,
        } => {
            let mut settings = config.reminder.resolve()?;
            if let Some(policy) = when_empty {
                settings.when_empty = policy;
            }
            let config = reminder_config(&settings)?;
            if dry_run {
                match reminder::prepare_reminder(&config, &store)? {
                    Some(prepared) => {
                        let message = prepared.email.to_message()?;
                        println!("{}", String::from_utf8_lossy(&message.formatted()));
                    }
                    None => eprintln!("No pending tasks; nothing would be sent"),
                }
            } else {
                report(send_reminder(&config, &store)?);
            }
        }
        Command::Schedule { at } => {
            let mut settings = config.reminder.resolve()?;
            if let Some(at) = at {
                settings.at = parse_time_of_day(&at).context("invalid --at")?;
            }
            // Fail fast on bad credentials; each run re-reads them.
            reminder_config(&settings)?;
            let at = settings.at;
            schedule::run_daily(at, || {
                let config = reminder_config(&settings)?;
                report(send_reminder(&config, &store)?);
                Ok(())
            })?;
        }
    }

    Ok(())
}
