//! Reminder email: select pending tasks, compose a message, hand it to a
//! `Mailer`. Scheduling is external (cron, or `dailytask schedule`).

use anyhow::Result;

use crate::config::{EmptyPolicy, ReminderConfig, ReminderSettings};
use crate::mail::{Mailer, OutgoingEmail};
use crate::model::{DateCell, Task};
use crate::ops;
use crate::store::TaskStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderOutcome {
    Sent { pending: usize, recipients: usize },
    /// Nothing pending and the policy says not to send.
    Skipped,
}

pub fn compose_body(settings: &ReminderSettings, pending: &[&Task]) -> String {
    let mut out = String::new();
    out.push_str("Hi,\n\n");
    out.push_str("This is your automated reminder to update today's tasks.\n\n");
    if pending.is_empty() {
        out.push_str("There are no pending tasks.\n");
    } else {
        out.push_str(&format!("Pending tasks ({}):\n", pending.len()));
        for task in pending {
            out.push_str(&format!("  - {}\n", format_line(task)));
        }
    }
    out.push_str(&format!("\nDashboard: {}\n", settings.dashboard_url));
    out.push_str("\nRegards,\nTask Tracker Bot\n");
    out
}

fn format_line(task: &Task) -> String {
    let date = match &task.date {
        DateCell::Blank => "-".to_string(),
        other => other.to_string(),
    };
    let mut line = format!("{date}  {}", task.task);
    if !task.status.is_empty() {
        line.push_str(&format!(" [{}]", task.status));
    }
    if task.deadline != DateCell::Blank {
        line.push_str(&format!(" due {}", task.deadline));
    }
    line
}

/// A composed reminder and how many tasks it lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedReminder {
    pub email: OutgoingEmail,
    pub pending: usize,
}

/// Build the reminder for the current store contents, or `None` when
/// there is nothing pending and the policy is to skip.
pub fn prepare_reminder(
    config: &ReminderConfig,
    store: &TaskStore,
) -> Result<Option<PreparedReminder>> {
    let tasks = store.load()?;
    let pending = ops::pending_tasks(&tasks, &config.settings.done_statuses);
    log::info!("{} of {} tasks pending", pending.len(), tasks.len());

    if pending.is_empty() && config.settings.when_empty == EmptyPolicy::Skip {
        return Ok(None);
    }

    let email = OutgoingEmail {
        from: config.credentials.sender.clone(),
        to: config.credentials.recipients.clone(),
        subject: config.settings.subject.clone(),
        body: compose_body(&config.settings, &pending),
    };
    Ok(Some(PreparedReminder {
        email,
        pending: pending.len(),
    }))
}

/// Load the store and send one reminder to every recipient. Transport
/// failures are returned as-is; nothing is retried.
pub fn send_daily_reminder(
    config: &ReminderConfig,
    store: &TaskStore,
    mailer: &dyn Mailer,
) -> Result<ReminderOutcome> {
    let Some(prepared) = prepare_reminder(config, store)? else {
        log::info!("no pending tasks; reminder skipped");
        return Ok(ReminderOutcome::Skipped);
    };
    mailer.send(&prepared.email)?;
    let recipients = prepared.email.to.len();
    log::info!("reminder sent to {recipients} recipient(s)");
    Ok(ReminderOutcome::Sent {
        pending: prepared.pending,
        recipients,
    })
}
