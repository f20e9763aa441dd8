use std::cell::RefCell;

use anyhow::Result;
use chrono::NaiveDate;

use dailytask::config::{Config, Credentials, ReminderConfig};
use dailytask::mail::{Mailer, OutgoingEmail};
use dailytask::model::{Column, DateCell};
use dailytask::ops::{self, Upserted};
use dailytask::reminder::{send_daily_reminder, ReminderOutcome};
use dailytask::store::TaskStore;

#[derive(Default)]
struct Outbox {
    sent: RefCell<Vec<OutgoingEmail>>,
}

impl Mailer for Outbox {
    fn send(&self, email: &OutgoingEmail) -> Result<()> {
        self.sent.borrow_mut().push(email.clone());
        Ok(())
    }
}

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn credentials(recipients: &str) -> Credentials {
    let recipients = recipients.to_string();
    Credentials::from_lookup(move |key: &str| match key {
        "EMAIL_SENDER" => Some("bot@example.com".into()),
        "EMAIL_PASSWORD" => Some("app-password".into()),
        "RECIPIENTS" => Some(recipients.clone()),
        _ => None,
    })
    .unwrap()
}

#[test]
fn add_edit_and_remind() {
    let dir = tempfile::tempdir().unwrap();
    let store = TaskStore::new(dir.path().join("data").join("tasks.csv"));

    // Fresh install: no file yet.
    assert!(store.load().unwrap().is_empty());

    let added =
        ops::upsert_task(&store, d(2024, 5, 1), "write report", "Yet to Start", d(2024, 5, 3))
            .unwrap();
    assert_eq!(added, Upserted::Added);
    ops::upsert_task(&store, d(2024, 5, 1), "file taxes", "In Progress", d(2024, 5, 2)).unwrap();
    assert_eq!(store.load().unwrap().len(), 2);

    // Same date and text updates in place.
    let updated =
        ops::upsert_task(&store, d(2024, 5, 1), "file taxes", "Completed", d(2024, 5, 4)).unwrap();
    assert_eq!(updated, Upserted::Updated(1));
    let tasks = store.load().unwrap();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[1].status, "Completed");
    assert_eq!(tasks[1].deadline, DateCell::Date(d(2024, 5, 4)));

    // Grid edit and save, as the dashboard does it.
    let mut grid = store.load().unwrap();
    grid[0].set_cell(Column::Status, "In Progress");
    store.save(&grid).unwrap();

    let config = ReminderConfig {
        settings: Config::default().reminder.resolve().unwrap(),
        credentials: credentials("a@x.com,b@y.com"),
    };
    let outbox = Outbox::default();
    let outcome = send_daily_reminder(&config, &store, &outbox).unwrap();
    assert_eq!(
        outcome,
        ReminderOutcome::Sent {
            pending: 1,
            recipients: 2
        }
    );

    let sent = outbox.sent.borrow();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].body.contains("write report [In Progress]"));
    assert!(!sent[0].body.contains("file taxes"));
    let message = String::from_utf8(sent[0].to_message().unwrap().formatted()).unwrap();
    assert!(message.contains("a@x.com"));
    assert!(message.contains("b@y.com"));
}

#[test]
fn hand_edited_file_survives_dashboard_save() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.csv");
    std::fs::write(
        &path,
        "date,task,status,deadline\n\
         2024-05-01 00:00:00,old import,Yet to Start,soon\n\
         ,no date,In Progress,2024-05-02\n",
    )
    .unwrap();
    let store = TaskStore::new(&path);

    let tasks = store.load().unwrap();
    assert_eq!(tasks[0].date, DateCell::Date(d(2024, 5, 1)));
    assert_eq!(tasks[0].deadline, DateCell::Unparsed("soon".into()));
    assert_eq!(tasks[1].date, DateCell::Blank);

    store.save(&tasks).unwrap();
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "date,task,status,deadline\n\
         2024-05-01,old import,Yet to Start,soon\n\
         ,no date,In Progress,2024-05-02\n"
    );
}

#[test]
fn nothing_sent_when_all_done() {
    let dir = tempfile::tempdir().unwrap();
    let store = TaskStore::new(dir.path().join("tasks.csv"));
    ops::upsert_task(&store, d(2024, 5, 1), "done already", "Done", d(2024, 5, 1)).unwrap();

    let config = ReminderConfig {
        settings: Config::default().reminder.resolve().unwrap(),
        credentials: credentials("a@x.com"),
    };
    let outbox = Outbox::default();
    assert_eq!(
        send_daily_reminder(&config, &store, &outbox).unwrap(),
        ReminderOutcome::Skipped
    );
    assert!(outbox.sent.borrow().is_empty());
}
