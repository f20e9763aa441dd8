use std::time::Duration;

use anyhow::Result;
use chrono::{Local, NaiveDateTime, NaiveTime, TimeDelta};

/// Wake at least this often so clock jumps (suspend, DST) are noticed.
const MAX_SLEEP: Duration = Duration::from_secs(60);

/// The first moment strictly after `now` whose wall-clock time is `at`.
pub fn next_run(now: NaiveDateTime, at: NaiveTime) -> NaiveDateTime {
    let today = now.date().and_time(at);
    if today > now {
        today
    } else {
        (now.date() + TimeDelta::days(1)).and_time(at)
    }
}

/// Once-a-day trigger in local wall-clock time.
#[derive(Debug, Clone)]
pub struct DailySchedule {
    at: NaiveTime,
    next: NaiveDateTime,
}

impl DailySchedule {
    pub fn new(at: NaiveTime, now: NaiveDateTime) -> Self {
        Self {
            at,
            next: next_run(now, at),
        }
    }

    pub fn next(&self) -> NaiveDateTime {
        self.next
    }

    /// True when a run is due at `now`. Advances to the following day, so
    /// runs missed while the machine was asleep collapse into one.
    pub fn due(&mut self, now: NaiveDateTime) -> bool {
        if now < self.next {
            return false;
        }
        self.next = next_run(now, self.at);
        true
    }
}

/// Run `job` every day at `at` (local time). Failures are logged and the
/// loop waits for the next day; there is no retry.
pub fn run_daily<F>(at: NaiveTime, mut job: F) -> Result<()>
where
    F: FnMut() -> Result<()>,
{
    let mut schedule = DailySchedule::new(at, Local::now().naive_local());
    log::info!("next reminder at {}", schedule.next());
    eprintln!("Next reminder at {}", schedule.next().format("%Y-%m-%d %H:%M"));

    loop {
        let now = Local::now().naive_local();
        if schedule.due(now) {
            match job() {
                Ok(()) => log::info!("scheduled reminder finished"),
                Err(e) => {
                    log::error!("scheduled reminder failed: {e:#}");
                    eprintln!("error: {e:#}");
                }
            }
            log::info!("next reminder at {}", schedule.next());
            continue;
        }
        let wait = (schedule.next() - now).to_std().unwrap_or(Duration::ZERO);
        std::thread::sleep(wait.min(MAX_SLEEP));
    }
}
