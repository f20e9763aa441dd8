use std::cmp::Ordering;
use std::fmt;

use chrono::NaiveDate;
use serde::{Serialize, Serializer};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Timestamp form written by older versions of the tracker. Accepted on load.
const LEGACY_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Status choices offered by the add form. The grid accepts any text.
pub const STATUS_CHOICES: [&str; 3] = ["Yet to Start", "In Progress", "Completed"];

/// A date column value. Cells that don't parse are kept verbatim so a
/// load/save cycle never rewrites what the user typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateCell {
    Date(NaiveDate),
    Blank,
    Unparsed(String),
}

impl DateCell {
    pub fn parse(s: &str) -> Self {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Self::Blank;
        }
        if let Ok(d) = NaiveDate::parse_from_str(trimmed, DATE_FORMAT) {
            return Self::Date(d);
        }
        if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(trimmed, LEGACY_DATETIME_FORMAT) {
            return Self::Date(dt.date());
        }
        Self::Unparsed(s.to_string())
    }

    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Valid dates first, in calendar order; everything else after, in
    /// a stable order among themselves.
    pub fn sort_cmp(&self, other: &Self) -> Ordering {
        match (self.date(), other.date()) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

impl From<NaiveDate> for DateCell {
    fn from(d: NaiveDate) -> Self {
        Self::Date(d)
    }
}

impl fmt::Display for DateCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
            Self::Blank => Ok(()),
            Self::Unparsed(s) => f.write_str(s),
        }
    }
}

impl Serialize for DateCell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    pub date: DateCell,
    pub task: String,
    pub status: String,
    pub deadline: DateCell,
}

impl Task {
    pub fn new(date: NaiveDate, task: &str, status: &str, deadline: NaiveDate) -> Self {
        Self {
            date: DateCell::Date(date),
            task: task.to_string(),
            status: status.to_string(),
            deadline: DateCell::Date(deadline),
        }
    }

    pub fn blank() -> Self {
        Self {
            date: DateCell::Blank,
            task: String::new(),
            status: String::new(),
            deadline: DateCell::Blank,
        }
    }

    pub fn is_done(&self, done_statuses: &[String]) -> bool {
        done_statuses.iter().any(|s| s == &self.status)
    }

    pub fn cell(&self, column: Column) -> String {
        match column {
            Column::Date => self.date.to_string(),
            Column::Task => self.task.clone(),
            Column::Status => self.status.clone(),
            Column::Deadline => self.deadline.to_string(),
        }
    }

    pub fn set_cell(&mut self, column: Column, value: &str) {
        match column {
            Column::Date => self.date = DateCell::parse(value),
            Column::Task => self.task = value.to_string(),
            Column::Status => self.status = value.to_string(),
            Column::Deadline => self.deadline = DateCell::parse(value),
        }
    }
}

/// Columns of the task table, in file order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Date,
    Task,
    Status,
    Deadline,
}

impl Column {
    pub const ALL: [Column; 4] = [Column::Date, Column::Task, Column::Status, Column::Deadline];

    pub fn header(self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Task => "task",
            Self::Status => "status",
            Self::Deadline => "deadline",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Date => "Date",
            Self::Task => "Task",
            Self::Status => "Status",
            Self::Deadline => "Deadline",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Self::Date => 0,
            Self::Task => 1,
            Self::Status => 2,
            Self::Deadline => 3,
        }
    }

    pub fn from_index(i: usize) -> Option<Self> {
        Self::ALL.get(i).copied()
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}
