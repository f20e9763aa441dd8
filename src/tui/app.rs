use anyhow::Result;
use chrono::{NaiveDate, TimeDelta};
use ratatui::widgets::TableState;

use crate::model::{Column, Task, DATE_FORMAT, STATUS_CHOICES};
use crate::ops::{self, Upserted};
use crate::store::TaskStore;
use crate::validate::parse_date;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Help,
    ConfirmQuit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddField {
    Date,
    Task,
    Status,
    Deadline,
}

pub struct AddForm {
    pub date: String,
    pub task: String,
    pub status: usize,
    pub deadline: String,
    pub focused: AddField,
    pub error: Option<String>,
}

impl AddForm {
    pub fn new(today: NaiveDate) -> Self {
        let today = today.format(DATE_FORMAT).to_string();
        Self {
            date: today.clone(),
            task: String::new(),
            status: 0,
            deadline: today,
            focused: AddField::Task,
            error: None,
        }
    }

    pub fn status(&self) -> &'static str {
        STATUS_CHOICES[self.status % STATUS_CHOICES.len()]
    }

    /// Text buffer behind the focused field. The status field is a choice,
    /// not free text.
    pub fn focused_buf_mut(&mut self) -> Option<&mut String> {
        match self.focused {
            AddField::Date => Some(&mut self.date),
            AddField::Task => Some(&mut self.task),
            AddField::Status => None,
            AddField::Deadline => Some(&mut self.deadline),
        }
    }

    /// Date fields only take digits and dashes.
    pub fn accepts(&self, c: char) -> bool {
        match self.focused {
            AddField::Date | AddField::Deadline => c.is_ascii_digit() || c == '-',
            AddField::Task => true,
            AddField::Status => false,
        }
    }

    pub fn cycle_status(&mut self, forward: bool) {
        let n = STATUS_CHOICES.len();
        self.status = if forward {
            (self.status + 1) % n
        } else {
            (self.status + n - 1) % n
        };
    }

    /// Move the focused date field by `days`. Does nothing if the field
    /// doesn't hold a valid date.
    pub fn step_date(&mut self, days: i64) {
        let buf = match self.focused {
            AddField::Date => &mut self.date,
            AddField::Deadline => &mut self.deadline,
            _ => return,
        };
        if let Ok(d) = parse_date(buf) {
            if let Some(next) = d.checked_add_signed(TimeDelta::days(days)) {
                *buf = next.format(DATE_FORMAT).to_string();
            }
        }
    }

    /// Parse the form into `(date, task, status, deadline)`, recording the
    /// first problem in `error`.
    pub fn validate(&mut self) -> Option<(NaiveDate, String, String, NaiveDate)> {
        if self.task.trim().is_empty() {
            self.error = Some("Task description must not be empty".into());
            return None;
        }
        let date = match parse_date(&self.date) {
            Ok(d) => d,
            Err(e) => {
                self.error = Some(format!("Date: {e}"));
                return None;
            }
        };
        let deadline = match parse_date(&self.deadline) {
            Ok(d) => d,
            Err(e) => {
                self.error = Some(format!("Deadline: {e}"));
                return None;
            }
        };
        self.error = None;
        Some((date, self.task.clone(), self.status().to_string(), deadline))
    }

    pub fn next_field(&mut self) {
        self.focused = match self.focused {
            AddField::Date => AddField::Task,
            AddField::Task => AddField::Status,
            AddField::Status => AddField::Deadline,
            AddField::Deadline => AddField::Date,
        };
    }

    pub fn prev_field(&mut self) {
        self.focused = match self.focused {
            AddField::Date => AddField::Deadline,
            AddField::Task => AddField::Date,
            AddField::Status => AddField::Task,
            AddField::Deadline => AddField::Status,
        };
    }
}

/// In-progress edit of one grid cell.
pub struct CellEdit {
    pub column: Column,
    pub buffer: String,
}

pub struct Notice {
    pub text: String,
    pub is_error: bool,
}

pub struct App {
    pub rows: Vec<Task>,
    pub cursor: usize,
    pub column: Column,
    pub table_state: TableState,
    pub dirty: bool,
    pub mode: Mode,
    pub edit: Option<CellEdit>,
    pub add_form: Option<AddForm>,
    pub notice: Option<Notice>,
    pub done_statuses: Vec<String>,
    pub today: NaiveDate,
}

impl App {
    /// Load the grid. A store that can't be read starts the dashboard
    /// empty with the error shown in the status line.
    pub fn new(store: &TaskStore, done_statuses: Vec<String>, today: NaiveDate) -> Self {
        let mut app = App {
            rows: Vec::new(),
            cursor: 0,
            column: Column::Date,
            table_state: TableState::default(),
            dirty: false,
            mode: Mode::Normal,
            edit: None,
            add_form: None,
            notice: None,
            done_statuses,
            today,
        };
        if let Err(e) = app.reload(store) {
            log::warn!("starting with an empty table: {e:#}");
            app.set_error(format!("{e:#}"));
        }
        app
    }

    /// Replace the grid with the file contents, discarding unsaved edits.
    pub fn reload(&mut self, store: &TaskStore) -> Result<()> {
        let mut rows = store.load()?;
        ops::sort_for_display(&mut rows);
        self.rows = rows;
        self.dirty = false;
        self.edit = None;
        self.clamp_cursor();
        Ok(())
    }

    /// Called when the file changed on disk. Unsaved edits, including a
    /// cell being typed into, are never overwritten.
    pub fn on_external_change(&mut self, store: &TaskStore) {
        if self.dirty || self.edit.is_some() {
            self.set_info("File changed on disk; press r to reload (discards your edits)");
            return;
        }
        if let Err(e) = self.reload(store) {
            self.set_error(format!("{e:#}"));
        }
    }

    pub fn save(&mut self, store: &TaskStore) {
        match store.save(&self.rows) {
            Ok(()) => {
                self.dirty = false;
                self.set_info(format!("Saved {} rows", self.rows.len()));
            }
            Err(e) => {
                log::error!("save failed: {e:#}");
                self.set_error(format!("Save failed: {e:#}"));
            }
        }
    }

    pub fn set_info(&mut self, text: impl Into<String>) {
        self.notice = Some(Notice {
            text: text.into(),
            is_error: false,
        });
    }

    pub fn set_error(&mut self, text: impl Into<String>) {
        self.notice = Some(Notice {
            text: text.into(),
            is_error: true,
        });
    }

    pub fn clamp_cursor(&mut self) {
        if self.rows.is_empty() {
            self.cursor = 0;
            self.table_state.select(None);
        } else {
            if self.cursor >= self.rows.len() {
                self.cursor = self.rows.len() - 1;
            }
            self.table_state.select(Some(self.cursor));
        }
    }

    pub fn move_up(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            self.table_state.select(Some(self.cursor));
        }
    }

    pub fn move_down(&mut self) {
        if !self.rows.is_empty() && self.cursor < self.rows.len() - 1 {
            self.cursor += 1;
            self.table_state.select(Some(self.cursor));
        }
    }

    pub fn move_left(&mut self) {
        if let Some(c) = self.column.index().checked_sub(1).and_then(Column::from_index) {
            self.column = c;
        }
    }

    pub fn move_right(&mut self) {
        if let Some(c) = Column::from_index(self.column.index() + 1) {
            self.column = c;
        }
    }

    pub fn begin_edit(&mut self) {
        if let Some(task) = self.rows.get(self.cursor) {
            self.edit = Some(CellEdit {
                column: self.column,
                buffer: task.cell(self.column),
            });
        }
    }

    pub fn commit_edit(&mut self) {
        let Some(edit) = self.edit.take() else {
            return;
        };
        if let Some(task) = self.rows.get_mut(self.cursor) {
            if task.cell(edit.column) != edit.buffer {
                task.set_cell(edit.column, &edit.buffer);
                self.dirty = true;
            }
        }
    }

    pub fn cancel_edit(&mut self) {
        self.edit = None;
    }

    /// Insert a blank row below the cursor (or as the first row).
    pub fn insert_row(&mut self) {
        let at = if self.rows.is_empty() { 0 } else { self.cursor + 1 };
        self.rows.insert(at, Task::blank());
        self.cursor = at;
        self.column = Column::Date;
        self.dirty = true;
        self.clamp_cursor();
    }

    pub fn delete_row(&mut self) {
        if self.cursor < self.rows.len() {
            self.rows.remove(self.cursor);
            self.dirty = true;
            self.clamp_cursor();
        }
    }

    pub fn enter_add_mode(&mut self) {
        self.add_form = Some(AddForm::new(self.today));
    }

    pub fn cancel_add_mode(&mut self) {
        self.add_form = None;
    }

    /// Add/update the row on disk right away. The visible grid picks up the
    /// change without discarding unsaved edits to other rows.
    pub fn submit_add(&mut self, store: &TaskStore) {
        let Some(form) = self.add_form.as_mut() else {
            return;
        };
        let Some((date, task, status, deadline)) = form.validate() else {
            return;
        };

        match ops::upsert_task(store, date, &task, &status, deadline) {
            Ok(result) => {
                self.add_form = None;
                if self.dirty {
                    // Mirror the change in the grid; the rest stays unsaved.
                    let mirrored =
                        ops::apply_upsert(&mut self.rows, date, &task, &status, deadline);
                    if let Err(e) = mirrored {
                        self.set_error(format!("{e:#}"));
                    }
                } else if let Err(e) = self.reload(store) {
                    self.set_error(format!("{e:#}"));
                    return;
                }
                self.select_task(date, &task);
                match result {
                    Upserted::Added => self.set_info("Task saved."),
                    Upserted::Updated(_) => self.set_info("Task updated."),
                }
            }
            Err(e) => {
                log::error!("add failed: {e:#}");
                if let Some(form) = self.add_form.as_mut() {
                    form.error = Some(format!("{e:#}"));
                }
            }
        }
    }

    fn select_task(&mut self, date: NaiveDate, task: &str) {
        if let Some(i) = self
            .rows
            .iter()
            .position(|t| t.date.date() == Some(date) && t.task == task)
        {
            self.cursor = i;
            self.clamp_cursor();
        }
    }

    /// Returns true if the app can exit now; otherwise asks for confirmation.
    pub fn request_quit(&mut self) -> bool {
        if self.dirty {
            self.mode = Mode::ConfirmQuit;
            false
        } else {
            true
        }
    }

    pub fn toggle_help(&mut self) {
        self.mode = match self.mode {
            Mode::Help => Mode::Normal,
            _ => Mode::Help,
        };
    }

    pub fn is_done(&self, task: &Task) -> bool {
        task.is_done(&self.done_statuses)
    }
}
