use anyhow::{bail, Result};
use chrono::NaiveDate;

use crate::model::{DateCell, Task};
use crate::store::TaskStore;

/// What `upsert_task` did with the submitted row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upserted {
    Added,
    /// Row at this index already had the same date and task text; its
    /// status and deadline were replaced.
    Updated(usize),
}

/// Apply an add-form submission to an in-memory table.
pub fn apply_upsert(
    tasks: &mut Vec<Task>,
    date: NaiveDate,
    task: &str,
    status: &str,
    deadline: NaiveDate,
) -> Result<Upserted> {
    if task.trim().is_empty() {
        bail!("task description must not be empty");
    }
    let date_cell = DateCell::Date(date);
    if let Some(i) = tasks
        .iter()
        .position(|t| t.date == date_cell && t.task == task)
    {
        tasks[i].status = status.to_string();
        tasks[i].deadline = DateCell::Date(deadline);
        return Ok(Upserted::Updated(i));
    }
    tasks.push(Task::new(date, task, status, deadline));
    Ok(Upserted::Added)
}

/// Load, apply an add-form submission, and persist immediately.
pub fn upsert_task(
    store: &TaskStore,
    date: NaiveDate,
    task: &str,
    status: &str,
    deadline: NaiveDate,
) -> Result<Upserted> {
    let mut tasks = store.load()?;
    let result = apply_upsert(&mut tasks, date, task, status, deadline)?;
    store.save(&tasks)?;
    Ok(result)
}

/// Order used by the dashboard grid: by date, then deadline.
pub fn sort_for_display(tasks: &mut [Task]) {
    tasks.sort_by(|a, b| {
        a.date
            .sort_cmp(&b.date)
            .then_with(|| a.deadline.sort_cmp(&b.deadline))
    });
}

/// Tasks whose status is not one of `done_statuses`, in table order.
pub fn pending_tasks<'a>(tasks: &'a [Task], done_statuses: &[String]) -> Vec<&'a Task> {
    tasks.iter().filter(|t| !t.is_done(done_statuses)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn done() -> Vec<String> {
        vec!["Completed".into(), "Done".into()]
    }

    #[test]
    fn upsert_appends_new_row() {
        let dir = tempfile::tempdir().unwrap();
        let store = TaskStore::new(dir.path().join("tasks.csv"));
        store
            .save(&[Task::new(d(2024, 1, 1), "old", "Done", d(2024, 1, 1))])
            .unwrap();

        let result =
            upsert_task(&store, d(2024, 1, 2), "new", "In Progress", d(2024, 1, 5)).unwrap();
        assert_eq!(result, Upserted::Added);

        let tasks = store.load().unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(
            tasks[1],
            Task::new(d(2024, 1, 2), "new", "In Progress", d(2024, 1, 5))
        );
    }

    #[test]
    fn upsert_updates_matching_date_and_text() {
        let mut tasks = vec![
            Task::new(d(2024, 1, 1), "report", "Yet to Start", d(2024, 1, 3)),
            Task::new(d(2024, 1, 2), "report", "Yet to Start", d(2024, 1, 3)),
        ];
        let result =
            apply_upsert(&mut tasks, d(2024, 1, 2), "report", "Completed", d(2024, 1, 4)).unwrap();
        assert_eq!(result, Upserted::Updated(1));
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[1].status, "Completed");
        assert_eq!(tasks[1].deadline, DateCell::Date(d(2024, 1, 4)));
        assert_eq!(tasks[0].status, "Yet to Start");
    }

    #[test]
    fn upsert_text_match_is_exact() {
        let mut tasks = vec![Task::new(d(2024, 1, 1), "report", "x", d(2024, 1, 3))];
        let result = apply_upsert(&mut tasks, d(2024, 1, 1), "Report", "y", d(2024, 1, 3)).unwrap();
        assert_eq!(result, Upserted::Added);
        assert_eq!(tasks.len(), 2);
    }

    #[test]
    fn upsert_rejects_blank_description() {
        let mut tasks = Vec::new();
        assert!(apply_upsert(&mut tasks, d(2024, 1, 1), "   ", "x", d(2024, 1, 1)).is_err());
        assert!(tasks.is_empty());
    }

    #[test]
    fn upsert_into_missing_store_creates_it() {
        let dir = tempfile::tempdir().unwrap();
        let store = TaskStore::new(dir.path().join("tasks.csv"));
        upsert_task(&store, d(2024, 1, 1), "first", "Yet to Start", d(2024, 1, 1)).unwrap();
        assert_eq!(store.load().unwrap().len(), 1);
    }

    #[test]
    fn sort_by_date_then_deadline() {
        let mut tasks = vec![
            Task::new(d(2024, 2, 1), "c", "", d(2024, 2, 1)),
            Task::new(d(2024, 1, 1), "b", "", d(2024, 3, 1)),
            Task::blank(),
            Task::new(d(2024, 1, 1), "a", "", d(2024, 1, 15)),
        ];
        sort_for_display(&mut tasks);
        let order: Vec<_> = tasks.iter().map(|t| t.task.as_str()).collect();
        assert_eq!(order, vec!["a", "b", "c", ""]);
    }

    #[test]
    fn pending_excludes_done_statuses() {
        let tasks = vec![
            Task::new(d(2024, 1, 1), "a", "Yet to Start", d(2024, 1, 1)),
            Task::new(d(2024, 1, 1), "b", "Completed", d(2024, 1, 1)),
            Task::new(d(2024, 1, 1), "c", "In Progress", d(2024, 1, 1)),
            Task::new(d(2024, 1, 1), "d", "Done", d(2024, 1, 1)),
            Task::new(d(2024, 1, 1), "e", "", d(2024, 1, 1)),
        ];
        let pending: Vec<_> = pending_tasks(&tasks, &done())
            .into_iter()
            .map(|t| t.task.as_str())
            .collect();
        assert_eq!(pending, vec!["a", "c", "e"]);
    }
}
