//! CSV-backed task store.
//!
//! The file is the single source of truth: every load reads the whole
//! table and every save replaces it. Saves go through a temp file in the
//! same directory that is renamed over the target, so a crash mid-write
//! leaves the previous contents in place.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::model::{Column, DateCell, Task};

#[derive(Debug, Clone)]
pub struct TaskStore {
    path: PathBuf,
}

impl TaskStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every row. A missing or zero-length file is an empty table.
    pub fn load(&self) -> Result<Vec<Task>> {
        let data = match std::fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("{} does not exist; starting empty", self.path.display());
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read {}", self.path.display()))
            }
        };
        let tasks =
            decode(&data).with_context(|| format!("failed to parse {}", self.path.display()))?;
        log::debug!("loaded {} rows from {}", tasks.len(), self.path.display());
        Ok(tasks)
    }

    /// Replace the file with `tasks`, in order.
    pub fn save(&self, tasks: &[Task]) -> Result<()> {
        self.replace_with(|out| encode(out, tasks).context("failed to write task table"))?;
        log::info!("saved {} rows to {}", tasks.len(), self.path.display());
        Ok(())
    }

    /// Write a new file through `write` and rename it over the target.
    /// If `write` fails the target is not touched.
    fn replace_with<F>(&self, write: F) -> Result<()>
    where
        F: FnOnce(&mut tempfile::NamedTempFile) -> Result<()>,
    {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        if !dir.exists() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create directory {}", dir.display()))?;
        }

        // Dropping `tmp` on any early return deletes it.
        let mut tmp = tempfile::Builder::new()
            .prefix(".dailytask-")
            .suffix(".tmp")
            .tempfile_in(dir)
            .with_context(|| format!("failed to create temp file in {}", dir.display()))?;
        if let Ok(meta) = std::fs::metadata(&self.path) {
            tmp.as_file()
                .set_permissions(meta.permissions())
                .context("failed to copy permissions to temp file")?;
        }
        write(&mut tmp)?;
        tmp.as_file().sync_all().context("failed to sync temp file")?;
        tmp.persist(&self.path)
            .map_err(|e| e.error)
            .with_context(|| format!("failed to replace {}", self.path.display()))?;
        Ok(())
    }
}

fn decode(data: &[u8]) -> Result<Vec<Task>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(data);

    let mut tasks = Vec::new();
    for record in reader.records() {
        let record = record?;
        let field = |column: Column| record.get(column.index()).unwrap_or("");
        tasks.push(Task {
            date: DateCell::parse(field(Column::Date)),
            task: field(Column::Task).to_string(),
            status: field(Column::Status).to_string(),
            deadline: DateCell::parse(field(Column::Deadline)),
        });
    }
    Ok(tasks)
}

fn encode<W: Write>(out: W, tasks: &[Task]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(Column::ALL.iter().map(|c| c.header()))?;
    for task in tasks {
        writer.write_record(Column::ALL.iter().map(|c| task.cell(*c)))?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn store_in(dir: &tempfile::TempDir) -> TaskStore {
        TaskStore::new(dir.path().join("tasks.csv"))
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn zero_length_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "").unwrap();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn header_only_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "date,task,status,deadline\n").unwrap();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn save_writes_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store
            .save(&[Task::new(d(2024, 5, 1), "write, report", "In Progress", d(2024, 5, 3))])
            .unwrap();
        let text = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(
            text,
            "date,task,status,deadline\n2024-05-01,\"write, report\",In Progress,2024-05-03\n"
        );
    }

    #[test]
    fn round_trip_preserves_every_column() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let tasks = vec![
            Task::new(d(2024, 5, 1), "first", "Yet to Start", d(2024, 5, 9)),
            Task::new(d(2024, 5, 2), "multi\nline \"quoted\"", "Completed", d(2024, 4, 30)),
            Task {
                date: DateCell::Unparsed("tomorrow".into()),
                task: "  padded  ".into(),
                status: "custom status".into(),
                deadline: DateCell::Blank,
            },
        ];
        store.save(&tasks).unwrap();
        assert_eq!(store.load().unwrap(), tasks);
    }

    #[test]
    fn short_rows_padded_long_rows_truncated() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(
            store.path(),
            "date,task,status,deadline\n2024-01-01,only two\n2024-01-02,a,b,2024-01-03,extra\n",
        )
        .unwrap();
        let tasks = store.load().unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].task, "only two");
        assert_eq!(tasks[0].status, "");
        assert_eq!(tasks[0].deadline, DateCell::Blank);
        assert_eq!(tasks[1].deadline, DateCell::Date(d(2024, 1, 3)));
    }

    #[test]
    fn invalid_utf8_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), b"date,task,status,deadline\n2024-01-01,\xff\xfe,x,y\n")
            .unwrap();
        assert!(store.load().is_err());
    }

    #[test]
    fn save_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = TaskStore::new(dir.path().join("nested").join("tasks.csv"));
        store.save(&[Task::blank()]).unwrap();
        assert_eq!(store.load().unwrap().len(), 1);
    }

    #[test]
    fn last_save_wins() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let first = vec![Task::new(d(2024, 1, 1), "a", "x", d(2024, 1, 1))];
        let second = vec![
            Task::new(d(2024, 2, 1), "b", "y", d(2024, 2, 1)),
            Task::new(d(2024, 2, 2), "c", "z", d(2024, 2, 2)),
        ];
        store.save(&first).unwrap();
        store.save(&second).unwrap();
        assert_eq!(store.load().unwrap(), second);
    }

    #[test]
    fn failed_save_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("tasks.csv");
        // A non-empty directory at the target path makes the rename fail.
        std::fs::create_dir(&target).unwrap();
        std::fs::write(target.join("keep"), "x").unwrap();

        let store = TaskStore::new(&target);
        assert!(store.save(&[Task::blank()]).is_err());

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["tasks.csv".to_string()]);
        assert!(target.join("keep").exists());
    }

    #[test]
    fn failed_write_keeps_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let tasks = vec![Task::new(d(2024, 3, 1), "keep me", "In Progress", d(2024, 3, 2))];
        store.save(&tasks).unwrap();
        let before = std::fs::read(store.path()).unwrap();

        let err = store
            .replace_with(|out| {
                out.write_all(b"date,task,sta")?;
                anyhow::bail!("disk full")
            })
            .unwrap_err();
        assert!(format!("{err:#}").contains("disk full"));

        assert_eq!(std::fs::read(store.path()).unwrap(), before);
        assert_eq!(store.load().unwrap(), tasks);
        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["tasks.csv".to_string()]);
    }
}
