//! Default locations for the task file, config file and dashboard log.
//! Everything lives under `$HOME/.dailytask` unless overridden.

use std::path::PathBuf;

/// `$HOME/.dailytask`, or `./.dailytask` when `HOME` is unset.
pub fn data_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
    PathBuf::from(home).join(".dailytask")
}

pub fn default_task_file() -> PathBuf {
    data_dir().join("tasks.csv")
}

pub fn default_config_file() -> PathBuf {
    data_dir().join("config.toml")
}

pub fn dashboard_log_file() -> PathBuf {
    data_dir().join("dashboard.log")
}
