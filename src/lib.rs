pub mod config;
pub mod mail;
pub mod model;
pub mod ops;
pub mod output;
pub mod paths;
pub mod reminder;
pub mod schedule;
pub mod store;
pub mod tui;
pub mod validate;
pub mod watch;
