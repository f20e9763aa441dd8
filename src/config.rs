use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveTime;
use lettre::Address;
use secrecy::SecretString;
use serde::Deserialize;

use crate::paths;
use crate::validate::parse_time_of_day;

pub const ENV_SENDER: &str = "EMAIL_SENDER";
pub const ENV_PASSWORD: &str = "EMAIL_PASSWORD";
pub const ENV_RECIPIENTS: &str = "RECIPIENTS";

const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
const DEFAULT_SMTP_PORT: u16 = 465;
const DEFAULT_SUBJECT: &str = "Daily Task Tracker - please update your tasks";
const DEFAULT_DASHBOARD_URL: &str = "http://localhost:8501";
const DEFAULT_DONE_STATUSES: [&str; 2] = ["Completed", "Done"];
const DEFAULT_AT: &str = "09:00";

/// Errors in reminder configuration. Kept distinct from storage and
/// transport failures so callers can tell them apart.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
    #[error("{0} lists no recipients")]
    NoRecipients(&'static str),
    #[error("{var} contains an invalid address '{value}'")]
    InvalidAddress { var: &'static str, value: String },
}

/// What the reminder does when no task is pending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EmptyPolicy {
    /// Send nothing.
    #[default]
    Skip,
    /// Send a message saying nothing is pending.
    Notice,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Security {
    /// Implicit TLS (SMTPS), usually port 465.
    #[default]
    Tls,
    /// Plain connection upgraded with STARTTLS, usually port 587.
    Starttls,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub reminder: ReminderSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    pub path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReminderSection {
    pub smtp_host: Option<String>,
    pub smtp_port: Option<u16>,
    pub security: Option<Security>,
    pub subject: Option<String>,
    pub dashboard_url: Option<String>,
    pub when_empty: Option<EmptyPolicy>,
    pub done_statuses: Option<Vec<String>>,
    pub at: Option<String>,
}

/// Reminder options with defaults filled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderSettings {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub security: Security,
    pub subject: String,
    pub dashboard_url: String,
    pub when_empty: EmptyPolicy,
    pub done_statuses: Vec<String>,
    pub at: NaiveTime,
}

impl Default for ReminderSettings {
    fn default() -> Self {
        Self {
            smtp_host: DEFAULT_SMTP_HOST.into(),
            smtp_port: DEFAULT_SMTP_PORT,
            security: Security::default(),
            subject: DEFAULT_SUBJECT.into(),
            dashboard_url: DEFAULT_DASHBOARD_URL.into(),
            when_empty: EmptyPolicy::default(),
            done_statuses: DEFAULT_DONE_STATUSES.iter().map(|s| s.to_string()).collect(),
            at: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default(),
        }
    }
}

impl ReminderSection {
    /// Statuses that count as finished. Needs nothing else from the
    /// section to be valid.
    pub fn done_statuses(&self) -> Vec<String> {
        self.done_statuses
            .clone()
            .unwrap_or_else(|| DEFAULT_DONE_STATUSES.iter().map(|s| s.to_string()).collect())
    }

    pub fn resolve(&self) -> Result<ReminderSettings> {
        let defaults = ReminderSettings::default();
        let at = parse_time_of_day(self.at.as_deref().unwrap_or(DEFAULT_AT))
            .context("invalid reminder.at")?;
        Ok(ReminderSettings {
            smtp_host: self.smtp_host.clone().unwrap_or(defaults.smtp_host),
            smtp_port: self.smtp_port.unwrap_or(defaults.smtp_port),
            security: self.security.unwrap_or(defaults.security),
            subject: self.subject.clone().unwrap_or(defaults.subject),
            dashboard_url: self.dashboard_url.clone().unwrap_or(defaults.dashboard_url),
            when_empty: self.when_empty.unwrap_or(defaults.when_empty),
            done_statuses: self.done_statuses(),
            at,
        })
    }
}

impl Config {
    /// Load config from `path`, or `~/.dailytask/config.toml` if `None`.
    /// Returns default config if the file doesn't exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load_from(p),
            None => Self::load_from(&paths::default_config_file()),
        }
    }

    fn load_from(path: &Path) -> Result<Self> {
        let config: Config = match std::fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents)
                .with_context(|| format!("failed to parse {}", path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Config::default()),
            Err(e) => return Err(e).with_context(|| format!("failed to read {}", path.display())),
        };
        Ok(config)
    }
}

/// Sender identity and recipient list for the reminder email.
#[derive(Debug)]
pub struct Credentials {
    pub sender: Address,
    pub password: SecretString,
    pub recipients: Vec<Address>,
}

impl Credentials {
    /// Read `EMAIL_SENDER`, `EMAIL_PASSWORD` and `RECIPIENTS` through
    /// `lookup`. Blank values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let sender_raw = lookup(ENV_SENDER)
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::Missing(ENV_SENDER))?;
        let sender = parse_address(ENV_SENDER, &sender_raw)?;

        let password = lookup(ENV_PASSWORD)
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing(ENV_PASSWORD))?;

        let recipients_raw = lookup(ENV_RECIPIENTS).ok_or(ConfigError::Missing(ENV_RECIPIENTS))?;
        let recipients = recipients_raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| parse_address(ENV_RECIPIENTS, s))
            .collect::<Result<Vec<_>, _>>()?;
        if recipients.is_empty() {
            return Err(ConfigError::NoRecipients(ENV_RECIPIENTS));
        }

        Ok(Self {
            sender,
            password: SecretString::new(password.into()),
            recipients,
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }
}

fn parse_address(var: &'static str, value: &str) -> Result<Address, ConfigError> {
    value
        .trim()
        .parse::<Address>()
        .map_err(|_| ConfigError::InvalidAddress {
            var,
            value: value.trim().to_string(),
        })
}

/// Everything the reminder needs, passed explicitly.
#[derive(Debug)]
pub struct ReminderConfig {
    pub settings: ReminderSettings,
    pub credentials: Credentials,
}
