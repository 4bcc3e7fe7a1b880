//! CLI configuration

use std::{path::PathBuf, str::FromStr, time::Duration};

use clap::{Args, Parser};
use thiserror::Error;

use juicebar::{
    checkout::DeliveryMethod,
    notifications::{
        DEFAULT_CAPACITY, DEFAULT_FADE_AFTER_MS, DEFAULT_REMOVE_AFTER_MS, NotificationError,
        NotificationId, QueueSettings,
    },
    products::{Category, ProductId},
};

/// Log output format.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Args)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "warn")]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

/// Notification feed settings.
#[derive(Debug, Args)]
pub struct NotificationConfig {
    /// Maximum notifications shown at once
    #[arg(long, default_value_t = DEFAULT_CAPACITY)]
    pub notification_capacity: usize,

    /// Milliseconds before a notification starts fading out
    #[arg(long, default_value_t = DEFAULT_FADE_AFTER_MS)]
    pub fade_after_ms: u64,

    /// Milliseconds before a notification is removed
    #[arg(long, default_value_t = DEFAULT_REMOVE_AFTER_MS)]
    pub remove_after_ms: u64,
}

impl NotificationConfig {
    /// Validated queue settings.
    ///
    /// # Errors
    ///
    /// Returns a `NotificationError` if the capacity is zero or removal precedes fading.
    pub fn settings(&self) -> Result<QueueSettings, NotificationError> {
        QueueSettings::new(
            self.notification_capacity,
            Duration::from_millis(self.fade_after_ms),
            Duration::from_millis(self.remove_after_ms),
        )
    }
}

/// Replay a shopping session against the menu and print the result
#[derive(Debug, Parser)]
#[command(name = "juicebar", about = "Juicebar cart session replay", long_about = None)]
pub struct CliConfig {
    /// Menu fixture to load
    #[arg(short, long, env = "JUICEBAR_CATALOG", default_value = "fixtures/menu.yml")]
    pub catalog: PathBuf,

    /// Print the menu before the session
    #[arg(long)]
    pub menu: bool,

    /// Only list menu products in this category
    #[arg(long, value_enum, requires = "menu")]
    pub category: Option<Category>,

    /// Only list menu products matching this text
    #[arg(long, requires = "menu")]
    pub search: Option<String>,

    /// Delivery method used for the checkout summary
    #[arg(short, long, value_enum, default_value_t = DeliveryMethod::Standard)]
    pub delivery: DeliveryMethod,

    /// Notification feed settings.
    #[command(flatten)]
    pub notifications: NotificationConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Session actions: add:ID, inc:ID, dec:ID, rm:ID, wait:MS, dismiss:NOTIFICATION
    pub actions: Vec<Action>,
}

/// One scripted shopper action.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Action {
    /// Add one unit of a product from the menu.
    Add(ProductId),

    /// Increase a cart line by one.
    Increase(ProductId),

    /// Decrease a cart line by one.
    Decrease(ProductId),

    /// Remove a cart line.
    Remove(ProductId),

    /// Let time pass and fire due notification timers.
    Wait(Duration),

    /// Dismiss a notification.
    Dismiss(NotificationId),
}

/// Errors parsing an [`Action`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ActionParseError {
    /// Missing `:` separator.
    #[error("expected VERB:VALUE, got `{0}`")]
    MissingValue(String),

    /// Unknown verb.
    #[error("unknown action `{0}` (expected add, inc, dec, rm, wait or dismiss)")]
    UnknownVerb(String),

    /// Value is not a non-negative integer.
    #[error("invalid number `{0}`")]
    InvalidNumber(String),
}

impl FromStr for Action {
    type Err = ActionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (verb, value) = s
            .split_once(':')
            .ok_or_else(|| ActionParseError::MissingValue(s.to_string()))?;

        let number = value
            .trim()
            .parse::<u64>()
            .map_err(|_err| ActionParseError::InvalidNumber(value.to_string()))?;

        let product = || {
            u32::try_from(number)
                .map(ProductId)
                .map_err(|_err| ActionParseError::InvalidNumber(value.to_string()))
        };

        match verb.trim() {
            "add" => Ok(Action::Add(product()?)),
            "inc" => Ok(Action::Increase(product()?)),
            "dec" => Ok(Action::Decrease(product()?)),
            "rm" => Ok(Action::Remove(product()?)),
            "wait" => Ok(Action::Wait(Duration::from_millis(number))),
            "dismiss" => Ok(Action::Dismiss(NotificationId::from(number))),
            other => Err(ActionParseError::UnknownVerb(other.to_string())),
        }
    }
}
