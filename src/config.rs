//! Client configuration from environment variables

use crate::dice::DEFAULT_ROLL_DELAY;
use crate::render::{DEFAULT_ELLIPSIS_INTERVAL, DEFAULT_TYPE_DELAY};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_SESSION_ID: &str = "default";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Backend base URL
    pub api_url: String,
    /// SQLite file holding session storage
    pub db_path: PathBuf,
    /// Which stored transcript this run continues
    pub session_id: String,
    /// Keep the transcript in memory only
    pub volatile: bool,
    pub type_delay: Duration,
    pub ellipsis_interval: Duration,
    pub roll_delay: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let db_path = lookup("DUNGEONMIND_DB_PATH").map_or_else(
            || {
                let home = lookup("HOME").unwrap_or_else(|| "/tmp".to_string());
                PathBuf::from(home).join(".dungeonmind").join("session.db")
            },
            PathBuf::from,
        );

        let millis = |key: &str, default: Duration| {
            lookup(key)
                .and_then(|v| v.trim().parse().ok())
                .map_or(default, Duration::from_millis)
        };

        Self {
            api_url: lookup("DUNGEONMIND_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            db_path,
            session_id: lookup("DUNGEONMIND_SESSION")
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_SESSION_ID.to_string()),
            volatile: lookup("DUNGEONMIND_VOLATILE")
                .is_some_and(|v| matches!(v.trim(), "1" | "true" | "yes")),
            type_delay: millis("DUNGEONMIND_TYPE_DELAY_MS", DEFAULT_TYPE_DELAY),
            ellipsis_interval: millis("DUNGEONMIND_ELLIPSIS_MS", DEFAULT_ELLIPSIS_INTERVAL),
            roll_delay: millis("DUNGEONMIND_DICE_DELAY_MS", DEFAULT_ROLL_DELAY),
        }
    }
}
