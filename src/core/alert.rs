use chrono::{DateTime, Local};

use super::level::Level;

/// Output of a watcher and input of every notifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub start_time: DateTime<Local>,
    pub level: Level,
    pub title: String,
    pub message: String,
}

impl Alert {
    pub fn new(
        start_time: DateTime<Local>,
        level: Level,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            start_time,
            level,
            title: title.into(),
            message: message.into(),
        }
    }

    /// Start time as rendered in notification subjects
    pub fn formatted_start_time(&self) -> String {
        self.start_time.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}
