use std::io;
use thiserror::Error;

/// Error type shared by every watcher, notifier and the settings loader
#[derive(Error, Debug)]
pub enum AlertError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Invalid or missing configuration. Fatal for the whole run.
    #[error("{0}")]
    Config(String),

    /// Malformed log fragment. Fatal for the whole run.
    #[error("{0}")]
    LogFormat(String),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Notification failed: {0}")]
    Notify(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for easy-alert
pub type Result<T> = std::result::Result<T, AlertError>;

impl AlertError {
    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        AlertError::Config(msg.into())
    }

    /// Create a log format error
    pub fn log_format<S: Into<String>>(msg: S) -> Self {
        AlertError::LogFormat(msg.into())
    }

    pub fn notify<S: Into<String>>(msg: S) -> Self {
        AlertError::Notify(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        AlertError::Other(msg.into())
    }

    /// Stable name of the error kind, used in the top-level failure log line
    pub fn kind(&self) -> &'static str {
        match self {
            AlertError::Io(_) => "IoError",
            AlertError::Config(_) => "SettingError",
            AlertError::LogFormat(_) => "LogFormatError",
            AlertError::Yaml(_) => "YamlError",
            AlertError::Notify(_) => "NotifyError",
            AlertError::Other(_) => "Error",
        }
    }
}
