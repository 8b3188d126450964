//! Alert severity.
//!
//! Levels are totally ordered by severity (`Debug < Info < Warn < Error < Critical`)
//! and can be built from a lowercase keyword or from a numeric ordinal.

use std::fmt;
use std::str::FromStr;

use serde_yaml::Value;

use super::i18n::MessageCatalog;
use super::value::render;
use crate::error::{AlertError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
    Critical,
}

impl Level {
    /// All levels, most severe first
    pub const DESCENDING: [Level; 5] = [
        Level::Critical,
        Level::Error,
        Level::Warn,
        Level::Info,
        Level::Debug,
    ];

    pub fn from_keyword(keyword: &str) -> Result<Self> {
        Self::DESCENDING
            .into_iter()
            .find(|l| l.keyword() == keyword)
            .ok_or_else(|| AlertError::config(format!("Unknown level string: {}", keyword)))
    }

    /// Build from a numeric ordinal (10, 20, 30, 40, 50)
    pub fn from_ordinal(ordinal: i64) -> Result<Self> {
        Self::DESCENDING
            .into_iter()
            .find(|l| l.ordinal() == ordinal)
            .ok_or_else(|| AlertError::config(format!("Invalid level: {}", ordinal)))
    }

    pub fn ordinal(&self) -> i64 {
        match self {
            Level::Debug => 10,
            Level::Info => 20,
            Level::Warn => 30,
            Level::Error => 40,
            Level::Critical => 50,
        }
    }

    /// Stable lowercase identifier used in configuration and log tags
    pub fn keyword(&self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Critical => "critical",
        }
    }

    /// Localized display text
    pub fn text<'a>(&self, catalog: &'a MessageCatalog) -> &'a str {
        match self {
            Level::Debug => catalog.level_debug,
            Level::Info => catalog.level_info,
            Level::Warn => catalog.level_warn,
            Level::Error => catalog.level_error,
            Level::Critical => catalog.level_critical,
        }
    }
}

impl FromStr for Level {
    type Err = AlertError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_keyword(s)
    }
}

impl TryFrom<&Value> for Level {
    type Error = AlertError;

    fn try_from(value: &Value) -> Result<Self> {
        match value {
            Value::String(s) => Self::from_keyword(s),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Self::from_ordinal(i),
                None => Err(AlertError::config(format!("Invalid level: {}", n))),
            },
            other => Err(AlertError::config(format!("Invalid level: {}", render(other)))),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}
