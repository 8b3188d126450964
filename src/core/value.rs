//! Helpers for reading untyped YAML configuration trees.
//!
//! Every watcher and notifier validates its own section with these helpers so
//! that error messages share one shape: `<Owner> <problem>: <detail>`.

use serde_yaml::{Mapping, Value};

use super::pattern::Pattern;
use crate::error::{AlertError, Result};

/// Render a value in YAML flow style for error messages
pub fn render(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Sequence(seq) => {
            let items: Vec<String> = seq.iter().map(render).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Mapping(map) => {
            let items: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{}: {}", render(k), render(v)))
                .collect();
            format!("{{{}}}", items.join(", "))
        }
        Value::Tagged(tagged) => render(&tagged.value),
    }
}

/// Integers may be written as numbers or numeric strings
pub fn parse_int(value: &Value) -> std::result::Result<i64, String> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| format!("invalid integer value: '{}'", n)),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| format!("invalid integer value: '{}'", s)),
        other => Err(format!("invalid integer value: '{}'", render(other))),
    }
}

/// Expect a list-shaped section
pub fn as_list<'a>(owner: &str, value: &'a Value) -> Result<&'a [Value]> {
    match value {
        Value::Sequence(seq) => Ok(seq),
        other => Err(AlertError::config(format!(
            "{} settings not a list: {}",
            owner,
            render(other)
        ))),
    }
}

/// A mapping-shaped section owned by one watcher or notifier
#[derive(Debug, Clone, Copy)]
pub struct Section<'a> {
    owner: &'static str,
    value: &'a Value,
    map: &'a Mapping,
}

impl<'a> Section<'a> {
    pub fn new(owner: &'static str, value: &'a Value) -> Result<Self> {
        match value {
            Value::Mapping(map) => Ok(Self { owner, value, map }),
            other => Err(AlertError::config(format!(
                "{} settings not a dict: {}",
                owner,
                render(other)
            ))),
        }
    }

    pub fn owner(&self) -> &'static str {
        self.owner
    }

    /// The whole section, rendered
    pub fn describe(&self) -> String {
        render(self.value)
    }

    /// Present and non-null value
    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.map.get(key).filter(|v| !v.is_null())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn require(&self, key: &str) -> Result<&'a Value> {
        self.get(key).ok_or_else(|| {
            AlertError::config(format!("{} not found config key: {}", self.owner, key))
        })
    }

    pub fn require_string(&self, key: &str) -> Result<String> {
        let value = self.require(key)?;
        self.scalar(value)
    }

    pub fn optional_string(&self, key: &str) -> Result<Option<String>> {
        self.get(key).map(|v| self.scalar(v)).transpose()
    }

    pub fn optional_int(&self, key: &str) -> Result<Option<i64>> {
        self.get(key)
            .map(|v| parse_int(v).map_err(|e| self.syntax_error(e)))
            .transpose()
    }

    pub fn optional_pattern(&self, key: &str) -> Result<Option<Pattern>> {
        self.optional_string(key)?
            .map(|s| Pattern::new(&s).map_err(|e| self.syntax_error(e)))
            .transpose()
    }

    pub fn syntax_error(&self, detail: impl std::fmt::Display) -> AlertError {
        AlertError::config(format!("{} settings syntax error: {}", self.owner, detail))
    }

    fn scalar(&self, value: &Value) -> Result<String> {
        match value {
            Value::String(s) => Ok(s.clone()),
            Value::Number(n) => Ok(n.to_string()),
            Value::Bool(b) => Ok(b.to_string()),
            other => Err(self.syntax_error(format!("expected a scalar: {}", render(other)))),
        }
    }
}
