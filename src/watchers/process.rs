//! Process count watcher.
//!
//! Each entry names a command-line regexp and a ladder of `level: matcher`
//! conditions. Conditions are checked from the most severe level down and the
//! first one the observed count violates decides the entry's level.

use std::fmt;

use chrono::Local;
use serde_yaml::Value;

use super::{compose_body, OWNER_PROCESS};
use crate::core::value::{as_list, render, Section};
use crate::core::{
    Alert, HostContext, Level, Matcher, MessageCatalog, Pattern, ProcessCounter, ProcessReader,
};
use crate::error::{AlertError, Result};
use crate::platform::SystemProcessReader;
use crate::utils::fill;

/// One watched process group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessSetting {
    pub name: String,
    pub pattern: Pattern,
    pub aggregate: bool,
    /// Most severe first
    pub conditions: Vec<(Level, Matcher)>,
}

impl ProcessSetting {
    fn parse(value: &Value) -> Result<Self> {
        let section = Section::new(OWNER_PROCESS, value)?;

        let name = section.require_string("name")?;
        let regexp = section.require_string("regexp")?;
        let pattern = Pattern::new(&regexp).map_err(|e| section.syntax_error(e))?;

        let aggregate = match section.get("aggregate") {
            None => true,
            Some(Value::Bool(b)) => *b,
            Some(other) => {
                return Err(AlertError::config(format!(
                    "{} value should be bool: {}",
                    OWNER_PROCESS,
                    render(other)
                )))
            }
        };

        let mut conditions = Vec::new();
        for level in Level::DESCENDING {
            if let Some(raw) = section.get(level.keyword()) {
                let matcher = render(raw)
                    .parse::<Matcher>()
                    .map_err(|e| section.syntax_error(e))?;
                conditions.push((level, matcher));
            }
        }
        if conditions.is_empty() {
            return Err(AlertError::config(format!(
                "{} not found threshold: {}",
                OWNER_PROCESS,
                section.describe()
            )));
        }

        Ok(Self {
            name,
            pattern,
            aggregate,
            conditions,
        })
    }

    /// First violated condition, scanning from the most severe level
    pub fn evaluate(&self, count: usize) -> Option<(Level, Matcher)> {
        let count = i64::try_from(count).unwrap_or(i64::MAX);
        self.conditions
            .iter()
            .find(|(_, matcher)| !matcher.check(count))
            .copied()
    }
}

/// An entry whose count violated one of its conditions
#[derive(Debug, Clone, PartialEq, Eq)]
struct ProcessStatus<'a> {
    name: &'a str,
    count: usize,
    level: Level,
    condition: Matcher,
}

impl ProcessStatus<'_> {
    fn render(&self, catalog: &MessageCatalog) -> String {
        let count = if self.count == 0 {
            catalog.proc_not_running.to_string()
        } else {
            fill(catalog.proc_running, &[("count", &self.count.to_string())])
        };
        fill(
            catalog.proc_status,
            &[
                ("level", self.level.text(catalog)),
                ("name", self.name),
                ("count", &count),
                ("condition", &self.condition.to_string()),
            ],
        )
    }
}

pub struct ProcessWatcher {
    settings: Vec<ProcessSetting>,
    reader: Box<dyn ProcessReader>,
}

impl ProcessWatcher {
    pub fn from_config(config: &Value) -> Result<Self> {
        Self::with_reader(config, Box::new(SystemProcessReader::new()))
    }

    /// Same as [`ProcessWatcher::from_config`] with a custom process source
    pub fn with_reader(config: &Value, reader: Box<dyn ProcessReader>) -> Result<Self> {
        let settings = as_list(OWNER_PROCESS, config)?
            .iter()
            .map(ProcessSetting::parse)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { settings, reader })
    }

    pub fn settings(&self) -> &[ProcessSetting] {
        &self.settings
    }

    pub fn watch(&self, host: &HostContext) -> Result<Vec<Alert>> {
        let start_time = Local::now();
        let counter = ProcessCounter::new(self.reader.read()?);

        let statuses: Vec<ProcessStatus> = self
            .settings
            .iter()
            .filter_map(|s| {
                let count = counter.count(&s.pattern, s.aggregate);
                log::debug!("{}: {} process(es) match {}", s.name, count, s.pattern);
                s.evaluate(count).map(|(level, condition)| ProcessStatus {
                    name: &s.name,
                    count,
                    level,
                    condition,
                })
            })
            .collect();

        let Some(max_level) = statuses.iter().map(|s| s.level).max() else {
            return Ok(Vec::new());
        };

        let catalog = &host.catalog;
        let lines: Vec<String> = statuses.iter().map(|s| s.render(catalog)).collect();
        let message = compose_body(catalog.proc_alert, host, &lines.join("\n"));
        Ok(vec![Alert::new(
            start_time,
            max_level,
            catalog.proc_alert_title,
            message,
        )])
    }
}

impl fmt::Debug for ProcessWatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessWatcher")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl PartialEq for ProcessWatcher {
    fn eq(&self, other: &Self) -> bool {
        self.settings == other.settings
    }
}
