//! Runs health-check commands and compares their outcome with expectations.

use chrono::Local;
use serde_yaml::Value;

use super::{compose_body, parse_level, OWNER_COMMAND};
use crate::core::value::{as_list, Section};
use crate::core::{Alert, HostContext, Level, MessageCatalog, Pattern};
use crate::error::{AlertError, Result};
use crate::platform::{run_shell, CommandOutput};
use crate::utils::{fill, truncate_chars};

pub const DEFAULT_MAX_OUTPUT_LEN: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSetting {
    pub name: String,
    pub level: Level,
    pub command: String,
    pub expect_code: Option<i32>,
    pub expect_stdout: Option<Pattern>,
    pub expect_stderr: Option<Pattern>,
    pub max_output_len: usize,
}

impl CommandSetting {
    fn parse(value: &Value) -> Result<Self> {
        let section = Section::new(OWNER_COMMAND, value)?;

        let name = section.require_string("name")?;
        let level = parse_level(&section, section.require("level")?)?;
        let command = section.require_string("command")?;

        let expect_code = section
            .optional_int("expect_code")?
            .map(|c| i32::try_from(c).map_err(|e| section.syntax_error(e)))
            .transpose()?;
        let expect_stdout = section.optional_pattern("expect_stdout")?;
        let expect_stderr = section.optional_pattern("expect_stderr")?;
        let max_output_len = match section.optional_int("max_output_len")? {
            None => DEFAULT_MAX_OUTPUT_LEN,
            Some(n) => usize::try_from(n).map_err(|_| {
                section.syntax_error(format!("max_output_len should not be negative: {}", n))
            })?,
        };

        if expect_code.is_none() && expect_stdout.is_none() && expect_stderr.is_none() {
            return Err(AlertError::config(format!(
                "{} any of expect_code, expect_stdout or expect_stderr should be set.",
                OWNER_COMMAND
            )));
        }

        Ok(Self {
            name,
            level,
            command,
            expect_code,
            expect_stdout,
            expect_stderr,
            max_output_len,
        })
    }

    /// True if any configured expectation does not hold
    pub fn should_alert(&self, output: &CommandOutput) -> bool {
        self.expect_code.is_some_and(|c| c != output.code)
            || self
                .expect_stdout
                .as_ref()
                .is_some_and(|p| !p.is_match(&output.stdout))
            || self
                .expect_stderr
                .as_ref()
                .is_some_and(|p| !p.is_match(&output.stderr))
    }

    fn render(&self, output: &CommandOutput, catalog: &MessageCatalog) -> String {
        let none = || "None".to_string();
        fill(
            catalog.cmd_status,
            &[
                ("level", self.level.text(catalog)),
                ("name", &self.name),
                ("code", &output.code.to_string()),
                ("stdout", truncate_chars(&output.stdout, self.max_output_len)),
                ("stderr", truncate_chars(&output.stderr, self.max_output_len)),
                (
                    "expect_code",
                    &self.expect_code.map_or_else(none, |c| c.to_string()),
                ),
                (
                    "expect_stdout",
                    &self.expect_stdout.as_ref().map_or_else(none, |p| p.to_string()),
                ),
                (
                    "expect_stderr",
                    &self.expect_stderr.as_ref().map_or_else(none, |p| p.to_string()),
                ),
            ],
        )
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct CommandWatcher {
    settings: Vec<CommandSetting>,
}

impl CommandWatcher {
    pub fn from_config(config: &Value) -> Result<Self> {
        let settings = as_list(OWNER_COMMAND, config)?
            .iter()
            .map(CommandSetting::parse)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &[CommandSetting] {
        &self.settings
    }

    pub fn watch(&self, host: &HostContext) -> Result<Vec<Alert>> {
        let start_time = Local::now();
        let catalog = &host.catalog;

        let mut failures: Vec<(Level, String)> = Vec::new();
        for setting in &self.settings {
            let output = match run_shell(&setting.command) {
                Ok(output) => output,
                Err(e) => {
                    log::error!("Failed to execute '{}': {}", setting.command, e);
                    CommandOutput {
                        code: -1,
                        stdout: String::new(),
                        stderr: e.to_string(),
                    }
                }
            };
            if setting.should_alert(&output) {
                failures.push((setting.level, setting.render(&output, catalog)));
            }
        }

        let Some(max_level) = failures.iter().map(|(l, _)| *l).max() else {
            return Ok(Vec::new());
        };
        let lines: Vec<&str> = failures.iter().map(|(_, m)| m.as_str()).collect();
        let message = compose_body(catalog.cmd_alert, host, &lines.join("\n"));
        Ok(vec![Alert::new(
            start_time,
            max_level,
            catalog.cmd_alert_title,
            message,
        )])
    }
}
