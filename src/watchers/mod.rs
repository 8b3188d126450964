//! Watchers: one check type each, producing alerts from their own settings.

pub mod command;
pub mod http;
pub mod log;
pub mod process;
pub mod ssh;

use std::fmt;
use std::str::FromStr;

use serde_yaml::Value;

use crate::core::value::{render, Section};
use crate::core::{Alert, HostContext, Level};
use crate::error::{AlertError, Result};
use crate::utils::fill;

pub use self::command::{CommandSetting, CommandWatcher};
pub use self::http::{HttpSetting, HttpWatcher};
pub use self::log::{LogSettings, LogTagAccumulator, LogWatcher};
pub use self::process::{ProcessSetting, ProcessWatcher};
pub use self::ssh::{SshSetting, SshTarget, SshWatcher};

pub(crate) const OWNER_PROCESS: &str = "ProcessWatcher";
pub(crate) const OWNER_LOG: &str = "LogWatcher";
pub(crate) const OWNER_SSH: &str = "SSHWatcher";
pub(crate) const OWNER_COMMAND: &str = "CommandWatcher";
pub(crate) const OWNER_HTTP: &str = "HTTPWatcher";

/// Watcher type keywords accepted on the command line and in `watchers:`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WatcherKind {
    Process,
    Log,
    Ssh,
    Command,
    Http,
}

impl WatcherKind {
    /// Sorted by keyword
    pub const ALL: [WatcherKind; 5] = [
        WatcherKind::Command,
        WatcherKind::Http,
        WatcherKind::Log,
        WatcherKind::Process,
        WatcherKind::Ssh,
    ];

    pub fn keyword(&self) -> &'static str {
        match self {
            WatcherKind::Process => "process",
            WatcherKind::Log => "log",
            WatcherKind::Ssh => "ssh",
            WatcherKind::Command => "command",
            WatcherKind::Http => "http",
        }
    }
}

impl FromStr for WatcherKind {
    type Err = AlertError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.keyword() == s)
            .ok_or_else(|| AlertError::config(format!("Unsupported watcher type: {}", s)))
    }
}

impl fmt::Display for WatcherKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A configured watcher of any kind
#[derive(Debug, PartialEq)]
pub enum Watcher {
    Process(ProcessWatcher),
    Log(LogWatcher),
    Ssh(SshWatcher),
    Command(CommandWatcher),
    Http(HttpWatcher),
}

impl Watcher {
    /// Validate the settings for `kind`. `print_only` only affects the log watcher.
    pub fn from_config(kind: WatcherKind, config: &Value, print_only: bool) -> Result<Self> {
        Ok(match kind {
            WatcherKind::Process => Watcher::Process(ProcessWatcher::from_config(config)?),
            WatcherKind::Log => Watcher::Log(LogWatcher::from_config(config, print_only)?),
            WatcherKind::Ssh => Watcher::Ssh(SshWatcher::from_config(config)?),
            WatcherKind::Command => Watcher::Command(CommandWatcher::from_config(config)?),
            WatcherKind::Http => Watcher::Http(HttpWatcher::from_config(config)?),
        })
    }

    pub fn kind(&self) -> WatcherKind {
        match self {
            Watcher::Process(_) => WatcherKind::Process,
            Watcher::Log(_) => WatcherKind::Log,
            Watcher::Ssh(_) => WatcherKind::Ssh,
            Watcher::Command(_) => WatcherKind::Command,
            Watcher::Http(_) => WatcherKind::Http,
        }
    }

    pub fn watch(&mut self, host: &HostContext) -> Result<Vec<Alert>> {
        match self {
            Watcher::Process(w) => w.watch(host),
            Watcher::Log(w) => w.watch(host),
            Watcher::Ssh(w) => w.watch(host),
            Watcher::Command(w) => w.watch(host),
            Watcher::Http(w) => w.watch(host),
        }
    }

    /// Post-processing once every alert was delivered
    pub fn after_success(&self) -> Result<()> {
        match self {
            Watcher::Log(w) => w.after_success(),
            _ => Ok(()),
        }
    }
}

/// Fill a watcher alert body template
pub(crate) fn compose_body(template: &str, host: &HostContext, result: &str) -> String {
    fill(
        template,
        &[("server_id", host.server_id.as_str()), ("result", result)],
    )
}

/// Level keyword of a single-level entry
pub(crate) fn parse_level(section: &Section, value: &Value) -> Result<Level> {
    match value {
        Value::String(s) => Level::from_keyword(s).ok(),
        _ => None,
    }
    .ok_or_else(|| {
        AlertError::config(format!("{} invalid level: {}", section.owner(), render(value)))
    })
}
