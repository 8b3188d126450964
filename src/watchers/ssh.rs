//! SSH reachability watcher.

use std::fmt;

use chrono::Local;
use serde_yaml::Value;

use super::{compose_body, OWNER_SSH};
use crate::core::value::{as_list, Section};
use crate::core::{Alert, HostContext, Level};
use crate::error::Result;
use crate::platform::{run_shell, OpenSshProbe, ProbeFailure, SshEndpoint, SshProbe};
use crate::utils::fill;

pub const DEFAULT_PORT: u16 = 22;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SshTarget {
    Static { name: String, host: String },
    /// Shell command printing `<host> <name>` lines
    Dynamic { command: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshSetting {
    pub user: String,
    pub key: String,
    pub port: u16,
    pub target: SshTarget,
}

impl SshSetting {
    fn parse(value: &Value) -> Result<Self> {
        let section = Section::new(OWNER_SSH, value)?;

        let user = section.require_string("user")?;
        let key = section.require_string("key")?;
        let port = match section.optional_int("port")? {
            None => DEFAULT_PORT,
            Some(p) => u16::try_from(p).map_err(|e| section.syntax_error(format!("{}: {}", e, p)))?,
        };

        let target = match section.optional_string("dynamic")?.filter(|c| !c.is_empty()) {
            Some(command) => SshTarget::Dynamic { command },
            None => SshTarget::Static {
                name: section.require_string("name")?,
                host: section.require_string("host")?,
            },
        };

        Ok(Self {
            user,
            key,
            port,
            target,
        })
    }

    fn endpoint(&self, host: &str) -> SshEndpoint {
        SshEndpoint {
            host: host.to_string(),
            port: self.port,
            user: self.user.clone(),
            key: self.key.clone(),
        }
    }
}

/// A resolved `(name, host)` pair to probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub name: String,
    pub host: String,
}

/// Parse the output of a discovery command. The first token of each line is
/// the host, the rest is the display name.
pub fn parse_targets(output: &str) -> Vec<ResolvedTarget> {
    output
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            let (host, name) = match line.split_once(char::is_whitespace) {
                Some((host, name)) => (host, name.trim()),
                None => (line, line),
            };
            (!host.is_empty()).then(|| ResolvedTarget {
                name: name.to_string(),
                host: host.to_string(),
            })
        })
        .collect()
}

fn discover(command: &str) -> std::result::Result<Vec<ResolvedTarget>, ProbeFailure> {
    let output = run_shell(command).map_err(|e| ProbeFailure::new("DiscoveryError", e.to_string()))?;
    if output.code != 0 {
        return Err(ProbeFailure::new(
            "DiscoveryError",
            format!("exit code {}: {}", output.code, output.stderr.trim()),
        ));
    }
    Ok(parse_targets(&output.stdout))
}

pub struct SshWatcher {
    settings: Vec<SshSetting>,
    probe: Box<dyn SshProbe>,
}

impl SshWatcher {
    pub fn from_config(config: &Value) -> Result<Self> {
        Self::with_probe(config, Box::new(OpenSshProbe::new()))
    }

    pub fn with_probe(config: &Value, probe: Box<dyn SshProbe>) -> Result<Self> {
        let settings = as_list(OWNER_SSH, config)?
            .iter()
            .map(SshSetting::parse)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { settings, probe })
    }

    pub fn settings(&self) -> &[SshSetting] {
        &self.settings
    }

    pub fn watch(&self, host: &HostContext) -> Result<Vec<Alert>> {
        let start_time = Local::now();
        let catalog = &host.catalog;

        let mut errors = Vec::new();
        let mut report = |setting: &SshSetting, name: &str, target_host: &str, failure: &ProbeFailure| {
            errors.push(fill(
                catalog.ssh_status,
                &[
                    ("name", name),
                    ("user", &setting.user),
                    ("host", target_host),
                    ("port", &setting.port.to_string()),
                    ("msg", &failure.to_string()),
                ],
            ));
        };

        for setting in &self.settings {
            let targets = match &setting.target {
                SshTarget::Static { name, host } => vec![ResolvedTarget {
                    name: name.clone(),
                    host: host.clone(),
                }],
                SshTarget::Dynamic { command } => match discover(command) {
                    Ok(targets) => targets,
                    Err(failure) => {
                        log::error!("Failed to list SSH targets with '{}': {}", command, failure);
                        report(setting, command, "-", &failure);
                        continue;
                    }
                },
            };

            for target in targets {
                if let Err(failure) = self.probe.probe(&setting.endpoint(&target.host)) {
                    report(setting, &target.name, &target.host, &failure);
                }
            }
        }

        if errors.is_empty() {
            return Ok(Vec::new());
        }
        let message = compose_body(catalog.ssh_alert, host, &errors.join("\n"));
        Ok(vec![Alert::new(
            start_time,
            Level::Error,
            catalog.ssh_alert_title,
            message,
        )])
    }
}

impl fmt::Debug for SshWatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SshWatcher")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl PartialEq for SshWatcher {
    fn eq(&self, other: &Self) -> bool {
        self.settings == other.settings
    }
}
