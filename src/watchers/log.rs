//! Watcher for tagged log fragments written by a log shipper (e.g. Fluentd).
//!
//! Each line of a fragment is `<time>\t<tag>.<level>\t{"message": ...}`. All
//! matching files are parsed into one alert; after a successful run the files
//! are removed. When no fragment is ready but several partial files pile up,
//! a pending alert reports a possibly stuck shipper.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde_yaml::Value;

use super::{compose_body, OWNER_LOG};
use crate::core::value::{parse_int, Section};
use crate::core::{Alert, HostContext, Level, MessageCatalog};
use crate::error::{AlertError, Result};
use crate::utils::{fill, truncate_chars};

pub const DEFAULT_TARGET_PATTERN: &str = "alert.????????_????_*.log";
pub const DEFAULT_PENDING_PATTERN: &str = "alert.????????_????*";
pub const DEFAULT_MESSAGE_NUM_THRESHOLD: usize = 15;
pub const DEFAULT_MESSAGE_LEN_THRESHOLD: usize = 1024;
pub const DEFAULT_PENDING_THRESHOLD: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub watch_dir: PathBuf,
    /// Glob for ready fragments, joined onto `watch_dir`
    pub target_pattern: String,
    /// Glob for any fragment, ready or not, joined onto `watch_dir`
    pub pending_pattern: String,
    pub message_num_threshold: usize,
    pub message_len_threshold: usize,
    pub pending_threshold: usize,
}

impl LogSettings {
    pub fn parse(value: &Value) -> Result<Self> {
        let section = Section::new(OWNER_LOG, value)?;

        let watch_dir = PathBuf::from(section.require_string("watch_dir")?);
        let target_pattern = glob_in(&section, &watch_dir, "target_pattern", DEFAULT_TARGET_PATTERN)?;
        let pending_pattern =
            glob_in(&section, &watch_dir, "pending_pattern", DEFAULT_PENDING_PATTERN)?;

        Ok(Self {
            target_pattern,
            pending_pattern,
            message_num_threshold: threshold(
                &section,
                "message_num_threshold",
                DEFAULT_MESSAGE_NUM_THRESHOLD,
            )?,
            message_len_threshold: threshold(
                &section,
                "message_len_threshold",
                DEFAULT_MESSAGE_LEN_THRESHOLD,
            )?,
            pending_threshold: threshold(&section, "pending_threshold", DEFAULT_PENDING_THRESHOLD)?,
            watch_dir,
        })
    }
}

/// Empty patterns fall back to the default
fn glob_in(section: &Section, dir: &Path, key: &str, default: &str) -> Result<String> {
    let pattern = section
        .optional_string(key)?
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| default.to_string());
    let joined = dir.join(pattern).to_string_lossy().into_owned();
    glob::Pattern::new(&joined).map_err(|e| section.syntax_error(e))?;
    Ok(joined)
}

/// Missing, empty and zero values fall back to the default
fn threshold(section: &Section, key: &str, default: usize) -> Result<usize> {
    let n = match section.get(key) {
        None => return Ok(default),
        Some(Value::String(s)) if s.is_empty() => return Ok(default),
        Some(v) => parse_int(v).map_err(|e| section.syntax_error(e))?,
    };
    match n {
        0 => Ok(default),
        n if n < 0 => Err(section.syntax_error(format!("{} should not be negative: {}", key, n))),
        n => usize::try_from(n).map_err(|e| section.syntax_error(e)),
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct TagSummary {
    count: usize,
    messages: Vec<String>,
}

/// Per-tag message counts with a capped, truncated sample of messages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogTagAccumulator {
    tags: BTreeMap<String, TagSummary>,
    max_level: Level,
    num_threshold: usize,
    len_threshold: usize,
}

impl LogTagAccumulator {
    pub fn new(num_threshold: usize, len_threshold: usize) -> Self {
        Self {
            tags: BTreeMap::new(),
            // fragments only carry warn and above
            max_level: Level::Warn,
            num_threshold,
            len_threshold,
        }
    }

    pub fn add(&mut self, tag: &str, level: Level, message: &str) {
        let summary = self.tags.entry(tag.to_string()).or_default();
        summary.count += 1;
        if summary.count <= self.num_threshold {
            summary
                .messages
                .push(truncate_chars(message, self.len_threshold).to_string());
        }
        self.max_level = self.max_level.max(level);
    }

    pub fn max_level(&self) -> Level {
        self.max_level
    }

    pub fn count(&self, tag: &str) -> usize {
        self.tags.get(tag).map_or(0, |s| s.count)
    }

    /// Tags in lexicographic order, each followed by its messages and a blank line
    pub fn render(&self, catalog: &MessageCatalog) -> String {
        let mut buf = Vec::new();
        for (tag, summary) in &self.tags {
            buf.push(fill(
                catalog.log_summary,
                &[("tag", tag), ("count", &summary.count.to_string())],
            ));
            buf.extend(summary.messages.iter().cloned());
            if summary.count > self.num_threshold {
                buf.push(catalog.log_snip.to_string());
            }
            buf.push(String::new());
        }
        buf.join("\n")
    }
}

#[derive(Debug)]
pub struct LogWatcher {
    settings: LogSettings,
    print_only: bool,
    /// Files matched by the last `watch`
    target_paths: Option<Vec<PathBuf>>,
}

impl LogWatcher {
    pub fn from_config(config: &Value, print_only: bool) -> Result<Self> {
        Ok(Self {
            settings: LogSettings::parse(config)?,
            print_only,
            target_paths: None,
        })
    }

    pub fn settings(&self) -> &LogSettings {
        &self.settings
    }

    pub fn target_paths(&self) -> Option<&[PathBuf]> {
        self.target_paths.as_deref()
    }

    pub fn watch(&mut self, host: &HostContext) -> Result<Vec<Alert>> {
        let start_time = Local::now();

        let paths = glob_paths(&self.settings.target_pattern)?;
        self.target_paths = Some(paths.clone());
        if paths.is_empty() {
            return self.check_pending(start_time, host);
        }

        let mut acc = LogTagAccumulator::new(
            self.settings.message_num_threshold,
            self.settings.message_len_threshold,
        );
        for path in &paths {
            parse_file(path, &mut acc)?;
        }
        log::debug!("Parsed {} log file(s)", paths.len());

        let catalog = &host.catalog;
        let message = compose_body(catalog.log_alert, host, &acc.render(catalog));
        Ok(vec![Alert::new(
            start_time,
            acc.max_level(),
            catalog.log_alert_title,
            message,
        )])
    }

    /// Remove the files consumed by the last `watch`
    pub fn after_success(&self) -> Result<()> {
        let Some(paths) = &self.target_paths else {
            return Ok(());
        };

        let mut first_error = None;
        for path in paths {
            if self.print_only {
                println!("Would remove: {}", path.display());
                continue;
            }
            if let Err(e) = fs::remove_file(path) {
                log::error!("Failed to remove {}: {}", path.display(), e);
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(AlertError::Io(e)),
            None => Ok(()),
        }
    }

    fn check_pending(&self, start_time: DateTime<Local>, host: &HostContext) -> Result<Vec<Alert>> {
        let paths = glob_paths(&self.settings.pending_pattern)?;
        if paths.len() < self.settings.pending_threshold {
            return Ok(Vec::new());
        }

        let paths: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
        let catalog = &host.catalog;
        let message = fill(
            catalog.log_pending,
            &[
                ("server_id", &host.server_id),
                ("pattern", &self.settings.pending_pattern),
                ("paths", &paths.join("\n")),
            ],
        );
        Ok(vec![Alert::new(
            start_time,
            Level::Warn,
            catalog.log_pending_title,
            message,
        )])
    }
}

impl PartialEq for LogWatcher {
    fn eq(&self, other: &Self) -> bool {
        self.settings == other.settings && self.print_only == other.print_only
    }
}

fn glob_paths(pattern: &str) -> Result<Vec<PathBuf>> {
    let entries = glob::glob(pattern)
        .map_err(|e| AlertError::config(format!("{} settings syntax error: {}", OWNER_LOG, e)))?;
    let mut paths = Vec::new();
    for entry in entries {
        paths.push(entry.map_err(|e| AlertError::Io(e.into_error()))?);
    }
    paths.sort();
    Ok(paths)
}

fn parse_file(path: &Path, acc: &mut LogTagAccumulator) -> Result<()> {
    let reader = BufReader::new(File::open(path)?);
    for raw in reader.split(b'\n') {
        let raw = raw?;
        let line = String::from_utf8_lossy(&raw);
        let line = line.strip_suffix('\r').unwrap_or(&line);
        parse_line(line, acc).map_err(|(kind, msg)| {
            AlertError::log_format(format!(
                "LogWatcher parse error: {}: {}: file={}, line={}",
                kind,
                msg,
                path.display(),
                line
            ))
        })?;
    }
    Ok(())
}

fn parse_line(line: &str, acc: &mut LogTagAccumulator) -> std::result::Result<(), (&'static str, String)> {
    let fields: Vec<&str> = line.split('\t').collect();
    let [_, tag, payload] = fields[..] else {
        return Err((
            "FieldCountError",
            format!("expected 3 tab-separated fields, found {}", fields.len()),
        ));
    };

    let json: serde_json::Value =
        serde_json::from_str(payload).map_err(|e| ("JsonError", e.to_string()))?;
    let message = match json.get("message") {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => {
            return Err(("TypeError", format!("message is not a string: {}", other)));
        }
        None => return Err(("KeyError", "'message'".to_string())),
    };

    let keyword = tag.rsplit('.').next().unwrap_or(tag);
    let level = Level::from_keyword(keyword).map_err(|e| ("LevelError", e.to_string()))?;

    acc.add(tag, level, &message);
    Ok(())
}
