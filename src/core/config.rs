//! Configuration document loading.
//!
//! The document has two required mappings: `watchers` (watcher type keyword to
//! its settings) and `notifiers` (notifier type keyword to its settings). Only
//! the watchers requested on the command line are built, in that order.

use std::fs;
use std::path::{Path, PathBuf};

use serde_yaml::Value;

use crate::error::{AlertError, Result};
use crate::notifiers::{Notifier, NotifierKind};
use crate::watchers::{Watcher, WatcherKind};

pub const DEFAULT_CONFIG_PATH: &str = "/etc/easy-alert/easy-alert.yml";

/// Supplies the raw configuration document
pub trait ConfigSource {
    /// Where the document comes from, used in error messages
    fn origin(&self) -> String;

    fn read(&self) -> Result<Value>;
}

/// A YAML file on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YamlFile {
    path: PathBuf,
}

impl YamlFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigSource for YamlFile {
    fn origin(&self) -> String {
        self.path.display().to_string()
    }

    fn read(&self) -> Result<Value> {
        let text = fs::read_to_string(&self.path)?;
        Ok(serde_yaml::from_str(&text)?)
    }
}

/// Validated watchers and notifiers for one run
#[derive(Debug, PartialEq)]
pub struct Config {
    pub watchers: Vec<Watcher>,
    pub notifiers: Vec<Notifier>,
}

impl Config {
    pub fn load(source: &dyn ConfigSource, kinds: &[WatcherKind], print_only: bool) -> Result<Self> {
        let document = source.read()?;
        Self::from_document(&document, &source.origin(), kinds, print_only)
    }

    pub fn from_document(
        document: &Value,
        origin: &str,
        kinds: &[WatcherKind],
        print_only: bool,
    ) -> Result<Self> {
        let syntax_error = || AlertError::config(format!("Syntax error: {}", origin));

        let Value::Mapping(root) = document else {
            return Err(syntax_error());
        };

        let watcher_configs = match root.get("watchers") {
            Some(v) if !is_blank(v) => v.as_mapping().ok_or_else(syntax_error)?,
            _ => {
                return Err(AlertError::config(format!(
                    "Not found \"watchers\" entry: {}",
                    origin
                )))
            }
        };
        let watchers = kinds
            .iter()
            .map(|kind| match watcher_configs.get(kind.keyword()) {
                Some(v) if !is_blank(v) => Watcher::from_config(*kind, v, print_only),
                _ => Err(AlertError::config(format!(
                    "Not found watcher configuration for \"{}\": {}",
                    kind, origin
                ))),
            })
            .collect::<Result<Vec<_>>>()?;

        let notifier_configs = match root.get("notifiers") {
            Some(v) if !is_blank(v) => v.as_mapping().ok_or_else(syntax_error)?,
            _ => {
                return Err(AlertError::config(format!(
                    "Not found \"notifiers\" entry: {}",
                    origin
                )))
            }
        };
        let notifiers = notifier_configs
            .iter()
            .map(|(key, value)| {
                let keyword = key.as_str().ok_or_else(syntax_error)?;
                let kind = NotifierKind::from_keyword(keyword).ok_or_else(|| {
                    AlertError::config(format!(
                        "Unsupported notifier type: {} in {}",
                        keyword, origin
                    ))
                })?;
                Notifier::from_config(kind, value, print_only)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            watchers,
            notifiers,
        })
    }
}

/// Missing-equivalent values: null, false, zero and empty collections
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Sequence(seq) => seq.is_empty(),
        Value::Mapping(map) => map.is_empty(),
        Value::Tagged(tagged) => is_blank(&tagged.value),
    }
}
