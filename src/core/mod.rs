// Core data model and configuration

pub mod alert;
pub mod config;
pub mod host;
pub mod i18n;
pub mod level;
pub mod matcher;
pub mod pattern;
pub mod process_tree;
pub mod value;

pub use alert::Alert;
pub use config::{Config, ConfigSource, YamlFile, DEFAULT_CONFIG_PATH};
pub use host::HostContext;
pub use i18n::{Locale, MessageCatalog};
pub use level::Level;
pub use matcher::{Matcher, Operator};
pub use pattern::Pattern;
pub use process_tree::{ProcessCounter, ProcessEntry, ProcessReader, ProcessTable};
