//! Command line parsing.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::builder::PossibleValuesParser;
use clap::{Arg, ArgAction, Command};

use crate::core::{Locale, DEFAULT_CONFIG_PATH};
use crate::watchers::WatcherKind;

/// What to run, parsed from the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Setting {
    /// In execution order, without duplicates
    pub watcher_types: Vec<WatcherKind>,
    pub config_path: PathBuf,
    pub print_only: bool,
    pub locale: Locale,
}

pub fn build_cli() -> Command {
    let keywords: Vec<&'static str> = WatcherKind::ALL.iter().map(|k| k.keyword()).collect();

    Command::new("easy-alert")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Checks processes, logs, SSH, commands and HTTP endpoints and mails alerts")
        .arg(
            Arg::new("watcher_type")
                .value_name("WATCHER_TYPE")
                .help("Watchers to run, in order")
                .required(true)
                .num_args(1..)
                .value_parser(PossibleValuesParser::new(keywords)),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Path to the config file")
                .default_value(DEFAULT_CONFIG_PATH),
        )
        .arg(
            Arg::new("check")
                .long("check")
                .help("Print alerts instead of sending notifications or removing files")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("lang")
                .long("lang")
                .value_name("LANG")
                .help("Language of alert messages")
                .value_parser(["en", "ja"])
                .default_value("en"),
        )
}

/// Parse arguments, including the program name in first position
pub fn parse_args<I, T>(args: I) -> Result<Setting, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = build_cli().try_get_matches_from(args)?;

    let mut watcher_types: Vec<WatcherKind> = Vec::new();
    for kind in matches
        .get_many::<String>("watcher_type")
        .into_iter()
        .flatten()
        .filter_map(|s| s.parse::<WatcherKind>().ok())
    {
        if !watcher_types.contains(&kind) {
            watcher_types.push(kind);
        }
    }

    let config_path = matches
        .get_one::<String>("config")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let locale = matches
        .get_one::<String>("lang")
        .and_then(|l| l.parse::<Locale>().ok())
        .unwrap_or_default();

    Ok(Setting {
        watcher_types,
        config_path,
        print_only: matches.get_flag("check"),
        locale,
    })
}
