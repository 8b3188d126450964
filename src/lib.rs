// easy-alert library: watchers, notifiers and the run loop

pub mod error;
pub use error::{AlertError, Result};

pub mod commands;
pub mod core;
pub mod notifiers;
pub mod platform;
pub mod utils;
pub mod watchers;

pub use self::core::{Alert, Config, HostContext, Level, Matcher};
pub use notifiers::Notifier;
pub use watchers::{Watcher, WatcherKind};

use std::io::Write;
use std::path::Path;

/// Install the global logger.
///
/// Check mode prints bare messages to stdout; otherwise lines go to syslog
/// under the program name.
pub fn init_logging(print_only: bool) {
    if print_only {
        let _ = env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .format(|buf, record| writeln!(buf, "{}", record.args()))
            .target(env_logger::Target::Stdout)
            .try_init();
        return;
    }

    let ident = std::env::args()
        .next()
        .and_then(|arg0| {
            Path::new(&arg0)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| "easy-alert".to_string());
    if let Err(e) = platform::syslog::install(&ident) {
        eprintln!("Failed to initialize syslog: {}", e);
    }
}
