//! One complete run: load settings, watch, notify, clean up.

use anyhow::{Context, Result};

use super::args::Setting;
use crate::core::{Config, HostContext, YamlFile};
use crate::error::AlertError;
use crate::notifiers::Notifier;
use crate::watchers::Watcher;

/// Run every watcher in order and send each alert to every notifier.
///
/// `after_success` hooks run only once all watchers and all notifications
/// have succeeded. Returns the number of alerts sent.
pub fn run_watchers(
    watchers: &mut [Watcher],
    notifiers: &[Notifier],
    host: &HostContext,
) -> Result<usize> {
    let mut sent = 0;
    for watcher in watchers.iter_mut() {
        let kind = watcher.kind();
        let alerts = watcher
            .watch(host)
            .with_context(|| format!("{} watcher failed", kind))?;
        log::debug!("{} watcher produced {} alert(s)", kind, alerts.len());

        for alert in &alerts {
            for notifier in notifiers {
                notifier
                    .notify(alert, host)
                    .with_context(|| format!("Failed to notify alert '{}'", alert.title))?;
            }
            sent += 1;
        }
    }

    for watcher in watchers.iter() {
        watcher
            .after_success()
            .with_context(|| format!("{} watcher cleanup failed", watcher.kind()))?;
    }
    Ok(sent)
}

fn run(setting: &Setting, host: &HostContext) -> Result<usize> {
    let source = YamlFile::new(&setting.config_path);
    let mut config = Config::load(&source, &setting.watcher_types, setting.print_only)?;
    run_watchers(&mut config.watchers, &config.notifiers, host)
}

/// Stable kind name of the innermost crate error, if any
pub fn error_kind(error: &anyhow::Error) -> &'static str {
    error
        .chain()
        .find_map(|cause| cause.downcast_ref::<AlertError>())
        .map_or("Error", AlertError::kind)
}

/// Execute a parsed command line and return the process exit status
pub fn execute(setting: &Setting) -> u8 {
    log::info!("Script started.");
    let host = HostContext::detect(setting.locale);

    match run(setting, &host) {
        Ok(sent) => {
            log::debug!("{} alert(s) sent", sent);
            log::info!("Script ended successfully.");
            0
        }
        Err(e) => {
            log::error!("Script ended with error: {}: {:#}", error_kind(&e), e);
            if setting.print_only {
                println!();
                println!("{:?}", e);
            }
            1
        }
    }
}
