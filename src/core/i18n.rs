//! Localized message templates.
//!
//! Templates use `{key}` placeholders filled by [`crate::utils::fill`]. A catalog is
//! chosen once at startup from an explicit [`Locale`] and handed to every watcher
//! and notifier through [`super::HostContext`].

use std::str::FromStr;

use crate::error::{AlertError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    En,
    Ja,
}

impl FromStr for Locale {
    type Err = AlertError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "en" => Ok(Locale::En),
            "ja" => Ok(Locale::Ja),
            other => Err(AlertError::config(format!("Unsupported locale: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageCatalog {
    pub level_debug: &'static str,
    pub level_info: &'static str,
    pub level_warn: &'static str,
    pub level_error: &'static str,
    pub level_critical: &'static str,

    pub proc_not_running: &'static str,
    pub proc_running: &'static str,
    pub proc_status: &'static str,
    pub proc_alert_title: &'static str,
    pub proc_alert: &'static str,

    pub log_summary: &'static str,
    pub log_snip: &'static str,
    pub log_alert_title: &'static str,
    pub log_alert: &'static str,
    pub log_pending_title: &'static str,
    pub log_pending: &'static str,

    pub ssh_status: &'static str,
    pub ssh_alert_title: &'static str,
    pub ssh_alert: &'static str,

    pub cmd_status: &'static str,
    pub cmd_alert_title: &'static str,
    pub cmd_alert: &'static str,

    pub http_status: &'static str,
    pub http_status_error: &'static str,
    pub http_alert_title: &'static str,
    pub http_alert: &'static str,

    pub subject: &'static str,
}

impl MessageCatalog {
    pub fn for_locale(locale: Locale) -> Self {
        match locale {
            Locale::En => Self::english(),
            Locale::Ja => Self::japanese(),
        }
    }

    pub fn english() -> Self {
        Self {
            level_debug: "DEBUG",
            level_info: "INFO",
            level_warn: "WARN",
            level_error: "ERROR",
            level_critical: "CRITICAL",

            proc_not_running: "not running",
            proc_running: "{count} process(es) are running",
            proc_status: "[{level}] {name}: {count} (not \"{condition}\")",
            proc_alert_title: "Found Process Abnormality",
            proc_alert: "Found the following process abnormality on server '{server_id}'.\n\n{result}\n\n==",

            log_summary: "[{tag}]: {count} messages",
            log_snip: "(snip)",
            log_alert_title: "Found Error Messages",
            log_alert: "Found the following errors on server '{server_id}'.\n\n{result}\n==",
            log_pending_title: "Possible Retention of Log Watcher",
            log_pending: "Found the possible retention of Log Watcher on server '{server_id}'.\n\n\
                          There exist multiple files which match the pattern {pattern}.\n\n{paths}\n\n\
                          Please check the state of the files, then restart Fluentd or other applications if needed.",

            ssh_status: "[{name}]({user}@{host}:{port}): {msg}",
            ssh_alert_title: "Found SSH Connection Error",
            ssh_alert: "Failed to connect to the following servers using SSH from '{server_id}'.\n\n{result}\n\n==",

            cmd_status: "[{level}] Failed health check: {name}\n  \
                         actual: {code:{code}, stdout:{stdout}, stderr:{stderr}}\n  \
                         expect: {code:{expect_code}, stdout:{expect_stdout}, stderr:{expect_stderr}}",
            cmd_alert_title: "Found Health Check Error",
            cmd_alert: "Found the following errors on server '{server_id}'.\n\n{result}\n\n==",

            http_status: "[{level}] Failed health check: {name}\n  \
                          url    : {url}\n  \
                          actual : {code:{code}, size:{size}}\n  \
                          expect : {code:{expect_code}, size:{expect_size}, regexp:{expect_regexp}}\n  \
                          message: {additional_info}",
            http_status_error: "[{level}] Failed health check: {name}\n  \
                                url    : {url}\n  \
                                error  : {error}\n  \
                                message: {additional_info}",
            http_alert_title: "Found HTTP Connection Error",
            http_alert: "Found the following errors on server '{server_id}'.\n\n{result}\n\n==",

            subject: "[{level}] [{group_id}:{server_id}] {title} ({start_time})",
        }
    }

    /// Japanese texts; watchers without a translation fall back to English
    pub fn japanese() -> Self {
        Self {
            level_debug: "デバッグ",
            level_info: "情報",
            level_warn: "警戒",
            level_error: "危険",
            level_critical: "緊急",

            proc_not_running: "起動していません",
            proc_running: "{count} 個 起動しています",
            proc_status: "[{level}] {name}: {count} (\"{condition}\" に違反)",
            proc_alert_title: "プロセス異常を検知しました",
            proc_alert: "サーバ {server_id} にて、以下のプロセス異常を検知しました。\n\n{result}\n\n以上",

            subject: "【{level}】[{group_id}:{server_id}] {title} ({start_time})",
            ..Self::english()
        }
    }
}

impl Default for MessageCatalog {
    fn default() -> Self {
        Self::english()
    }
}
