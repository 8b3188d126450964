//! Notifiers: deliver alerts to people.

pub mod email;

use serde_yaml::Value;

use crate::core::{Alert, HostContext};
use crate::error::Result;

pub use email::{EmailNotifier, EmailSettings, MessageSink, OutgoingMessage, SmtpSink};

pub(crate) const OWNER_EMAIL: &str = "EmailNotifier";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifierKind {
    Email,
}

impl NotifierKind {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "email" => Some(NotifierKind::Email),
            _ => None,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            NotifierKind::Email => "email",
        }
    }
}

/// A configured notifier of any kind
#[derive(Debug, PartialEq)]
pub enum Notifier {
    Email(EmailNotifier),
}

impl Notifier {
    pub fn from_config(kind: NotifierKind, config: &Value, print_only: bool) -> Result<Self> {
        match kind {
            NotifierKind::Email => Ok(Notifier::Email(EmailNotifier::from_config(config, print_only)?)),
        }
    }

    pub fn notify(&self, alert: &Alert, host: &HostContext) -> Result<()> {
        match self {
            Notifier::Email(n) => n.notify(alert, host),
        }
    }
}
