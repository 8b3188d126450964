//! Email notifier over plain SMTP.

use std::fmt;

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use serde_yaml::Value;

use super::OWNER_EMAIL;
use crate::core::value::{render, Section};
use crate::core::{Alert, HostContext};
use crate::error::{AlertError, Result};
use crate::utils::fill;

pub const DEFAULT_SMTP_PORT: u16 = 25;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailSettings {
    pub group_id: String,
    pub from_address: String,
    pub to_address_list: Vec<String>,
    pub smtp_server: String,
    pub smtp_port: u16,
    pub smtp_user: Option<String>,
    pub smtp_password: Option<String>,
}

impl EmailSettings {
    pub fn parse(value: &Value) -> Result<Self> {
        let section = Section::new(OWNER_EMAIL, value)?;

        let group_id = section.require_string("group_id")?;
        let from_address = section.require_string("from_address")?;
        let to_address_list = parse_recipients(&section, section.require("to_address_list")?)?;
        let smtp_server = section.require_string("smtp_server")?;
        let smtp_port = match section.optional_int("smtp_port")? {
            None => DEFAULT_SMTP_PORT,
            Some(p) => u16::try_from(p).map_err(|e| section.syntax_error(format!("{}: {}", e, p)))?,
        };
        let smtp_user = section.optional_string("smtp_user")?;
        let smtp_password = section.optional_string("smtp_password")?;

        for address in std::iter::once(&from_address).chain(&to_address_list) {
            address
                .parse::<Mailbox>()
                .map_err(|e| section.syntax_error(format!("{}: {}", e, address)))?;
        }

        Ok(Self {
            group_id,
            from_address,
            to_address_list,
            smtp_server,
            smtp_port,
            smtp_user,
            smtp_password,
        })
    }
}

/// Comma separated string or a list of strings
fn parse_recipients(section: &Section, value: &Value) -> Result<Vec<String>> {
    let raw: Vec<String> = match value {
        Value::String(s) => s.split(',').map(str::to_string).collect(),
        Value::Sequence(items) => items
            .iter()
            .map(|v| match v {
                Value::String(s) => Ok(s.clone()),
                other => Err(section.syntax_error(format!("invalid address: {}", render(other)))),
            })
            .collect::<Result<_>>()?,
        other => {
            return Err(section.syntax_error(format!("invalid address list: {}", render(other))))
        }
    };

    let list: Vec<String> = raw
        .iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if list.is_empty() {
        return Err(section.syntax_error("to_address_list is empty"));
    }
    Ok(list)
}

/// A composed plain-text mail
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub subject: String,
    pub from: String,
    pub to: Vec<String>,
    pub body: String,
}

/// Delivers composed messages
pub trait MessageSink {
    fn send(&self, message: &OutgoingMessage) -> Result<()>;
}

/// Sends through an SMTP relay, authenticating when credentials are set
#[derive(Debug, Clone)]
pub struct SmtpSink {
    server: String,
    port: u16,
    credentials: Option<(String, String)>,
}

impl SmtpSink {
    pub fn new(settings: &EmailSettings) -> Self {
        let credentials = match (&settings.smtp_user, &settings.smtp_password) {
            (Some(user), Some(password)) => Some((user.clone(), password.clone())),
            (Some(user), None) => Some((user.clone(), String::new())),
            _ => None,
        };
        Self {
            server: settings.smtp_server.clone(),
            port: settings.smtp_port,
            credentials,
        }
    }
}

fn mailbox(address: &str) -> Result<Mailbox> {
    address
        .parse()
        .map_err(|e| AlertError::notify(format!("invalid address {}: {}", address, e)))
}

impl MessageSink for SmtpSink {
    fn send(&self, message: &OutgoingMessage) -> Result<()> {
        let mut builder = Message::builder()
            .from(mailbox(&message.from)?)
            .subject(message.subject.clone())
            .header(ContentType::TEXT_PLAIN);
        for to in &message.to {
            builder = builder.to(mailbox(to)?);
        }
        let email = builder
            .body(message.body.clone())
            .map_err(|e| AlertError::notify(e.to_string()))?;

        let mut transport = SmtpTransport::builder_dangerous(&self.server).port(self.port);
        if let Some((user, password)) = &self.credentials {
            transport = transport.credentials(Credentials::new(user.clone(), password.clone()));
        }
        transport
            .build()
            .send(&email)
            .map_err(|e| AlertError::notify(format!("{}:{}: {}", self.server, self.port, e)))?;
        Ok(())
    }
}

pub struct EmailNotifier {
    settings: EmailSettings,
    print_only: bool,
    sink: Box<dyn MessageSink>,
}

impl EmailNotifier {
    pub fn from_config(config: &Value, print_only: bool) -> Result<Self> {
        let settings = EmailSettings::parse(config)?;
        let sink = Box::new(SmtpSink::new(&settings));
        Ok(Self {
            settings,
            print_only,
            sink,
        })
    }

    /// Same as [`EmailNotifier::from_config`] with a custom delivery backend
    pub fn with_sink(config: &Value, print_only: bool, sink: Box<dyn MessageSink>) -> Result<Self> {
        Ok(Self {
            settings: EmailSettings::parse(config)?,
            print_only,
            sink,
        })
    }

    pub fn settings(&self) -> &EmailSettings {
        &self.settings
    }

    pub fn subject(&self, alert: &Alert, host: &HostContext) -> String {
        fill(
            host.catalog.subject,
            &[
                ("level", alert.level.text(&host.catalog)),
                ("group_id", &self.settings.group_id),
                ("server_id", &host.server_id),
                ("title", &alert.title),
                ("start_time", &alert.formatted_start_time()),
            ],
        )
    }

    pub fn compose(&self, alert: &Alert, host: &HostContext) -> OutgoingMessage {
        OutgoingMessage {
            subject: self.subject(alert, host),
            from: self.settings.from_address.clone(),
            to: self.settings.to_address_list.clone(),
            body: alert.message.clone(),
        }
    }

    pub fn notify(&self, alert: &Alert, host: &HostContext) -> Result<()> {
        let message = self.compose(alert, host);
        let to = message.to.join(",");

        if self.print_only {
            log::info!("Would send a message:");
            log::info!("Subject: {}", message.subject);
            log::info!("From: {}", message.from);
            log::info!("To: {}", to);
            log::info!("Body:");
            for line in message.body.split('\n') {
                log::info!("{}", line);
            }
            return Ok(());
        }

        self.sink.send(&message)?;
        log::info!("Sent mail to {}.", to);
        Ok(())
    }
}

impl fmt::Debug for EmailNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmailNotifier")
            .field("settings", &self.settings)
            .field("print_only", &self.print_only)
            .finish_non_exhaustive()
    }
}

impl PartialEq for EmailNotifier {
    fn eq(&self, other: &Self) -> bool {
        self.settings == other.settings && self.print_only == other.print_only
    }
}
