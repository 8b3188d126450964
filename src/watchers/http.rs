//! HTTP(S) health checks.

use std::error::Error as StdError;
use std::time::Duration;

use chrono::Local;
use reqwest::blocking::Client;
use serde_yaml::Value;
use url::Url;

use super::{compose_body, parse_level, OWNER_HTTP};
use crate::core::value::{as_list, Section};
use crate::core::{Alert, HostContext, Level, Matcher, MessageCatalog, Pattern};
use crate::error::{AlertError, Result};
use crate::utils::{fill, with_retry};

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_RETRY: u32 = 2;
pub const DEFAULT_RETRY_INTERVAL_SECS: u64 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpSetting {
    pub name: String,
    pub level: Level,
    /// As written in the configuration
    pub url: String,
    /// `url` with the default scheme applied
    pub target: Url,
    pub timeout: Duration,
    pub retry: u32,
    pub retry_interval: Duration,
    pub additional_info: String,
    pub expect_code: Option<u16>,
    pub expect_size: Option<Matcher>,
    pub expect_regexp: Option<Pattern>,
}

impl HttpSetting {
    fn parse(value: &Value) -> Result<Self> {
        let section = Section::new(OWNER_HTTP, value)?;

        let name = section.require_string("name")?;
        let level = parse_level(&section, section.require("level")?)?;
        let url = section.require_string("url")?;

        // zero falls back to the default
        let timeout = match non_negative(&section, "timeout", DEFAULT_TIMEOUT_SECS)? {
            0 => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            secs => Duration::from_secs(secs),
        };
        let retry = u32::try_from(non_negative(&section, "retry", u64::from(DEFAULT_RETRY))?)
            .map_err(|e| section.syntax_error(e))?;
        let retry_interval = Duration::from_secs(non_negative(
            &section,
            "retry_interval",
            DEFAULT_RETRY_INTERVAL_SECS,
        )?);
        let additional_info = section.optional_string("additional_info")?.unwrap_or_default();

        let expect_code = section
            .optional_int("expect_code")?
            .map(|c| u16::try_from(c).map_err(|e| section.syntax_error(e)))
            .transpose()?;
        let expect_size = section
            .optional_string("expect_size")?
            .map(|s| s.parse::<Matcher>().map_err(|e| section.syntax_error(e)))
            .transpose()?;
        let expect_regexp = section.optional_pattern("expect_regexp")?;

        let target = resolve_url(&section, &url)?;
        if expect_code.is_none() && expect_size.is_none() && expect_regexp.is_none() {
            return Err(AlertError::config(format!(
                "{} any of expect_code, expect_size or expect_regexp should be set.",
                OWNER_HTTP
            )));
        }

        Ok(Self {
            name,
            level,
            url,
            target,
            timeout,
            retry,
            retry_interval,
            additional_info,
            expect_code,
            expect_size,
            expect_regexp,
        })
    }

    /// True if any configured expectation does not hold
    pub fn should_alert(&self, response: &HttpResponse) -> bool {
        let size = i64::try_from(response.body.len()).unwrap_or(i64::MAX);
        self.expect_code.is_some_and(|c| c != response.status)
            || self.expect_size.is_some_and(|m| !m.check(size))
            || self
                .expect_regexp
                .as_ref()
                .is_some_and(|p| !p.is_match(&String::from_utf8_lossy(&response.body)))
    }

    fn render(&self, response: &HttpResponse, catalog: &MessageCatalog) -> String {
        let none = || "None".to_string();
        fill(
            catalog.http_status,
            &[
                ("level", self.level.text(catalog)),
                ("name", &self.name),
                ("url", &self.url),
                ("code", &response.status.to_string()),
                ("size", &response.body.len().to_string()),
                ("expect_code", &self.expect_code.map_or_else(none, |c| c.to_string())),
                ("expect_size", &self.expect_size.map_or_else(none, |m| m.to_string())),
                (
                    "expect_regexp",
                    &self.expect_regexp.as_ref().map_or_else(none, |p| p.to_string()),
                ),
                ("additional_info", &self.additional_info),
            ],
        )
    }

    fn render_error(&self, error: &str, catalog: &MessageCatalog) -> String {
        fill(
            catalog.http_status_error,
            &[
                ("level", self.level.text(catalog)),
                ("name", &self.name),
                ("url", &self.url),
                ("error", error),
                ("additional_info", &self.additional_info),
            ],
        )
    }
}

fn non_negative(section: &Section, key: &str, default: u64) -> Result<u64> {
    match section.optional_int(key)? {
        None => Ok(default),
        Some(n) => u64::try_from(n)
            .map_err(|_| section.syntax_error(format!("{} should not be negative: {}", key, n))),
    }
}

/// Apply the default scheme and reject anything but http and https
fn resolve_url(section: &Section, url: &str) -> Result<Url> {
    let (scheme, full) = match url.split_once("://") {
        Some((scheme, _)) => (scheme.to_ascii_lowercase(), url.to_string()),
        None => ("http".to_string(), format!("http://{}", url)),
    };
    if scheme != "http" && scheme != "https" {
        return Err(AlertError::config(format!(
            "{} unsupported scheme: {}",
            OWNER_HTTP, scheme
        )));
    }
    Url::parse(&full).map_err(|e| section.syntax_error(format!("{}: {}", e, url)))
}

/// Status and body of a completed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

fn fetch(client: &Client, url: &Url) -> std::result::Result<HttpResponse, reqwest::Error> {
    let response = client.get(url.clone()).send()?;
    let status = response.status().as_u16();
    let body = response.bytes()?.to_vec();
    Ok(HttpResponse { status, body })
}

/// `<kind>: <message>` for a transport failure
fn describe_error(e: &reqwest::Error) -> String {
    let kind = if e.is_timeout() {
        "Timeout"
    } else if e.is_connect() {
        "ConnectError"
    } else if e.is_redirect() {
        "RedirectError"
    } else if e.is_body() || e.is_decode() {
        "BodyError"
    } else if e.is_builder() {
        "BuilderError"
    } else {
        "RequestError"
    };

    let mut message = e.to_string();
    let mut source = e.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    format!("{}: {}", kind, message)
}

#[derive(Debug, PartialEq, Eq)]
pub struct HttpWatcher {
    settings: Vec<HttpSetting>,
}

impl HttpWatcher {
    pub fn from_config(config: &Value) -> Result<Self> {
        let settings = as_list(OWNER_HTTP, config)?
            .iter()
            .map(HttpSetting::parse)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &[HttpSetting] {
        &self.settings
    }

    pub fn watch(&self, host: &HostContext) -> Result<Vec<Alert>> {
        let start_time = Local::now();
        let catalog = &host.catalog;

        let mut failures: Vec<(Level, String)> = Vec::new();
        for setting in &self.settings {
            let outcome = Client::builder()
                .timeout(setting.timeout)
                .build()
                .and_then(|client| {
                    with_retry(setting.retry, setting.retry_interval, || {
                        fetch(&client, &setting.target)
                    })
                });

            match outcome {
                Ok(response) => {
                    log::debug!("{}: {} ({} bytes)", setting.url, response.status, response.body.len());
                    if setting.should_alert(&response) {
                        failures.push((setting.level, setting.render(&response, catalog)));
                    }
                }
                Err(e) => {
                    let error = describe_error(&e);
                    log::debug!("{}: {}", setting.url, error);
                    failures.push((setting.level, setting.render_error(&error, catalog)));
                }
            }
        }

        let Some(max_level) = failures.iter().map(|(l, _)| *l).max() else {
            return Ok(Vec::new());
        };
        let lines: Vec<&str> = failures.iter().map(|(_, m)| m.as_str()).collect();
        let message = compose_body(catalog.http_alert, host, &lines.join("\n"));
        Ok(vec![Alert::new(
            start_time,
            max_level,
            catalog.http_alert_title,
            message,
        )])
    }
}
