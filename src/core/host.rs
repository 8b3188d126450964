use std::env;

use super::i18n::{Locale, MessageCatalog};

/// Facts about the running host shared by all watchers and notifiers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostContext {
    pub server_id: String,
    pub catalog: MessageCatalog,
}

impl HostContext {
    pub fn new(server_id: impl Into<String>, catalog: MessageCatalog) -> Self {
        Self {
            server_id: server_id.into(),
            catalog,
        }
    }

    /// Resolve the server id from the environment and pick the catalog
    pub fn detect(locale: Locale) -> Self {
        Self::new(server_id(), MessageCatalog::for_locale(locale))
    }
}

/// `NICKNAME` if set, otherwise the host name
pub fn server_id() -> String {
    match env::var("NICKNAME") {
        Ok(nick) if !nick.is_empty() => nick,
        _ => hostname::get()
            .map(|h| h.to_string_lossy().into_owned())
            .unwrap_or_else(|_| "localhost".to_string()),
    }
}
