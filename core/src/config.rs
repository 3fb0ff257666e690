//! Configuration lookups: default timeouts and the calling application's
//! identity.
//!
//! Values are read through a [`ConfigSource`] handed to whoever needs them,
//! so tests can supply a map instead of touching the process environment.

use std::collections::HashMap;

pub const CONNECT_TIMEOUT_KEY: &str = "URL_CONNECTION_TIMEOUT";
pub const READ_TIMEOUT_KEY: &str = "URL_READ_TIMEOUT";
pub const USER_KEY: &str = "WEASIS_USER";
pub const USER_AGENT_KEY: &str = "WEASIS_USER_AGENT";

pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 15_000;

/// Key/value lookup for configuration properties.
pub trait ConfigSource {
    fn property(&self, key: &str) -> Option<String>;

    fn connect_timeout_ms(&self) -> u64 {
        self.int_property(CONNECT_TIMEOUT_KEY, DEFAULT_CONNECT_TIMEOUT_MS)
    }

    fn read_timeout_ms(&self) -> u64 {
        self.int_property(READ_TIMEOUT_KEY, DEFAULT_READ_TIMEOUT_MS)
    }

    /// Integer property, or `default` when missing or unparsable.
    fn int_property(&self, key: &str, default: u64) -> u64 {
        match self.property(key) {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                log::debug!("ignoring non-numeric value {raw:?} for {key}");
                default
            }),
            None => default,
        }
    }
}

/// Reads properties from the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvConfig;

impl ConfigSource for EnvConfig {
    fn property(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl ConfigSource for HashMap<String, String> {
    fn property(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Identity headers sent with every request, whatever the caller asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppIdentity {
    user_agent: String,
    user: String,
}

impl AppIdentity {
    pub fn new(user_agent: &str, user: &str) -> Self {
        Self {
            user_agent: user_agent.to_string(),
            user: user.to_string(),
        }
    }

    pub fn from_source(source: &impl ConfigSource) -> Self {
        let user_agent = source
            .property(USER_AGENT_KEY)
            .unwrap_or_else(|| format!("Weasis/{}", env!("CARGO_PKG_VERSION")));
        let user = [USER_KEY, "USER", "USERNAME"]
            .iter()
            .find_map(|key| source.property(key))
            .unwrap_or_default();
        Self { user_agent, user }
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Raw user name as configured.
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Value of the `Weasis-User` header: trimmed and uppercased.
    pub fn user_header(&self) -> String {
        self.user.trim().to_uppercase()
    }
}

impl Default for AppIdentity {
    fn default() -> Self {
        Self::from_source(&EnvConfig)
    }
}
