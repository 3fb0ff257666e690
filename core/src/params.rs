//! Connection parameters supplied by the caller.
//!
//! # Design
//! `ConnectionParams` is immutable once built: fields are private and only
//! readable through getters. Construction goes through
//! [`ConnectionParamsBuilder`], or through serde when a host application
//! keeps its fetch settings in JSON. Missing JSON fields take the same
//! defaults as the builder.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{ConfigSource, DEFAULT_CONNECT_TIMEOUT_MS, DEFAULT_READ_TIMEOUT_MS};
use crate::error::FetchError;
use crate::http::{HttpMethod, RequestSettings};

/// Timeouts, flags and headers applied to a connection before it is opened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConnectionParams {
    connect_timeout_ms: u64,
    read_timeout_ms: u64,
    allow_user_interaction: bool,
    use_caches: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    if_modified_since: Option<DateTime<Utc>>,
    http_post: bool,
    headers: BTreeMap<String, String>,
}

impl Default for ConnectionParams {
    fn default() -> Self {
        Self {
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
            allow_user_interaction: false,
            use_caches: true,
            if_modified_since: None,
            http_post: false,
            headers: BTreeMap::new(),
        }
    }
}

impl ConnectionParams {
    pub fn builder() -> ConnectionParamsBuilder {
        ConnectionParamsBuilder::default()
    }

    /// Parameters whose timeouts come from `source`.
    pub fn from_source(source: &impl ConfigSource) -> Self {
        Self::builder()
            .connect_timeout_ms(source.connect_timeout_ms())
            .read_timeout_ms(source.read_timeout_ms())
            .build()
    }

    /// GET parameters with default timeouts and the given headers.
    pub fn with_headers<I, K, V>(headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::builder().headers(headers).build()
    }

    /// POST parameters with default timeouts and the given headers.
    pub fn post_with_headers<I, K, V>(headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::builder().headers(headers).http_post(true).build()
    }

    pub fn from_json(json: &str) -> Result<Self, FetchError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn allow_user_interaction(&self) -> bool {
        self.allow_user_interaction
    }

    pub fn use_caches(&self) -> bool {
        self.use_caches
    }

    pub fn if_modified_since(&self) -> Option<DateTime<Utc>> {
        self.if_modified_since
    }

    pub fn is_http_post(&self) -> bool {
        self.http_post
    }

    pub fn method(&self) -> HttpMethod {
        if self.http_post {
            HttpMethod::Post
        } else {
            HttpMethod::Get
        }
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Connection settings derived from these parameters. Input is always
    /// enabled; output only for POST.
    pub fn request_settings(&self) -> RequestSettings {
        RequestSettings {
            connect_timeout: self.connect_timeout(),
            read_timeout: self.read_timeout(),
            allow_user_interaction: self.allow_user_interaction,
            use_caches: self.use_caches,
            if_modified_since: self.if_modified_since,
            do_input: true,
            do_output: self.http_post,
        }
    }
}

/// Builder for [`ConnectionParams`].
#[derive(Debug, Clone, Default)]
pub struct ConnectionParamsBuilder {
    params: ConnectionParams,
}

impl ConnectionParamsBuilder {
    pub fn connect_timeout_ms(mut self, ms: u64) -> Self {
        self.params.connect_timeout_ms = ms;
        self
    }

    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.params.read_timeout_ms = ms;
        self
    }

    pub fn allow_user_interaction(mut self, allow: bool) -> Self {
        self.params.allow_user_interaction = allow;
        self
    }

    pub fn use_caches(mut self, use_caches: bool) -> Self {
        self.params.use_caches = use_caches;
        self
    }

    pub fn if_modified_since(mut self, since: DateTime<Utc>) -> Self {
        self.params.if_modified_since = Some(since);
        self
    }

    pub fn http_post(mut self, post: bool) -> Self {
        self.params.http_post = post;
        self
    }

    /// Adds one header; a later value for the same key wins.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.headers.insert(name.into(), value.into());
        self
    }

    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.params
            .headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn build(self) -> ConnectionParams {
        self.params
    }
}
