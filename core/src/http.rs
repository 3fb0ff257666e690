//! HTTP request and response types exchanged with a [`Transport`].
//!
//! # Design
//! Requests are plain data: the preparer and the redirect resolver build an
//! `HttpRequest`, the transport executes it and hands back an `HttpResponse`
//! whose body is a live stream. Header names compare case-insensitively but
//! keep the casing they were written with.
//!
//! [`Transport`]: crate::transport::Transport

use std::fmt;
use std::io::Read;
use std::time::Duration;

use chrono::{DateTime, Utc};
use url::Url;

/// Readable response body. Dropping it releases the underlying connection.
pub type Body = Box<dyn Read>;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// Ordered header list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers(Vec<(String, String)>);

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces every header named `name` with a single entry.
    pub fn set(&mut self, name: &str, value: &str) {
        self.0.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.0.push((name.to_string(), value.to_string()));
    }

    /// Appends an entry, keeping any existing ones with the same name.
    pub fn add(&mut self, name: &str, value: &str) {
        self.0.push((name.to_string(), value.to_string()));
    }

    /// First value for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Last value for `name`. Response lookups use this, so a repeated
    /// `Set-Cookie` or `Location` resolves to the one the server sent last.
    pub fn last(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .rev()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn get_all<'a, 'n>(&'a self, name: &'n str) -> impl Iterator<Item = &'a str> + 'n
    where
        'a: 'n,
    {
        self.0
            .iter()
            .filter(move |(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Headers(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Connection-level settings applied when a request is opened.
///
/// `use_caches` and `allow_user_interaction` are advisory; transports
/// without an equivalent ignore them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSettings {
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    pub allow_user_interaction: bool,
    pub use_caches: bool,
    pub if_modified_since: Option<DateTime<Utc>>,
    pub do_input: bool,
    pub do_output: bool,
}

/// An HTTP request described as plain data.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: Url,
    pub headers: Headers,
    pub settings: RequestSettings,
    pub body: Option<Vec<u8>>,
}

/// An HTTP response with a live body stream.
pub struct HttpResponse {
    pub status: u16,
    /// Status message sent by the server, e.g. `Not Found`.
    pub message: String,
    pub headers: Headers,
    pub body: Body,
}

impl fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .field("message", &self.message)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}
