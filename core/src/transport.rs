//! Transport adapters that perform the actual I/O.
//!
//! # Design
//! A transport knows two things: how to execute an [`HttpRequest`] and how
//! to open a plain byte stream for any other scheme. It never follows
//! redirects or interprets status codes itself; that is the job of the
//! classifier and the redirect resolver, which need to see every hop.

use std::fmt;
use std::fs::File;
use std::time::Duration;

use ureq::http::StatusCode;
use url::Url;

use crate::error::FetchError;
use crate::http::{Body, Headers, HttpMethod, HttpRequest, HttpResponse, RequestSettings};

/// Executes requests for the connection preparer.
pub trait Transport {
    /// Sends `request` and returns the response without following redirects
    /// or treating any status as an error.
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, FetchError>;

    /// Opens a non-HTTP resource for reading. Only `file` URLs are supported
    /// unless an implementation says otherwise.
    fn open_plain(&self, url: &Url, _settings: &RequestSettings) -> Result<Body, FetchError> {
        if url.scheme() != "file" {
            return Err(FetchError::UnsupportedScheme(url.scheme().to_string()));
        }
        let path = url
            .to_file_path()
            .map_err(|()| FetchError::malformed(url.as_str(), "not a local file path"))?;
        Ok(Box::new(File::open(path)?))
    }
}

/// Whether `url` is served by [`Transport::send`] rather than
/// [`Transport::open_plain`].
pub fn is_http(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}

/// Blocking transport backed by a `ureq` agent.
///
/// The agent is configured to hand back 3xx and error statuses as ordinary
/// responses. Connect and read timeouts come from each request's settings.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UreqTransport").finish_non_exhaustive()
    }
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .max_redirects(0)
            .max_redirects_will_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, FetchError> {
        let url = request.url.as_str();
        let response = match (request.method, &request.body) {
            (HttpMethod::Get, _) => configure(self.agent.get(url), request).call(),
            (HttpMethod::Post, Some(body)) => configure(self.agent.post(url), request).send(&body[..]),
            (HttpMethod::Post, None) => configure(self.agent.post(url), request).send_empty(),
        }
        .map_err(into_fetch_error)?;

        let status = response.status();
        let headers: Headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();

        Ok(HttpResponse {
            status: status.as_u16(),
            message: status_message(status),
            headers,
            body: Box::new(response.into_body().into_reader()),
        })
    }
}

/// ureq hands back an `http::Response`, which drops the reason phrase from
/// the status line, so the message is the standard phrase for the code.
fn status_message(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => reason.to_string(),
        None => format!("HTTP {}", status.as_u16()),
    }
}

/// Headers sent on the wire: the request's own, with `If-Modified-Since`
/// replacing any caller value when the settings carry one.
fn outgoing_headers(request: &HttpRequest) -> Headers {
    let mut headers = request.headers.clone();
    if let Some(since) = request.settings.if_modified_since {
        headers.set(
            "If-Modified-Since",
            &since.format("%a, %d %b %Y %H:%M:%S GMT").to_string(),
        );
    }
    headers
}

/// Zero means no timeout.
fn limit(timeout: Duration) -> Option<Duration> {
    (!timeout.is_zero()).then_some(timeout)
}

/// Copies headers and timeouts from `request` onto a ureq request builder.
///
/// The read timeout bounds the wait for the response head only. The body is
/// handed to the caller as a stream and has no overall deadline.
fn configure<B>(mut builder: ureq::RequestBuilder<B>, request: &HttpRequest) -> ureq::RequestBuilder<B> {
    for (name, value) in outgoing_headers(request).iter() {
        builder = builder.header(name, value);
    }
    let settings = &request.settings;
    builder
        .config()
        .timeout_connect(limit(settings.connect_timeout))
        .timeout_recv_response(limit(settings.read_timeout))
        .build()
}

fn into_fetch_error(e: ureq::Error) -> FetchError {
    match e {
        ureq::Error::Io(io) => FetchError::Io(io),
        other => FetchError::Transport(other.to_string()),
    }
}
