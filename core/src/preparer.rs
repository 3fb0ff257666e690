//! Opens a URL and hands back a validated connection.
//!
//! # Design
//! `ConnectionPreparer` holds only a transport and the application identity;
//! each `prepare` call is independent. GET requests over HTTP are sent right
//! away, classified, and their redirects followed, so what comes back is
//! ready to read. POST requests come back as a [`PendingPost`] that has not
//! touched the network: the caller supplies the body, and validation runs
//! once it is sent.

use std::collections::BTreeMap;

use url::Url;

use crate::classify::classify;
use crate::config::AppIdentity;
use crate::connection::{Connection, HttpConnection, PlainConnection};
use crate::error::FetchError;
use crate::http::{Headers, HttpRequest};
use crate::params::ConnectionParams;
use crate::resolve::resolve_url;
use crate::transport::{is_http, Transport, UreqTransport};

pub const USER_AGENT_HEADER: &str = "User-Agent";
pub const USER_HEADER: &str = "Weasis-User";

/// Builds connections from URLs and [`ConnectionParams`].
#[derive(Debug, Clone)]
pub struct ConnectionPreparer<T> {
    transport: T,
    identity: AppIdentity,
}

impl Default for ConnectionPreparer<UreqTransport> {
    fn default() -> Self {
        Self::new(UreqTransport::new(), AppIdentity::default())
    }
}

impl<T: Transport> ConnectionPreparer<T> {
    pub fn new(transport: T, identity: AppIdentity) -> Self {
        Self { transport, identity }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn identity(&self) -> &AppIdentity {
        &self.identity
    }

    /// Resolves `path_or_url` (see [`resolve_url`]) and prepares it.
    pub fn open(&self, path_or_url: &str, params: &ConnectionParams) -> Result<PreparedConnection<'_, T>, FetchError> {
        let url = resolve_url(path_or_url)?;
        self.prepare(&url, params)
    }

    /// Opens `path_or_url` and reads the whole body as text, with line
    /// terminators removed. POST parameters send an empty body.
    pub fn fetch_text(&self, path_or_url: &str, params: &ConnectionParams) -> Result<String, FetchError> {
        self.open(path_or_url, params)?.read_text()
    }

    /// Applies `params` to a new connection for `url`.
    ///
    /// - non-HTTP schemes: the resource is opened and returned unclassified;
    /// - POST: returns [`PreparedConnection::Post`] without any exchange;
    /// - GET: sends the request and returns the classified connection, after
    ///   following redirects.
    pub fn prepare(&self, url: &Url, params: &ConnectionParams) -> Result<PreparedConnection<'_, T>, FetchError> {
        let settings = params.request_settings();
        if !is_http(url) {
            let body = self.transport.open_plain(url, &settings)?;
            return Ok(PreparedConnection::Ready(PlainConnection::new(url.clone(), body).into()));
        }

        let request = HttpRequest {
            method: params.method(),
            url: url.clone(),
            headers: self.request_headers(params),
            settings,
            body: None,
        };

        if params.is_http_post() {
            return Ok(PreparedConnection::Post(PendingPost {
                transport: &self.transport,
                request,
                forward_headers: params.headers().clone(),
            }));
        }

        let response = self.transport.send(&request)?;
        let connection = classify(&self.transport, HttpConnection::new(request, response), params.headers())?;
        Ok(PreparedConnection::Ready(connection))
    }

    /// Caller headers followed by the identity headers, which always win.
    fn request_headers(&self, params: &ConnectionParams) -> Headers {
        let mut headers = Headers::new();
        for (name, value) in params.headers() {
            headers.set(name, value);
        }
        headers.set(USER_AGENT_HEADER, self.identity.user_agent());
        headers.set(USER_HEADER, &self.identity.user_header());
        headers
    }
}

/// What [`ConnectionPreparer::prepare`] returns.
#[derive(Debug)]
pub enum PreparedConnection<'a, T> {
    /// Validated (GET) or opened (non-HTTP) and ready to read.
    Ready(Connection),
    /// POST waiting for its body. Nothing has been sent yet.
    Post(PendingPost<'a, T>),
}

impl<T: Transport> PreparedConnection<'_, T> {
    pub fn url(&self) -> &Url {
        match self {
            PreparedConnection::Ready(c) => c.url(),
            PreparedConnection::Post(p) => p.url(),
        }
    }

    /// Request headers in effect when the connection was finalized. `None`
    /// for non-HTTP connections.
    pub fn request_headers(&self) -> Option<&Headers> {
        match self {
            PreparedConnection::Ready(c) => c.as_http().map(HttpConnection::request_headers),
            PreparedConnection::Post(p) => Some(p.request_headers()),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, PreparedConnection::Post(_))
    }

    /// Ready connection, sending a pending POST with an empty body first.
    pub fn connect(self) -> Result<Connection, FetchError> {
        match self {
            PreparedConnection::Ready(c) => Ok(c),
            PreparedConnection::Post(p) => p.send(Vec::new()),
        }
    }

    pub fn read_text(self) -> Result<String, FetchError> {
        self.connect()?.read_text()
    }
}

/// A POST request that has been prepared but not sent.
#[derive(Debug)]
pub struct PendingPost<'a, T> {
    transport: &'a T,
    request: HttpRequest,
    forward_headers: BTreeMap<String, String>,
}

impl<T: Transport> PendingPost<'_, T> {
    pub fn url(&self) -> &Url {
        &self.request.url
    }

    pub fn request_headers(&self) -> &Headers {
        &self.request.headers
    }

    /// Sends the request with `body` and classifies the response the same
    /// way a GET is classified.
    pub fn send(self, body: impl Into<Vec<u8>>) -> Result<Connection, FetchError> {
        let PendingPost {
            transport,
            mut request,
            forward_headers,
        } = self;
        request.body = Some(body.into());
        let response = transport.send(&request)?;
        classify(transport, HttpConnection::new(request, response), &forward_headers)
    }
}
