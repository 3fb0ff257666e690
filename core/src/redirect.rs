//! Manual redirect following.
//!
//! # Design
//! The chain is a value threaded through the loop: each hop consumes the
//! previous state, releases the previous connection, and yields a new state
//! holding the freshly opened one. Only the cookie set by the immediately
//! preceding hop is forwarded; there is no cookie jar across the chain.
//! The final connection is returned whatever its status, so callers that
//! care about an unresolved chain must inspect it themselves.

use std::collections::BTreeMap;

use crate::connection::{Connection, HttpConnection, PlainConnection};
use crate::error::FetchError;
use crate::http::{Headers, HttpMethod, HttpRequest, RequestSettings};
use crate::transport::{is_http, Transport};

/// Maximum number of `Location` headers followed for one request.
pub const MAX_REDIRECTS: usize = 3;

enum Chain {
    /// `current` points somewhere else and `hops` redirects were followed to
    /// reach it.
    Redirected {
        current: HttpConnection,
        location: String,
        hops: usize,
    },
    Settled(Connection),
}

impl Chain {
    fn start(connection: HttpConnection) -> Self {
        Self::at(connection, 0)
    }

    fn at(connection: HttpConnection, hops: usize) -> Self {
        match connection.location().map(str::to_string) {
            Some(location) => Chain::Redirected {
                current: connection,
                location,
                hops,
            },
            None => Chain::Settled(connection.into()),
        }
    }

    fn advance<T: Transport + ?Sized>(
        self,
        transport: &T,
        forward_headers: &BTreeMap<String, String>,
    ) -> Result<Self, FetchError> {
        let (current, location, hops) = match self {
            Chain::Redirected {
                current,
                location,
                hops,
            } => (current, location, hops),
            settled => return Ok(settled),
        };

        let cookie = current.header("Set-Cookie").unwrap_or_default().to_string();
        let target = current
            .url()
            .join(&location)
            .map_err(|e| FetchError::Transport(format!("cannot follow redirect to `{location}`: {e}")))?;
        let settings = RequestSettings {
            do_output: false,
            ..current.request().settings.clone()
        };
        current.disconnect();

        log::debug!("redirect {} of {MAX_REDIRECTS}: {target}", hops + 1);
        if !is_http(&target) {
            let body = transport.open_plain(&target, &settings)?;
            return Ok(Chain::Settled(PlainConnection::new(target, body).into()));
        }

        let mut headers = Headers::new();
        headers.set("Cookie", &cookie);
        for (name, value) in forward_headers {
            headers.add(name, value);
        }
        let request = HttpRequest {
            method: HttpMethod::Get,
            url: target,
            headers,
            settings,
            body: None,
        };
        let response = transport.send(&request)?;
        Ok(Chain::at(HttpConnection::new(request, response), hops + 1))
    }
}

/// Follows `Location` headers starting from `connection`, for at most
/// [`MAX_REDIRECTS`] hops.
///
/// Every hop carries a `Cookie` header holding the previous response's
/// `Set-Cookie` value (empty when there was none) followed by each of
/// `forward_headers`. Errors only come from the transport, or from an
/// unparsable `Location` reported as [`FetchError::Transport`]; hitting the
/// hop limit is not an error.
pub fn follow_redirects<T: Transport + ?Sized>(
    transport: &T,
    connection: HttpConnection,
    forward_headers: &BTreeMap<String, String>,
) -> Result<Connection, FetchError> {
    let mut chain = Chain::start(connection);
    loop {
        chain = match chain {
            Chain::Settled(connection) => return Ok(connection),
            Chain::Redirected { current, hops, .. } if hops >= MAX_REDIRECTS => {
                log::debug!("redirect limit reached at {}", current.url());
                return Ok(current.into());
            }
            redirected => redirected.advance(transport, forward_headers)?,
        };
    }
}
