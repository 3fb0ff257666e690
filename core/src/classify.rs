//! Decides what to do with a received HTTP response.

use std::collections::BTreeMap;

use log::Level;

use crate::connection::{Connection, HttpConnection};
use crate::error::FetchError;
use crate::redirect::follow_redirects;
use crate::transport::Transport;

/// How a status code is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Redirect,
    Failure,
}

impl Outcome {
    pub fn of(status: u16) -> Self {
        match status {
            200..=299 => Outcome::Success,
            301..=303 => Outcome::Redirect,
            _ => Outcome::Failure,
        }
    }
}

/// Passes successful responses through, follows 301/302/303 redirects, and
/// turns every other status into [`FetchError::Status`].
///
/// When trace logging is enabled the error body is read and logged before
/// failing; problems reading it are only logged.
pub fn classify<T: Transport + ?Sized>(
    transport: &T,
    mut connection: HttpConnection,
    forward_headers: &BTreeMap<String, String>,
) -> Result<Connection, FetchError> {
    let code = connection.status();
    match Outcome::of(code) {
        Outcome::Success => Ok(connection.into()),
        Outcome::Redirect => follow_redirects(transport, connection, forward_headers),
        Outcome::Failure => {
            let message = connection.status_message().to_string();
            log::warn!("http Status {code} - {message}");
            if log::log_enabled!(Level::Trace) {
                log_error_body(&mut connection);
            }
            Err(FetchError::Status { code, message })
        }
    }
}

fn log_error_body(connection: &mut HttpConnection) {
    match connection.drain_body() {
        Ok(body) if !body.trim().is_empty() => {
            log::trace!("{} failed, server response: {body}", connection.url());
        }
        Ok(_) => {}
        Err(e) => log::debug!("could not read error body from {}: {e}", connection.url()),
    }
}
