//! Blocking fetch helper for HTTP and local resources.
//!
//! # Overview
//! Given a URL or a local path and a set of [`ConnectionParams`], the
//! [`ConnectionPreparer`] opens a connection, applies headers and timeouts,
//! follows up to [`MAX_REDIRECTS`] redirects by hand while forwarding cookies
//! and caller headers, and classifies the final response. The caller gets
//! back either a live connection to stream from, or the body as text.
//!
//! # Design
//! - I/O goes through the [`Transport`] trait. [`UreqTransport`] talks HTTP;
//!   non-HTTP schemes are opened as plain streams.
//! - HTTP and plain connections are distinct variants of [`Connection`], so
//!   only HTTP ones expose status, headers and redirects.
//! - Configuration (default timeouts, identity) is read through an explicit
//!   [`ConfigSource`] instead of process-wide state.
//! - Everything is synchronous; each `prepare` call is independent.

pub mod classify;
pub mod config;
pub mod connection;
pub mod error;
pub mod http;
pub mod params;
pub mod preparer;
pub mod redirect;
pub mod resolve;
pub mod transport;

#[cfg(test)]
mod testing;

pub use classify::{classify, Outcome};
pub use config::{AppIdentity, ConfigSource, EnvConfig};
pub use connection::{read_lines, Connection, HttpConnection, PlainConnection};
pub use error::FetchError;
pub use http::{Body, Headers, HttpMethod, HttpRequest, HttpResponse, RequestSettings};
pub use params::{ConnectionParams, ConnectionParamsBuilder};
pub use preparer::{ConnectionPreparer, PendingPost, PreparedConnection};
pub use redirect::{follow_redirects, MAX_REDIRECTS};
pub use resolve::resolve_url;
pub use transport::{Transport, UreqTransport};
