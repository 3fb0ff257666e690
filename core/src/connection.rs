//! Live connections returned to callers.
//!
//! An [`HttpConnection`] pairs the request that was sent with the response
//! it produced; a [`PlainConnection`] is a byte stream opened for a non-HTTP
//! scheme. Only the HTTP variant has a status, headers, and the notion of a
//! redirect. Dropping either one releases the underlying resource.

use std::fmt;
use std::io::{BufRead, BufReader, Read};

use url::Url;

use crate::error::FetchError;
use crate::http::{Body, Headers, HttpRequest, HttpResponse};

/// An HTTP exchange whose response has been received.
#[derive(Debug)]
pub struct HttpConnection {
    request: HttpRequest,
    response: HttpResponse,
}

impl HttpConnection {
    pub fn new(request: HttpRequest, response: HttpResponse) -> Self {
        Self { request, response }
    }

    pub fn url(&self) -> &Url {
        &self.request.url
    }

    pub fn request(&self) -> &HttpRequest {
        &self.request
    }

    /// Headers that were sent on the request.
    pub fn request_headers(&self) -> &Headers {
        &self.request.headers
    }

    pub fn status(&self) -> u16 {
        self.response.status
    }

    pub fn status_message(&self) -> &str {
        &self.response.message
    }

    /// Response header value; the last one wins when the server repeated it.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.response.headers.last(name)
    }

    pub fn response_headers(&self) -> &Headers {
        &self.response.headers
    }

    /// Non-empty `Location` header, if any.
    pub fn location(&self) -> Option<&str> {
        self.header("Location").filter(|l| !l.is_empty())
    }

    pub fn into_reader(self) -> Body {
        self.response.body
    }

    /// Releases the connection.
    pub fn disconnect(self) {
        log::debug!("disconnecting {}", self.request.url);
    }

    /// Reads the remaining body into text without releasing anything else.
    pub(crate) fn drain_body(&mut self) -> Result<String, FetchError> {
        read_lines(&mut self.response.body)
    }
}

/// A non-HTTP resource opened for reading.
pub struct PlainConnection {
    url: Url,
    body: Body,
}

impl PlainConnection {
    pub fn new(url: Url, body: Body) -> Self {
        Self { url, body }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn into_reader(self) -> Body {
        self.body
    }
}

impl fmt::Debug for PlainConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlainConnection")
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

/// A connection ready to be read.
#[derive(Debug)]
pub enum Connection {
    Http(HttpConnection),
    Plain(PlainConnection),
}

impl Connection {
    pub fn url(&self) -> &Url {
        match self {
            Connection::Http(c) => c.url(),
            Connection::Plain(c) => c.url(),
        }
    }

    /// Status code, for HTTP connections.
    pub fn status(&self) -> Option<u16> {
        match self {
            Connection::Http(c) => Some(c.status()),
            Connection::Plain(_) => None,
        }
    }

    pub fn as_http(&self) -> Option<&HttpConnection> {
        match self {
            Connection::Http(c) => Some(c),
            Connection::Plain(_) => None,
        }
    }

    pub fn into_http(self) -> Option<HttpConnection> {
        match self {
            Connection::Http(c) => Some(c),
            Connection::Plain(_) => None,
        }
    }

    pub fn into_reader(self) -> Body {
        match self {
            Connection::Http(c) => c.into_reader(),
            Connection::Plain(c) => c.into_reader(),
        }
    }

    /// Reads the whole body as text. Lines are concatenated without their
    /// line terminators.
    pub fn read_text(self) -> Result<String, FetchError> {
        read_lines(self.into_reader())
    }
}

impl From<HttpConnection> for Connection {
    fn from(c: HttpConnection) -> Self {
        Connection::Http(c)
    }
}

impl From<PlainConnection> for Connection {
    fn from(c: PlainConnection) -> Self {
        Connection::Plain(c)
    }
}

/// Reads `reader` line by line, dropping line terminators.
pub fn read_lines(reader: impl Read) -> Result<String, FetchError> {
    let mut text = String::new();
    for line in BufReader::new(reader).lines() {
        text.push_str(&line?);
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use std::io::{self, Cursor};
    use std::time::Duration;

    use super::*;
    use crate::http::{HttpMethod, RequestSettings};

    fn request(url: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: Url::parse(url).unwrap(),
            headers: Headers::new(),
            settings: RequestSettings {
                connect_timeout: Duration::from_secs(5),
                read_timeout: Duration::from_secs(15),
                allow_user_interaction: false,
                use_caches: true,
                if_modified_since: None,
                do_input: true,
                do_output: false,
            },
            body: None,
        }
    }

    fn response(status: u16, headers: &[(&str, &str)], body: &'static str) -> HttpResponse {
        HttpResponse {
            status,
            message: String::new(),
            headers: headers.iter().copied().collect(),
            body: Box::new(Cursor::new(body)),
        }
    }

    struct Broken;

    impl Read for Broken {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset by peer"))
        }
    }

    #[test]
    fn read_text_strips_newlines() {
        let conn = HttpConnection::new(request("http://pacs.local/"), response(200, &[], "<a>\r\n<b/>\n</a>\n"));
        let text = Connection::from(conn).read_text().unwrap();
        assert_eq!(text, "<a><b/></a>");
    }

    #[test]
    fn read_text_propagates_read_errors() {
        let conn = PlainConnection::new(Url::parse("file:///tmp/x").unwrap(), Box::new(Broken));
        let err = Connection::from(conn).read_text().unwrap_err();
        assert!(matches!(err, FetchError::Io(ref e) if e.kind() == io::ErrorKind::ConnectionReset));
    }

    #[test]
    fn empty_location_counts_as_absent() {
        let conn = HttpConnection::new(request("http://pacs.local/"), response(302, &[("Location", "")], ""));
        assert!(conn.location().is_none());
    }

    #[test]
    fn repeated_header_resolves_to_last() {
        let conn = HttpConnection::new(
            request("http://pacs.local/"),
            response(302, &[("Set-Cookie", "a=1"), ("set-cookie", "b=2")], ""),
        );
        assert_eq!(conn.header("Set-Cookie"), Some("b=2"));
    }

    #[test]
    fn plain_connection_has_no_status() {
        let conn = Connection::from(PlainConnection::new(
            Url::parse("file:///tmp/x").unwrap(),
            Box::new(Cursor::new("")),
        ));
        assert_eq!(conn.status(), None);
        assert!(conn.as_http().is_none());
    }
}
