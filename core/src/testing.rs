//! Scripted transport for unit tests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Cursor;
use std::time::Duration;

use url::Url;

use crate::connection::HttpConnection;
use crate::error::FetchError;
use crate::http::{Headers, HttpMethod, HttpRequest, HttpResponse, RequestSettings};
use crate::transport::Transport;

pub fn settings() -> RequestSettings {
    RequestSettings {
        connect_timeout: Duration::from_millis(1_000),
        read_timeout: Duration::from_millis(2_000),
        allow_user_interaction: false,
        use_caches: true,
        if_modified_since: None,
        do_input: true,
        do_output: false,
    }
}

#[derive(Debug, Clone)]
struct Scripted {
    status: u16,
    message: String,
    headers: Vec<(String, String)>,
    body: String,
}

/// Answers every request for a URL with the same scripted response and
/// records what was sent.
#[derive(Debug, Default)]
pub struct FakeTransport {
    routes: HashMap<String, Scripted>,
    sent: RefCell<Vec<HttpRequest>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, url: &str, status: u16, message: &str, headers: &[(&str, &str)], body: &str) -> Self {
        self.routes.insert(
            url.to_string(),
            Scripted {
                status,
                message: message.to_string(),
                headers: headers
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                body: body.to_string(),
            },
        );
        self
    }

    pub fn ok(self, url: &str, body: &str) -> Self {
        self.route(url, 200, "OK", &[], body)
    }

    pub fn redirect(self, url: &str, status: u16, location: &str, cookie: Option<&str>) -> Self {
        let mut headers = vec![("Location", location)];
        if let Some(cookie) = cookie {
            headers.push(("Set-Cookie", cookie));
        }
        self.route(url, status, "Found", &headers, "")
    }

    /// Sends a bare GET for `url` and wraps the answer.
    pub fn open(&self, url: &str) -> HttpConnection {
        let request = HttpRequest {
            method: HttpMethod::Get,
            url: Url::parse(url).unwrap(),
            headers: Headers::new(),
            settings: settings(),
            body: None,
        };
        let response = self.send(&request).unwrap();
        HttpConnection::new(request, response)
    }

    pub fn sent(&self) -> Vec<HttpRequest> {
        self.sent.borrow().clone()
    }

    pub fn sent_urls(&self) -> Vec<String> {
        self.sent.borrow().iter().map(|r| r.url.to_string()).collect()
    }
}

impl Transport for FakeTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, FetchError> {
        self.sent.borrow_mut().push(request.clone());
        let scripted = self
            .routes
            .get(request.url.as_str())
            .ok_or_else(|| FetchError::Transport(format!("connection refused: {}", request.url)))?;
        Ok(HttpResponse {
            status: scripted.status,
            message: scripted.message.clone(),
            headers: scripted.headers.iter().cloned().collect::<Headers>(),
            body: Box::new(Cursor::new(scripted.body.clone())),
        })
    }
}
