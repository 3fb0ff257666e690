//! End-to-end tests against the live mock server.
//!
//! # Design
//! Each test starts the mock server on a random port and drives a
//! `ConnectionPreparer` backed by `UreqTransport` over real HTTP. The server
//! records every request it receives, so tests can check what each redirect
//! hop actually sent.

use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::thread;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use fetch_core::{AppIdentity, ConnectionParams, ConnectionPreparer, FetchError, PreparedConnection, UreqTransport};
use mock_server::{Echo, RecordedRequest, RequestLog};

struct Server {
    base: String,
    requests: RequestLog,
}

impl Server {
    fn start() -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        let std_listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = std_listener.local_addr().unwrap();
        std_listener.set_nonblocking(true).unwrap();
        let requests = RequestLog::default();
        let server_requests = requests.clone();

        thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            rt.block_on(async {
                let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
                mock_server::run(listener, server_requests).await
            })
            .unwrap();
        });

        Server {
            base: format!("http://{addr}"),
            requests,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }

    fn recorded(&self) -> Vec<RecordedRequest> {
        self.requests.blocking_lock().clone()
    }

    fn paths(&self) -> Vec<String> {
        self.recorded().into_iter().map(|r| r.path).collect()
    }
}

/// Answers a single request with `head` and then writes each chunk of
/// `body` after `gap`.
fn raw_server(head: &'static str, body: &'static [&'static str], gap: Duration) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());
        let mut line = String::new();
        while reader.read_line(&mut line).unwrap() > 2 {
            line.clear();
        }
        let mut stream = stream;
        stream.write_all(head.as_bytes()).unwrap();
        stream.flush().unwrap();
        for chunk in body {
            thread::sleep(gap);
            stream.write_all(chunk.as_bytes()).unwrap();
            stream.flush().unwrap();
        }
    });
    format!("http://{addr}/")
}

fn preparer() -> ConnectionPreparer<UreqTransport> {
    ConnectionPreparer::new(UreqTransport::new(), AppIdentity::new("Weasis/4.5.1", "  viewer "))
}

#[test]
fn get_reads_body_without_newlines() {
    let server = Server::start();

    let text = preparer()
        .fetch_text(&server.url("/ok"), &ConnectionParams::default())
        .unwrap();

    assert_eq!(text, "first linesecond line");
}

#[test]
fn identity_headers_reach_the_server() {
    let server = Server::start();
    let params = ConnectionParams::with_headers([("User-Agent", "curl/8.0"), ("X-Trace", "abc")]);

    preparer().fetch_text(&server.url("/ok"), &params).unwrap();

    let request = server.recorded().remove(0);
    let agents: Vec<&str> = request.headers_named("user-agent").collect();
    assert_eq!(agents, vec!["Weasis/4.5.1"]);
    assert_eq!(request.header("weasis-user"), Some("VIEWER"));
    assert_eq!(request.header("x-trace"), Some("abc"));
}

#[test]
fn short_chain_is_followed_to_the_end() {
    let server = Server::start();

    let text = preparer()
        .fetch_text(&server.url("/chain/2"), &ConnectionParams::default())
        .unwrap();

    assert_eq!(text, "end of chain");
    assert_eq!(server.paths(), vec!["/chain/2", "/chain/1", "/chain/0"]);
}

#[test]
fn long_chain_stops_after_three_hops() {
    let server = Server::start();
    let params = ConnectionParams::with_headers([("X-Trace", "abc")]);

    let conn = preparer()
        .open(&server.url("/chain/5"), &params)
        .unwrap()
        .connect()
        .unwrap();

    assert_eq!(conn.status(), Some(302));
    assert_eq!(conn.url().path(), "/chain/2");
    assert_eq!(server.paths(), vec!["/chain/5", "/chain/4", "/chain/3", "/chain/2"]);

    let recorded = server.recorded();
    assert!(recorded.iter().all(|r| r.header("x-trace") == Some("abc")));
    assert_eq!(recorded[1].header("cookie"), Some("hop=5"));
    assert_eq!(recorded[2].header("cookie"), Some("hop=4"));
    assert_eq!(recorded[3].header("cookie"), Some("hop=3"));
}

#[test]
fn redirect_loop_is_not_an_error() {
    let server = Server::start();

    let conn = preparer()
        .open(&server.url("/loop"), &ConnectionParams::default())
        .unwrap()
        .connect()
        .unwrap();

    assert_eq!(conn.status(), Some(302));
    assert_eq!(server.paths().len(), 4);
}

#[test]
fn followed_redirect_codes() {
    let server = Server::start();
    for code in [301, 302, 303] {
        let text = preparer()
            .fetch_text(&server.url(&format!("/moved/{code}")), &ConnectionParams::default())
            .unwrap();
        assert_eq!(text, "first linesecond line", "{code}");
    }
}

#[test]
fn other_redirect_codes_fail() {
    let server = Server::start();

    let err = preparer()
        .fetch_text(&server.url("/moved/307"), &ConnectionParams::default())
        .unwrap_err();

    assert_eq!(err.status_code(), Some(307));
    assert_eq!(err.to_string(), "Temporary Redirect");
}

#[test]
fn error_status_fails_with_server_message() {
    let server = Server::start();

    let err = preparer()
        .fetch_text(&server.url("/status/404"), &ConnectionParams::default())
        .unwrap_err();

    assert!(matches!(err, FetchError::Status { code: 404, .. }));
    assert_eq!(err.to_string(), "Not Found");
}

#[test]
fn post_is_sent_only_when_the_caller_asks() {
    let server = Server::start();
    let params = ConnectionParams::post_with_headers([("Content-Type", "text/xml"), ("X-Trace", "up")]);
    let preparer = preparer();

    let prepared = preparer.open(&server.url("/upload"), &params).unwrap();
    assert!(server.recorded().is_empty());

    let PreparedConnection::Post(pending) = prepared else {
        panic!("expected a pending POST");
    };
    let text = pending.send("<query/>").unwrap().read_text().unwrap();

    let echo: Echo = serde_json::from_str(&text).unwrap();
    assert!(echo.body.is_empty());
    assert!(echo.headers.contains(&("x-trace".to_string(), "up".to_string())));
    let recorded = server.recorded();
    assert_eq!(recorded[0].method, "POST");
    assert_eq!(recorded[1].method, "GET");
    assert_eq!(recorded[1].path, "/echo");
}

#[test]
fn if_modified_since_is_sent_as_http_date() {
    let server = Server::start();
    let params = ConnectionParams::builder()
        .if_modified_since(Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).unwrap())
        .build();

    preparer().fetch_text(&server.url("/echo"), &params).unwrap();

    assert_eq!(
        server.recorded()[0].header("if-modified-since"),
        Some("Fri, 01 Mar 2024 08:30:00 GMT")
    );
}

#[test]
fn connection_refused_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = preparer()
        .fetch_text(&format!("http://{addr}/ok"), &ConnectionParams::default())
        .unwrap_err();

    assert!(err.is_transport());
    assert!(err.status_code().is_none());
}

#[test]
fn unknown_status_code_still_has_a_message() {
    let server = Server::start();

    let err = preparer()
        .fetch_text(&server.url("/status/520"), &ConnectionParams::default())
        .unwrap_err();

    assert_eq!(err.status_code(), Some(520));
    assert_eq!(err.to_string(), "HTTP 520");
}

#[test]
fn read_timeout_does_not_cap_a_streaming_body() {
    let url = raw_server(
        "HTTP/1.1 200 OK\r\nContent-Length: 12\r\nConnection: close\r\n\r\n",
        &["ab", "cd", "ef", "gh", "ij", "kl"],
        Duration::from_millis(300),
    );
    let params = ConnectionParams::builder().read_timeout_ms(1_000).build();

    let text = preparer().fetch_text(&url, &params).unwrap();

    assert_eq!(text, "abcdefghijkl");
}

#[test]
fn read_timeout_bounds_the_response_head() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    thread::spawn(move || {
        let (_stream, _) = listener.accept().unwrap();
        thread::sleep(Duration::from_secs(3));
    });
    let params = ConnectionParams::builder().read_timeout_ms(300).build();

    let err = preparer()
        .fetch_text(&format!("http://{addr}/"), &params)
        .unwrap_err();

    assert!(err.is_transport());
}

#[test]
fn zero_timeouts_mean_no_limit() {
    let server = Server::start();
    let params = ConnectionParams::builder()
        .connect_timeout_ms(0)
        .read_timeout_ms(0)
        .build();

    let text = preparer().fetch_text(&server.url("/ok"), &params).unwrap();

    assert_eq!(text, "first linesecond line");
}
