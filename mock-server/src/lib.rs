use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::Mutex};

/// A request as the server saw it.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn headers_named<'a, 'n>(&'a self, name: &'n str) -> impl Iterator<Item = &'a str> + 'n
    where
        'a: 'n,
    {
        self.headers
            .iter()
            .filter(move |(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Body of `/echo`: the request headers and body sent back as JSON.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Echo {
    pub headers: Vec<(String, String)>,
    pub body: String,
}

pub type RequestLog = Arc<Mutex<Vec<RecordedRequest>>>;

pub fn app(requests: RequestLog) -> Router {
    Router::new()
        .route("/ok", get(ok))
        .route("/echo", get(echo).post(echo))
        .route("/chain/{hops}", get(chain))
        .route("/loop", get(redirect_loop))
        .route("/moved/{code}", get(moved))
        .route("/status/{code}", get(status).post(status))
        .route("/upload", post(upload))
        .layer(middleware::from_fn_with_state(requests.clone(), record))
        .with_state(requests)
}

pub async fn run(listener: TcpListener, requests: RequestLog) -> Result<(), std::io::Error> {
    axum::serve(listener, app(requests)).await
}

async fn record(State(requests): State<RequestLog>, request: Request, next: Next) -> Response {
    let recorded = RecordedRequest {
        method: request.method().to_string(),
        path: request.uri().path().to_string(),
        headers: request
            .headers()
            .iter()
            .map(|(k, v)| (k.as_str().to_string(), String::from_utf8_lossy(v.as_bytes()).into_owned()))
            .collect(),
    };
    log::debug!("{} {}", recorded.method, recorded.path);
    requests.lock().await.push(recorded);
    next.run(request).await
}

async fn ok() -> &'static str {
    "first line\nsecond line\n"
}

async fn echo(headers: HeaderMap, body: String) -> Json<Echo> {
    Json(Echo {
        headers: headers
            .iter()
            .map(|(k, v)| (k.as_str().to_string(), String::from_utf8_lossy(v.as_bytes()).into_owned()))
            .collect(),
        body,
    })
}

/// Redirects `/chain/n` to `/chain/n-1`, setting cookie `hop=n`, until `n`
/// reaches zero.
async fn chain(Path(hops): Path<u32>) -> Response {
    if hops == 0 {
        return "end of chain".into_response();
    }
    (
        StatusCode::FOUND,
        [
            (header::LOCATION, format!("/chain/{}", hops - 1)),
            (header::SET_COOKIE, format!("hop={hops}")),
        ],
    )
        .into_response()
}

async fn redirect_loop() -> Response {
    (StatusCode::FOUND, [(header::LOCATION, "/loop")]).into_response()
}

/// Redirects to `/ok` with the given status code.
async fn moved(Path(code): Path<u16>) -> Response {
    match StatusCode::from_u16(code) {
        Ok(code) if code.is_redirection() => (code, [(header::LOCATION, "/ok")]).into_response(),
        _ => StatusCode::BAD_REQUEST.into_response(),
    }
}

async fn status(Path(code): Path<u16>) -> Response {
    match StatusCode::from_u16(code) {
        Ok(code) => (code, format!("status {}", code.as_u16())).into_response(),
        Err(_) => StatusCode::BAD_REQUEST.into_response(),
    }
}

/// Accepts a POST and sends the client to `/echo`.
async fn upload(body: String) -> Response {
    log::debug!("upload of {} bytes", body.len());
    (StatusCode::SEE_OTHER, [(header::LOCATION, "/echo")]).into_response()
}
