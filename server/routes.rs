use std::io::Cursor;
use std::sync::Arc;

use serde::Serialize;
use tiny_http::{Header, Method, Request, Response, StatusCode};
use tracing::{debug, error};

use crate::config::ServerConfig;
use crate::handlers;

type HttpResponse = Response<Cursor<Vec<u8>>>;

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

fn header(name: &str, value: &str) -> Option<Header> {
    Header::from_bytes(name.as_bytes(), value.as_bytes()).ok()
}

fn with_body(status: u16, content_type: &str, bytes: Vec<u8>) -> HttpResponse {
    let len = bytes.len();
    Response::new(
        StatusCode(status),
        header("Content-Type", content_type).into_iter().collect(),
        Cursor::new(bytes),
        Some(len),
        None,
    )
}

pub fn text_response(status: u16, body: &str) -> HttpResponse {
    with_body(status, "text/plain; charset=utf-8", body.as_bytes().to_vec())
}

pub fn json_response<T: Serialize>(status: u16, body: &T) -> HttpResponse {
    match serde_json::to_vec(body) {
        Ok(bytes) => with_body(status, "application/json", bytes),
        Err(e) => {
            error!(error = %e, "failed to serialize response body");
            text_response(500, "Internal Server Error")
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

pub fn not_found() -> HttpResponse {
    json_response(404, &ErrorBody { error: "Not found" })
}

/// Empty 204 answering a CORS preflight. `requested_headers` is echoed back
/// so any header the browser asks for is allowed.
fn preflight(requested_headers: Option<&str>) -> HttpResponse {
    let allow_headers = requested_headers.unwrap_or("Content-Type");
    let mut response = Response::new(
        StatusCode(204),
        Vec::new(),
        Cursor::new(Vec::new()),
        Some(0),
        None,
    );
    for h in [
        header("Access-Control-Allow-Methods", "GET, POST, OPTIONS"),
        header("Access-Control-Allow-Headers", allow_headers),
        header("Access-Control-Max-Age", "86400"),
    ]
    .into_iter()
    .flatten()
    {
        response.add_header(h);
    }
    response
}

/// Lets browsers on any origin read the response.
pub fn allow_any_origin(response: HttpResponse) -> HttpResponse {
    match header("Access-Control-Allow-Origin", "*") {
        Some(h) => response.with_header(h),
        None => response,
    }
}

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    Health,
    UploadImage,
    Preflight,
    NotFound,
}

/// Maps a method and URL (query string ignored) to a route.
pub fn route(method: &Method, url: &str) -> Route {
    let path = url.split('?').next().unwrap_or("");
    match (method, path) {
        (Method::Options, _) => Route::Preflight,
        (Method::Get, "/") => Route::Home,
        (Method::Get, "/health") => Route::Health,
        (Method::Post, "/upload-image") => Route::UploadImage,
        _ => Route::NotFound,
    }
}

fn request_header(request: &Request, name: &'static str) -> Option<String> {
    request
        .headers()
        .iter()
        .find(|h| h.field.equiv(name))
        .map(|h| h.value.as_str().to_owned())
}

/// Handles one request to completion and sends the response. Every response
/// allows any origin.
pub fn dispatch(mut request: Request, config: Arc<ServerConfig>) {
    let method = request.method().clone();
    let url = request.url().to_owned();
    debug!(%method, %url, "request");

    let response = match route(&method, &url) {
        Route::Home => text_response(200, handlers::health::HOME_MESSAGE),
        Route::Health => json_response(200, &handlers::health::status()),
        Route::Preflight => {
            let requested = request_header(&request, "Access-Control-Request-Headers");
            preflight(requested.as_deref())
        }
        Route::UploadImage => {
            let content_type = request_header(&request, "Content-Type").unwrap_or_default();
            let mut body = Vec::new();
            match request.as_reader().read_to_end(&mut body) {
                Ok(_) => handlers::upload::respond(&content_type, &body, &config.upload_dir),
                Err(e) => handlers::upload::respond_error(&e.into()),
            }
        }
        Route::NotFound => not_found(),
    };

    if let Err(e) = request.respond(allow_any_origin(response)) {
        debug!(error = %e, %url, "client went away before the response was sent");
    }
}
