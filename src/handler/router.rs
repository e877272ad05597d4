//! Request routing dispatch module
//!
//! Entry point for HTTP request processing, responsible for route matching,
//! method validation, dispatching and the per-request access log line.

use crate::config::AppState;
use crate::handler::{songs, static_files};
use crate::http::{self, ResponseBody};
use crate::library::UPLOADS_ROUTE;
use crate::logger::{self, AccessLogEntry};
use hyper::body::{Body, Bytes};
use hyper::header::CONTENT_LENGTH;
use hyper::{Method, Request, Response, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Request context encapsulating information needed for file serving
pub struct RequestContext {
    pub is_head: bool,
    pub if_none_match: Option<String>,
    pub range_header: Option<String>,
}

impl RequestContext {
    fn from_request<B>(req: &Request<B>) -> Self {
        Self {
            is_head: req.method() == Method::HEAD,
            if_none_match: header_string(req, "if-none-match"),
            range_header: header_string(req, "range"),
        }
    }
}

/// Known endpoints
#[derive(Debug, PartialEq, Eq)]
enum Route<'a> {
    Index,
    SongList,
    Upload,
    /// `/api/songs/<filename>`, still percent-encoded
    Song(&'a str),
    /// `/uploads/<filename>`, still percent-encoded
    StoredFile(&'a str),
    NotFound,
}

impl<'a> Route<'a> {
    fn parse(path: &'a str) -> Self {
        match path {
            "/" | "/index.html" => Self::Index,
            "/api/songs" => Self::SongList,
            "/api/upload" => Self::Upload,
            _ => {
                if let Some(name) = path.strip_prefix("/api/songs/").filter(|n| !n.is_empty()) {
                    Self::Song(name)
                } else if let Some(name) = path
                    .strip_prefix(UPLOADS_ROUTE)
                    .and_then(|rest| rest.strip_prefix('/'))
                    .filter(|n| !n.is_empty())
                {
                    Self::StoredFile(name)
                } else {
                    Self::NotFound
                }
            }
        }
    }

    /// Value of the `Allow` header for this route
    const fn allow(&self) -> &'static str {
        match self {
            Self::Index | Self::SongList | Self::StoredFile(_) => "GET, HEAD",
            Self::Upload => "POST",
            Self::Song(_) => "DELETE",
            Self::NotFound => "",
        }
    }

    fn accepts(&self, method: &Method) -> bool {
        match self {
            Self::Index | Self::SongList | Self::StoredFile(_) => {
                matches!(*method, Method::GET | Method::HEAD)
            }
            Self::Upload => *method == Method::POST,
            Self::Song(_) => *method == Method::DELETE,
            Self::NotFound => true,
        }
    }
}

/// Main entry point for HTTP request handling
///
/// Generic over the body so tests can drive it with in-memory requests.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer: SocketAddr,
) -> Result<Response<ResponseBody>, Infallible>
where
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let started = Instant::now();
    let entry = state
        .config
        .logging
        .access_log
        .then(|| access_entry(&req, peer));

    let mut response = route_request(req, &state).await;
    apply_common_headers(&mut response, &state);

    if let Some(mut entry) = entry {
        entry.status = response.status().as_u16();
        entry.body_bytes = body_bytes(&response);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Route request based on path and method
async fn route_request<B>(req: Request<B>, state: &AppState) -> Response<ResponseBody>
where
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    if req.method() == Method::OPTIONS {
        return http::build_options_response(state.config.http.enable_cors);
    }

    let path = req.uri().path().to_string();
    let route = Route::parse(&path);

    if !route.accepts(req.method()) {
        logger::log_warning(&format!("Method not allowed: {} {path}", req.method()));
        return http::build_405_response(route.allow());
    }

    match route {
        Route::Index => {
            let ctx = RequestContext::from_request(&req);
            static_files::serve_index(&ctx, &state.config.storage.index_file).await
        }
        Route::StoredFile(name) => {
            let ctx = RequestContext::from_request(&req);
            static_files::serve_upload(&ctx, state.library.dir(), name).await
        }
        Route::SongList => songs::list_songs(&state.library).await,
        Route::Upload => songs::upload_song(req, state).await,
        Route::Song(name) => songs::delete_song(&state.library, name).await,
        Route::NotFound => http::build_404_response(),
    }
}

/// Headers every response carries
fn apply_common_headers(response: &mut Response<ResponseBody>, state: &AppState) {
    let headers = response.headers_mut();
    if let Ok(value) = state.config.http.server_name.parse() {
        headers.insert("server", value);
    }
    if state.config.http.enable_cors {
        headers.insert(
            "access-control-allow-origin",
            hyper::header::HeaderValue::from_static("*"),
        );
    }
}

/// Bytes the response announces, streamed file bodies only know theirs from the header
fn body_bytes(response: &Response<ResponseBody>) -> u64 {
    response
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .or_else(|| response.body().size_hint().exact())
        .unwrap_or(0)
}

fn access_entry<B>(req: &Request<B>, peer: SocketAddr) -> AccessLogEntry {
    let mut entry = AccessLogEntry::new(
        peer.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = match req.version() {
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        _ => "1.1",
    }
    .to_string();
    entry.referer = header_string(req, "referer");
    entry.user_agent = header_string(req, "user-agent");
    entry
}

fn header_string<B>(req: &Request<B>, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}
