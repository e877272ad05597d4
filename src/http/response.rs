//! HTTP response building module
//!
//! Provides builders for various HTTP status code responses, decoupled from specific business logic.

use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde::Serialize;

use super::body::{self, ResponseBody};
use super::cache::TRACK_CACHE_CONTROL;
use super::range::ByteRange;

/// Methods advertised on `OPTIONS` and CORS preflight
pub const ALLOWED_METHODS: &str = "GET, HEAD, POST, DELETE, OPTIONS";

/// Build 304 Not Modified response
pub fn build_304_response(etag: &str) -> Response<ResponseBody> {
    Response::builder()
        .status(304)
        .header("ETag", etag)
        .header("Cache-Control", TRACK_CACHE_CONTROL)
        .body(body::empty())
        .unwrap_or_else(|e| {
            log_build_error("304", &e);
            Response::new(body::empty())
        })
}

/// Build 404 Not Found response
pub fn build_404_response() -> Response<ResponseBody> {
    Response::builder()
        .status(404)
        .header("Content-Type", "text/plain")
        .body(body::full("404 Not Found"))
        .unwrap_or_else(|e| {
            log_build_error("404", &e);
            Response::new(body::full("404 Not Found"))
        })
}

/// Build 405 Method Not Allowed response
pub fn build_405_response(allow: &str) -> Response<ResponseBody> {
    Response::builder()
        .status(405)
        .header("Content-Type", "text/plain")
        .header("Allow", allow)
        .body(body::full("405 Method Not Allowed"))
        .unwrap_or_else(|e| {
            log_build_error("405", &e);
            Response::new(body::full("405 Method Not Allowed"))
        })
}

/// Build OPTIONS response (preflight request)
pub fn build_options_response(enable_cors: bool) -> Response<ResponseBody> {
    let mut builder = Response::builder()
        .status(204)
        .header("Allow", ALLOWED_METHODS);

    if enable_cors {
        builder = builder
            .header("Access-Control-Allow-Origin", "*")
            .header("Access-Control-Allow-Methods", ALLOWED_METHODS)
            .header("Access-Control-Allow-Headers", "Content-Type, Range")
            .header("Access-Control-Max-Age", "86400");
    }

    builder.body(body::empty()).unwrap_or_else(|e| {
        log_build_error("OPTIONS", &e);
        Response::new(body::empty())
    })
}

/// Build 416 Range Not Satisfiable response
pub fn build_416_response(file_size: u64) -> Response<ResponseBody> {
    Response::builder()
        .status(416)
        .header("Content-Type", "text/plain")
        .header("Content-Range", format!("bytes */{file_size}"))
        .body(body::full("Range Not Satisfiable"))
        .unwrap_or_else(|e| {
            log_build_error("416", &e);
            Response::new(body::full("Range Not Satisfiable"))
        })
}

/// Build generic HTML response
pub fn build_html_response(content: Bytes, is_head: bool) -> Response<ResponseBody> {
    let content_length = content.len();
    let payload = if is_head { Bytes::new() } else { content };

    Response::builder()
        .status(200)
        .header("Content-Type", "text/html; charset=utf-8")
        .header("Content-Length", content_length)
        .body(body::full(payload))
        .unwrap_or_else(|e| {
            log_build_error("HTML", &e);
            Response::new(body::empty())
        })
}

/// Build success response for a whole file
///
/// `total_size` is taken separately since the body is usually a stream,
/// and an empty one for HEAD requests.
pub fn build_file_response(
    content: ResponseBody,
    content_type: &str,
    etag: &str,
    total_size: u64,
) -> Response<ResponseBody> {
    Response::builder()
        .status(200)
        .header("Content-Type", content_type)
        .header("Content-Length", total_size)
        .header("Accept-Ranges", "bytes")
        .header("ETag", etag)
        .header("Cache-Control", TRACK_CACHE_CONTROL)
        .body(content)
        .unwrap_or_else(|e| {
            log_build_error("200", &e);
            Response::new(body::empty())
        })
}

/// Build 206 Partial Content response
pub fn build_partial_response(
    content: ResponseBody,
    content_type: &str,
    etag: &str,
    range: ByteRange,
    total_size: u64,
) -> Response<ResponseBody> {
    Response::builder()
        .status(206)
        .header("Content-Type", content_type)
        .header("Content-Length", range.len())
        .header("Content-Range", range.content_range(total_size))
        .header("Accept-Ranges", "bytes")
        .header("ETag", etag)
        .header("Cache-Control", TRACK_CACHE_CONTROL)
        .body(content)
        .unwrap_or_else(|e| {
            log_build_error("206", &e);
            Response::new(body::empty())
        })
}

/// Build a JSON response from any serializable value
pub fn json_response<T: Serialize + ?Sized>(status: StatusCode, value: &T) -> Response<ResponseBody> {
    let payload = match serde_json::to_vec(value) {
        Ok(payload) => payload,
        Err(e) => {
            crate::logger::log_error(&format!("Failed to serialize JSON response: {e}"));
            return json_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error");
        }
    };

    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Content-Length", payload.len())
        .body(body::full(payload))
        .unwrap_or_else(|e| {
            log_build_error("JSON", &e);
            Response::new(body::empty())
        })
}

/// Build `{"error": message}` with the given status
pub fn json_error(status: StatusCode, message: &str) -> Response<ResponseBody> {
    let payload = serde_json::json!({ "error": message }).to_string();

    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Content-Length", payload.len())
        .body(body::full(payload))
        .unwrap_or_else(|e| {
            log_build_error("JSON error", &e);
            Response::new(body::empty())
        })
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_string(response: Response<ResponseBody>) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_json_error_shape() {
        let response = json_error(StatusCode::BAD_REQUEST, "No file uploaded");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers()["Content-Type"], "application/json");
        assert_eq!(body_string(response).await, r#"{"error":"No file uploaded"}"#);
    }

    #[tokio::test]
    async fn test_json_response_serializes_value() {
        let response = json_response(StatusCode::OK, &serde_json::json!({ "success": true }));
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, r#"{"success":true}"#);
    }

    #[tokio::test]
    async fn test_head_file_response_keeps_length() {
        let response = build_file_response(body::empty(), "audio/mpeg", "\"e\"", 6);
        assert_eq!(response.headers()["Content-Length"], "6");
        assert_eq!(response.headers()["Accept-Ranges"], "bytes");
        assert!(body_string(response).await.is_empty());
    }

    #[test]
    fn test_partial_response_headers() {
        let range = ByteRange { start: 2, end: 4 };
        let response =
            build_partial_response(body::full("cde"), "audio/mpeg", "\"e\"", range, 10);
        assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(response.headers()["Content-Range"], "bytes 2-4/10");
        assert_eq!(response.headers()["Content-Length"], "3");
    }

    #[test]
    fn test_options_cors_headers() {
        let plain = build_options_response(false);
        assert_eq!(plain.status(), StatusCode::NO_CONTENT);
        assert!(plain.headers().get("Access-Control-Allow-Origin").is_none());

        let cors = build_options_response(true);
        assert_eq!(cors.headers()["Access-Control-Allow-Origin"], "*");
        assert_eq!(cors.headers()["Access-Control-Allow-Methods"], ALLOWED_METHODS);
    }

    #[test]
    fn test_405_carries_allow() {
        let response = build_405_response("GET, HEAD");
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()["Allow"], "GET, HEAD");
    }
}
