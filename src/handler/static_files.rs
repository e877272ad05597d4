//! Static file serving module
//!
//! Serves the landing page and the raw track files under `/uploads`.

use crate::handler::router::RequestContext;
use crate::http::{self, body, cache, mime, ByteRange, RangeParseResult, ResponseBody};
use crate::logger;
use hyper::body::Bytes;
use hyper::Response;
use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

/// Landing page compiled into the binary, used when the configured file is absent
const BUILTIN_INDEX: &str = include_str!("../../static/index.html");

/// Serve the landing page
pub async fn serve_index(ctx: &RequestContext, index_file: &str) -> Response<ResponseBody> {
    let content = match fs::read(index_file).await {
        Ok(content) => Bytes::from(content),
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                logger::log_warning(&format!(
                    "Failed to read index file '{index_file}': {e}, using built-in page"
                ));
            }
            Bytes::from_static(BUILTIN_INDEX.as_bytes())
        }
    };
    http::build_html_response(content, ctx.is_head)
}

/// Serve a stored file with `ETag` and Range support
pub async fn serve_upload(
    ctx: &RequestContext,
    uploads_dir: &Path,
    raw_name: &str,
) -> Response<ResponseBody> {
    let Ok(name) = urlencoding::decode(raw_name) else {
        return http::build_404_response();
    };
    let Some(path) = resolve_in_dir(uploads_dir, &name).await else {
        return http::build_404_response();
    };

    // File not found is common (404), no need to log
    let metadata = match fs::metadata(&path).await {
        Ok(m) if m.is_file() => m,
        _ => return http::build_404_response(),
    };

    let etag = cache::etag_from_metadata(&metadata);
    if cache::check_etag_match(ctx.if_none_match.as_deref(), &etag) {
        return http::build_304_response(&etag);
    }

    let total_size = metadata.len();
    let content_type = mime::content_type_for(&path);

    match http::parse_range_header(ctx.range_header.as_deref(), total_size) {
        RangeParseResult::Valid(range) => {
            let content = if ctx.is_head {
                body::empty()
            } else {
                match open_range(&path, range).await {
                    Ok(content) => content,
                    Err(e) => return read_failed(&path, &e),
                }
            };
            http::build_partial_response(content, content_type, &etag, range, total_size)
        }
        RangeParseResult::NotSatisfiable => http::build_416_response(total_size),
        RangeParseResult::None => {
            let content = if ctx.is_head {
                body::empty()
            } else {
                match fs::File::open(&path).await {
                    // Bounded by the size the headers announce, even if the file grows
                    Ok(file) => body::stream(file.take(total_size)),
                    Err(e) => return read_failed(&path, &e),
                }
            };
            http::build_file_response(content, content_type, &etag, total_size)
        }
    }
}

/// Join `name` onto `dir`, refusing anything that resolves outside of it
async fn resolve_in_dir(dir: &Path, name: &str) -> Option<PathBuf> {
    let dir_canonical = match fs::canonicalize(dir).await {
        Ok(p) => p,
        Err(e) => {
            logger::log_warning(&format!(
                "Uploads directory not found or inaccessible '{}': {e}",
                dir.display()
            ));
            return None;
        }
    };

    let file_canonical = fs::canonicalize(dir.join(name)).await.ok()?;
    if !file_canonical.starts_with(&dir_canonical) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {name} -> {}",
            file_canonical.display()
        ));
        return None;
    }
    Some(file_canonical)
}

async fn open_range(path: &Path, range: ByteRange) -> std::io::Result<ResponseBody> {
    let mut file = fs::File::open(path).await?;
    file.seek(SeekFrom::Start(range.start)).await?;
    Ok(body::stream(file.take(range.len())))
}

fn read_failed(path: &Path, error: &std::io::Error) -> Response<ResponseBody> {
    logger::log_error(&format!("Failed to read file '{}': {error}", path.display()));
    http::build_404_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use hyper::StatusCode;

    fn ctx(range: Option<&str>, if_none_match: Option<&str>) -> RequestContext {
        RequestContext {
            is_head: false,
            if_none_match: if_none_match.map(ToString::to_string),
            range_header: range.map(ToString::to_string),
        }
    }

    async fn body(response: Response<ResponseBody>) -> Bytes {
        response.into_body().collect().await.unwrap().to_bytes()
    }

    #[tokio::test]
    async fn test_index_falls_back_to_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("index.html");
        let response = serve_index(&ctx(None, None), missing.to_str().unwrap()).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body(response).await, BUILTIN_INDEX.as_bytes());
    }

    #[tokio::test]
    async fn test_index_prefers_configured_file() {
        let dir = tempfile::tempdir().unwrap();
        let index = dir.path().join("index.html");
        std::fs::write(&index, "<h1>custom</h1>").unwrap();
        let response = serve_index(&ctx(None, None), index.to_str().unwrap()).await;
        assert_eq!(body(response).await, "<h1>custom</h1>");
    }

    #[tokio::test]
    async fn test_serve_whole_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("1-2-my song.mp3"), b"ID3 audio").unwrap();

        let response = serve_upload(&ctx(None, None), dir.path(), "1-2-my%20song.mp3").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["Content-Type"], "audio/mpeg");
        assert_eq!(response.headers()["Accept-Ranges"], "bytes");
        assert_eq!(body(response).await, "ID3 audio");
    }

    #[tokio::test]
    async fn test_serve_suffix_range() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.mp3"), b"0123456789").unwrap();

        let response = serve_upload(&ctx(Some("bytes=-3"), None), dir.path(), "a.mp3").await;
        assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(response.headers()["Content-Range"], "bytes 7-9/10");
        assert_eq!(body(response).await, "789");
    }

    #[tokio::test]
    async fn test_unsatisfiable_range() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.mp3"), b"0123").unwrap();

        let response = serve_upload(&ctx(Some("bytes=10-"), None), dir.path(), "a.mp3").await;
        assert_eq!(response.status(), StatusCode::RANGE_NOT_SATISFIABLE);
        assert_eq!(response.headers()["Content-Range"], "bytes */4");
    }

    #[tokio::test]
    async fn test_etag_revalidation() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.mp3"), b"abc").unwrap();

        let first = serve_upload(&ctx(None, None), dir.path(), "a.mp3").await;
        let etag = first.headers()["ETag"].to_str().unwrap().to_string();

        let second = serve_upload(&ctx(None, Some(&etag)), dir.path(), "a.mp3").await;
        assert_eq!(second.status(), StatusCode::NOT_MODIFIED);
    }

    #[tokio::test]
    async fn test_missing_and_traversal_are_404() {
        let dir = tempfile::tempdir().unwrap();
        let uploads = dir.path().join("uploads");
        std::fs::create_dir(&uploads).unwrap();
        std::fs::write(dir.path().join("secret.mp3"), b"x").unwrap();

        let missing = serve_upload(&ctx(None, None), &uploads, "nope.mp3").await;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let escaped = serve_upload(&ctx(None, None), &uploads, "..%2Fsecret.mp3").await;
        assert_eq!(escaped.status(), StatusCode::NOT_FOUND);
    }
}
