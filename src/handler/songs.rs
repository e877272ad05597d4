//! Song API handlers
//!
//! JSON endpoints over the track library: list, upload and delete.

use crate::config::AppState;
use crate::http::{self, ResponseBody};
use crate::library::{receive_upload, LibraryError, SongLibrary, SONG_FIELD};
use crate::logger;
use http_body_util::BodyExt;
use hyper::body::{Body, Bytes};
use hyper::header::{CONTENT_LENGTH, CONTENT_TYPE};
use hyper::{Request, Response, StatusCode};

/// `GET /api/songs`
pub async fn list_songs(library: &SongLibrary) -> Response<ResponseBody> {
    match library.list().await {
        Ok(tracks) => {
            logger::log_info(&format!("Found {} songs in uploads directory", tracks.len()));
            http::json_response(StatusCode::OK, &tracks)
        }
        Err(e) => {
            logger::log_error(&format!(
                "Error reading uploads directory '{}': {e}",
                library.dir().display()
            ));
            http::json_error(StatusCode::INTERNAL_SERVER_ERROR, "Unable to read files")
        }
    }
}

/// `POST /api/upload`
pub async fn upload_song<B>(req: Request<B>, state: &AppState) -> Response<ResponseBody>
where
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let too_large = LibraryError::TooLarge {
        limit: state.library.max_file_size(),
    };

    if let Some(size) = declared_length(&req) {
        if size > state.config.http.max_body_size {
            logger::log_warning(&format!(
                "Request body too large: {size} bytes (max: {})",
                state.config.http.max_body_size
            ));
            return upload_error(&too_large);
        }
    }

    let Some(boundary) = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|ct| multer::parse_boundary(ct).ok())
    else {
        return upload_error(&LibraryError::NoFile);
    };

    // Bodies without a Content-Length are capped while streaming
    let constraints = multer::Constraints::new().size_limit(
        multer::SizeLimit::new()
            .whole_stream(state.config.http.max_body_size)
            .for_field(SONG_FIELD, state.library.max_file_size()),
    );
    let multipart =
        multer::Multipart::with_constraints(req.into_body().into_data_stream(), boundary, constraints);

    match receive_upload(&state.library, multipart).await {
        Ok(track) => {
            logger::log_info(&format!("File uploaded successfully: {}", track.filename));
            http::json_response(StatusCode::OK, &track)
        }
        // The stream cap reports its own limit, clients only ever hear about the file limit
        Err(LibraryError::TooLarge { .. }) => upload_error(&too_large),
        Err(e) => upload_error(&e),
    }
}

/// `DELETE /api/songs/:filename`
pub async fn delete_song(library: &SongLibrary, raw_name: &str) -> Response<ResponseBody> {
    let filename = match urlencoding::decode(raw_name) {
        Ok(name) => name.into_owned(),
        Err(e) => {
            logger::log_error(&format!("Error deleting file '{raw_name}': {e}"));
            return delete_failed();
        }
    };

    match library.remove(&filename).await {
        Ok(()) => {
            logger::log_info(&format!("Deleted file: {filename}"));
            http::json_response(StatusCode::OK, &serde_json::json!({ "success": true }))
        }
        Err(e) => {
            logger::log_error(&format!("Error deleting file '{filename}': {e}"));
            delete_failed()
        }
    }
}

fn declared_length<B>(req: &Request<B>) -> Option<u64> {
    let value = req.headers().get(CONTENT_LENGTH)?;
    match value.to_str().ok().map(str::parse::<u64>) {
        Some(Ok(size)) => Some(size),
        _ => {
            logger::log_warning(&format!(
                "Invalid Content-Length value: {value:?}, skipping size check"
            ));
            None
        }
    }
}

fn upload_error(err: &LibraryError) -> Response<ResponseBody> {
    if err.is_validation() {
        logger::log_warning(&format!("Upload rejected: {err}"));
    } else {
        logger::log_error(&format!("Upload failed: {err}"));
    }
    http::json_error(StatusCode::BAD_REQUEST, &err.to_string())
}

fn delete_failed() -> Response<ResponseBody> {
    http::json_error(StatusCode::INTERNAL_SERVER_ERROR, "Unable to delete file")
}
