// Multipart upload intake
// Picks the `song` field out of a form, validates it and hands it to the store

use super::naming;
use super::{LibraryError, SongLibrary, Track, DEFAULT_MIME};
use crate::logger;

/// Form field that carries the uploaded file
pub const SONG_FIELD: &str = "song";

/// Consume a multipart form and store its `song` file.
///
/// Other fields are skipped. The type check runs before a single byte of
/// the file is written.
pub async fn receive_upload(
    library: &SongLibrary,
    mut multipart: multer::Multipart<'_>,
) -> Result<Track, LibraryError> {
    while let Some(mut field) = multipart.next_field().await? {
        if field.name() != Some(SONG_FIELD) {
            continue;
        }
        let Some(original) = field
            .file_name()
            .map(naming::original_name)
            .filter(|name| !name.is_empty())
            .map(ToString::to_string)
        else {
            continue;
        };
        let content_type = field.content_type().map(ToString::to_string);

        logger::log_info(&format!(
            "Checking uploaded file: {original} MIME type: {}",
            content_type.as_deref().unwrap_or(DEFAULT_MIME)
        ));

        if !naming::is_mp3_upload(content_type.as_deref(), &original) {
            return Err(LibraryError::InvalidType(
                content_type.unwrap_or_else(|| DEFAULT_MIME.to_string()),
            ));
        }

        return library.store(&mut field, &original).await;
    }

    Err(LibraryError::NoFile)
}
