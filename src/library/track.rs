use serde::{Deserialize, Serialize};

use super::naming;

/// Route under which stored tracks are served.
pub const UPLOADS_ROUTE: &str = "/uploads";

/// A stored MP3 file plus its derived display metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: u64,
    /// Display name
    pub name: String,
    /// URL of the file under the uploads route
    pub file: String,
    /// On-disk filename
    pub filename: String,
    pub duration: String,
}

impl Track {
    /// Track as reported by a directory listing, `position` is 1-based.
    pub fn listed(position: u64, filename: String) -> Self {
        Self {
            id: position,
            name: naming::display_name(&filename),
            file: file_url(&filename),
            filename,
            duration: naming::PLACEHOLDER_DURATION.to_string(),
        }
    }

    /// Track as reported right after an upload.
    pub fn uploaded(id: u64, original: &str, filename: String) -> Self {
        Self {
            id,
            name: naming::upload_display_name(original),
            file: file_url(&filename),
            filename,
            duration: naming::PLACEHOLDER_DURATION.to_string(),
        }
    }
}

fn file_url(filename: &str) -> String {
    format!("{UPLOADS_ROUTE}/{filename}")
}
