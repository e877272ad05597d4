use thiserror::Error;

/// Fallback MIME type reported when an upload part declares none.
pub const DEFAULT_MIME: &str = "application/octet-stream";

#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("No file uploaded")]
    NoFile,
    #[error("Only MP3 files are allowed! Received: {0}")]
    InvalidType(String),
    #[error("File too large. Maximum size is {}MB.", .limit / 1_048_576)]
    TooLarge { limit: u64 },
    #[error("Refusing unsafe filename: {0:?}")]
    InvalidFilename(String),
    #[error("Malformed upload: {0}")]
    Multipart(multer::Error),
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

impl From<multer::Error> for LibraryError {
    fn from(err: multer::Error) -> Self {
        match err {
            multer::Error::FieldSizeExceeded { limit, .. }
            | multer::Error::StreamSizeExceeded { limit } => Self::TooLarge { limit },
            other => Self::Multipart(other),
        }
    }
}

impl LibraryError {
    /// Whether the error was caused by the client's request rather than the server.
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::NoFile | Self::InvalidType(_) | Self::TooLarge { .. } | Self::Multipart(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_too_large_message_names_limit_in_megabytes() {
        let err = LibraryError::TooLarge { limit: 50 * 1024 * 1024 };
        assert_eq!(err.to_string(), "File too large. Maximum size is 50MB.");
    }

    #[test]
    fn test_invalid_type_names_mime() {
        let err = LibraryError::InvalidType("image/png".to_string());
        assert_eq!(err.to_string(), "Only MP3 files are allowed! Received: image/png");
    }

    #[test]
    fn test_size_errors_from_multer_become_too_large() {
        let err = LibraryError::from(multer::Error::FieldSizeExceeded {
            limit: 10,
            field_name: Some("song".to_string()),
        });
        assert!(matches!(err, LibraryError::TooLarge { limit: 10 }));

        let err = LibraryError::from(multer::Error::StreamSizeExceeded { limit: 20 });
        assert!(matches!(err, LibraryError::TooLarge { limit: 20 }));
    }

    #[test]
    fn test_validation_classification() {
        assert!(LibraryError::NoFile.is_validation());
        assert!(LibraryError::TooLarge { limit: 1 }.is_validation());
        assert!(!LibraryError::InvalidFilename("../x".to_string()).is_validation());
        assert!(!LibraryError::Io(std::io::Error::other("disk")).is_validation());
    }
}
