//! Track library module
//!
//! The uploads directory is the only record store: tracks are derived from a
//! directory scan on every request, created by uploads and destroyed by deletes.
//! Nothing in here knows about hyper.

mod error;
pub mod naming;
mod store;
mod track;
mod upload;

pub use error::{LibraryError, DEFAULT_MIME};
pub use store::SongLibrary;
pub use track::{Track, UPLOADS_ROUTE};
pub use upload::{receive_upload, SONG_FIELD};
