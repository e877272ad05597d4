//! Request handler module
//!
//! Responsible for request routing dispatch: the song API, the landing page
//! and the stored track files.

pub mod router;
pub mod songs;
pub mod static_files;

// Re-export main entry point
pub use router::handle_request;
