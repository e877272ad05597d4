// Application state module
// Configuration plus the handles every request needs

use super::types::Config;
use crate::library::SongLibrary;

/// Application state, shared read-only across connections
pub struct AppState {
    pub config: Config,
    pub library: SongLibrary,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let library = SongLibrary::new(
            &config.storage.uploads_dir,
            config.storage.max_file_size,
        );
        Self { config, library }
    }
}
