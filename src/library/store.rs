// Directory-backed track store
// Lists, writes and removes track files in the uploads directory

use std::path::{Path, PathBuf};
use tempfile::Builder;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use super::naming::{self, MP3_SUFFIX, PARTIAL_SUFFIX};
use super::{LibraryError, Track};
use crate::logger;

/// Handle on the uploads directory
#[derive(Debug, Clone)]
pub struct SongLibrary {
    dir: PathBuf,
    max_file_size: u64,
}

impl SongLibrary {
    pub fn new(dir: impl Into<PathBuf>, max_file_size: u64) -> Self {
        Self {
            dir: dir.into(),
            max_file_size,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub const fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    /// Create the uploads directory if it does not exist yet
    pub async fn ensure_dir(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.dir).await
    }

    /// Scan the uploads directory.
    ///
    /// Ids are 1-based positions in directory order, which the filesystem
    /// does not keep stable across calls.
    pub async fn list(&self) -> Result<Vec<Track>, LibraryError> {
        let mut entries = fs::read_dir(&self.dir).await?;
        let mut names = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.ends_with(MP3_SUFFIX) {
                continue;
            }
            // A file can vanish between readdir and stat when a delete races us
            match entry.file_type().await {
                Ok(ft) if ft.is_dir() => continue,
                Ok(_) => names.push(name),
                Err(e) => {
                    logger::log_warning(&format!("Skipping '{name}' during scan: {e}"));
                }
            }
        }

        Ok(names
            .into_iter()
            .zip(1_u64..)
            .map(|(name, position)| Track::listed(position, name))
            .collect())
    }

    /// Stream an upload into the directory under a freshly generated name.
    ///
    /// Bytes go to a `.part` temp file first and are moved into place once
    /// the whole field has been received. The temp file is deleted whenever
    /// this future fails or is dropped, so an aborted upload never shows up
    /// in a listing or lingers on disk.
    pub async fn store(
        &self,
        field: &mut multer::Field<'_>,
        original: &str,
    ) -> Result<Track, LibraryError> {
        let filename = naming::generate_filename(
            original,
            naming::unix_millis(),
            naming::random_component(),
        );
        let final_path = self.dir.join(&filename);

        let (file, part_path) = Builder::new()
            .prefix(&filename)
            .suffix(PARTIAL_SUFFIX)
            .tempfile_in(&self.dir)?
            .into_parts();
        let mut file = fs::File::from_std(file);

        self.write_field(field, &mut file).await?;
        drop(file);

        part_path
            .persist_noclobber(&final_path)
            .map_err(std::io::Error::from)?;

        Ok(Track::uploaded(naming::unix_millis(), original, filename))
    }

    async fn write_field(
        &self,
        field: &mut multer::Field<'_>,
        file: &mut fs::File,
    ) -> Result<(), LibraryError> {
        let mut written: u64 = 0;

        while let Some(chunk) = field.chunk().await? {
            written += chunk.len() as u64;
            if written > self.max_file_size {
                return Err(LibraryError::TooLarge {
                    limit: self.max_file_size,
                });
            }
            file.write_all(&chunk).await?;
        }

        file.flush().await?;
        Ok(())
    }

    /// Remove a track file. A missing file is an error like any other.
    pub async fn remove(&self, filename: &str) -> Result<(), LibraryError> {
        if !naming::is_safe_filename(filename) {
            return Err(LibraryError::InvalidFilename(filename.to_string()));
        }
        fs::remove_file(self.dir.join(filename)).await?;
        Ok(())
    }
}
