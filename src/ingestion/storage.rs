use super::IngestionError;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Relative references stored in the database all start with this prefix;
/// the file itself lives directly under the storage root.
pub const RELATIVE_PREFIX: &str = "/images/";

/// Local filesystem storage for ingested images.
///
/// File names are `book_<bookId>_<uuid>.png`, unique per call, so concurrent
/// saves never collide and nothing is ever overwritten. The `.png` extension
/// is fixed regardless of the source content type.
#[derive(Clone)]
pub struct ImageStorage {
    root: PathBuf,
}

impl ImageStorage {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes the bytes under a fresh generated name and returns the
    /// relative reference (`/images/<file>`), never the filesystem path.
    pub async fn save(&self, book_id: i64, bytes: &[u8]) -> Result<String, IngestionError> {
        fs::create_dir_all(&self.root).await?;

        let file_name = format!("book_{}_{}.png", book_id, Uuid::new_v4());
        let destination = self.root.join(&file_name);

        let mut file = fs::File::create(&destination).await?;
        file.write_all(bytes).await?;
        file.flush().await?;

        Ok(format!("{}{}", RELATIVE_PREFIX, file_name))
    }

    /// Resolves a stored relative reference back to the on-disk path.
    /// Returns None for references that were not produced by [`save`].
    pub fn absolute_path(&self, relative: &str) -> Option<PathBuf> {
        let file_name = relative.strip_prefix(RELATIVE_PREFIX)?;
        // A stored reference never points outside the root.
        if file_name.is_empty() || file_name.contains('/') || file_name.contains("..") {
            return None;
        }
        Some(self.root.join(file_name))
    }

    /// Removes the file behind a relative reference. Missing files are fine;
    /// only real IO failures are reported.
    pub async fn delete(&self, relative: &str) -> Result<(), IngestionError> {
        let Some(path) = self.absolute_path(relative) else {
            return Ok(());
        };
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// True if the file behind the reference exists on disk.
    pub fn exists(&self, relative: &str) -> bool {
        self.absolute_path(relative)
            .map(|path| path.exists())
            .unwrap_or(false)
    }
}
