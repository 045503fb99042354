use sha2::{Digest, Sha256};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::{map_io_err, PatchError, PatchResult};

/// A target file held in memory, with the fingerprint of the bytes read
#[derive(Debug, Clone)]
pub struct LoadedFile {
    pub path: PathBuf,
    pub content: String,
    pub file_hash: String,
}

fn calculate_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Reads the whole file as UTF-8 text
pub fn load_file(path: impl AsRef<Path>) -> PatchResult<LoadedFile> {
    let path = path.as_ref();
    debug!("Reading file: {}", path.display());

    let bytes = fs::read(path).map_err(map_io_err(path))?;
    let file_hash = calculate_hash(&bytes);
    let content = String::from_utf8(bytes).map_err(|_| PatchError::Encoding {
        path: path.to_path_buf(),
    })?;

    Ok(LoadedFile {
        path: path.to_path_buf(),
        content,
        file_hash,
    })
}

impl LoadedFile {
    /// Whether the file on disk still holds the bytes that were loaded
    pub fn is_unchanged_on_disk(&self) -> PatchResult<bool> {
        let bytes = fs::read(&self.path).map_err(map_io_err(&self.path))?;
        Ok(calculate_hash(&bytes) == self.file_hash)
    }

    /// Replaces the file with `content`.
    ///
    /// Refuses to write if the file changed since it was loaded. Symlinks are
    /// followed, so the link stays and its destination is replaced. The new
    /// content goes to a temporary file next to the destination which is then
    /// renamed over it, keeping the original permissions.
    pub fn write_back(&self, content: &str) -> PatchResult<()> {
        if !self.is_unchanged_on_disk()? {
            warn!(
                "File hash changed since it was read: {}",
                self.path.display()
            );
            return Err(PatchError::ConcurrentModification {
                path: self.path.clone(),
            });
        }

        let destination = fs::canonicalize(&self.path).map_err(map_io_err(&self.path))?;
        if destination != self.path {
            debug!(
                "Writing {} through to {}",
                self.path.display(),
                destination.display()
            );
        }
        let parent = destination
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let permissions = fs::metadata(&destination)
            .map_err(map_io_err(&destination))?
            .permissions();

        let mut temp = NamedTempFile::new_in(&parent).map_err(map_io_err(&parent))?;
        let temp_path = temp.path().to_path_buf();
        temp.write_all(content.as_bytes())
            .and_then(|_| temp.flush())
            .map_err(map_io_err(&temp_path))?;
        temp.as_file()
            .set_permissions(permissions)
            .map_err(map_io_err(&temp_path))?;
        temp.persist(&destination)
            .map_err(|e| PatchError::io_error(e.error, &destination))?;

        debug!(
            "Wrote {} bytes to {}",
            content.len(),
            self.path.display()
        );
        Ok(())
    }
}
