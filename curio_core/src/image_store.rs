//! Content-addressed image artifact storage.

use crate::digest::{Digest, ImageRef};
use crate::error::{Error, Result};
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// File name of the fallback artifact served when a reference is missing.
pub const DEFAULT_ARTIFACT: &str = "default.jpg";

/// A content-addressed store for image artifacts.
///
/// Artifacts live flat under the store root, named by their content
/// reference (`<64-hex>.jpg`). An artifact is written at most once per
/// distinct digest; re-ingesting identical bytes is a no-op against
/// storage.
#[derive(Debug)]
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    /// Open the store rooted at the given directory, creating it if needed.
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();

        fs::create_dir_all(&root)
            .map_err(|e| Error::persist_failure(&root, e.to_string()))?;

        Ok(Self { root })
    }

    /// Get the root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the path an artifact with the given reference is stored at.
    pub fn artifact_path(&self, reference: &ImageRef) -> PathBuf {
        self.root.join(reference.file_name())
    }

    /// Whether an artifact with the given reference is stored.
    pub fn contains(&self, reference: &ImageRef) -> bool {
        self.artifact_path(reference).exists()
    }

    /// Ingest an image byte stream, returning its content-derived reference.
    ///
    /// The full stream is consumed and hashed; if no artifact exists for the
    /// resulting digest, the bytes are written atomically (tempfile plus
    /// rename), otherwise the write is skipped entirely. Identical content
    /// always yields the identical reference.
    pub fn ingest<R: Read>(&self, mut reader: R) -> Result<ImageRef> {
        let mut payload = Vec::new();
        reader
            .read_to_end(&mut payload)
            .map_err(|e| Error::source_unavailable(e.to_string()))?;

        let reference = ImageRef::from_digest(Digest::hash_bytes(&payload));

        // Deduplication: identical content is already durable under this name
        let path = self.artifact_path(&reference);
        if path.exists() {
            log::debug!("artifact {} already stored, skipping write", reference);
            return Ok(reference);
        }

        self.write_artifact_atomic(&path, &payload)?;
        log::info!("stored artifact {} ({} bytes)", reference, payload.len());

        Ok(reference)
    }

    /// Resolve a reference to a readable artifact path.
    ///
    /// Falls back to the fixed default artifact when the referenced one is
    /// missing, so a stale reference degrades instead of failing the read.
    pub fn resolve(&self, reference: &ImageRef) -> PathBuf {
        let path = self.artifact_path(reference);
        if path.exists() {
            path
        } else {
            log::debug!("artifact not found: {}, using default", reference);
            self.root.join(DEFAULT_ARTIFACT)
        }
    }

    /// Write an artifact atomically using tempfile.
    ///
    /// A concurrent ingest of the same content races only on the final
    /// rename, which replaces byte-identical data; a partial write is never
    /// observable at the artifact path.
    fn write_artifact_atomic(&self, path: &Path, payload: &[u8]) -> Result<()> {
        let mut temp_file = tempfile::NamedTempFile::new_in(&self.root)
            .map_err(|e| Error::persist_failure(path, e.to_string()))?;

        temp_file
            .write_all(payload)
            .and_then(|_| temp_file.flush())
            .map_err(|e| Error::persist_failure(path, e.to_string()))?;

        temp_file
            .persist(path)
            .map_err(|e| Error::persist_failure(path, e.error.to_string()))?;

        Ok(())
    }
}
