//! services/api/src/adapters/blob.rs
//!
//! This module contains the blob storage adapter used for profile pictures.
//! It implements the `BlobStorage` port by writing files below a media directory
//! that the router serves under `/media`.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use lovecraft_core::ports::{BlobStorage, PortError, PortResult};
use tracing::debug;

/// An adapter that implements the `BlobStorage` port on the local filesystem.
#[derive(Clone)]
pub struct LocalBlobStorage {
    root: PathBuf,
    public_prefix: String,
}

impl LocalBlobStorage {
    /// Creates a new `LocalBlobStorage`. `public_prefix` is the URL the root is served at.
    pub fn new(root: impl Into<PathBuf>, public_prefix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_prefix: public_prefix.into().trim_end_matches('/').to_string(),
        }
    }

    /// Resolves `key` below the root, refusing anything that could escape it.
    fn path_for(&self, key: &str) -> PortResult<PathBuf> {
        let relative = Path::new(key);
        let is_plain = !key.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !is_plain {
            return Err(PortError::Unexpected(format!("Invalid blob key '{}'", key)));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl BlobStorage for LocalBlobStorage {
    async fn upload(&self, key: &str, bytes: &[u8], content_type: &str) -> PortResult<()> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| PortError::Unexpected(e.to_string()))?;
        }
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        debug!("Stored {} bytes of {} at {}", bytes.len(), content_type, path.display());
        Ok(())
    }

    async fn delete(&self, key: &str) -> PortResult<()> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!("Removed {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PortError::Unexpected(e.to_string())),
        }
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_prefix, key)
    }
}
