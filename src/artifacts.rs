//! Screenshot artifact storage
//!
//! Artifacts are write-once files in a shared temporary location, named with
//! a UTC timestamp plus a process-wide sequence number so that concurrent
//! requests never collide.

use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

use crate::{Error, Result};

/// Stores screenshot artifacts
#[derive(Debug)]
pub struct ArtifactStore {
    dir: PathBuf,
    sequence: AtomicU64,
}

impl ArtifactStore {
    /// Create a store over a directory (system temp dir when unset)
    pub fn new(dir: Option<PathBuf>) -> Self {
        Self {
            dir: dir.unwrap_or_else(std::env::temp_dir),
            sequence: AtomicU64::new(0),
        }
    }

    /// The artifact directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Next collision-free artifact path
    fn next_path(&self) -> PathBuf {
        let stamp = Utc::now().format("%Y%m%d-%H%M%S%.3f");
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst);
        self.dir.join(format!("scout-{}-{:04}.png", stamp, seq))
    }

    /// Write screenshot bytes to a fresh artifact file
    pub async fn store_screenshot(&self, bytes: &[u8]) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| Error::internal(format!("artifact dir: {}", e)))?;

        let path = self.next_path();
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| Error::internal(format!("write artifact: {}", e)))?;

        debug!("Screenshot stored at {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_dir_is_temp() {
        let store = ArtifactStore::new(None);
        assert_eq!(store.dir(), std::env::temp_dir());
    }

    #[test]
    fn test_paths_do_not_collide() {
        let store = ArtifactStore::new(None);
        let a = store.next_path();
        let b = store.next_path();
        assert_ne!(a, b);
        assert!(a.to_string_lossy().contains("scout-"));
        assert!(a.to_string_lossy().ends_with(".png"));
    }

    #[tokio::test]
    async fn test_store_writes_bytes() {
        let dir = std::env::temp_dir().join(format!("scout-artifacts-{}", uuid::Uuid::new_v4()));
        let store = ArtifactStore::new(Some(dir.clone()));

        let path = store.store_screenshot(&[1, 2, 3]).await.unwrap();
        let written = tokio::fs::read(&path).await.unwrap();
        assert_eq!(written, vec![1, 2, 3]);

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }
}
