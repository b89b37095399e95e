//! Persistence of fetched image assets.
//!
//! Each split owns one directory and each record at most one file in it,
//! named after the record identifier. Assets are immutable once written:
//! callers check [`AssetStore::contains`] before fetching and never rewrite
//! an existing file.
//!
//! Writes go to a `.tmp` sibling, are synced, then renamed into place, so
//! an interrupted run never leaves a truncated file under the final name.

mod path;

pub use path::{asset_path, split_directory, ASSET_EXTENSION, PARTIAL_SUFFIX};

use crate::records::{RecordError, RecordId};
use path::partial_path;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{debug, trace};

/// Errors raised by the asset store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The identifier cannot be mapped to a file name
    #[error(transparent)]
    InvalidId(#[from] RecordError),

    /// Filesystem failure
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// A persisted image, as produced by a successful fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAsset {
    pub id: RecordId,
    pub path: PathBuf,
    pub bytes: Vec<u8>,
}

/// Asset directory for one split.
#[derive(Debug, Clone)]
pub struct AssetStore {
    directory: PathBuf,
}

impl AssetStore {
    /// Creates a store rooted at `directory`. Nothing is created on disk yet.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// Creates the store for `split` under `{base_dir}/images/`.
    pub fn for_split(base_dir: &Path, split: &str) -> Self {
        Self::new(split_directory(base_dir, split))
    }

    /// Directory holding this store's assets.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Path the asset for `id` lives at (whether or not it exists).
    pub fn asset_path(&self, id: &RecordId) -> Result<PathBuf, StoreError> {
        Ok(asset_path(&self.directory, id)?)
    }

    /// Creates the store directory if it does not exist.
    pub async fn ensure_directory(&self) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.directory)
            .await
            .map_err(|e| StoreError::io(&self.directory, e))
    }

    /// Returns true if an asset for `id` is already persisted.
    pub async fn contains(&self, id: &RecordId) -> Result<bool, StoreError> {
        let path = self.asset_path(id)?;
        tokio::fs::try_exists(&path)
            .await
            .map_err(|e| StoreError::io(&path, e))
    }

    /// Persists `bytes` as the asset for `id`.
    ///
    /// The payload is fully written and synced to a temporary sibling before
    /// being renamed to its final name.
    pub async fn write(&self, id: &RecordId, bytes: Vec<u8>) -> Result<ImageAsset, StoreError> {
        let path = self.asset_path(id)?;
        self.ensure_directory().await?;

        let temp_path = partial_path(&path);
        let result = write_synced(&temp_path, &bytes).await;
        if let Err(e) = result {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(e);
        }

        tokio::fs::rename(&temp_path, &path)
            .await
            .map_err(|e| StoreError::io(&path, e))?;

        debug!(id = %id, path = %path.display(), bytes = bytes.len(), "Asset written");

        Ok(ImageAsset {
            id: id.clone(),
            path,
            bytes,
        })
    }

    /// Identifiers of every complete asset currently in the directory.
    ///
    /// Partial `.tmp` files and files with other extensions are ignored. A
    /// missing directory yields an empty set.
    pub async fn list_ids(&self) -> Result<BTreeSet<RecordId>, StoreError> {
        let mut ids = BTreeSet::new();

        let mut entries = match tokio::fs::read_dir(&self.directory).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(ids),
            Err(e) => return Err(StoreError::io(&self.directory, e)),
        };

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StoreError::io(&self.directory, e))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(ASSET_EXTENSION) {
                trace!(path = %path.display(), "Skipping non-asset file");
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                ids.insert(RecordId::from(stem));
            }
        }

        Ok(ids)
    }
}

async fn write_synced(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let mut file = tokio::fs::File::create(path)
        .await
        .map_err(|e| StoreError::io(path, e))?;
    file.write_all(bytes)
        .await
        .map_err(|e| StoreError::io(path, e))?;
    file.sync_all().await.map_err(|e| StoreError::io(path, e))
}
