//! Aligned access to acquired images.
//!
//! [`AlignedImageDataset`] pairs a record sequence with an image directory
//! and exposes them as a fixed-length, randomly indexable collection. Index
//! `i` always yields the image of the `i`-th record together with that
//! record's identifier, so consumers can join images back to tabular rows.
//!
//! Reading never fetches. Every referenced asset must already exist: a gap
//! is reported as [`DatasetError::MissingAsset`] and a corrupt file as
//! [`DatasetError::Decode`]. Run acquisition again to fill gaps first.

use image::{ImageReader, RgbImage};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::records::{Record, RecordError, RecordId};
use crate::store::{asset_path, split_directory};

/// Errors raised while reading an aligned image.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// Index past the end of the record sequence
    #[error("Index {index} out of range for dataset of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// No asset on disk for the record
    #[error("Image not found for record {id} at {path}")]
    MissingAsset { id: RecordId, path: PathBuf },

    /// The asset exists but is not a decodable image
    #[error("Failed to decode image for record {id} at {path}: {source}")]
    Decode {
        id: RecordId,
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The asset exists but could not be read
    #[error("Failed to read image for record {id} at {path}: {source}")]
    Io {
        id: RecordId,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The identifier cannot name an asset
    #[error(transparent)]
    InvalidId(#[from] RecordError),
}

/// Caller-supplied post-decode transform.
pub type Transform<T> = Box<dyn Fn(RgbImage) -> T + Send + Sync>;

/// Fixed-length collection of `(image, identifier)` pairs.
///
/// # Example
///
/// ```no_run
/// use satlayer::dataset::AlignedImageDataset;
/// use satlayer::records::read_csv;
/// use std::path::Path;
///
/// let records = read_csv(Path::new("data/raw/train.csv"))?;
/// let dataset = AlignedImageDataset::for_split(records, Path::new("data"), "train")
///     .with_transform(|img| image::imageops::grayscale(&img));
///
/// let (gray, id) = dataset.get(0)?;
/// println!("{}: {}x{}", id, gray.width(), gray.height());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct AlignedImageDataset<T = RgbImage> {
    records: Vec<Record>,
    image_dir: PathBuf,
    transform: Transform<T>,
}

impl AlignedImageDataset<RgbImage> {
    /// Creates a dataset returning decoded RGB images unchanged.
    pub fn new(records: Vec<Record>, image_dir: impl Into<PathBuf>) -> Self {
        Self {
            records,
            image_dir: image_dir.into(),
            transform: Box::new(|image| image),
        }
    }

    /// Creates a dataset over `{base_dir}/images/{split}`.
    pub fn for_split(records: Vec<Record>, base_dir: &Path, split: &str) -> Self {
        Self::new(records, split_directory(base_dir, split))
    }
}

impl<T> AlignedImageDataset<T> {
    /// Replaces the transform applied after decoding.
    pub fn with_transform<U, F>(self, transform: F) -> AlignedImageDataset<U>
    where
        F: Fn(RgbImage) -> U + Send + Sync + 'static,
    {
        AlignedImageDataset {
            records: self.records,
            image_dir: self.image_dir,
            transform: Box::new(transform),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn image_dir(&self) -> &Path {
        &self.image_dir
    }

    /// Expected asset location for the record at `index`.
    pub fn asset_path(&self, index: usize) -> Result<PathBuf, DatasetError> {
        let record = self.record(index)?;
        Ok(asset_path(&self.image_dir, &record.id)?)
    }

    /// Loads, decodes and transforms the image of the record at `index`.
    pub fn get(&self, index: usize) -> Result<(T, RecordId), DatasetError> {
        let record = self.record(index)?;
        let id = record.id.clone();
        let path = asset_path(&self.image_dir, &id)?;

        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(DatasetError::MissingAsset { id, path });
            }
            Err(source) => return Err(DatasetError::Io { id, path, source }),
        };

        let decoded = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(image::ImageError::IoError)
            .and_then(|reader| reader.decode());

        let image = match decoded {
            Ok(image) => image.to_rgb8(),
            Err(source) => return Err(DatasetError::Decode { id, path, source }),
        };

        Ok(((self.transform)(image), id))
    }

    /// Iterates over every index in order.
    pub fn iter(&self) -> impl Iterator<Item = Result<(T, RecordId), DatasetError>> + '_ {
        (0..self.len()).map(move |i| self.get(i))
    }

    /// Records whose asset file is absent, with the path that was expected.
    ///
    /// Records with unusable identifiers are reported with the image
    /// directory as their path.
    pub fn missing_assets(&self) -> Vec<(RecordId, PathBuf)> {
        self.records
            .iter()
            .filter_map(|record| match asset_path(&self.image_dir, &record.id) {
                Ok(path) if path.is_file() => None,
                Ok(path) => Some((record.id.clone(), path)),
                Err(_) => Some((record.id.clone(), self.image_dir.clone())),
            })
            .collect()
    }

    fn record(&self, index: usize) -> Result<&Record, DatasetError> {
        self.records
            .get(index)
            .ok_or(DatasetError::IndexOutOfRange {
                index,
                len: self.records.len(),
            })
    }
}
