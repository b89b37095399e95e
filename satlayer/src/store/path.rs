//! Asset path construction.

use crate::records::{RecordError, RecordId};
use std::path::{Path, PathBuf};

/// File extension of persisted assets.
pub const ASSET_EXTENSION: &str = "jpg";

/// Suffix appended to an asset path while it is being written.
pub const PARTIAL_SUFFIX: &str = "tmp";

/// Directory holding every asset of one split.
///
/// ```
/// use std::path::{Path, PathBuf};
/// use satlayer::store::split_directory;
///
/// assert_eq!(
///     split_directory(Path::new("data"), "train"),
///     PathBuf::from("data/images/train")
/// );
/// ```
pub fn split_directory(base_dir: &Path, split: &str) -> PathBuf {
    base_dir.join("images").join(split)
}

/// Deterministic location of one record's asset: `{dir}/{id}.jpg`.
///
/// ```
/// use std::path::{Path, PathBuf};
/// use satlayer::records::RecordId;
/// use satlayer::store::asset_path;
///
/// let path = asset_path(Path::new("data/images/test"), &RecordId::from(7129300520u64)).unwrap();
/// assert_eq!(path, PathBuf::from("data/images/test/7129300520.jpg"));
/// ```
pub fn asset_path(directory: &Path, id: &RecordId) -> Result<PathBuf, RecordError> {
    let stem = id.file_stem()?;
    Ok(directory.join(format!("{}.{}", stem, ASSET_EXTENSION)))
}

/// Sibling path used while an asset is being written.
pub(crate) fn partial_path(final_path: &Path) -> PathBuf {
    let mut name = final_path.as_os_str().to_owned();
    name.push(".");
    name.push(PARTIAL_SUFFIX);
    PathBuf::from(name)
}
