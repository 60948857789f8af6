//! Persisting the working image as a timestamped JPEG.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

use crate::config::ViewConfig;
use crate::decode::DecodedImage;
use crate::encode::{encode_jpeg, EncodeError};

/// Errors that can occur while saving.
#[derive(Debug, Error)]
pub enum SaveError {
    /// The working image is the null image.
    #[error("Nothing to save: the image is empty")]
    EmptyImage,

    /// JPEG encoding failed.
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// Creating the directory or writing the file failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// A file written by [`write_timestamped_jpeg`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedImage {
    /// Bare file name, `<epoch-ms>.<extension>`.
    pub file_name: String,
    /// Full path of the written file.
    pub path: PathBuf,
}

/// Encode `image` and write it under `config.output_dir()`, named after
/// `timestamp_ms`. The directory is created if missing. If a file with that
/// name already exists the timestamp is bumped until a free name is found.
pub fn write_timestamped_jpeg(
    image: &DecodedImage,
    config: &ViewConfig,
    timestamp_ms: i64,
) -> Result<SavedImage, SaveError> {
    if image.is_empty() {
        return Err(SaveError::EmptyImage);
    }

    let bytes = encode_jpeg(image, config.jpeg_quality)?;

    let dir = config.output_dir();
    fs::create_dir_all(&dir)?;

    persist_timestamped(&dir, &config.extension, timestamp_ms, |file| {
        file.write_all(&bytes)
    })
}

/// Write through a temporary file in `dir`, then move it to the first free
/// `<stamp>.<extension>` name. The temporary file is removed on any error,
/// so a failed write never leaves a partial image behind.
fn persist_timestamped(
    dir: &Path,
    extension: &str,
    timestamp_ms: i64,
    write: impl FnOnce(&mut File) -> io::Result<()>,
) -> Result<SavedImage, SaveError> {
    let mut temp = NamedTempFile::new_in(dir)?;
    write(temp.as_file_mut())?;
    temp.as_file().sync_all()?;

    let mut stamp = timestamp_ms;
    loop {
        let file_name = format!("{}.{}", stamp, extension);
        let path = dir.join(&file_name);
        match temp.persist_noclobber(&path) {
            Ok(_) => return Ok(SavedImage { file_name, path }),
            Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {
                temp = e.file;
                stamp += 1;
            }
            Err(e) => return Err(e.error.into()),
        }
    }
}
