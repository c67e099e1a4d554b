//! Filesystem storage for uploaded category images.

use std::{
    fs,
    path::{Path, PathBuf},
};

use uuid::Uuid;

use crate::Error;

/// The web-relative prefix under which stored images are served and persisted.
pub const UPLOAD_WEB_PREFIX: &str = "/uploads/method-icons";

/// Stores uploaded image files in a fixed directory and maps them to the
/// web-relative paths persisted on category records.
#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    /// Create an image store rooted at `root`, creating the directory if it
    /// does not exist yet.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, Error> {
        let root = root.into();

        fs::create_dir_all(&root).map_err(|error| {
            Error::ImageIo(format!(
                "could not create upload directory {}: {error}",
                root.display()
            ))
        })?;

        Ok(Self { root })
    }

    /// The directory that image files are written to.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `data` to the upload directory under a generated file name and
    /// return the web-relative path to persist on the record.
    ///
    /// The generated name keeps the extension of `original_file_name` so the
    /// stored file is served with a sensible content type.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    pub fn save(&self, original_file_name: &str, data: &[u8]) -> Result<String, Error> {
        let file_name = format!("{}{}", Uuid::new_v4(), file_extension(original_file_name));
        let disk_path = self.root.join(&file_name);

        fs::write(&disk_path, data).map_err(|error| {
            Error::ImageIo(format!(
                "could not write image {}: {error}",
                disk_path.display()
            ))
        })?;

        tracing::debug!(
            "Stored image '{original_file_name}' as {} ({} bytes)",
            disk_path.display(),
            data.len()
        );

        Ok(format!("{UPLOAD_WEB_PREFIX}/{file_name}"))
    }

    /// Remove the file that `web_path` refers to from the upload directory.
    ///
    /// Whether a failure here matters is up to the caller: record deletion
    /// treats an already-absent file as gone, record updates surface it.
    ///
    /// # Errors
    /// Returns an error if the file cannot be removed, including when it does
    /// not exist.
    pub fn delete(&self, web_path: &str) -> Result<(), Error> {
        let disk_path = self.disk_path(web_path)?;

        fs::remove_file(&disk_path).map_err(|error| {
            Error::ImageIo(format!(
                "could not delete image {}: {error}",
                disk_path.display()
            ))
        })
    }

    /// Resolve a persisted web path back to a location on disk.
    ///
    /// Only the path's base name is used, so a stored path can never resolve
    /// to a file outside the upload directory.
    fn disk_path(&self, web_path: &str) -> Result<PathBuf, Error> {
        let file_name = Path::new(web_path)
            .file_name()
            .ok_or_else(|| Error::ImageIo(format!("image path '{web_path}' has no file name")))?;

        Ok(self.root.join(file_name))
    }
}

/// The lowercased extension of `file_name` including the leading dot, or an
/// empty string when there is no usable extension.
fn file_extension(file_name: &str) -> String {
    match Path::new(file_name).extension().and_then(|ext| ext.to_str()) {
        Some(ext) if !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()) => {
            format!(".{}", ext.to_ascii_lowercase())
        }
        _ => String::new(),
    }
}
