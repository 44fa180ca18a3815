//! Directory scanning.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::core::natural_cmp;
use crate::error::LabelerError;

/// An image file found in the images directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    /// File name, used as the image identifier.
    pub name: String,
    /// Absolute path.
    pub path: PathBuf,
}

/// Whether `path` has one of `extensions` (case-insensitive).
#[must_use]
pub fn has_image_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy())
        .is_some_and(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(&ext)))
}

/// List the images directly inside `dir`, in natural order.
///
/// # Errors
///
/// Returns an error if `dir` does not exist or is not a directory.
pub fn scan_images(dir: &Path, extensions: &[String]) -> Result<Vec<ImageFile>, LabelerError> {
    if !dir.is_dir() {
        return Err(LabelerError::Source(format!(
            "Images directory not found: {}",
            dir.display()
        )));
    }

    let root = dir.canonicalize().map_err(|e| {
        LabelerError::Source(format!("Failed to resolve {}: {e}", dir.display()))
    })?;

    let mut images: Vec<ImageFile> = WalkDir::new(&root)
        .max_depth(1)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| has_image_extension(entry.path(), extensions))
        .filter_map(|entry| {
            let name = entry.file_name().to_str()?.to_string();
            // Names with whitespace cannot be written to labels.txt.
            if name.chars().any(char::is_whitespace) {
                return None;
            }
            Some(ImageFile {
                name,
                path: entry.into_path(),
            })
        })
        .collect();

    images.sort_by(|a, b| natural_cmp(&a.name, &b.name));
    Ok(images)
}
