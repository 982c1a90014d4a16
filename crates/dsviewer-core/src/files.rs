use std::path::Path;

use crate::{CoreError, Result};

/// Image file suffixes offered when browsing an image folder.
pub const SUPPORTED_IMAGE_FORMATS: &[&str] = &[".jpg", ".png", ".jpeg", ".bmp", ".tiff"];

pub const EMPTY_FOLDER_WARNING: &str = "Please enter an image folder path.";
pub const NO_IMAGES_WARNING: &str =
    "No supported images found in the folder. Check the path and image formats.";

/// List file names in `folder` ending with one of `formats`.
///
/// Matching is an exact, case-sensitive suffix comparison (`c.PNG` does not
/// match `.png`). Names are returned sorted.
pub fn list_files(folder: &Path, formats: &[&str]) -> Result<Vec<String>> {
    let read_dir = std::fs::read_dir(folder).map_err(|e| CoreError::io(folder, e))?;

    let mut names: Vec<String> = read_dir
        .flatten()
        .filter(|entry| entry.file_type().map(|t| !t.is_dir()).unwrap_or(false))
        .map(|entry| entry.file_name().to_string_lossy().to_string())
        .filter(|name| formats.iter().any(|fmt| name.ends_with(fmt)))
        .collect();
    names.sort();
    Ok(names)
}

/// Result of looking for images in a folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageListing {
    /// No folder path was given.
    EmptyPath,
    /// The folder is unreadable or holds no supported images.
    NoMatches,
    Found(Vec<String>),
}

impl ImageListing {
    /// Warning to surface for the non-`Found` cases.
    pub fn warning(&self) -> Option<&'static str> {
        match self {
            ImageListing::EmptyPath => Some(EMPTY_FOLDER_WARNING),
            ImageListing::NoMatches => Some(NO_IMAGES_WARNING),
            ImageListing::Found(_) => None,
        }
    }

    pub fn files(&self) -> &[String] {
        match self {
            ImageListing::Found(files) => files,
            _ => &[],
        }
    }

    /// The file at `index`, clamped to the listing.
    pub fn select(&self, index: usize) -> Option<&str> {
        let files = self.files();
        if files.is_empty() {
            return None;
        }
        files.get(index.min(files.len() - 1)).map(String::as_str)
    }
}

/// List supported images in `folder`. Never fails: problems become warnings.
pub fn browse_images(folder: &str) -> ImageListing {
    let folder = folder.trim();
    if folder.is_empty() {
        return ImageListing::EmptyPath;
    }
    match list_files(Path::new(folder), SUPPORTED_IMAGE_FORMATS) {
        Ok(files) if !files.is_empty() => ImageListing::Found(files),
        Ok(_) => ImageListing::NoMatches,
        Err(e) => {
            tracing::warn!("cannot list image folder: {}", e);
            ImageListing::NoMatches
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), b"").unwrap();
    }

    #[test]
    fn suffix_match_is_case_sensitive() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a.jpg");
        touch(dir.path(), "b.txt");
        touch(dir.path(), "c.PNG");

        let files = list_files(dir.path(), &[".jpg", ".png"]).unwrap();
        assert_eq!(files, vec!["a.jpg"]);
    }

    #[test]
    fn directories_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("nested.png")).unwrap();
        touch(dir.path(), "z.png");
        touch(dir.path(), "m.jpeg");

        let files = list_files(dir.path(), SUPPORTED_IMAGE_FORMATS).unwrap();
        assert_eq!(files, vec!["m.jpeg", "z.png"]);
    }

    #[test]
    fn missing_folder_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = list_files(&dir.path().join("nope"), &[".jpg"]).unwrap_err();
        assert!(matches!(err, CoreError::Io { .. }));
    }

    #[test]
    fn browse_empty_path_warns() {
        let listing = browse_images("   ");
        assert_eq!(listing, ImageListing::EmptyPath);
        assert_eq!(listing.warning(), Some(EMPTY_FOLDER_WARNING));
        assert_eq!(listing.select(0), None);
    }

    #[test]
    fn browse_without_images_warns() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "notes.txt");
        let listing = browse_images(dir.path().to_str().unwrap());
        assert_eq!(listing, ImageListing::NoMatches);
        assert_eq!(listing.warning(), Some(NO_IMAGES_WARNING));
    }

    #[test]
    fn browse_unreadable_folder_warns() {
        let listing = browse_images("/definitely/not/a/real/folder");
        assert_eq!(listing, ImageListing::NoMatches);
    }

    #[test]
    fn select_clamps_index() {
        let listing = ImageListing::Found(vec!["a.png".into(), "b.png".into()]);
        assert_eq!(listing.select(0), Some("a.png"));
        assert_eq!(listing.select(9), Some("b.png"));
    }
}
