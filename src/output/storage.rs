//! Writing captured images to disk.

use super::OutputError;
use crate::settings::{Directory, ImageFormat};
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

/// Builds a file name of the form `{prefix}_{yyyyMMdd_HHmmss_SSS}.{ext}`.
pub fn file_name(prefix: &str, format: ImageFormat, timestamp: DateTime<Local>) -> String {
    format!(
        "{}_{}.{}",
        prefix,
        timestamp.format("%Y%m%d_%H%M%S_%3f"),
        format.extension()
    )
}

/// Resolves the folder images are written to.
///
/// `root` replaces the platform location of `directory` when given.
/// `folder` is appended as a sub-folder when non-empty.
pub fn destination(
    directory: Directory,
    root: Option<&Path>,
    folder: Option<&str>,
) -> Result<PathBuf, OutputError> {
    let base = match root {
        Some(root) => root.to_path_buf(),
        None => directory.resolve().ok_or(OutputError::NoDestination(directory))?,
    };

    Ok(match folder.filter(|f| !f.is_empty()) {
        Some(folder) => base.join(folder),
        None => base,
    })
}

/// Writes `bytes` to `dir/name`, creating `dir` if needed.
pub fn write_image(dir: &Path, name: &str, bytes: &[u8]) -> Result<PathBuf, OutputError> {
    std::fs::create_dir_all(dir).map_err(|source| OutputError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let path = dir.join(name);
    std::fs::write(&path, bytes).map_err(|source| OutputError::Io {
        path: path.clone(),
        source,
    })?;

    tracing::info!(path = %path.display(), bytes = bytes.len(), "Saved image");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_file_name_format() {
        let timestamp = Local
            .with_ymd_and_hms(2024, 3, 9, 14, 5, 7)
            .single()
            .unwrap();
        assert_eq!(
            file_name("IMG", ImageFormat::Jpeg, timestamp),
            "IMG_20240309_140507_000.jpg"
        );
    }

    #[test]
    fn test_destination_with_root_and_folder() {
        let root = Path::new("/tmp/captures");
        let dest = destination(Directory::Pictures, Some(root), Some("CameraKit")).unwrap();
        assert_eq!(dest, root.join("CameraKit"));

        let dest = destination(Directory::Pictures, Some(root), Some("")).unwrap();
        assert_eq!(dest, root);
    }

    #[test]
    fn test_write_image_creates_folders() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("nested").join("folder");

        let path = write_image(&dir, "a.png", &[1, 2, 3]).unwrap();

        assert_eq!(path, dir.join("a.png"));
        assert_eq!(std::fs::read(path).unwrap(), vec![1, 2, 3]);
    }
}
