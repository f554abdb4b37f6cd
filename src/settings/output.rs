//! Encoding and storage destination settings.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Encoding of a captured still image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// Lossy JPEG, saved as `.jpg`.
    Jpeg,
    /// Lossless PNG.
    Png,
}

named_setting!(ImageFormat, "image format", { Jpeg => "jpeg", Png => "png" });

impl ImageFormat {
    /// File extension used when saving.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
        }
    }

    /// MIME type of the encoded bytes.
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }
}

impl From<ImageFormat> for image::ImageFormat {
    fn from(format: ImageFormat) -> Self {
        match format {
            ImageFormat::Jpeg => image::ImageFormat::Jpeg,
            ImageFormat::Png => image::ImageFormat::Png,
        }
    }
}

/// Logical storage destination for saved images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Directory {
    /// The user's pictures folder.
    Pictures,
    /// Camera roll, a `DCIM` folder inside the pictures folder.
    Dcim,
    /// The user's documents folder.
    Documents,
}

named_setting!(Directory, "directory", {
    Pictures => "pictures",
    Dcim => "dcim",
    Documents => "documents",
});

impl Directory {
    /// Resolves the destination to a path on this machine.
    ///
    /// Returns `None` when the platform has no such folder (for example a
    /// headless account without a home directory).
    pub fn resolve(self) -> Option<PathBuf> {
        match self {
            Self::Pictures => dirs::picture_dir(),
            Self::Dcim => dirs::picture_dir().map(|p| p.join("DCIM")),
            Self::Documents => dirs::document_dir(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_extensions() {
        assert_eq!(ImageFormat::Jpeg.extension(), "jpg");
        assert_eq!(ImageFormat::Png.extension(), "png");
        assert_eq!(ImageFormat::Png.mime_type(), "image/png");
    }

    #[test]
    fn test_directory_round_trips_through_text() {
        for dir in [Directory::Pictures, Directory::Dcim, Directory::Documents] {
            assert_eq!(dir.as_str().parse::<Directory>().unwrap(), dir);
        }
    }

    #[test]
    fn test_dcim_is_inside_pictures() {
        if let (Some(pictures), Some(dcim)) =
            (Directory::Pictures.resolve(), Directory::Dcim.resolve())
        {
            assert_eq!(dcim, pictures.join("DCIM"));
        }
    }
}
