//! Encoding captured frames and storing them on disk.
//!
//! Codecs come from the `image` crate; this module only decides rotation,
//! format and where files go.

mod encode;
mod storage;

pub use encode::{encode, rotate, CapturedImage, JPEG_QUALITY};
pub use storage::{destination, file_name, write_image};

use crate::settings::Directory;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while producing or storing images.
#[derive(Debug, Error)]
pub enum OutputError {
    /// The pixel buffer length disagrees with the frame dimensions.
    #[error("frame buffer of {bytes} bytes does not match {width}x{height} RGB")]
    InvalidFrame {
        /// Frame width in pixels.
        width: u32,
        /// Frame height in pixels.
        height: u32,
        /// Actual buffer length.
        bytes: usize,
    },
    /// The codec rejected the image.
    #[error("failed to encode image: {0}")]
    Encode(#[from] image::ImageError),
    /// The platform has no folder for this directory.
    #[error("no {0} folder on this system")]
    NoDestination(Directory),
    /// Writing the file failed.
    #[error("failed to write {}: {source}", path.display())]
    Io {
        /// File being written.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}
