//! Rotation and encoding of captured frames.

use super::OutputError;
use crate::capture::Frame;
use crate::settings::{ImageFormat, Rotation};
use chrono::{DateTime, Local};
use image::{imageops, DynamicImage, RgbImage};
use std::io::Cursor;

/// JPEG quality used for still captures.
pub const JPEG_QUALITY: u8 = 90;

/// An encoded still image produced by the controller.
#[derive(Clone)]
pub struct CapturedImage {
    bytes: Vec<u8>,
    format: ImageFormat,
    width: u32,
    height: u32,
    captured_at: DateTime<Local>,
}

impl CapturedImage {
    /// Encoded image bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consumes the image and returns the encoded bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Encoding of [`bytes`](Self::bytes).
    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// Width after rotation.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height after rotation.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Wall-clock time of capture.
    pub fn captured_at(&self) -> DateTime<Local> {
        self.captured_at
    }
}

impl std::fmt::Debug for CapturedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapturedImage")
            .field("format", &self.format)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("encoded_bytes", &self.bytes.len())
            .field("captured_at", &self.captured_at)
            .finish()
    }
}

/// Applies a clockwise rotation to an RGB image.
pub fn rotate(image: RgbImage, rotation: Rotation) -> RgbImage {
    match rotation {
        Rotation::Deg0 => image,
        Rotation::Deg90 => imageops::rotate90(&image),
        Rotation::Deg180 => imageops::rotate180(&image),
        Rotation::Deg270 => imageops::rotate270(&image),
    }
}

/// Rotates `frame` and encodes it as `format`.
pub fn encode(
    frame: &Frame,
    rotation: Rotation,
    format: ImageFormat,
) -> Result<CapturedImage, OutputError> {
    let image = frame.to_rgb_image().ok_or(OutputError::InvalidFrame {
        width: frame.width(),
        height: frame.height(),
        bytes: frame.pixels().len(),
    })?;
    let image = rotate(image, rotation);
    let (width, height) = image.dimensions();

    let mut bytes = Vec::new();
    match format {
        ImageFormat::Jpeg => {
            let encoder =
                image::codecs::jpeg::JpegEncoder::new_with_quality(&mut bytes, JPEG_QUALITY);
            DynamicImage::ImageRgb8(image).write_with_encoder(encoder)?;
        }
        ImageFormat::Png => {
            DynamicImage::ImageRgb8(image)
                .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::from(format))?;
        }
    }

    tracing::debug!(
        ?format,
        width,
        height,
        encoded_bytes = bytes.len(),
        "Encoded still image"
    );

    Ok(CapturedImage {
        bytes,
        format,
        width,
        height,
        captured_at: Local::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::CameraLens;

    fn test_frame(width: u32, height: u32) -> Frame {
        let pixels = (0..width * height * 3).map(|i| (i % 251) as u8).collect();
        Frame::new(pixels, width, height, CameraLens::Back, 1)
    }

    #[test]
    fn test_png_is_lossless() {
        let frame = test_frame(8, 4);
        let captured = encode(&frame, Rotation::Deg0, ImageFormat::Png).unwrap();

        assert_eq!(captured.format(), ImageFormat::Png);
        let decoded = image::load_from_memory(captured.bytes()).unwrap().to_rgb8();
        assert_eq!(decoded.as_raw(), frame.pixels());
    }

    #[test]
    fn test_jpeg_signature() {
        let frame = test_frame(16, 16);
        let captured = encode(&frame, Rotation::Deg0, ImageFormat::Jpeg).unwrap();

        assert_eq!(&captured.bytes()[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_rotation_swaps_dimensions() {
        let frame = test_frame(8, 4);

        let quarter = encode(&frame, Rotation::Deg90, ImageFormat::Png).unwrap();
        assert_eq!((quarter.width(), quarter.height()), (4, 8));

        let half = encode(&frame, Rotation::Deg180, ImageFormat::Png).unwrap();
        assert_eq!((half.width(), half.height()), (8, 4));
    }

    #[test]
    fn test_rotate_90_moves_top_left_to_top_right() {
        let mut image = RgbImage::new(2, 1);
        image.put_pixel(0, 0, image::Rgb([255, 0, 0]));

        let rotated = rotate(image, Rotation::Deg90);
        assert_eq!(rotated.dimensions(), (1, 2));
        assert_eq!(rotated.get_pixel(0, 0), &image::Rgb([255, 0, 0]));
    }

    #[test]
    fn test_invalid_frame_is_rejected() {
        let frame = Frame::new(vec![0; 5], 8, 4, CameraLens::Back, 1);
        assert!(matches!(
            encode(&frame, Rotation::Deg0, ImageFormat::Png),
            Err(OutputError::InvalidFrame { bytes: 5, .. })
        ));
    }
}
