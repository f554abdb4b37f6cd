//! Frame type representing a captured image with metadata.

use crate::settings::CameraLens;
use std::time::Instant;

/// Bytes per pixel of the packed RGB8 layout used by every backend.
pub const BYTES_PER_PIXEL: usize = 3;

/// A single frame delivered by a camera backend.
///
/// Pixels are tightly packed RGB8, row-major, no stride padding.
#[derive(Clone)]
pub struct Frame {
    /// Packed RGB pixel data.
    pixels: Vec<u8>,
    /// Frame width in pixels.
    width: u32,
    /// Frame height in pixels.
    height: u32,
    /// Lens the frame was captured from.
    lens: CameraLens,
    /// Capture timestamp.
    timestamp: Instant,
    /// Monotonic sequence number within a session.
    sequence: u64,
}

impl Frame {
    /// Creates a new frame with the given parameters.
    pub fn new(pixels: Vec<u8>, width: u32, height: u32, lens: CameraLens, sequence: u64) -> Self {
        Self {
            pixels,
            width,
            height,
            lens,
            timestamp: Instant::now(),
            sequence,
        }
    }

    /// Returns a reference to the raw pixel data.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Consumes the frame and returns its pixel buffer.
    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// Returns the frame width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the frame height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the lens that produced this frame.
    #[inline]
    pub fn lens(&self) -> CameraLens {
        self.lens
    }

    /// Returns the capture timestamp.
    #[inline]
    pub fn timestamp(&self) -> Instant {
        self.timestamp
    }

    /// Returns the sequence number.
    #[inline]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Returns the total number of pixels (width * height).
    #[inline]
    pub fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Validates that the pixel buffer size matches dimensions.
    pub fn is_valid(&self) -> bool {
        self.pixels.len() == self.pixel_count() * BYTES_PER_PIXEL
    }

    /// BT.601 luma of the pixel at `(x, y)`, or `None` out of bounds.
    pub fn luma_at(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL;
        let rgb = self.pixels.get(offset..offset + BYTES_PER_PIXEL)?;
        let luma = (299 * rgb[0] as u32 + 587 * rgb[1] as u32 + 114 * rgb[2] as u32) / 1000;
        Some(luma as u8)
    }

    /// Borrows the frame as an `image` buffer. `None` if the buffer is
    /// the wrong size for the dimensions.
    pub fn to_rgb_image(&self) -> Option<image::RgbImage> {
        image::RgbImage::from_raw(self.width, self.height, self.pixels.clone())
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("lens", &self.lens)
            .field("sequence", &self.sequence)
            .field("pixel_bytes", &self.pixels.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_creation() {
        let pixels = vec![0u8; 64 * 48 * BYTES_PER_PIXEL];
        let frame = Frame::new(pixels, 64, 48, CameraLens::Back, 1);

        assert_eq!(frame.width(), 64);
        assert_eq!(frame.height(), 48);
        assert_eq!(frame.sequence(), 1);
        assert_eq!(frame.lens(), CameraLens::Back);
        assert!(frame.is_valid());
    }

    #[test]
    fn test_frame_invalid_size() {
        let pixels = vec![0u8; 100]; // Wrong size
        let frame = Frame::new(pixels, 64, 48, CameraLens::Back, 1);

        assert!(!frame.is_valid());
        assert!(frame.to_rgb_image().is_none());
    }

    #[test]
    fn test_luma() {
        let pixels = vec![255, 255, 255, 0, 0, 0];
        let frame = Frame::new(pixels, 2, 1, CameraLens::Front, 0);

        assert_eq!(frame.luma_at(0, 0), Some(255));
        assert_eq!(frame.luma_at(1, 0), Some(0));
        assert_eq!(frame.luma_at(2, 0), None);
    }
}
