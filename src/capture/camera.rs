//! Camera backend abstraction.
//!
//! A backend owns the connection to one camera and knows how to open a
//! session for a lens, deliver frames and drive the light sources. The
//! controller never talks to hardware directly; it only sees this trait.

use super::frame::{Frame, BYTES_PER_PIXEL};
use crate::settings::{CameraLens, TorchMode};
use std::collections::VecDeque;
use thiserror::Error;

/// Errors that can occur during camera operations.
#[derive(Debug, Error)]
pub enum CameraError {
    /// No camera matches the requested device or lens.
    #[error("camera device not found: {0}")]
    DeviceNotFound(String),
    /// The camera exists but could not be opened or configured.
    #[error("failed to open camera: {0}")]
    OpenFailed(String),
    /// A frame could not be read from the open session.
    #[error("failed to capture frame: {0}")]
    CaptureFailed(String),
    /// The camera lacks the named capability.
    #[error("not supported by this camera: {0}")]
    Unsupported(&'static str),
    /// No session is open.
    #[error("camera not initialized")]
    NotInitialized,
}

/// Trait for camera backends.
///
/// One implementation exists per platform. Implementations are selected
/// at compile time through the builder that constructs the controller.
pub trait CameraBackend {
    /// Opens a capture session on the given lens.
    fn open(&mut self, lens: CameraLens) -> Result<(), CameraError>;

    /// Captures a single frame from the open session.
    fn capture(&mut self) -> Result<Frame, CameraError>;

    /// Switches the continuous light.
    fn set_torch(&mut self, mode: TorchMode) -> Result<(), CameraError>;

    /// Arms the flash for the next still capture.
    fn fire_flash(&mut self) -> Result<(), CameraError>;

    /// Checks if a session is currently open.
    fn is_open(&self) -> bool;

    /// Closes the session and releases resources.
    fn close(&mut self);
}

/// Synthetic backend that generates frames in-process.
///
/// Frames are a deterministic gradient that shifts with the sequence
/// number. Frames pushed with [`MockBackend::push_frame`] are delivered
/// first, which lets tests feed specific images through a controller.
#[derive(Debug)]
pub struct MockBackend {
    width: u32,
    height: u32,
    lens: Option<CameraLens>,
    sequence: u64,
    queued: VecDeque<Vec<u8>>,
    torch: TorchMode,
    flashes_fired: u64,
    opens: u64,
    fail_captures: bool,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new(640, 480)
    }
}

impl MockBackend {
    /// Creates a backend producing frames of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            lens: None,
            sequence: 0,
            queued: VecDeque::new(),
            torch: TorchMode::Off,
            flashes_fired: 0,
            opens: 0,
            fail_captures: false,
        }
    }

    /// Queues RGB8 pixels to be returned by the next capture.
    ///
    /// The buffer must match the backend's frame size.
    pub fn push_frame(&mut self, pixels: Vec<u8>) {
        self.queued.push_back(pixels);
    }

    /// Makes every subsequent capture fail.
    pub fn set_fail_captures(&mut self, fail: bool) {
        self.fail_captures = fail;
    }

    /// Lens of the open session.
    pub fn lens(&self) -> Option<CameraLens> {
        self.lens
    }

    /// Current torch state.
    pub fn torch(&self) -> TorchMode {
        self.torch
    }

    /// Number of flashes fired so far.
    pub fn flashes_fired(&self) -> u64 {
        self.flashes_fired
    }

    /// Number of sessions opened so far.
    pub fn opens(&self) -> u64 {
        self.opens
    }

    /// Frame dimensions.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn synthesize(&self, lens: CameraLens) -> Vec<u8> {
        // Front lens frames are tinted blue, back lens frames red, so tests
        // can tell which lens produced them.
        let tint = match lens {
            CameraLens::Front => [0u8, 0, 96],
            CameraLens::Back | CameraLens::Default => [96u8, 0, 0],
        };
        let mut pixels = Vec::with_capacity(self.width as usize * self.height as usize * BYTES_PER_PIXEL);
        for y in 0..self.height {
            for x in 0..self.width {
                let shade = ((x as u64 + y as u64 + self.sequence) % 160) as u8;
                pixels.extend(tint.iter().map(|t| t.saturating_add(shade)));
            }
        }
        pixels
    }
}

impl CameraBackend for MockBackend {
    fn open(&mut self, lens: CameraLens) -> Result<(), CameraError> {
        if self.width == 0 || self.height == 0 {
            return Err(CameraError::OpenFailed(format!(
                "invalid frame size {}x{}",
                self.width, self.height
            )));
        }
        self.lens = Some(lens);
        self.sequence = 0;
        self.opens += 1;
        tracing::info!(?lens, width = self.width, height = self.height, "MockBackend opened");
        Ok(())
    }

    fn capture(&mut self) -> Result<Frame, CameraError> {
        let lens = self.lens.ok_or(CameraError::NotInitialized)?;
        if self.fail_captures {
            return Err(CameraError::CaptureFailed("injected failure".into()));
        }

        let pixels = match self.queued.pop_front() {
            Some(pixels) => pixels,
            None => self.synthesize(lens),
        };

        self.sequence += 1;
        Ok(Frame::new(pixels, self.width, self.height, lens, self.sequence))
    }

    fn set_torch(&mut self, mode: TorchMode) -> Result<(), CameraError> {
        self.torch = mode;
        tracing::debug!(?mode, "MockBackend torch");
        Ok(())
    }

    fn fire_flash(&mut self) -> Result<(), CameraError> {
        if self.lens.is_none() {
            return Err(CameraError::NotInitialized);
        }
        self.flashes_fired += 1;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.lens.is_some()
    }

    fn close(&mut self) {
        self.lens = None;
        self.torch = TorchMode::Off;
        tracing::info!("MockBackend closed");
    }
}
