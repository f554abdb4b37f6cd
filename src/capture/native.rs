//! Native camera backend built on `nokhwa`.
//!
//! `nokhwa` drives AVFoundation on macOS, V4L2 on Linux and Media
//! Foundation on Windows. Desktop cameras carry no facing information, so
//! lenses map to device indices chosen by the caller.

use super::camera::{CameraBackend, CameraError};
use super::frame::Frame;
use crate::settings::{CameraLens, TorchMode};
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{ApiBackend, CameraIndex, RequestedFormat, RequestedFormatType};
use nokhwa::Camera;

/// A camera attached to this machine, as reported by the OS.
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    /// Device index to pass to [`NativeBackend::new`].
    pub index: u32,
    /// Human readable device name.
    pub name: String,
}

/// Lists the cameras attached to this machine.
pub fn list_devices() -> Result<Vec<DeviceInfo>, CameraError> {
    let devices = nokhwa::query(ApiBackend::Auto)
        .map_err(|e| CameraError::DeviceNotFound(e.to_string()))?;

    Ok(devices
        .iter()
        .filter_map(|info| match info.index() {
            CameraIndex::Index(index) => Some(DeviceInfo {
                index: *index,
                name: info.human_name(),
            }),
            CameraIndex::String(_) => None,
        })
        .collect())
}

/// Camera backend for real hardware.
pub struct NativeBackend {
    back_device: u32,
    front_device: Option<u32>,
    camera: Option<Camera>,
    lens: Option<CameraLens>,
    sequence: u64,
}

impl NativeBackend {
    /// Creates a backend whose back (and default) lens is `device`.
    pub fn new(device: u32) -> Self {
        Self {
            back_device: device,
            front_device: None,
            camera: None,
            lens: None,
            sequence: 0,
        }
    }

    /// Maps the front lens to another device.
    pub fn with_front_device(mut self, device: u32) -> Self {
        self.front_device = Some(device);
        self
    }

    fn device_for(&self, lens: CameraLens) -> Result<u32, CameraError> {
        match lens {
            CameraLens::Back | CameraLens::Default => Ok(self.back_device),
            CameraLens::Front => self.front_device.ok_or_else(|| {
                CameraError::DeviceNotFound("no front-facing camera configured".into())
            }),
        }
    }
}

impl CameraBackend for NativeBackend {
    fn open(&mut self, lens: CameraLens) -> Result<(), CameraError> {
        self.close();

        let device = self.device_for(lens)?;
        let requested =
            RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestFrameRate);
        let mut camera = Camera::new(CameraIndex::Index(device), requested)
            .map_err(|e| CameraError::OpenFailed(e.to_string()))?;
        camera
            .open_stream()
            .map_err(|e| CameraError::OpenFailed(e.to_string()))?;

        let format = camera.camera_format();
        tracing::info!(
            device,
            ?lens,
            width = format.width(),
            height = format.height(),
            fps = format.frame_rate(),
            "Native camera opened"
        );

        self.camera = Some(camera);
        self.lens = Some(lens);
        self.sequence = 0;
        Ok(())
    }

    fn capture(&mut self) -> Result<Frame, CameraError> {
        let lens = self.lens.ok_or(CameraError::NotInitialized)?;
        let camera = self.camera.as_mut().ok_or(CameraError::NotInitialized)?;

        let buffer = camera
            .frame()
            .map_err(|e| CameraError::CaptureFailed(e.to_string()))?;
        let decoded = buffer
            .decode_image::<RgbFormat>()
            .map_err(|e| CameraError::CaptureFailed(e.to_string()))?;

        self.sequence += 1;
        let (width, height) = (decoded.width(), decoded.height());
        Ok(Frame::new(decoded.into_raw(), width, height, lens, self.sequence))
    }

    fn set_torch(&mut self, mode: TorchMode) -> Result<(), CameraError> {
        match mode {
            TorchMode::Off => Ok(()),
            TorchMode::On | TorchMode::Auto => Err(CameraError::Unsupported("torch")),
        }
    }

    fn fire_flash(&mut self) -> Result<(), CameraError> {
        Err(CameraError::Unsupported("flash"))
    }

    fn is_open(&self) -> bool {
        self.camera.is_some()
    }

    fn close(&mut self) {
        if let Some(mut camera) = self.camera.take() {
            if let Err(e) = camera.stop_stream() {
                tracing::warn!(error = %e, "Failed to stop camera stream");
            }
            tracing::info!("Native camera closed");
        }
        self.lens = None;
    }
}

impl Drop for NativeBackend {
    fn drop(&mut self) {
        self.close();
    }
}
