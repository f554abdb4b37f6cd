//! Fluent builders producing camera controllers.
//!
//! [`CameraControllerBuilder`] is implemented once per backend. All setters
//! are provided by the trait and only touch the [`PendingConfig`]; a
//! backend-specific builder supplies storage for it and constructs its
//! backend.
//!
//! ```
//! use camera_kit::controller::{CameraControllerBuilder, MockControllerBuilder};
//! use camera_kit::settings::{Directory, ImageFormat};
//!
//! let controller = MockControllerBuilder::new()
//!     .set_image_format(ImageFormat::Jpeg)
//!     .set_directory(Directory::Pictures)
//!     .build()
//!     .unwrap();
//! assert!(controller.plugins().is_empty());
//! ```

use super::config::{CameraSettings, ConfigError, PendingConfig};
use super::controller::CameraController;
use crate::capture::{CameraBackend, MockBackend};
use crate::plugins::CameraPlugin;
use crate::settings::{CameraLens, Directory, FlashMode, ImageFormat, Rotation, TorchMode};
use std::sync::Arc;

/// Accumulates capture configuration and produces a controller.
///
/// Setters never fail and the last call wins. [`build`](Self::build) takes
/// `&self`: the builder stays usable afterwards, and every later build
/// reflects the builder's state at that moment. Controllers already built
/// are unaffected by later setter calls.
pub trait CameraControllerBuilder {
    /// Backend driven by the controllers this builder produces.
    type Backend: CameraBackend;

    /// Configuration accumulated so far.
    fn pending(&self) -> &PendingConfig;

    /// Mutable access to the accumulated configuration.
    fn pending_mut(&mut self) -> &mut PendingConfig;

    /// Creates a fresh backend for a new controller.
    fn create_backend(&self) -> Self::Backend;

    /// Sets the flash mode (default off).
    fn set_flash_mode(&mut self, flash_mode: FlashMode) -> &mut Self {
        self.pending_mut().flash_mode = flash_mode;
        self
    }

    /// Sets the torch mode (default off).
    fn set_torch_mode(&mut self, torch_mode: TorchMode) -> &mut Self {
        self.pending_mut().torch_mode = torch_mode;
        self
    }

    /// Sets the lens (default back).
    fn set_camera_lens(&mut self, camera_lens: CameraLens) -> &mut Self {
        self.pending_mut().camera_lens = camera_lens;
        self
    }

    /// Sets the output rotation (default 0°).
    fn set_rotation(&mut self, rotation: Rotation) -> &mut Self {
        self.pending_mut().rotation = rotation;
        self
    }

    /// Sets the still image encoding. Required.
    fn set_image_format(&mut self, image_format: ImageFormat) -> &mut Self {
        self.pending_mut().image_format = Some(image_format);
        self
    }

    /// Sets where images are saved. Required.
    fn set_directory(&mut self, directory: Directory) -> &mut Self {
        self.pending_mut().directory = Some(directory);
        self
    }

    /// Appends a plugin. The same plugin may be added more than once.
    fn add_plugin(&mut self, plugin: Arc<dyn CameraPlugin>) -> &mut Self {
        self.pending_mut().plugins.push(plugin);
        self
    }

    /// Applies every value present in `settings` through the setters.
    fn apply_settings(&mut self, settings: &CameraSettings) -> &mut Self {
        if let Some(mode) = settings.flash_mode {
            self.set_flash_mode(mode);
        }
        if let Some(mode) = settings.torch_mode {
            self.set_torch_mode(mode);
        }
        if let Some(lens) = settings.lens {
            self.set_camera_lens(lens);
        }
        if let Some(rotation) = settings.rotation {
            self.set_rotation(rotation);
        }
        if let Some(format) = settings.image_format {
            self.set_image_format(format);
        }
        if let Some(directory) = settings.directory {
            self.set_directory(directory);
        }
        self
    }

    /// Validates the configuration and constructs a controller.
    ///
    /// Fails with [`ConfigError::MissingField`] when the image format or
    /// the directory was never set.
    fn build(&self) -> Result<CameraController<Self::Backend>, ConfigError> {
        let pending = self.pending();
        let config = pending.validate()?;

        tracing::debug!(?config, plugins = pending.plugins.len(), "Building camera controller");
        Ok(CameraController::new(
            config,
            pending.plugins.clone(),
            self.create_backend(),
        ))
    }
}

/// Builder for controllers driving the synthetic [`MockBackend`].
#[derive(Debug)]
pub struct MockControllerBuilder {
    pending: PendingConfig,
    width: u32,
    height: u32,
}

impl Default for MockControllerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MockControllerBuilder {
    /// Creates a builder producing 640x480 frames.
    pub fn new() -> Self {
        Self {
            pending: PendingConfig::default(),
            width: 640,
            height: 480,
        }
    }

    /// Sets the synthetic frame size.
    pub fn frame_size(&mut self, width: u32, height: u32) -> &mut Self {
        self.width = width;
        self.height = height;
        self
    }
}

impl CameraControllerBuilder for MockControllerBuilder {
    type Backend = MockBackend;

    fn pending(&self) -> &PendingConfig {
        &self.pending
    }

    fn pending_mut(&mut self) -> &mut PendingConfig {
        &mut self.pending
    }

    fn create_backend(&self) -> MockBackend {
        MockBackend::new(self.width, self.height)
    }
}

/// Builder for controllers driving real cameras through `nokhwa`.
#[cfg(feature = "camera")]
#[derive(Debug, Default)]
pub struct NativeControllerBuilder {
    pending: PendingConfig,
    device: u32,
    front_device: Option<u32>,
}

#[cfg(feature = "camera")]
impl NativeControllerBuilder {
    /// Creates a builder using device 0 as the back camera.
    pub fn new() -> Self {
        Self::default()
    }

    /// Device index used for the back (and default) lens.
    pub fn device(&mut self, device: u32) -> &mut Self {
        self.device = device;
        self
    }

    /// Device index used for the front lens.
    pub fn front_device(&mut self, device: u32) -> &mut Self {
        self.front_device = Some(device);
        self
    }
}

#[cfg(feature = "camera")]
impl CameraControllerBuilder for NativeControllerBuilder {
    type Backend = crate::capture::NativeBackend;

    fn pending(&self) -> &PendingConfig {
        &self.pending
    }

    fn pending_mut(&mut self) -> &mut PendingConfig {
        &mut self.pending
    }

    fn create_backend(&self) -> Self::Backend {
        let backend = crate::capture::NativeBackend::new(self.device);
        match self.front_device {
            Some(front) => backend.with_front_device(front),
            None => backend,
        }
    }
}
