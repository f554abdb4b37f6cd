//! Controller configuration and the TOML file format.

use crate::plugins::{CameraPlugin, ImageSaverConfig};
use crate::settings::{CameraLens, Directory, FlashMode, ImageFormat, Rotation, TorchMode};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A mandatory setting was never given to the builder. Carries the
    /// setting's name, e.g. `"ImageFormat"`.
    #[error("{0} must be set.")]
    MissingField(&'static str),
    /// A capture setting is out of range.
    #[error("invalid capture settings: {0}")]
    InvalidValue(String),
    /// The config file could not be read.
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    /// The config file is not valid TOML for [`FileConfig`].
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

/// Frozen capture configuration held by a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Flash behaviour for still pictures.
    pub flash_mode: FlashMode,
    /// Continuous light applied when a session starts.
    pub torch_mode: TorchMode,
    /// Lens the first session opens on.
    pub camera_lens: CameraLens,
    /// Rotation applied to still pictures.
    pub rotation: Rotation,
    /// Encoding of still pictures.
    pub image_format: ImageFormat,
    /// Where saved pictures go.
    pub directory: Directory,
}

impl ControllerConfig {
    /// Configuration with the given mandatory values and defaults for the rest.
    pub fn new(image_format: ImageFormat, directory: Directory) -> Self {
        Self {
            flash_mode: FlashMode::default(),
            torch_mode: TorchMode::default(),
            camera_lens: CameraLens::default(),
            rotation: Rotation::default(),
            image_format,
            directory,
        }
    }
}

/// Configuration being accumulated by a builder.
///
/// Image format and directory stay optional until [`validate`] turns the
/// pending values into a [`ControllerConfig`].
///
/// [`validate`]: PendingConfig::validate
#[derive(Default, Clone)]
pub struct PendingConfig {
    /// Flash mode, `Off` unless set.
    pub flash_mode: FlashMode,
    /// Torch mode, `Off` unless set.
    pub torch_mode: TorchMode,
    /// Lens, `Back` unless set.
    pub camera_lens: CameraLens,
    /// Rotation, none unless set.
    pub rotation: Rotation,
    /// Mandatory image format.
    pub image_format: Option<ImageFormat>,
    /// Mandatory output directory.
    pub directory: Option<Directory>,
    /// Plugins in insertion order.
    pub plugins: Vec<Arc<dyn CameraPlugin>>,
}

impl PendingConfig {
    /// Checks that every mandatory value is present.
    ///
    /// The image format is checked before the directory.
    pub fn validate(&self) -> Result<ControllerConfig, ConfigError> {
        let image_format = self
            .image_format
            .ok_or(ConfigError::MissingField("ImageFormat"))?;
        let directory = self.directory.ok_or(ConfigError::MissingField("Directory"))?;

        Ok(ControllerConfig {
            flash_mode: self.flash_mode,
            torch_mode: self.torch_mode,
            camera_lens: self.camera_lens,
            rotation: self.rotation,
            image_format,
            directory,
        })
    }
}

impl std::fmt::Debug for PendingConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingConfig")
            .field("flash_mode", &self.flash_mode)
            .field("torch_mode", &self.torch_mode)
            .field("camera_lens", &self.camera_lens)
            .field("rotation", &self.rotation)
            .field("image_format", &self.image_format)
            .field("directory", &self.directory)
            .field("plugins", &self.plugins.len())
            .finish()
    }
}

/// Controller settings as they appear in a config file. Every field is
/// optional; only present fields are applied to a builder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CameraSettings {
    /// `flash_mode = "auto"`
    pub flash_mode: Option<FlashMode>,
    /// `torch_mode = "on"`
    pub torch_mode: Option<TorchMode>,
    /// `lens = "front"`, also accepted as `camera_lens`.
    #[serde(alias = "camera_lens")]
    pub lens: Option<CameraLens>,
    /// `rotation = 90`
    pub rotation: Option<Rotation>,
    /// `image_format = "png"`
    pub image_format: Option<ImageFormat>,
    /// `directory = "dcim"`
    pub directory: Option<Directory>,
}

/// Frame source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureSettings {
    /// Device index of the back camera (native backend).
    pub device: u32,
    /// Device index of the front camera (native backend).
    pub front_device: Option<u32>,
    /// Synthetic frame width (mock backend).
    pub width: u32,
    /// Synthetic frame height (mock backend).
    pub height: u32,
    /// Preview frames to process when not running continuously.
    pub frame_count: u32,
    /// Run until interrupted.
    pub continuous: bool,
    /// Take a still picture every this many frames (0 to disable).
    pub picture_every: u32,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            device: 0,
            front_device: None,
            width: 640,
            height: 480,
            frame_count: 30,
            continuous: false,
            picture_every: 0,
        }
    }
}

impl CaptureSettings {
    /// Validates the capture parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidValue(format!(
                "frame size {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

/// Metrics exporter settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsSettings {
    /// Metrics server port (0 to disable).
    pub port: u16,
}

impl Default for MetricsSettings {
    fn default() -> Self {
        Self { port: 0 }
    }
}

/// Full configuration file format.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    /// `[controller]` table.
    #[serde(default)]
    pub controller: CameraSettings,
    /// `[capture]` table.
    #[serde(default)]
    pub capture: CaptureSettings,
    /// `[saver]` table.
    #[serde(default)]
    pub saver: ImageSaverConfig,
    /// `[metrics]` table.
    #[serde(default)]
    pub metrics: MetricsSettings,
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parses configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: FileConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.capture.validate()?;
        Ok(config)
    }
}
