//! Controller construction and configuration.
//!
//! A builder accumulates settings and plugins, validates that the image
//! format and directory were given, and hands a frozen
//! [`ControllerConfig`] to a new [`CameraController`].

mod builder;
mod config;
#[allow(clippy::module_inception)]
mod controller;

pub use builder::{CameraControllerBuilder, MockControllerBuilder};
#[cfg(feature = "camera")]
pub use builder::NativeControllerBuilder;
pub use config::{
    CameraSettings, CaptureSettings, ConfigError, ControllerConfig, FileConfig, MetricsSettings,
    PendingConfig,
};
pub use controller::{CameraController, CaptureError, CaptureStats};
