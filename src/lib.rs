//! Camera Kit
//!
//! A builder-configured camera controller. A controller wraps one camera
//! backend, manages flash, torch, lens, rotation and output format, and
//! drives plugins such as a QR scanner or an image saver.
//!
//! # Architecture
//!
//! ```text
//! settings → builder → controller → backend (mock | nokhwa)
//!                          ↓
//!                 plugins (qr scanner, image saver)
//!                          ↓
//!                 output (encode, save)
//! ```
//!
//! Camera hardware, image codecs and QR decoding are supplied by `nokhwa`,
//! `image` and `rqrr`; this crate only configures and sequences them.
//!
//! # Example
//!
//! ```
//! use camera_kit::{
//!     controller::{CameraControllerBuilder, MockControllerBuilder},
//!     plugins::QrScannerPlugin,
//!     settings::{Directory, FlashMode, ImageFormat},
//! };
//! use std::sync::Arc;
//!
//! let scanner = Arc::new(QrScannerPlugin::new());
//! scanner.start_scanning();
//!
//! let mut controller = MockControllerBuilder::new()
//!     .set_flash_mode(FlashMode::Auto)
//!     .set_image_format(ImageFormat::Jpeg)
//!     .set_directory(Directory::Pictures)
//!     .add_plugin(scanner.clone())
//!     .build()
//!     .unwrap();
//!
//! controller.start_session().unwrap();
//! for _ in 0..3 {
//!     controller.next_frame().unwrap();
//! }
//! let picture = controller.take_picture().unwrap();
//! controller.stop_session();
//!
//! assert_eq!(picture.format(), ImageFormat::Jpeg);
//! assert_eq!(scanner.frames_scanned(), 3);
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod capture;
pub mod controller;
pub mod metrics;
pub mod output;
pub mod plugins;
pub mod settings;

// Re-export commonly used types at crate root
pub use capture::{CameraBackend, CameraError, Frame, MockBackend};
pub use controller::{
    CameraController, CameraControllerBuilder, ConfigError, ControllerConfig,
    MockControllerBuilder,
};
pub use output::CapturedImage;
pub use plugins::{CameraPlugin, ImageSaverPlugin, QrScannerPlugin};
pub use settings::{CameraLens, Directory, FlashMode, ImageFormat, Rotation, TorchMode};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
