//! Plugins attached to a camera controller.
//!
//! A plugin is any `Send + Sync` type implementing [`CameraPlugin`]. The
//! controller holds plugins as shared `Arc`s in insertion order and calls
//! every hook on each of them, in that order. All hooks default to doing
//! nothing, so a plugin only implements the ones it cares about.
//!
//! Hooks take `&self`: plugins keep mutable state behind their own locks
//! so the caller can keep a handle and query it while the controller runs.

mod qr;
mod saver;

pub use qr::{CodeDecoder, QrScannerPlugin, RqrrDecoder};
pub use saver::{ImageSaverConfig, ImageSaverPlugin};

use crate::capture::Frame;
use crate::controller::ControllerConfig;
use crate::output::CapturedImage;
use crate::settings::CameraLens;

/// Capability contract for controller plugins.
pub trait CameraPlugin: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Called once when the controller is constructed.
    fn on_attach(&self, _config: &ControllerConfig) {}

    /// Called after a capture session opens.
    fn on_session_started(&self, _lens: CameraLens) {}

    /// Called after a capture session closes.
    fn on_session_stopped(&self) {}

    /// Called for every preview frame delivered by the controller.
    fn on_frame(&self, _frame: &Frame) {}

    /// Called for every still image taken by the controller.
    fn on_image_captured(&self, _image: &CapturedImage) {}
}

impl std::fmt::Debug for dyn CameraPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("CameraPlugin").field(&self.name()).finish()
    }
}

/// Locks a mutex, recovering the data if a callback panicked while holding it.
fn lock<T>(mutex: &std::sync::Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
