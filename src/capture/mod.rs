//! Camera backends and frame handling.
//!
//! This module provides the backend trait the controller drives, a
//! synthetic backend that works everywhere, and (with the `camera`
//! feature) a backend for real hardware.

mod camera;
mod frame;
#[cfg(feature = "camera")]
mod native;

pub use camera::{CameraBackend, CameraError, MockBackend};
pub use frame::{Frame, BYTES_PER_PIXEL};
#[cfg(feature = "camera")]
pub use native::{list_devices, DeviceInfo, NativeBackend};
