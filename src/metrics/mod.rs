//! Prometheus metrics exporter for capture monitoring.
//!
//! # Metrics Exposed
//!
//! ## Session Metrics
//! - `camera_kit_session_active` - Capture session state (1=open, 0=closed)
//! - `camera_kit_sessions_started_total` - Sessions opened
//!
//! ## Capture Metrics
//! - `camera_kit_frames_delivered_total` - Preview frames delivered to plugins
//! - `camera_kit_images_captured_total` - Still images captured
//! - `camera_kit_capture_errors_total` - Failed captures
//!
//! ## Plugin Metrics
//! - `camera_kit_images_saved_total` - Images written by the image saver
//! - `camera_kit_save_failures_total` - Failed image writes
//! - `camera_kit_qr_frames_scanned_total` - Frames run through the QR decoder
//! - `camera_kit_qr_codes_detected_total` - QR codes reported
//!
//! # Example
//!
//! ```
//! use camera_kit::metrics::{MetricsRegistry, MetricsSnapshot};
//!
//! let registry = MetricsRegistry::new().expect("Failed to create registry");
//!
//! let snapshot = MetricsSnapshot {
//!     session_active: true,
//!     frames_delivered: 30,
//!     ..Default::default()
//! };
//!
//! registry.update(&snapshot);
//! assert!(registry.encode().unwrap().contains("camera_kit_frames_delivered_total 30"));
//! ```

mod collector;
#[cfg(feature = "metrics")]
mod server;

pub use collector::{MetricsError, MetricsRegistry, MetricsSnapshot};
#[cfg(feature = "metrics")]
pub use server::{MetricsServer, MetricsServerConfig, MetricsState, ServerError};
