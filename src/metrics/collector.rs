//! Metrics collection and registry.

use crate::controller::{CameraController, CaptureStats};
use crate::capture::CameraBackend;
use crate::plugins::{ImageSaverPlugin, QrScannerPlugin};
use prometheus::{Encoder, IntCounter, IntGauge, Registry, TextEncoder};
use thiserror::Error;

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// Registration or text encoding failed.
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

/// A snapshot of controller and plugin state for metrics update.
#[derive(Debug, Clone, Default)]
pub struct MetricsSnapshot {
    /// Whether a capture session is open.
    pub session_active: bool,
    /// Sessions opened.
    pub sessions_started: u64,
    /// Preview frames delivered.
    pub frames_delivered: u64,
    /// Still images captured.
    pub images_captured: u64,
    /// Failed captures.
    pub capture_errors: u64,
    /// Images written to disk.
    pub images_saved: u64,
    /// Failed image writes.
    pub save_failures: u64,
    /// Frames run through the QR decoder.
    pub qr_frames_scanned: u64,
    /// QR codes reported.
    pub qr_codes_detected: u64,
}

/// Prometheus metrics registry for capture monitoring.
pub struct MetricsRegistry {
    registry: Registry,

    // Session metrics
    session_active: IntGauge,
    sessions_started: IntCounter,

    // Capture metrics
    frames_delivered: IntCounter,
    images_captured: IntCounter,
    capture_errors: IntCounter,

    // Plugin metrics
    images_saved: IntCounter,
    save_failures: IntCounter,
    qr_frames_scanned: IntCounter,
    qr_codes_detected: IntCounter,
}

impl MetricsRegistry {
    /// Creates a new metrics registry with all capture metrics registered.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let session_active = IntGauge::new(
            "camera_kit_session_active",
            "Capture session state (1=open, 0=closed)",
        )?;
        let sessions_started = IntCounter::new(
            "camera_kit_sessions_started_total",
            "Total capture sessions opened",
        )?;

        let frames_delivered = IntCounter::new(
            "camera_kit_frames_delivered_total",
            "Total preview frames delivered to plugins",
        )?;
        let images_captured = IntCounter::new(
            "camera_kit_images_captured_total",
            "Total still images captured",
        )?;
        let capture_errors = IntCounter::new(
            "camera_kit_capture_errors_total",
            "Total failed frame or still captures",
        )?;

        let images_saved = IntCounter::new(
            "camera_kit_images_saved_total",
            "Total images written to disk",
        )?;
        let save_failures = IntCounter::new(
            "camera_kit_save_failures_total",
            "Total failed image writes",
        )?;
        let qr_frames_scanned = IntCounter::new(
            "camera_kit_qr_frames_scanned_total",
            "Total frames run through the QR decoder",
        )?;
        let qr_codes_detected = IntCounter::new(
            "camera_kit_qr_codes_detected_total",
            "Total QR codes reported",
        )?;

        registry.register(Box::new(session_active.clone()))?;
        registry.register(Box::new(sessions_started.clone()))?;
        registry.register(Box::new(frames_delivered.clone()))?;
        registry.register(Box::new(images_captured.clone()))?;
        registry.register(Box::new(capture_errors.clone()))?;
        registry.register(Box::new(images_saved.clone()))?;
        registry.register(Box::new(save_failures.clone()))?;
        registry.register(Box::new(qr_frames_scanned.clone()))?;
        registry.register(Box::new(qr_codes_detected.clone()))?;

        Ok(Self {
            registry,
            session_active,
            sessions_started,
            frames_delivered,
            images_captured,
            capture_errors,
            images_saved,
            save_failures,
            qr_frames_scanned,
            qr_codes_detected,
        })
    }

    /// Updates all metrics from a snapshot.
    ///
    /// Counters only move forward: a snapshot total lower than the current
    /// counter value leaves the counter unchanged.
    pub fn update(&self, snapshot: &MetricsSnapshot) {
        self.session_active.set(i64::from(snapshot.session_active));

        advance(&self.sessions_started, snapshot.sessions_started);
        advance(&self.frames_delivered, snapshot.frames_delivered);
        advance(&self.images_captured, snapshot.images_captured);
        advance(&self.capture_errors, snapshot.capture_errors);
        advance(&self.images_saved, snapshot.images_saved);
        advance(&self.save_failures, snapshot.save_failures);
        advance(&self.qr_frames_scanned, snapshot.qr_frames_scanned);
        advance(&self.qr_codes_detected, snapshot.qr_codes_detected);
    }

    /// Returns the underlying Prometheus registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Encodes all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

fn advance(counter: &IntCounter, total: u64) {
    let current = counter.get();
    if total > current {
        counter.inc_by(total - current);
    }
}

impl MetricsSnapshot {
    /// Creates a snapshot from controller counters and optional plugins.
    pub fn from_components(
        stats: CaptureStats,
        session_active: bool,
        qr: Option<&QrScannerPlugin>,
        saver: Option<&ImageSaverPlugin>,
    ) -> Self {
        Self {
            session_active,
            sessions_started: stats.sessions_started,
            frames_delivered: stats.frames_delivered,
            images_captured: stats.images_captured,
            capture_errors: stats.capture_errors,
            images_saved: saver.map_or(0, |s| s.saved_count()),
            save_failures: saver.map_or(0, |s| s.failure_count()),
            qr_frames_scanned: qr.map_or(0, |q| q.frames_scanned()),
            qr_codes_detected: qr.map_or(0, |q| q.codes_detected()),
        }
    }

    /// Creates a snapshot from a controller and optional plugins.
    pub fn from_controller<B: CameraBackend>(
        controller: &CameraController<B>,
        qr: Option<&QrScannerPlugin>,
        saver: Option<&ImageSaverPlugin>,
    ) -> Self {
        Self::from_components(controller.stats(), controller.is_session_active(), qr, saver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_creation() {
        let registry = MetricsRegistry::new();
        assert!(registry.is_ok());
    }

    #[test]
    fn test_metrics_update() {
        let registry = MetricsRegistry::new().unwrap();

        let snapshot = MetricsSnapshot {
            session_active: true,
            sessions_started: 1,
            frames_delivered: 120,
            images_captured: 3,
            capture_errors: 0,
            images_saved: 2,
            save_failures: 1,
            qr_frames_scanned: 120,
            qr_codes_detected: 4,
        };

        registry.update(&snapshot);
        registry.update(&snapshot);

        let output = registry.encode().unwrap();
        assert!(output.contains("camera_kit_session_active 1"));
        assert!(output.contains("camera_kit_frames_delivered_total 120"));
        assert!(output.contains("camera_kit_images_saved_total 2"));
        assert!(output.contains("camera_kit_qr_codes_detected_total 4"));
    }

    #[test]
    fn test_counters_never_decrease() {
        let registry = MetricsRegistry::new().unwrap();
        registry.update(&MetricsSnapshot {
            frames_delivered: 10,
            ..Default::default()
        });
        registry.update(&MetricsSnapshot {
            frames_delivered: 4,
            ..Default::default()
        });

        let output = registry.encode().unwrap();
        assert!(output.contains("camera_kit_frames_delivered_total 10"));
        assert!(output.contains("camera_kit_session_active 0"));
    }

    #[test]
    fn test_snapshot_from_components() {
        let stats = CaptureStats {
            sessions_started: 2,
            frames_delivered: 7,
            images_captured: 1,
            capture_errors: 0,
        };
        let qr = QrScannerPlugin::new();
        let snapshot = MetricsSnapshot::from_components(stats, false, Some(&qr), None);

        assert_eq!(snapshot.frames_delivered, 7);
        assert_eq!(snapshot.qr_frames_scanned, 0);
        assert_eq!(snapshot.images_saved, 0);
        assert!(!snapshot.session_active);
    }
}
