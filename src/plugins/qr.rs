//! QR code scanning on preview frames.

use super::{lock, CameraPlugin};
use crate::capture::Frame;
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

/// Upper bound on undrained results; oldest results are dropped first.
const MAX_PENDING_RESULTS: usize = 64;

/// Extracts code payloads from a frame.
pub trait CodeDecoder: Send + Sync {
    /// Returns the text of every code found in `frame`.
    fn decode(&self, frame: &Frame) -> Vec<String>;
}

/// QR decoder backed by `rqrr`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RqrrDecoder;

impl CodeDecoder for RqrrDecoder {
    fn decode(&self, frame: &Frame) -> Vec<String> {
        let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
            frame.width() as usize,
            frame.height() as usize,
            |x, y| frame.luma_at(x as u32, y as u32).unwrap_or(0),
        );

        prepared
            .detect_grids()
            .into_iter()
            .filter_map(|grid| match grid.decode() {
                Ok((_, content)) => Some(content),
                Err(e) => {
                    tracing::trace!(error = ?e, sequence = frame.sequence(), "QR grid failed to decode");
                    None
                }
            })
            .collect()
    }
}

type ResultCallback = Box<dyn Fn(&str) + Send + Sync>;

/// Scans preview frames for QR codes.
///
/// Scanning is off until [`start_scanning`](Self::start_scanning) is
/// called. A code that stays in view is reported once; it is reported
/// again only after a frame in which it was absent.
pub struct QrScannerPlugin {
    decoder: Box<dyn CodeDecoder>,
    callback: Option<ResultCallback>,
    scanning: AtomicBool,
    previous: Mutex<Vec<String>>,
    pending: Mutex<VecDeque<String>>,
    frames_scanned: AtomicU64,
    codes_detected: AtomicU64,
}

impl Default for QrScannerPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl QrScannerPlugin {
    /// Creates a scanner using the `rqrr` decoder.
    pub fn new() -> Self {
        Self::with_decoder(RqrrDecoder)
    }

    /// Creates a scanner with a custom decoder.
    pub fn with_decoder(decoder: impl CodeDecoder + 'static) -> Self {
        Self {
            decoder: Box::new(decoder),
            callback: None,
            scanning: AtomicBool::new(false),
            previous: Mutex::new(Vec::new()),
            pending: Mutex::new(VecDeque::new()),
            frames_scanned: AtomicU64::new(0),
            codes_detected: AtomicU64::new(0),
        }
    }

    /// Invokes `callback` with every newly detected code.
    pub fn on_result(mut self, callback: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.callback = Some(Box::new(callback));
        self
    }

    /// Starts scanning from a clean slate.
    pub fn start_scanning(&self) {
        lock(&self.previous).clear();
        lock(&self.pending).clear();
        self.scanning.store(true, Ordering::SeqCst);
        tracing::debug!("QR scanning started");
    }

    /// Stops scanning, keeping undrained results.
    pub fn pause_scanning(&self) {
        self.scanning.store(false, Ordering::SeqCst);
        tracing::debug!("QR scanning paused");
    }

    /// Resumes scanning after [`pause_scanning`](Self::pause_scanning).
    pub fn resume_scanning(&self) {
        self.scanning.store(true, Ordering::SeqCst);
        tracing::debug!("QR scanning resumed");
    }

    /// Whether frames are currently being scanned.
    pub fn is_scanning(&self) -> bool {
        self.scanning.load(Ordering::SeqCst)
    }

    /// Drains the codes detected since the last call, oldest first.
    pub fn take_results(&self) -> Vec<String> {
        lock(&self.pending).drain(..).collect()
    }

    /// Frames run through the decoder so far.
    pub fn frames_scanned(&self) -> u64 {
        self.frames_scanned.load(Ordering::Relaxed)
    }

    /// Codes reported so far.
    pub fn codes_detected(&self) -> u64 {
        self.codes_detected.load(Ordering::Relaxed)
    }

    fn report(&self, code: &str) {
        self.codes_detected.fetch_add(1, Ordering::Relaxed);
        tracing::info!(code, "QR code detected");

        {
            let mut pending = lock(&self.pending);
            if pending.len() == MAX_PENDING_RESULTS {
                pending.pop_front();
            }
            pending.push_back(code.to_string());
        }

        if let Some(callback) = &self.callback {
            callback(code);
        }
    }
}

impl CameraPlugin for QrScannerPlugin {
    fn name(&self) -> &str {
        "qr-scanner"
    }

    fn on_session_stopped(&self) {
        lock(&self.previous).clear();
    }

    fn on_frame(&self, frame: &Frame) {
        if !self.is_scanning() {
            return;
        }

        let mut codes = self.decoder.decode(frame);
        self.frames_scanned.fetch_add(1, Ordering::Relaxed);

        // Identical codes in one frame count once.
        let mut unique = HashSet::new();
        codes.retain(|code| unique.insert(code.clone()));

        let fresh: Vec<String> = {
            let mut previous = lock(&self.previous);
            let fresh = codes
                .iter()
                .filter(|code| !previous.contains(*code))
                .cloned()
                .collect();
            *previous = codes;
            fresh
        };

        for code in &fresh {
            self.report(code);
        }
    }
}
