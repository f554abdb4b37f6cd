//! Saving captured images to the configured directory.

use super::{lock, CameraPlugin};
use crate::controller::ControllerConfig;
use crate::output::{self, CapturedImage, OutputError};
use crate::settings::Directory;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Configuration for [`ImageSaverPlugin`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageSaverConfig {
    /// Save every captured image without being asked.
    pub auto_save: bool,
    /// File name prefix.
    pub prefix: String,
    /// Sub-folder created inside the destination directory.
    pub folder: Option<String>,
    /// Destination category; the controller's directory when unset.
    pub directory: Option<Directory>,
    /// Replaces the platform location of the directory.
    pub root: Option<PathBuf>,
}

impl Default for ImageSaverConfig {
    fn default() -> Self {
        Self {
            auto_save: false,
            prefix: "IMG".to_string(),
            folder: None,
            directory: None,
            root: None,
        }
    }
}

/// Writes captured images to disk.
#[derive(Debug)]
pub struct ImageSaverPlugin {
    config: ImageSaverConfig,
    attached_directory: Mutex<Option<Directory>>,
    last_saved: Mutex<Option<PathBuf>>,
    saved: AtomicU64,
    failures: AtomicU64,
}

impl ImageSaverPlugin {
    /// Creates a saver with the given configuration.
    pub fn new(config: ImageSaverConfig) -> Self {
        Self {
            config,
            attached_directory: Mutex::new(None),
            last_saved: Mutex::new(None),
            saved: AtomicU64::new(0),
            failures: AtomicU64::new(0),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ImageSaverConfig {
        &self.config
    }

    /// The directory images go to: the configured override, else the
    /// controller's directory, else pictures.
    pub fn directory(&self) -> Directory {
        self.config
            .directory
            .or(*lock(&self.attached_directory))
            .unwrap_or(Directory::Pictures)
    }

    /// Saves `image` and returns the path written.
    ///
    /// Names never collide: a numeric suffix is added when a file with the
    /// same timestamp already exists.
    pub fn save(&self, image: &CapturedImage) -> Result<PathBuf, OutputError> {
        let result = self.write(image);
        match &result {
            Ok(path) => {
                self.saved.fetch_add(1, Ordering::Relaxed);
                *lock(&self.last_saved) = Some(path.clone());
            }
            Err(_) => {
                self.failures.fetch_add(1, Ordering::Relaxed);
            }
        }
        result
    }

    /// Path of the most recently saved image.
    pub fn last_saved(&self) -> Option<PathBuf> {
        lock(&self.last_saved).clone()
    }

    /// Images saved so far.
    pub fn saved_count(&self) -> u64 {
        self.saved.load(Ordering::Relaxed)
    }

    /// Failed save attempts so far.
    pub fn failure_count(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    fn write(&self, image: &CapturedImage) -> Result<PathBuf, OutputError> {
        let dir = output::destination(
            self.directory(),
            self.config.root.as_deref(),
            self.config.folder.as_deref(),
        )?;

        let extension = image.format().extension();
        let base = output::file_name(&self.config.prefix, image.format(), image.captured_at());
        let stem = base.trim_end_matches(extension).trim_end_matches('.');
        let mut name = base.clone();
        let mut suffix = 1;
        while dir.join(&name).exists() {
            name = format!("{stem}_{suffix}.{extension}");
            suffix += 1;
        }

        output::write_image(&dir, &name, image.bytes())
    }
}

impl CameraPlugin for ImageSaverPlugin {
    fn name(&self) -> &str {
        "image-saver"
    }

    fn on_attach(&self, config: &ControllerConfig) {
        *lock(&self.attached_directory) = Some(config.directory);
    }

    fn on_image_captured(&self, image: &CapturedImage) {
        if !self.config.auto_save {
            return;
        }
        if let Err(e) = self.save(image) {
            tracing::warn!(error = %e, "Auto-save failed");
        }
    }
}
