//! The camera controller.

use super::config::ControllerConfig;
use crate::capture::{CameraBackend, CameraError, Frame};
use crate::output::{self, CapturedImage, OutputError};
use crate::plugins::CameraPlugin;
use crate::settings::{CameraLens, Directory, FlashMode, ImageFormat, Rotation, TorchMode};
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur while taking a picture.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// The backend failed to deliver the frame.
    #[error(transparent)]
    Camera(#[from] CameraError),
    /// The frame could not be encoded or stored.
    #[error(transparent)]
    Output(#[from] OutputError),
}

/// Counters describing controller activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaptureStats {
    /// Sessions opened.
    pub sessions_started: u64,
    /// Preview frames delivered to plugins.
    pub frames_delivered: u64,
    /// Still images produced.
    pub images_captured: u64,
    /// Failed frame or still captures.
    pub capture_errors: u64,
}

/// A configured camera bound to one backend.
///
/// The configuration given at construction is kept unchanged and returned
/// by [`config`](Self::config). Flash, torch and lens can be toggled at
/// runtime; their live values are returned by the dedicated getters.
pub struct CameraController<B: CameraBackend> {
    config: ControllerConfig,
    plugins: Vec<Arc<dyn CameraPlugin>>,
    backend: B,
    flash_mode: FlashMode,
    torch_mode: TorchMode,
    camera_lens: CameraLens,
    stats: CaptureStats,
}

impl<B: CameraBackend> CameraController<B> {
    /// Creates a controller from validated configuration.
    ///
    /// Every plugin's `on_attach` hook runs here, in order.
    pub fn new(config: ControllerConfig, plugins: Vec<Arc<dyn CameraPlugin>>, backend: B) -> Self {
        for plugin in &plugins {
            tracing::debug!(plugin = plugin.name(), "Attaching plugin");
            plugin.on_attach(&config);
        }

        tracing::info!(
            flash = %config.flash_mode,
            torch = %config.torch_mode,
            lens = %config.camera_lens,
            rotation = config.rotation.degrees(),
            format = %config.image_format,
            directory = %config.directory,
            plugins = plugins.len(),
            "Camera controller created"
        );

        Self {
            flash_mode: config.flash_mode,
            torch_mode: config.torch_mode,
            camera_lens: config.camera_lens,
            config,
            plugins,
            backend,
            stats: CaptureStats::default(),
        }
    }

    /// Configuration as it was at construction.
    pub fn config(&self) -> ControllerConfig {
        self.config
    }

    /// Attached plugins, in insertion order.
    pub fn plugins(&self) -> &[Arc<dyn CameraPlugin>] {
        &self.plugins
    }

    /// Current flash mode.
    pub fn flash_mode(&self) -> FlashMode {
        self.flash_mode
    }

    /// Current torch mode.
    pub fn torch_mode(&self) -> TorchMode {
        self.torch_mode
    }

    /// Current lens.
    pub fn camera_lens(&self) -> CameraLens {
        self.camera_lens
    }

    /// Output rotation.
    pub fn rotation(&self) -> Rotation {
        self.config.rotation
    }

    /// Still image encoding.
    pub fn image_format(&self) -> ImageFormat {
        self.config.image_format
    }

    /// Where captured images belong.
    pub fn directory(&self) -> Directory {
        self.config.directory
    }

    /// Activity counters.
    pub fn stats(&self) -> CaptureStats {
        self.stats
    }

    /// The backend this controller drives.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Mutable access to the backend.
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Whether a capture session is open.
    pub fn is_session_active(&self) -> bool {
        self.backend.is_open()
    }

    /// Opens a capture session on the current lens.
    ///
    /// Does nothing if a session is already open.
    pub fn start_session(&mut self) -> Result<(), CameraError> {
        if self.backend.is_open() {
            return Ok(());
        }

        self.backend.open(self.camera_lens)?;
        if let Err(e) = self.apply_torch() {
            self.backend.close();
            return Err(e);
        }
        self.stats.sessions_started += 1;

        tracing::info!(lens = %self.camera_lens, "Capture session started");
        for plugin in &self.plugins {
            plugin.on_session_started(self.camera_lens);
        }
        Ok(())
    }

    /// Closes the capture session, if one is open.
    pub fn stop_session(&mut self) {
        if !self.backend.is_open() {
            return;
        }

        self.backend.close();
        tracing::info!("Capture session stopped");
        for plugin in &self.plugins {
            plugin.on_session_stopped();
        }
    }

    /// Grabs one preview frame and hands it to every plugin.
    pub fn next_frame(&mut self) -> Result<Frame, CameraError> {
        let frame = match self.backend.capture() {
            Ok(frame) => frame,
            Err(e) => {
                self.stats.capture_errors += 1;
                return Err(e);
            }
        };

        for plugin in &self.plugins {
            plugin.on_frame(&frame);
        }
        self.stats.frames_delivered += 1;

        tracing::trace!(sequence = frame.sequence(), "Frame delivered");
        Ok(frame)
    }

    /// Takes a still picture.
    ///
    /// Fires the flash when the flash mode is on or auto, applies the
    /// configured rotation and encodes in the configured format. Every
    /// plugin sees the result.
    pub fn take_picture(&mut self) -> Result<CapturedImage, CaptureError> {
        let result = self.capture_still();
        match &result {
            Ok(image) => {
                self.stats.images_captured += 1;
                for plugin in &self.plugins {
                    plugin.on_image_captured(image);
                }
            }
            Err(e) => {
                self.stats.capture_errors += 1;
                tracing::warn!(error = %e, "Picture capture failed");
            }
        }
        result
    }

    fn capture_still(&mut self) -> Result<CapturedImage, CaptureError> {
        if !self.backend.is_open() {
            return Err(CameraError::NotInitialized.into());
        }

        if self.flash_mode.fires() {
            match self.backend.fire_flash() {
                Ok(()) => {}
                Err(CameraError::Unsupported(what)) => {
                    tracing::debug!(what, "Flash unavailable, capturing without it");
                }
                Err(e) => return Err(e.into()),
            }
        }

        let frame = self.backend.capture()?;
        let image = output::encode(&frame, self.config.rotation, self.config.image_format)?;

        tracing::info!(
            format = %image.format(),
            width = image.width(),
            height = image.height(),
            bytes = image.bytes().len(),
            "Picture taken"
        );
        Ok(image)
    }

    /// Advances the flash mode: off → on → auto → off.
    pub fn toggle_flash_mode(&mut self) -> FlashMode {
        self.flash_mode = self.flash_mode.toggled();
        tracing::debug!(flash = %self.flash_mode, "Flash mode toggled");
        self.flash_mode
    }

    /// Switches the torch on or off, applying it to an open session.
    pub fn toggle_torch_mode(&mut self) -> Result<TorchMode, CameraError> {
        self.torch_mode = self.torch_mode.toggled();
        tracing::debug!(torch = %self.torch_mode, "Torch mode toggled");
        if self.backend.is_open() {
            self.apply_torch()?;
        }
        Ok(self.torch_mode)
    }

    /// Switches between the back and front lens.
    ///
    /// An open session is restarted on the new lens.
    pub fn toggle_camera_lens(&mut self) -> Result<CameraLens, CameraError> {
        self.camera_lens = self.camera_lens.toggled();
        tracing::debug!(lens = %self.camera_lens, "Camera lens toggled");
        if self.backend.is_open() {
            self.stop_session();
            self.start_session()?;
        }
        Ok(self.camera_lens)
    }

    fn apply_torch(&mut self) -> Result<(), CameraError> {
        match self.backend.set_torch(self.torch_mode) {
            Ok(()) => Ok(()),
            Err(CameraError::Unsupported(what)) => {
                tracing::warn!(what, torch = %self.torch_mode, "Torch unavailable on this camera");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

impl<B: CameraBackend> std::fmt::Debug for CameraController<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraController")
            .field("config", &self.config)
            .field("plugins", &self.plugins)
            .field("flash_mode", &self.flash_mode)
            .field("torch_mode", &self.torch_mode)
            .field("camera_lens", &self.camera_lens)
            .field("session_active", &self.backend.is_open())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::MockBackend;
    use crate::controller::{CameraControllerBuilder, FileConfig, MockControllerBuilder};
    use crate::plugins::ImageSaverPlugin;
    use std::sync::Mutex;

    /// Records every hook call as a string.
    #[derive(Default)]
    struct Recorder {
        tag: &'static str,
        events: Arc<Mutex<Vec<String>>>,
    }

    impl CameraPlugin for Recorder {
        fn name(&self) -> &str {
            self.tag
        }

        fn on_attach(&self, config: &ControllerConfig) {
            self.push(format!("attach:{}", config.image_format));
        }

        fn on_session_started(&self, lens: CameraLens) {
            self.push(format!("start:{lens}"));
        }

        fn on_session_stopped(&self) {
            self.push("stop".into());
        }

        fn on_frame(&self, frame: &Frame) {
            self.push(format!("frame:{}", frame.sequence()));
        }

        fn on_image_captured(&self, image: &CapturedImage) {
            self.push(format!("image:{}", image.format()));
        }
    }

    impl Recorder {
        fn push(&self, event: String) {
            self.events.lock().unwrap().push(format!("{}:{}", self.tag, event));
        }
    }

    fn controller(
        configure: impl FnOnce(&mut MockControllerBuilder),
    ) -> CameraController<MockBackend> {
        let mut builder = MockControllerBuilder::new();
        builder
            .frame_size(8, 4)
            .set_image_format(ImageFormat::Png)
            .set_directory(Directory::Pictures);
        configure(&mut builder);
        builder.build().unwrap()
    }

    #[test]
    fn test_plugins_called_in_order() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let a = Arc::new(Recorder { tag: "a", events: Arc::clone(&events) });
        let b = Arc::new(Recorder { tag: "b", events: Arc::clone(&events) });

        let mut controller = controller(|builder| {
            builder.add_plugin(a).add_plugin(b);
        });
        controller.start_session().unwrap();
        controller.next_frame().unwrap();
        controller.take_picture().unwrap();
        controller.stop_session();

        assert_eq!(
            *events.lock().unwrap(),
            vec![
                "a:attach:png",
                "b:attach:png",
                "a:start:back",
                "b:start:back",
                "a:frame:1",
                "b:frame:1",
                "a:image:png",
                "b:image:png",
                "a:stop",
                "b:stop",
            ]
        );
    }

    #[test]
    fn test_frames_require_session() {
        let mut controller = controller(|_| {});

        assert!(matches!(controller.next_frame(), Err(CameraError::NotInitialized)));
        assert!(matches!(
            controller.take_picture(),
            Err(CaptureError::Camera(CameraError::NotInitialized))
        ));
        assert_eq!(controller.stats().capture_errors, 2);
    }

    #[test]
    fn test_start_session_is_idempotent() {
        let mut controller = controller(|_| {});
        controller.start_session().unwrap();
        controller.start_session().unwrap();

        assert_eq!(controller.backend().opens(), 1);
        assert_eq!(controller.stats().sessions_started, 1);
    }

    /// Mock backend whose torch always fails.
    #[derive(Default)]
    struct BrokenTorch(MockBackend);

    impl CameraBackend for BrokenTorch {
        fn open(&mut self, lens: CameraLens) -> Result<(), CameraError> {
            self.0.open(lens)
        }

        fn capture(&mut self) -> Result<Frame, CameraError> {
            self.0.capture()
        }

        fn set_torch(&mut self, _mode: TorchMode) -> Result<(), CameraError> {
            Err(CameraError::OpenFailed("torch driver".into()))
        }

        fn fire_flash(&mut self) -> Result<(), CameraError> {
            self.0.fire_flash()
        }

        fn is_open(&self) -> bool {
            self.0.is_open()
        }

        fn close(&mut self) {
            self.0.close()
        }
    }

    #[test]
    fn test_torch_failure_leaves_session_closed() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let recorder: Arc<dyn CameraPlugin> =
            Arc::new(Recorder { tag: "a", events: Arc::clone(&events) });
        let config = ControllerConfig::new(ImageFormat::Png, Directory::Pictures);
        let mut controller = CameraController::new(config, vec![recorder], BrokenTorch::default());

        assert!(matches!(controller.start_session(), Err(CameraError::OpenFailed(_))));
        assert!(!controller.is_session_active());

        assert!(controller.start_session().is_err());
        assert!(matches!(controller.next_frame(), Err(CameraError::NotInitialized)));
        assert_eq!(controller.stats().sessions_started, 0);
        assert_eq!(*events.lock().unwrap(), vec!["a:attach:png"]);
    }

    #[test]
    fn test_take_picture_rotates_and_encodes() {
        let mut controller = controller(|builder| {
            builder.set_rotation(Rotation::Deg270);
        });
        controller.start_session().unwrap();

        let image = controller.take_picture().unwrap();

        assert_eq!(image.format(), ImageFormat::Png);
        assert_eq!((image.width(), image.height()), (4, 8));
        let decoded = image::load_from_memory(image.bytes()).unwrap().to_rgb8();
        assert_eq!(decoded.dimensions(), (4, 8));
        assert_eq!(controller.stats().images_captured, 1);
    }

    #[test]
    fn test_flash_fires_only_when_enabled() {
        let mut controller = controller(|_| {});
        controller.start_session().unwrap();

        controller.take_picture().unwrap();
        assert_eq!(controller.backend().flashes_fired(), 0);

        assert_eq!(controller.toggle_flash_mode(), FlashMode::On);
        controller.take_picture().unwrap();
        assert_eq!(controller.toggle_flash_mode(), FlashMode::Auto);
        controller.take_picture().unwrap();
        assert_eq!(controller.backend().flashes_fired(), 2);

        assert_eq!(controller.toggle_flash_mode(), FlashMode::Off);
    }

    #[test]
    fn test_torch_applied_on_start_and_toggle() {
        let mut controller = controller(|builder| {
            builder.set_torch_mode(TorchMode::On);
        });
        controller.start_session().unwrap();
        assert_eq!(controller.backend().torch(), TorchMode::On);

        assert_eq!(controller.toggle_torch_mode().unwrap(), TorchMode::Off);
        assert_eq!(controller.backend().torch(), TorchMode::Off);
    }

    #[test]
    fn test_toggle_lens_restarts_session() {
        let mut controller = controller(|_| {});
        controller.start_session().unwrap();

        assert_eq!(controller.toggle_camera_lens().unwrap(), CameraLens::Front);
        assert_eq!(controller.backend().lens(), Some(CameraLens::Front));
        assert_eq!(controller.backend().opens(), 2);
        assert_eq!(controller.next_frame().unwrap().lens(), CameraLens::Front);

        // Frozen configuration is unaffected by toggles.
        assert_eq!(controller.config().camera_lens, CameraLens::Back);
    }

    #[test]
    fn test_toggle_lens_without_session_does_not_open() {
        let mut controller = controller(|_| {});
        controller.toggle_camera_lens().unwrap();

        assert!(!controller.is_session_active());
        assert_eq!(controller.backend().opens(), 0);
    }

    #[test]
    fn test_capture_failure_is_counted() {
        let mut controller = controller(|_| {});
        controller.start_session().unwrap();
        controller.backend_mut().set_fail_captures(true);

        assert!(matches!(controller.next_frame(), Err(CameraError::CaptureFailed(_))));
        assert_eq!(controller.stats().capture_errors, 1);
        assert_eq!(controller.stats().frames_delivered, 0);
    }

    #[test]
    fn test_auto_save_from_file_config() {
        let tmp = tempfile::tempdir().unwrap();
        let file = FileConfig::from_toml(&format!(
            r#"
            [controller]
            image_format = "jpeg"
            directory = "dcim"

            [saver]
            auto_save = true
            folder = "CameraKit"
            root = {:?}
            "#,
            tmp.path().display().to_string()
        ))
        .unwrap();

        let saver = Arc::new(ImageSaverPlugin::new(file.saver.clone()));
        let mut builder = MockControllerBuilder::new();
        builder
            .frame_size(16, 16)
            .apply_settings(&file.controller)
            .add_plugin(saver.clone());
        let mut controller = builder.build().unwrap();

        controller.start_session().unwrap();
        controller.take_picture().unwrap();

        assert_eq!(saver.directory(), Directory::Dcim);
        let path = saver.last_saved().unwrap();
        assert!(path.starts_with(tmp.path().join("CameraKit")));
        assert_eq!(path.extension().unwrap(), "jpg");
    }
}
