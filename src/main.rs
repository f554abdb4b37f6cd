//! Camera Kit CLI
//!
//! Builds a controller from a config file and command-line flags, runs a
//! preview loop with the requested plugins and takes still pictures.

use camera_kit::{
    controller::{
        CameraControllerBuilder, CameraSettings, CaptureSettings, FileConfig,
        MockControllerBuilder,
    },
    metrics::{MetricsRegistry, MetricsSnapshot},
    plugins::{ImageSaverConfig, ImageSaverPlugin, QrScannerPlugin},
    settings::{CameraLens, Directory, FlashMode, ImageFormat, Rotation, TorchMode},
};
use clap::Parser;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Consecutive frame failures tolerated before the preview loop stops.
const MAX_CONSECUTIVE_FAILURES: u32 = 10;

#[derive(Debug, Parser)]
#[command(name = "camera-kit", version, about = "Capture frames and pictures from a camera")]
struct Args {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Flash mode: on, off, auto.
    #[arg(long)]
    flash: Option<FlashMode>,

    /// Torch mode: on, off, auto.
    #[arg(long)]
    torch: Option<TorchMode>,

    /// Lens: default, front, back.
    #[arg(long)]
    lens: Option<CameraLens>,

    /// Output rotation in degrees: 0, 90, 180, 270.
    #[arg(long)]
    rotation: Option<Rotation>,

    /// Still image format: jpeg, png.
    #[arg(long)]
    format: Option<ImageFormat>,

    /// Destination: pictures, dcim, documents.
    #[arg(long)]
    directory: Option<Directory>,

    /// Preview frames to process.
    #[arg(short = 'n', long)]
    frames: Option<u32>,

    /// Run until interrupted with Ctrl-C.
    #[arg(long)]
    continuous: bool,

    /// Take a picture every N frames.
    #[arg(long)]
    picture_every: Option<u32>,

    /// Scan preview frames for QR codes.
    #[arg(long)]
    scan_qr: bool,

    /// Save every picture taken.
    #[arg(long)]
    save: bool,

    /// Write pictures under this folder instead of the platform directory.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Print Prometheus metrics when done.
    #[arg(long)]
    metrics_dump: bool,

    /// Use the attached camera instead of synthetic frames.
    #[cfg(feature = "camera")]
    #[arg(long)]
    native: bool,

    /// List attached cameras and exit.
    #[cfg(feature = "camera")]
    #[arg(long)]
    list_devices: bool,

    /// Serve metrics over HTTP on this port (0 to disable).
    #[cfg(feature = "metrics")]
    #[arg(long)]
    metrics_port: Option<u16>,
}

impl Args {
    fn settings(&self) -> CameraSettings {
        CameraSettings {
            flash_mode: self.flash,
            torch_mode: self.torch,
            lens: self.lens,
            rotation: self.rotation,
            image_format: self.format,
            directory: self.directory,
        }
    }
}

/// Plugins selected on the command line, kept for reporting.
struct Plugins {
    qr: Option<Arc<QrScannerPlugin>>,
    saver: Option<Arc<ImageSaverPlugin>>,
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Camera Kit v{}", camera_kit::VERSION);

    let args = Args::parse();

    let file_config = match &args.config {
        Some(path) => match FileConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => FileConfig::default(),
    };

    let mut capture = file_config.capture.clone();
    if let Some(frames) = args.frames {
        capture.frame_count = frames;
    }
    if let Some(every) = args.picture_every {
        capture.picture_every = every;
    }
    capture.continuous |= args.continuous;

    let plugins = Plugins {
        qr: args.scan_qr.then(|| {
            let scanner = QrScannerPlugin::new().on_result(|code| println!("QR: {code}"));
            scanner.start_scanning();
            Arc::new(scanner)
        }),
        saver: (args.save || file_config.saver.auto_save).then(|| {
            let mut config: ImageSaverConfig = file_config.saver.clone();
            config.auto_save = true;
            if let Some(dir) = &args.output_dir {
                config.root = Some(dir.clone());
            }
            Arc::new(ImageSaverPlugin::new(config))
        }),
    };

    #[cfg(feature = "camera")]
    {
        if args.list_devices {
            match camera_kit::capture::list_devices() {
                Ok(devices) => {
                    for device in devices {
                        println!("{}: {}", device.index, device.name);
                    }
                }
                Err(e) => {
                    eprintln!("Failed to list cameras: {}", e);
                    std::process::exit(1);
                }
            }
            return;
        }

        if args.native {
            let mut builder = camera_kit::controller::NativeControllerBuilder::new();
            builder.device(capture.device);
            if let Some(front) = capture.front_device {
                builder.front_device(front);
            }
            run(&mut builder, &args, &file_config, &capture, &plugins);
            return;
        }
    }

    let mut builder = MockControllerBuilder::new();
    builder.frame_size(capture.width, capture.height);
    run(&mut builder, &args, &file_config, &capture, &plugins);
}

fn run<B: CameraControllerBuilder>(
    builder: &mut B,
    args: &Args,
    file_config: &FileConfig,
    capture: &CaptureSettings,
    plugins: &Plugins,
) {
    builder
        .apply_settings(&file_config.controller)
        .apply_settings(&args.settings());
    if let Some(qr) = &plugins.qr {
        builder.add_plugin(qr.clone());
    }
    if let Some(saver) = &plugins.saver {
        builder.add_plugin(saver.clone());
    }

    let mut controller = match builder.build() {
        Ok(controller) => controller,
        Err(e) => {
            eprintln!("Invalid camera configuration: {}", e);
            eprintln!("Pass --format and --directory, or set them in the [controller] table.");
            std::process::exit(2);
        }
    };

    let registry = match MetricsRegistry::new() {
        Ok(registry) => registry,
        Err(e) => {
            eprintln!("Failed to create metrics registry: {}", e);
            std::process::exit(1);
        }
    };

    #[cfg(feature = "metrics")]
    let metrics_state = {
        let port = args.metrics_port.unwrap_or(file_config.metrics.port);
        (port != 0).then(|| spawn_metrics_server(port))
    };
    #[cfg(not(feature = "metrics"))]
    let _ = file_config.metrics.port;

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = Arc::clone(&running);
        if let Err(e) = ctrlc::set_handler(move || running.store(false, Ordering::SeqCst)) {
            warn!("Failed to install Ctrl-C handler: {}", e);
        }
    }

    if let Err(e) = controller.start_session() {
        error!("Failed to start capture session: {}", e);
        std::process::exit(1);
    }

    info!(
        continuous = capture.continuous,
        frames = capture.frame_count,
        "Processing frames..."
    );

    let mut processed: u32 = 0;
    let mut pictures: u32 = 0;
    let mut consecutive_failures: u32 = 0;
    while running.load(Ordering::SeqCst) && (capture.continuous || processed < capture.frame_count)
    {
        if let Err(e) = controller.next_frame() {
            warn!("Frame capture failed: {}", e);
            consecutive_failures += 1;
            if consecutive_failures >= MAX_CONSECUTIVE_FAILURES {
                error!("Giving up after {} failed frames", consecutive_failures);
                break;
            }
            continue;
        }
        consecutive_failures = 0;
        processed += 1;

        if capture.picture_every > 0 && processed % capture.picture_every == 0 {
            match controller.take_picture() {
                Ok(_) => pictures += 1,
                Err(e) => warn!("Picture failed: {}", e),
            }
        }

        let snapshot = MetricsSnapshot::from_controller(
            &controller,
            plugins.qr.as_deref(),
            plugins.saver.as_deref(),
        );
        registry.update(&snapshot);
        #[cfg(feature = "metrics")]
        if let Some(state) = &metrics_state {
            state.blocking_write().update(&snapshot);
        }
    }

    // Always leave with at least one picture when saving was requested.
    if pictures == 0 && plugins.saver.is_some() {
        if let Err(e) = controller.take_picture() {
            warn!("Picture failed: {}", e);
        }
    }

    controller.stop_session();

    let stats = controller.stats();
    info!(
        "Processed {} frames: {} pictures, {} errors",
        stats.frames_delivered, stats.images_captured, stats.capture_errors
    );
    if let Some(qr) = &plugins.qr {
        info!("QR codes detected: {}", qr.codes_detected());
    }
    if let Some(saver) = &plugins.saver {
        if let Some(path) = saver.last_saved() {
            info!("Last picture saved to {}", path.display());
        }
    }

    registry.update(&MetricsSnapshot::from_controller(
        &controller,
        plugins.qr.as_deref(),
        plugins.saver.as_deref(),
    ));
    if args.metrics_dump {
        match registry.encode() {
            Ok(output) => print!("{}", output),
            Err(e) => warn!("Failed to encode metrics: {}", e),
        }
    }
}

#[cfg(feature = "metrics")]
fn spawn_metrics_server(
    port: u16,
) -> Arc<tokio::sync::RwLock<camera_kit::metrics::MetricsState>> {
    use camera_kit::metrics::{MetricsServer, MetricsServerConfig};

    let registry = match MetricsRegistry::new() {
        Ok(registry) => registry,
        Err(e) => {
            eprintln!("Failed to create metrics registry: {}", e);
            std::process::exit(1);
        }
    };
    let server = MetricsServer::new(MetricsServerConfig::with_port(port), registry);
    let state = server.state();

    std::thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
            Ok(runtime) => runtime,
            Err(e) => {
                error!("Failed to start metrics runtime: {}", e);
                return;
            }
        };
        if let Err(e) = runtime.block_on(server.run()) {
            error!("Metrics server stopped: {}", e);
        }
    });

    state
}
