//! Luma Meter CLI
//!
//! Command-line interface for running the luminance analysis pipeline
//! against the built-in mock camera.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};

use luma_meter::{
    camera::{FileConfig, FrameSource, MockCamera},
    metrics::{MetricsRegistry, MetricsSnapshot},
    pipeline::{AnalysisPipeline, TracingSink},
    still::{CaptureController, CaptureRequest, CaptureStats, MockWriter},
};

/// Command-line options.
#[derive(Debug, Parser)]
#[command(
    name = "luma-meter",
    version,
    about = "Scene luminance meter over a mock camera stream"
)]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Number of preview frames to push before exiting.
    #[arg(long, value_name = "N")]
    frames: Option<u32>,

    /// Keep running until Ctrl-C (overrides --frames).
    #[arg(long)]
    continuous: bool,

    /// Minimum milliseconds of frame time between published samples.
    #[arg(long, value_name = "MS")]
    interval_ms: Option<u64>,
}

fn main() {
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Luma Meter v{}", luma_meter::VERSION);
    info!("Demo run over the built-in mock camera");

    // Load configuration, then apply command-line overrides
    let mut config = match &args.config {
        Some(path) => match FileConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load config {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => FileConfig::default(),
    };
    if let Some(frames) = args.frames {
        config.output.frame_count = frames;
    }
    if args.continuous {
        config.output.continuous = true;
    }
    if let Some(interval_ms) = args.interval_ms {
        config.analysis.interval_ms = interval_ms;
    }
    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {}", e);
        std::process::exit(1);
    }

    let mut camera = MockCamera::new();
    if let Err(e) = camera.open(&config.camera) {
        eprintln!("Could not open camera: {}", e);
        std::process::exit(1);
    }

    let pipeline = Arc::new(AnalysisPipeline::new(config.analysis.clone(), TracingSink));
    pipeline.start();

    let registry = match MetricsRegistry::new() {
        Ok(registry) => Some(Arc::new(registry)),
        Err(e) => {
            warn!("Metrics registry unavailable: {}", e);
            None
        }
    };

    #[cfg(feature = "metrics")]
    spawn_metrics_server(&registry, config.output.metrics_port);

    // Ctrl-C flips the running flag; both contexts watch it
    let running = Arc::new(AtomicBool::new(true));
    {
        let running = Arc::clone(&running);
        if let Err(e) = ctrlc::set_handler(move || {
            running.store(false, Ordering::SeqCst);
        }) {
            warn!("Failed to install Ctrl-C handler: {}", e);
        }
    }

    if config.output.continuous {
        info!("Running continuously; press Ctrl-C to stop");
    } else {
        info!("Processing {} frames...", config.output.frame_count);
    }

    // Producer context: push frames at the source's native rate
    let streaming = Arc::new(AtomicBool::new(true));
    let producer = {
        let pipeline = Arc::clone(&pipeline);
        let running = Arc::clone(&running);
        let streaming = Arc::clone(&streaming);
        let period = Duration::from_millis(1000 / u64::from(config.camera.fps));
        let continuous = config.output.continuous;
        let frame_count = config.output.frame_count;

        thread::spawn(move || {
            let mut pushed: u32 = 0;
            while running.load(Ordering::SeqCst) && (continuous || pushed < frame_count) {
                match camera.next_frame() {
                    Ok(frame) => pipeline.submit(frame),
                    Err(e) => {
                        warn!("Frame acquisition failed: {}", e);
                        break;
                    }
                }
                pushed = pushed.saturating_add(1);
                thread::sleep(period);
            }
            streaming.store(false, Ordering::SeqCst);
            camera
        })
    };

    // Analysis context: this thread polls at its own cadence
    let poll_period = Duration::from_millis(config.output.poll_ms);
    while streaming.load(Ordering::SeqCst) {
        pipeline.poll();
        if let Some(registry) = &registry {
            let snapshot = MetricsSnapshot::from_components(
                &pipeline.stats(),
                &CaptureStats::default(),
                pipeline.is_running(),
            );
            registry.update(&snapshot);
        }
        thread::sleep(poll_period);
    }
    // Drain whatever the producer left behind
    pipeline.poll();

    let camera = match producer.join() {
        Ok(camera) => camera,
        Err(_) => {
            eprintln!("Producer thread panicked");
            std::process::exit(1);
        }
    };

    // One demonstration still, named by wall-clock time like a photo app
    let mut controller = CaptureController::new(camera, MockWriter::new());
    let request = CaptureRequest::new(format!("{}.jpg", chrono::Utc::now().timestamp_millis()));
    match controller.capture(&request) {
        Ok(receipt) => info!("Saved still as {}", receipt.destination),
        Err(e) => warn!("Still capture failed: {}", e),
    }

    pipeline.stop();

    let stats = pipeline.stats();
    if let Some(registry) = &registry {
        let snapshot =
            MetricsSnapshot::from_components(&stats, &controller.stats(), pipeline.is_running());
        registry.update(&snapshot);
    }

    info!(
        "Processed {} frames: {} samples, {} throttled, {} replaced, {} failed",
        stats.frames_submitted,
        stats.samples_published,
        stats.frames_throttled,
        stats.frames_replaced,
        stats.extraction_failures
    );

    if let Some(sample) = stats.last_sample {
        println!(
            "Last luminance: {:.2} (frame time {} ms)",
            sample.mean_luma, sample.timestamp_ms
        );
    }
}

/// Serves /metrics and /health on a background runtime until the
/// process exits.
#[cfg(feature = "metrics")]
fn spawn_metrics_server(registry: &Option<Arc<MetricsRegistry>>, port: u16) {
    use luma_meter::metrics::{ExporterConfig, MetricsExporter};

    let registry = match registry {
        Some(registry) => Arc::clone(registry),
        None => return,
    };
    if port == 0 {
        return;
    }

    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(e) => {
                warn!("Failed to start metrics runtime: {}", e);
                return;
            }
        };

        let exporter = MetricsExporter::new(ExporterConfig::with_port(port), registry);
        if let Err(e) = runtime.block_on(exporter.run()) {
            warn!("Metrics exporter exited: {}", e);
        }
    });
}
