//! Luma Meter Library
//!
//! A camera frame pipeline that measures scene luminance at a bounded
//! rate while keeping frame ingestion running at full speed. Also
//! drives on-demand full-resolution still captures, independent of the
//! analysis path.
//!
//! # Architecture
//!
//! Frames move along one explicit path:
//!
//! ```text
//! source → latest-frame buffer → rate gate → extraction → sink
//!    ↓
//! still capture (on demand, own frame)
//! ```
//!
//! # Design Principles
//!
//! - **Newest frame wins**: the buffer holds one frame; a new arrival
//!   replaces an unconsumed one rather than queueing behind it
//! - **Bounded analysis rate**: the gate admits at most one frame per
//!   configured interval, measured in frame time
//! - **Failures skip, never halt**: a frame that cannot be analyzed is
//!   reported and dropped; the pipeline keeps running
//! - **Captures never steal frames**: stills are acquired directly
//!   from the source, not from the analysis buffer
//!
//! # Example
//!
//! ```no_run
//! use luma_meter::{
//!     camera::{AnalysisConfig, CameraConfig, FrameSource, MockCamera},
//!     pipeline::{AnalysisPipeline, PollOutcome, TracingSink},
//! };
//!
//! // Initialize components
//! let mut camera = MockCamera::new();
//! camera.open(&CameraConfig::default()).unwrap();
//!
//! let pipeline = AnalysisPipeline::new(AnalysisConfig::default(), TracingSink);
//! pipeline.start();
//!
//! // Feed frames and poll for samples
//! for _ in 0..10 {
//!     let frame = camera.next_frame().unwrap();
//!     pipeline.submit(frame);
//!
//!     if let PollOutcome::Sample(sample) = pipeline.poll() {
//!         println!("mean luminance: {:.1}", sample.mean_luma);
//!     }
//! }
//!
//! pipeline.stop();
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod analysis;
pub mod camera;
pub mod metrics;
pub mod pipeline;
pub mod still;

// Re-exports covering the common construction path
pub use analysis::{AnalysisError, LuminanceSample, RateGate};
pub use camera::{AnalysisConfig, CameraConfig, FrameSource, MockCamera, RawFrame};
pub use pipeline::{AnalysisPipeline, AnalysisSink, PollOutcome, TracingSink};
pub use still::{CaptureController, CaptureReceipt, CaptureRequest};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
