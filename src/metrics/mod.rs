//! Prometheus metrics exporter for pipeline monitoring.
//!
//! Counters and gauges describing the frame pipeline and still
//! captures, rendered in the Prometheus text format and optionally
//! served over HTTP.
//!
//! # Metrics Exposed
//!
//! ## Pipeline Metrics
//! - `luma_meter_pipeline_running` - Whether the pipeline is running (1=running, 0=stopped)
//! - `luma_meter_frames_submitted_total` - Frames accepted into the buffer
//! - `luma_meter_frames_replaced_total` - Frames overwritten before analysis saw them
//! - `luma_meter_frames_throttled_total` - Frames refused by the rate gate
//! - `luma_meter_samples_total` - Luminance samples published
//! - `luma_meter_extraction_failures_total` - Frames that failed extraction
//!
//! ## Sample Metrics
//! - `luma_meter_last_luminance` - Mean luminance of the latest sample (0-255)
//! - `luma_meter_last_sample_timestamp_ms` - Source timestamp of the latest sample
//!
//! ## Capture Metrics
//! - `luma_meter_captures_succeeded_total` - Still captures that completed
//! - `luma_meter_captures_failed_total` - Still captures that failed
//!
//! # Example
//!
//! ```no_run
//! use luma_meter::metrics::{MetricsRegistry, MetricsSnapshot};
//!
//! // Create a metrics registry
//! let registry = MetricsRegistry::new().expect("registry construction failed");
//!
//! // Update metrics from system state
//! let snapshot = MetricsSnapshot {
//!     running: true,
//!     frames_submitted: 120,
//!     frames_replaced: 30,
//!     frames_throttled: 85,
//!     samples_published: 4,
//!     extraction_failures: 0,
//!     last_luminance: Some(131.5),
//!     last_sample_timestamp_ms: Some(4000),
//!     captures_succeeded: 1,
//!     captures_failed: 0,
//! };
//!
//! registry.update(&snapshot);
//! ```

mod collector;
#[cfg(feature = "metrics")]
mod server;

pub use collector::{MetricsError, MetricsRegistry, MetricsSnapshot};
#[cfg(feature = "metrics")]
pub use server::{ExporterConfig, ExporterError, MetricsExporter};
