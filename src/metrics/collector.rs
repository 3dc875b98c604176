//! Metrics collection and registry.

use prometheus::{Encoder, Gauge, IntCounter, IntGauge, Registry, TextEncoder};
use thiserror::Error;

use crate::pipeline::PipelineStats;
use crate::still::CaptureStats;

/// Errors from registering or encoding metrics.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

/// Point-in-time view of pipeline and capture state for export.
#[derive(Debug, Clone, Default)]
pub struct MetricsSnapshot {
    /// Whether the analysis pipeline is running.
    pub running: bool,
    /// Frames accepted into the buffer.
    pub frames_submitted: u64,
    /// Frames overwritten before analysis saw them.
    pub frames_replaced: u64,
    /// Frames refused by the rate gate.
    pub frames_throttled: u64,
    /// Luminance samples published.
    pub samples_published: u64,
    /// Extraction failures published.
    pub extraction_failures: u64,
    /// Mean luminance of the latest sample.
    pub last_luminance: Option<f64>,
    /// Source timestamp of the latest sample.
    pub last_sample_timestamp_ms: Option<u64>,
    /// Still captures that produced a receipt.
    pub captures_succeeded: u64,
    /// Still captures that failed.
    pub captures_failed: u64,
}

impl MetricsSnapshot {
    /// Creates a snapshot from the pipeline and capture counters.
    pub fn from_components(
        pipeline: &PipelineStats,
        captures: &CaptureStats,
        running: bool,
    ) -> Self {
        Self {
            running,
            frames_submitted: pipeline.frames_submitted,
            frames_replaced: pipeline.frames_replaced,
            frames_throttled: pipeline.frames_throttled,
            samples_published: pipeline.samples_published,
            extraction_failures: pipeline.extraction_failures,
            last_luminance: pipeline.last_sample.map(|s| s.mean_luma),
            last_sample_timestamp_ms: pipeline.last_sample.map(|s| s.timestamp_ms),
            captures_succeeded: captures.succeeded,
            captures_failed: captures.failed,
        }
    }
}

/// Prometheus metrics registry for luminance monitoring.
pub struct MetricsRegistry {
    registry: Registry,

    // Pipeline metrics
    pipeline_running: IntGauge,
    frames_submitted: IntCounter,
    frames_replaced: IntCounter,
    frames_throttled: IntCounter,
    samples_total: IntCounter,
    extraction_failures: IntCounter,

    // Sample metrics
    last_luminance: Gauge,
    last_sample_timestamp: IntGauge,

    // Capture metrics
    captures_succeeded: IntCounter,
    captures_failed: IntCounter,
}

impl MetricsRegistry {
    /// Builds a registry with every pipeline and capture metric registered.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        // Pipeline metrics
        let pipeline_running = IntGauge::new(
            "luma_meter_pipeline_running",
            "Whether the analysis pipeline is running (1=running, 0=stopped)",
        )?;
        let frames_submitted = IntCounter::new(
            "luma_meter_frames_submitted_total",
            "Total frames accepted into the latest-frame buffer",
        )?;
        let frames_replaced = IntCounter::new(
            "luma_meter_frames_replaced_total",
            "Total frames overwritten before analysis saw them",
        )?;
        let frames_throttled = IntCounter::new(
            "luma_meter_frames_throttled_total",
            "Total frames refused by the sampling rate gate",
        )?;
        let samples_total = IntCounter::new(
            "luma_meter_samples_total",
            "Total luminance samples published",
        )?;
        let extraction_failures = IntCounter::new(
            "luma_meter_extraction_failures_total",
            "Total frames that failed luminance extraction",
        )?;

        // Sample metrics
        let last_luminance = Gauge::new(
            "luma_meter_last_luminance",
            "Mean luminance of the latest sample (0-255)",
        )?;
        let last_sample_timestamp = IntGauge::new(
            "luma_meter_last_sample_timestamp_ms",
            "Source timestamp of the latest sample in milliseconds",
        )?;

        // Capture metrics
        let captures_succeeded = IntCounter::new(
            "luma_meter_captures_succeeded_total",
            "Total still captures that completed",
        )?;
        let captures_failed = IntCounter::new(
            "luma_meter_captures_failed_total",
            "Total still captures that failed",
        )?;

        // Register all metrics
        registry.register(Box::new(pipeline_running.clone()))?;
        registry.register(Box::new(frames_submitted.clone()))?;
        registry.register(Box::new(frames_replaced.clone()))?;
        registry.register(Box::new(frames_throttled.clone()))?;
        registry.register(Box::new(samples_total.clone()))?;
        registry.register(Box::new(extraction_failures.clone()))?;
        registry.register(Box::new(last_luminance.clone()))?;
        registry.register(Box::new(last_sample_timestamp.clone()))?;
        registry.register(Box::new(captures_succeeded.clone()))?;
        registry.register(Box::new(captures_failed.clone()))?;

        Ok(Self {
            registry,
            pipeline_running,
            frames_submitted,
            frames_replaced,
            frames_throttled,
            samples_total,
            extraction_failures,
            last_luminance,
            last_sample_timestamp,
            captures_succeeded,
            captures_failed,
        })
    }

    /// Folds a snapshot into the exported metrics.
    pub fn update(&self, snapshot: &MetricsSnapshot) {
        self.pipeline_running.set(if snapshot.running { 1 } else { 0 });

        // Counters advance by the delta to stay monotonic
        let current = self.frames_submitted.get();
        if snapshot.frames_submitted > current {
            self.frames_submitted.inc_by(snapshot.frames_submitted - current);
        }
        let current = self.frames_replaced.get();
        if snapshot.frames_replaced > current {
            self.frames_replaced.inc_by(snapshot.frames_replaced - current);
        }
        let current = self.frames_throttled.get();
        if snapshot.frames_throttled > current {
            self.frames_throttled.inc_by(snapshot.frames_throttled - current);
        }
        let current = self.samples_total.get();
        if snapshot.samples_published > current {
            self.samples_total.inc_by(snapshot.samples_published - current);
        }
        let current = self.extraction_failures.get();
        if snapshot.extraction_failures > current {
            self.extraction_failures.inc_by(snapshot.extraction_failures - current);
        }

        // Sample gauges (only update once a sample exists)
        if let Some(luminance) = snapshot.last_luminance {
            self.last_luminance.set(luminance);
        }
        if let Some(timestamp_ms) = snapshot.last_sample_timestamp_ms {
            self.last_sample_timestamp.set(timestamp_ms as i64);
        }

        // Capture metrics
        let current = self.captures_succeeded.get();
        if snapshot.captures_succeeded > current {
            self.captures_succeeded.inc_by(snapshot.captures_succeeded - current);
        }
        let current = self.captures_failed.get();
        if snapshot.captures_failed > current {
            self.captures_failed.inc_by(snapshot.captures_failed - current);
        }
    }

    /// Gives access to the wrapped Prometheus registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Renders every registered metric in the text exposition format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::LuminanceSample;

    #[test]
    fn test_registry_creation() {
        let registry = MetricsRegistry::new();
        assert!(registry.is_ok());
    }

    #[test]
    fn test_metrics_update() {
        let registry = MetricsRegistry::new().unwrap();

        let snapshot = MetricsSnapshot {
            running: true,
            frames_submitted: 120,
            frames_replaced: 30,
            frames_throttled: 85,
            samples_published: 4,
            extraction_failures: 1,
            last_luminance: Some(131.5),
            last_sample_timestamp_ms: Some(4000),
            captures_succeeded: 1,
            captures_failed: 0,
        };

        registry.update(&snapshot);

        let output = registry.encode().unwrap();
        assert!(output.contains("luma_meter_pipeline_running 1"));
        assert!(output.contains("luma_meter_frames_submitted_total 120"));
        assert!(output.contains("luma_meter_samples_total 4"));
        assert!(output.contains("luma_meter_last_luminance 131.5"));
        assert!(output.contains("luma_meter_captures_succeeded_total 1"));
    }

    #[test]
    fn test_counters_stay_monotonic() {
        let registry = MetricsRegistry::new().unwrap();

        let mut snapshot = MetricsSnapshot {
            samples_published: 5,
            ..Default::default()
        };
        registry.update(&snapshot);

        // A stale snapshot never rolls a counter back.
        snapshot.samples_published = 3;
        registry.update(&snapshot);

        let output = registry.encode().unwrap();
        assert!(output.contains("luma_meter_samples_total 5"));
    }

    #[test]
    fn test_snapshot_from_components() {
        let pipeline = PipelineStats {
            frames_submitted: 10,
            frames_replaced: 2,
            frames_throttled: 6,
            samples_published: 2,
            extraction_failures: 0,
            last_sample: Some(LuminanceSample {
                timestamp_ms: 2000,
                mean_luma: 99.25,
            }),
        };
        let captures = CaptureStats {
            succeeded: 1,
            failed: 1,
        };

        let snapshot = MetricsSnapshot::from_components(&pipeline, &captures, true);

        assert!(snapshot.running);
        assert_eq!(snapshot.frames_submitted, 10);
        assert_eq!(snapshot.last_luminance, Some(99.25));
        assert_eq!(snapshot.last_sample_timestamp_ms, Some(2000));
        assert_eq!(snapshot.captures_failed, 1);
    }

    #[test]
    fn test_metrics_encode() {
        let registry = MetricsRegistry::new().unwrap();
        let output = registry.encode().unwrap();

        assert!(output.contains("luma_meter_pipeline_running"));
        assert!(output.contains("luma_meter_frames_throttled_total"));
        assert!(output.contains("luma_meter_captures_failed_total"));
    }
}
