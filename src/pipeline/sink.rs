//! Result sink boundary.
//!
//! The pipeline reports fire-and-forget: one tagged event per accepted
//! frame, whether extraction produced a sample or failed. Sinks must
//! not block for long, since they run on the analysis context.

use crate::analysis::{AnalysisError, LuminanceSample};

/// Outcome of analyzing one gate-accepted frame.
#[derive(Debug, Clone)]
pub enum AnalysisEvent {
    /// Extraction succeeded and produced a sample.
    Sample(LuminanceSample),
    /// Extraction failed; the frame was skipped and the pipeline
    /// continues.
    Failed {
        /// Capture time of the offending frame.
        timestamp_ms: u64,
        /// What went wrong.
        error: AnalysisError,
    },
}

/// Receives analysis events from the pipeline.
///
/// No acknowledgment flows back: the pipeline publishes and moves on.
pub trait AnalysisSink: Send + Sync {
    /// Publishes one event.
    fn publish(&self, event: &AnalysisEvent);
}

/// Sink that reports events through `tracing`.
///
/// Samples land at `debug` level, extraction failures at `warn`.
#[derive(Debug, Default)]
pub struct TracingSink;

impl AnalysisSink for TracingSink {
    fn publish(&self, event: &AnalysisEvent) {
        match event {
            AnalysisEvent::Sample(sample) => {
                tracing::debug!(
                    timestamp_ms = sample.timestamp_ms,
                    mean_luma = sample.mean_luma,
                    "scene luminance sample"
                );
            }
            AnalysisEvent::Failed {
                timestamp_ms,
                error,
            } => {
                tracing::warn!(
                    timestamp_ms,
                    error = %error,
                    "frame analysis failed"
                );
            }
        }
    }
}
