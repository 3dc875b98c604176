//! Mean luminance extraction.
//!
//! The luma plane is a sequence of unsigned 8-bit samples; the metric
//! is their arithmetic mean. Every byte is widened unsigned before
//! accumulation; a signed interpretation would skew the mean for
//! samples above 127.

use thiserror::Error;

/// Errors produced while analyzing a frame.
#[derive(Debug, Clone, Error)]
pub enum AnalysisError {
    #[error("empty luma plane")]
    EmptyPlane,
    #[error(
        "plane geometry mismatch: {width}x{height} stride {stride} implies {expected} bytes, got {actual}"
    )]
    GeometryMismatch {
        width: u32,
        height: u32,
        stride: u32,
        expected: usize,
        actual: usize,
    },
}

/// One luminance measurement for an accepted frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LuminanceSample {
    /// Capture time of the measured frame, monotonic milliseconds.
    pub timestamp_ms: u64,
    /// Mean luma over the plane, in [0, 255].
    pub mean_luma: f64,
}

/// Computes the mean luminance of a luma plane.
///
/// A single linear pass accumulating into `u64`, so the sum is exact
/// for any plane shorter than 2^56 bytes and the mean is the true
/// arithmetic mean rounded once.
///
/// An empty plane is undefined input and returns
/// [`AnalysisError::EmptyPlane`] rather than dividing by zero.
pub fn mean_luma(plane: &[u8]) -> Result<f64, AnalysisError> {
    if plane.is_empty() {
        return Err(AnalysisError::EmptyPlane);
    }

    let sum: u64 = plane.iter().map(|&b| u64::from(b)).sum();
    Ok(sum as f64 / plane.len() as f64)
}
