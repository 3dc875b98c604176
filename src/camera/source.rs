//! Frame source abstraction.
//!
//! This module provides a trait-based abstraction over the live frame
//! source, allowing for both real camera backends and mock
//! implementations for testing. The source pushes nothing by itself:
//! the host drives it and forwards frames into the pipeline.

use super::{CameraConfig, RawFrame};
use thiserror::Error;

/// Errors that can occur while operating a frame source.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("frame source not open")]
    NotOpen,
    #[error("failed to open frame source: {0}")]
    OpenFailed(String),
    #[error("invalid source configuration: {0}")]
    ConfigFailed(String),
    #[error("failed to acquire frame: {0}")]
    AcquireFailed(String),
}

/// Trait for frame source implementations.
///
/// A source serves two distinct streams from the same device: the
/// preview-resolution stream consumed by the analysis pipeline
/// ([`next_frame`](FrameSource::next_frame)) and one-shot
/// full-resolution frames for still capture
/// ([`still_frame`](FrameSource::still_frame)). Frame timestamps are
/// monotonic milliseconds and non-decreasing across `next_frame` calls.
pub trait FrameSource {
    /// Opens the source with the given configuration.
    fn open(&mut self, config: &CameraConfig) -> Result<(), SourceError>;

    /// Acquires the next preview-resolution frame.
    fn next_frame(&mut self) -> Result<RawFrame, SourceError>;

    /// Acquires a single full-resolution frame for still capture.
    fn still_frame(&mut self) -> Result<RawFrame, SourceError>;

    /// Checks if the source is currently open.
    fn is_open(&self) -> bool;

    /// Closes the source and releases resources.
    fn close(&mut self);
}

/// Mock frame source that generates synthetic frames.
///
/// Timestamps are synthesized from the configured frame rate, so a
/// sequence of `next_frame` calls behaves like a camera delivering at
/// that rate on a monotonic clock.
#[derive(Debug, Default)]
pub struct MockCamera {
    config: Option<CameraConfig>,
    sequence: u64,
}

impl MockCamera {
    /// Creates a closed mock source.
    pub fn new() -> Self {
        Self::default()
    }

    fn frame_period_ms(config: &CameraConfig) -> u64 {
        1000 / u64::from(config.fps)
    }

    // Synthetic luma pattern, for tests and demos only. The base level
    // sweeps with the sequence number so mean luminance visibly changes
    // from frame to frame.
    fn pattern(sequence: u64, width: u32, height: u32) -> Vec<u8> {
        let len = (width as usize) * (height as usize);
        let base = (sequence * 11) % 200;
        (0..len).map(|i| (base + (i as u64 % 56)) as u8).collect()
    }
}

impl FrameSource for MockCamera {
    fn open(&mut self, config: &CameraConfig) -> Result<(), SourceError> {
        config
            .validate()
            .map_err(|e| SourceError::ConfigFailed(e.to_string()))?;
        self.config = Some(config.clone());
        self.sequence = 0;
        tracing::info!("Mock camera opened: {:?}", config);
        Ok(())
    }

    fn next_frame(&mut self) -> Result<RawFrame, SourceError> {
        let config = self.config.as_ref().ok_or(SourceError::NotOpen)?;

        let timestamp_ms = self.sequence * Self::frame_period_ms(config);
        let luma = Self::pattern(self.sequence, config.width, config.height);
        self.sequence += 1;

        Ok(RawFrame::new(
            luma,
            config.width,
            config.height,
            timestamp_ms,
        ))
    }

    fn still_frame(&mut self) -> Result<RawFrame, SourceError> {
        let config = self.config.as_ref().ok_or(SourceError::NotOpen)?;

        // Stills do not advance the preview clock.
        let timestamp_ms = self.sequence * Self::frame_period_ms(config);
        let luma = Self::pattern(self.sequence, config.still_width, config.still_height);

        Ok(RawFrame::new(
            luma,
            config.still_width,
            config.still_height,
            timestamp_ms,
        ))
    }

    fn is_open(&self) -> bool {
        self.config.is_some()
    }

    fn close(&mut self) {
        self.config = None;
        tracing::info!("Mock camera closed");
    }
}
