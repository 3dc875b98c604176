//! On-demand full-resolution capture.

use crate::camera::{FrameSource, SourceError};

use super::writer::{FrameWriter, PersistError};

/// Reasons a capture attempt can fail.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    /// The source could not deliver a still frame.
    #[error("capture source unavailable: {0}")]
    SourceUnavailable(#[from] SourceError),
    /// The frame was acquired but could not be persisted.
    #[error("still persistence failed: {0}")]
    Persist(#[from] PersistError),
}

/// One capture request.
#[derive(Debug, Clone)]
pub struct CaptureRequest {
    /// Destination name handed to the writer, e.g. a file name.
    pub destination: String,
}

impl CaptureRequest {
    /// Creates a request targeting `destination`.
    pub fn new(destination: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
        }
    }
}

/// Proof that a capture completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureReceipt {
    /// Destination the still was written under.
    pub destination: String,
    /// Source timestamp of the captured frame.
    pub timestamp_ms: u64,
}

/// Counter snapshot for one controller.
#[derive(Debug, Clone, Copy, Default)]
pub struct CaptureStats {
    /// Captures that produced a receipt.
    pub succeeded: u64,
    /// Captures that failed at acquisition or persistence.
    pub failed: u64,
}

/// Drives still captures against a source and a writer.
///
/// Captures are strictly sequential: `capture` borrows the controller
/// mutably, so a second request cannot start until the first returns.
/// Each capture acquires its own full-resolution frame from the source
/// rather than reusing anything held for analysis.
pub struct CaptureController<S, W> {
    source: S,
    writer: W,
    succeeded: u64,
    failed: u64,
}

impl<S: FrameSource, W: FrameWriter> CaptureController<S, W> {
    /// Creates a controller over an already-configured source.
    pub fn new(source: S, writer: W) -> Self {
        Self {
            source,
            writer,
            succeeded: 0,
            failed: 0,
        }
    }

    /// Acquires a still frame and persists it under the request's
    /// destination.
    ///
    /// A failed capture leaves the controller ready for the next
    /// request; nothing is retried here.
    pub fn capture(&mut self, request: &CaptureRequest) -> Result<CaptureReceipt, CaptureError> {
        let outcome = self.try_capture(request);
        match &outcome {
            Ok(receipt) => {
                self.succeeded += 1;
                tracing::info!(
                    destination = %receipt.destination,
                    timestamp_ms = receipt.timestamp_ms,
                    "still captured"
                );
            }
            Err(error) => {
                self.failed += 1;
                tracing::warn!(
                    destination = %request.destination,
                    error = %error,
                    "still capture failed"
                );
            }
        }
        outcome
    }

    fn try_capture(&mut self, request: &CaptureRequest) -> Result<CaptureReceipt, CaptureError> {
        let frame = self.source.still_frame()?;
        self.writer.write_still(&request.destination, &frame)?;
        Ok(CaptureReceipt {
            destination: request.destination.clone(),
            timestamp_ms: frame.timestamp_ms(),
        })
    }

    /// Returns a snapshot of the capture counters.
    pub fn stats(&self) -> CaptureStats {
        CaptureStats {
            succeeded: self.succeeded,
            failed: self.failed,
        }
    }

    /// Borrows the underlying source.
    #[inline]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Borrows the underlying writer.
    #[inline]
    pub fn writer(&self) -> &W {
        &self.writer
    }
}
