//! Persistence boundary for captured stills.

use std::error::Error;

use crate::camera::RawFrame;

/// Failure to persist a captured frame.
///
/// Carries the writer's own description plus the underlying error when
/// one exists, so callers can log the full chain without knowing the
/// backend.
#[derive(Debug, thiserror::Error)]
#[error("{reason}")]
pub struct PersistError {
    /// Writer-level description of what went wrong.
    pub reason: String,
    /// Backend error that caused the failure, if any.
    #[source]
    pub cause: Option<Box<dyn Error + Send + Sync>>,
}

impl PersistError {
    /// Creates an error with no underlying cause.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            cause: None,
        }
    }

    /// Creates an error wrapping a backend error.
    pub fn with_cause(
        reason: impl Into<String>,
        cause: impl Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            reason: reason.into(),
            cause: Some(Box::new(cause)),
        }
    }
}

/// Destination for full-resolution stills.
///
/// Implementations own the encoding and storage details; the capture
/// controller only hands over the raw frame and a destination name.
pub trait FrameWriter {
    /// Persists one frame under the given destination name.
    fn write_still(&mut self, destination: &str, frame: &RawFrame) -> Result<(), PersistError>;
}

/// In-memory writer for tests and demos.
///
/// Records every destination it was asked to write. When constructed
/// with [`MockWriter::failing`], every write fails with the configured
/// reason instead.
#[derive(Debug, Default)]
pub struct MockWriter {
    destinations: Vec<String>,
    fail_reason: Option<String>,
}

impl MockWriter {
    /// Creates a writer that accepts every frame.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a writer that rejects every frame with `reason`.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            destinations: Vec::new(),
            fail_reason: Some(reason.into()),
        }
    }

    /// Destinations written so far, in order.
    pub fn written(&self) -> &[String] {
        &self.destinations
    }
}

impl FrameWriter for MockWriter {
    fn write_still(&mut self, destination: &str, frame: &RawFrame) -> Result<(), PersistError> {
        if let Some(reason) = &self.fail_reason {
            return Err(PersistError::new(reason.clone()));
        }
        if frame.luma().is_empty() {
            return Err(PersistError::new("refusing to write empty frame"));
        }
        self.destinations.push(destination.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_writer_records_destinations() {
        let mut writer = MockWriter::new();
        let frame = RawFrame::new(vec![1u8; 4], 2, 2, 0);

        writer.write_still("a.jpg", &frame).unwrap();
        writer.write_still("b.jpg", &frame).unwrap();

        assert_eq!(writer.written(), ["a.jpg", "b.jpg"]);
    }

    #[test]
    fn test_failing_writer_reports_reason() {
        let mut writer = MockWriter::failing("disk full");
        let frame = RawFrame::new(vec![1u8; 4], 2, 2, 0);

        let err = writer.write_still("a.jpg", &frame).unwrap_err();
        assert_eq!(err.to_string(), "disk full");
        assert!(writer.written().is_empty());
    }

    #[test]
    fn test_persist_error_chains_cause() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err = PersistError::with_cause("could not open destination", io);

        assert_eq!(err.to_string(), "could not open destination");
        let source = std::error::Error::source(&err).unwrap();
        assert!(source.to_string().contains("read-only"));
    }
}
