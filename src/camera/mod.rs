//! Camera input and frame handling.
//!
//! This module provides abstractions for acquiring frames from a live
//! source and managing source configuration. The camera is treated as
//! an external collaborator owned by the host: it pushes frames into
//! the pipeline and serves one-shot stills for capture, nothing more.

mod config;
mod frame;
mod source;

pub use config::{AnalysisConfig, CameraConfig, ConfigError, FileConfig, OutputConfig};
pub use frame::RawFrame;
pub use source::{FrameSource, MockCamera, SourceError};
