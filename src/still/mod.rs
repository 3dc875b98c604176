//! Full-resolution still capture, independent of the analysis path.

mod controller;
mod writer;

pub use controller::{CaptureController, CaptureError, CaptureReceipt, CaptureRequest, CaptureStats};
pub use writer::{FrameWriter, MockWriter, PersistError};
