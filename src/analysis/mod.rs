//! Luminance measurement and throttling.
//!
//! This module holds the two pure pieces of the analysis path: the
//! extractor that turns a luma plane into a mean-luminance sample, and
//! the rate gate that decides which frames are worth a sample at all.

mod luminance;
mod rate;

pub use luminance::{mean_luma, AnalysisError, LuminanceSample};
pub use rate::RateGate;
