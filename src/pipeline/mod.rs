//! Frame ingestion and throttled analysis.
//!
//! The pipeline decouples two lines of activity: a producer context
//! pushing frames at the source's native rate through
//! [`submit`](AnalysisPipeline::submit), and an analysis context
//! pulling on its own cadence through [`poll`](AnalysisPipeline::poll).
//! The single shared resource between them is the [`FrameBuffer`]
//! latest-frame register, so frame delivery never waits on analysis
//! and analysis never sees a backlog, only the most recent frame.
//!
//! The pipeline owns no thread of its own; the host supplies both
//! contexts and drives the lifecycle with
//! [`start`](AnalysisPipeline::start) / [`stop`](AnalysisPipeline::stop).

mod buffer;
mod sink;

pub use buffer::{BufferStats, FrameBuffer};
pub use sink::{AnalysisEvent, AnalysisSink, TracingSink};

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::analysis::{mean_luma, AnalysisError, LuminanceSample, RateGate};
use crate::camera::{AnalysisConfig, RawFrame};

/// What one analysis poll did.
#[derive(Debug, Clone)]
pub enum PollOutcome {
    /// No frame was waiting, or the pipeline is stopped.
    Idle,
    /// A frame was waiting but the rate gate refused it.
    Throttled,
    /// A sample was produced and published to the sink.
    Sample(LuminanceSample),
    /// Extraction failed; the failure was published to the sink.
    Failed(AnalysisError),
}

/// Counter snapshot for one pipeline.
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Frames accepted into the buffer.
    pub frames_submitted: u64,
    /// Frames overwritten before analysis saw them.
    pub frames_replaced: u64,
    /// Frames taken but refused by the rate gate.
    pub frames_throttled: u64,
    /// Samples published to the sink.
    pub samples_published: u64,
    /// Extraction failures published to the sink.
    pub extraction_failures: u64,
    /// Most recent sample, if any.
    pub last_sample: Option<LuminanceSample>,
}

/// Composes the latest-frame buffer, the rate gate, and the extractor.
///
/// `submit` and `poll` both take `&self`, so one pipeline instance can
/// be shared (e.g. in an `Arc`) between the producer and analysis
/// contexts. Extraction failures are published like samples and never
/// stop the pipeline: the design degrades by skipping a sample, not by
/// halting.
pub struct AnalysisPipeline<S> {
    buffer: FrameBuffer,
    /// Gate state belongs to the analysis context; the mutex only
    /// covers accidental concurrent polls.
    gate: Mutex<RateGate>,
    sink: S,
    running: AtomicBool,
    throttled: AtomicU64,
    samples: AtomicU64,
    failures: AtomicU64,
    last_sample: Mutex<Option<LuminanceSample>>,
}

impl<S: AnalysisSink> AnalysisPipeline<S> {
    /// Creates a stopped pipeline with the given sink.
    pub fn new(config: AnalysisConfig, sink: S) -> Self {
        Self {
            buffer: FrameBuffer::new(),
            gate: Mutex::new(RateGate::new(config.interval_ms)),
            sink,
            running: AtomicBool::new(false),
            throttled: AtomicU64::new(0),
            samples: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            last_sample: Mutex::new(None),
        }
    }

    /// Starts accepting frames. Idempotent.
    ///
    /// Restarting does not re-open the rate gate: the last accepted
    /// timestamp survives stop/start cycles, so throttling cannot be
    /// defeated by bouncing the pipeline.
    pub fn start(&self) {
        if !self.running.swap(true, Ordering::SeqCst) {
            tracing::info!("analysis pipeline started");
        }
    }

    /// Stops accepting frames and drops the held frame, if any.
    pub fn stop(&self) {
        if self.running.swap(false, Ordering::SeqCst) {
            self.buffer.clear();
            tracing::info!("analysis pipeline stopped");
        }
    }

    /// Returns true between `start` and `stop`.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Ingests one frame from the producer context.
    ///
    /// Replaces any frame already held and returns immediately; this
    /// never blocks on analysis. Frames submitted while the pipeline
    /// is stopped are discarded.
    pub fn submit(&self, frame: RawFrame) {
        if !self.is_running() {
            tracing::trace!("frame discarded: pipeline stopped");
            return;
        }
        self.buffer.submit(frame);
    }

    /// Runs one analysis turn on the caller's context.
    ///
    /// Takes the held frame (if any), offers its timestamp to the rate
    /// gate, and on acceptance extracts a sample and publishes the
    /// outcome to the sink. A gate-refused frame is discarded; the
    /// next poll will see a newer one.
    pub fn poll(&self) -> PollOutcome {
        if !self.is_running() {
            return PollOutcome::Idle;
        }

        let frame = match self.buffer.take_latest() {
            Some(frame) => frame,
            None => return PollOutcome::Idle,
        };

        let accepted = self
            .gate
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .admit(frame.timestamp_ms());

        if !accepted {
            self.throttled.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(timestamp_ms = frame.timestamp_ms(), "frame throttled");
            return PollOutcome::Throttled;
        }

        match Self::extract(&frame) {
            Ok(sample) => {
                self.samples.fetch_add(1, Ordering::Relaxed);
                *self
                    .last_sample
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner) = Some(sample);
                self.sink.publish(&AnalysisEvent::Sample(sample));
                PollOutcome::Sample(sample)
            }
            Err(error) => {
                self.failures.fetch_add(1, Ordering::Relaxed);
                self.sink.publish(&AnalysisEvent::Failed {
                    timestamp_ms: frame.timestamp_ms(),
                    error: error.clone(),
                });
                PollOutcome::Failed(error)
            }
        }
    }

    /// Returns a snapshot of the pipeline counters.
    pub fn stats(&self) -> PipelineStats {
        let buffer = self.buffer.stats();
        PipelineStats {
            frames_submitted: buffer.submitted,
            frames_replaced: buffer.replaced,
            frames_throttled: self.throttled.load(Ordering::Relaxed),
            samples_published: self.samples.load(Ordering::Relaxed),
            extraction_failures: self.failures.load(Ordering::Relaxed),
            last_sample: *self
                .last_sample
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        }
    }

    fn extract(frame: &RawFrame) -> Result<LuminanceSample, AnalysisError> {
        if frame.luma().is_empty() {
            return Err(AnalysisError::EmptyPlane);
        }
        if !frame.is_valid() {
            return Err(AnalysisError::GeometryMismatch {
                width: frame.width(),
                height: frame.height(),
                stride: frame.stride(),
                expected: frame.expected_len(),
                actual: frame.luma().len(),
            });
        }

        let mean = mean_luma(frame.luma())?;
        Ok(LuminanceSample {
            timestamp_ms: frame.timestamp_ms(),
            mean_luma: mean,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Sink that records every published event.
    #[derive(Default)]
    struct RecordingSink {
        events: Mutex<Vec<AnalysisEvent>>,
    }

    impl RecordingSink {
        fn events(&self) -> Vec<AnalysisEvent> {
            self.events.lock().unwrap().clone()
        }
    }

    impl AnalysisSink for RecordingSink {
        fn publish(&self, event: &AnalysisEvent) {
            self.events.lock().unwrap().push(event.clone());
        }
    }

    fn pipeline(interval_ms: u64) -> AnalysisPipeline<RecordingSink> {
        let p = AnalysisPipeline::new(
            AnalysisConfig { interval_ms },
            RecordingSink::default(),
        );
        p.start();
        p
    }

    fn frame(fill: u8, timestamp_ms: u64) -> RawFrame {
        RawFrame::new(vec![fill; 64], 8, 8, timestamp_ms)
    }

    #[test]
    fn test_first_frame_always_sampled() {
        let p = pipeline(1000);
        p.submit(frame(42, 777_777));

        match p.poll() {
            PollOutcome::Sample(sample) => {
                assert_eq!(sample.mean_luma, 42.0);
                assert_eq!(sample.timestamp_ms, 777_777);
            }
            other => panic!("expected sample, got {:?}", other),
        }
    }

    #[test]
    fn test_poll_idle_without_frames() {
        let p = pipeline(1000);
        assert!(matches!(p.poll(), PollOutcome::Idle));
    }

    #[test]
    fn test_newest_frame_is_analyzed() {
        let p = pipeline(1000);

        // Two frames in quick succession, no poll between them.
        p.submit(frame(10, 0));
        p.submit(frame(30, 16));

        match p.poll() {
            PollOutcome::Sample(sample) => assert_eq!(sample.mean_luma, 30.0),
            other => panic!("expected sample, got {:?}", other),
        }
        assert_eq!(p.stats().frames_replaced, 1);
    }

    #[test]
    fn test_quick_succession_throttled() {
        let p = pipeline(1000);

        p.submit(frame(10, 0));
        assert!(matches!(p.poll(), PollOutcome::Sample(_)));

        p.submit(frame(20, 500));
        assert!(matches!(p.poll(), PollOutcome::Throttled));

        p.submit(frame(30, 1000));
        assert!(matches!(p.poll(), PollOutcome::Sample(_)));

        let stats = p.stats();
        assert_eq!(stats.samples_published, 2);
        assert_eq!(stats.frames_throttled, 1);
    }

    #[test]
    fn test_stopped_pipeline_discards_frames() {
        let p = AnalysisPipeline::new(AnalysisConfig::default(), RecordingSink::default());

        p.submit(frame(10, 0));
        assert!(matches!(p.poll(), PollOutcome::Idle));
        assert_eq!(p.stats().frames_submitted, 0);
    }

    #[test]
    fn test_stop_drops_held_frame() {
        let p = pipeline(1000);

        p.submit(frame(10, 0));
        p.stop();
        p.start();

        assert!(matches!(p.poll(), PollOutcome::Idle));
    }

    #[test]
    fn test_restart_keeps_gate_closed() {
        let p = pipeline(1000);

        p.submit(frame(10, 0));
        assert!(matches!(p.poll(), PollOutcome::Sample(_)));

        p.stop();
        p.start();

        // Within the interval of the pre-restart sample.
        p.submit(frame(20, 500));
        assert!(matches!(p.poll(), PollOutcome::Throttled));
    }

    #[test]
    fn test_extraction_failure_does_not_halt() {
        let p = pipeline(1000);

        // Plane too short for the declared geometry.
        p.submit(RawFrame::new(vec![0u8; 10], 100, 100, 0));
        assert!(matches!(
            p.poll(),
            PollOutcome::Failed(AnalysisError::GeometryMismatch { .. })
        ));

        // The failed frame advanced the gate, so failures are
        // rate-limited like samples.
        p.submit(frame(20, 500));
        assert!(matches!(p.poll(), PollOutcome::Throttled));

        p.submit(frame(20, 1000));
        assert!(matches!(p.poll(), PollOutcome::Sample(_)));

        let stats = p.stats();
        assert_eq!(stats.extraction_failures, 1);
        assert_eq!(stats.samples_published, 1);
    }

    #[test]
    fn test_sink_sees_samples_and_failures() {
        let p = pipeline(100);

        p.submit(frame(50, 0));
        p.poll();
        p.submit(RawFrame::new(Vec::new(), 8, 8, 200));
        p.poll();

        let events = p.sink.events();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], AnalysisEvent::Sample(s) if s.mean_luma == 50.0));
        assert!(matches!(
            events[1],
            AnalysisEvent::Failed {
                timestamp_ms: 200,
                error: AnalysisError::EmptyPlane,
            }
        ));
    }

    #[test]
    fn test_last_sample_tracked() {
        let p = pipeline(100);

        p.submit(frame(50, 0));
        p.poll();
        p.submit(frame(60, 100));
        p.poll();

        let last = p.stats().last_sample.unwrap();
        assert_eq!(last.mean_luma, 60.0);
        assert_eq!(last.timestamp_ms, 100);
    }

    #[test]
    fn test_concurrent_producer_and_analyst() {
        use std::thread;

        let interval_ms = 200u64;
        let total = 500u64;
        let p = Arc::new(pipeline(interval_ms));

        let producer = {
            let p = Arc::clone(&p);
            thread::spawn(move || {
                for i in 0..total {
                    // 10ms of frame time per submission.
                    p.submit(frame((i % 200) as u8, i * 10));
                }
            })
        };

        let analyst = {
            let p = Arc::clone(&p);
            thread::spawn(move || {
                while p.stats().frames_submitted < total {
                    p.poll();
                }
            })
        };

        producer.join().unwrap();
        analyst.join().unwrap();

        // Joins make every submission visible; drain the last frame if
        // the analyst exited past it.
        p.poll();

        let stats = p.stats();
        assert_eq!(stats.frames_submitted, total);

        // Sample count respects the rate bound over the frame-time span.
        let span = (total - 1) * 10;
        assert!(stats.samples_published >= 1);
        assert!(stats.samples_published <= span / interval_ms + 1);
        assert_eq!(stats.extraction_failures, 0);

        // Accepted timestamps are spaced by at least the interval.
        let events = p.sink.events();
        let timestamps: Vec<u64> = events
            .iter()
            .map(|e| match e {
                AnalysisEvent::Sample(s) => s.timestamp_ms,
                AnalysisEvent::Failed { timestamp_ms, .. } => *timestamp_ms,
            })
            .collect();
        for pair in timestamps.windows(2) {
            assert!(pair[1] - pair[0] >= interval_ms);
        }
    }
}
