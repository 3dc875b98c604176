//! Latest-frame register shared between the producer and analysis contexts.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwapOption;

use crate::camera::RawFrame;

/// Traffic counters for the frame slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BufferStats {
    /// Frames ever submitted.
    pub submitted: u64,
    /// Frames overwritten before the analysis context took them.
    pub replaced: u64,
}

/// Single-slot overwrite register holding the most recent frame.
///
/// This is the backpressure policy in one type: `submit` replaces
/// whatever frame is held, unconditionally, so a slow consumer only
/// ever sees the latest state of the world and held memory stays
/// bounded at one frame. Reads are pull-consume: `take_latest`
/// atomically empties the slot, so no frame is analyzed twice and the
/// sole frame ever submitted is never skipped.
///
/// Both sides are lock-free pointer swaps; a frame is either fully in
/// the slot or absent, never torn.
pub struct FrameBuffer {
    slot: ArcSwapOption<RawFrame>,
    submitted: AtomicU64,
    replaced: AtomicU64,
}

impl FrameBuffer {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self {
            slot: ArcSwapOption::empty(),
            submitted: AtomicU64::new(0),
            replaced: AtomicU64::new(0),
        }
    }

    /// Stores a frame, discarding any frame currently held.
    ///
    /// Never blocks: the producer context is free to call this at the
    /// source's native rate regardless of how slow analysis is.
    pub fn submit(&self, frame: RawFrame) {
        let previous = self.slot.swap(Some(Arc::new(frame)));
        self.submitted.fetch_add(1, Ordering::Relaxed);
        if previous.is_some() {
            self.replaced.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Takes the held frame, leaving the slot empty.
    pub fn take_latest(&self) -> Option<Arc<RawFrame>> {
        self.slot.swap(None)
    }

    /// Drops the held frame without counting it as replaced.
    pub fn clear(&self) {
        self.slot.store(None);
    }

    /// Returns true if no frame is held.
    pub fn is_empty(&self) -> bool {
        self.slot.load().is_none()
    }

    /// Returns a snapshot of the traffic counters.
    pub fn stats(&self) -> BufferStats {
        BufferStats {
            submitted: self.submitted.load(Ordering::Relaxed),
            replaced: self.replaced.load(Ordering::Relaxed),
        }
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(fill: u8, timestamp_ms: u64) -> RawFrame {
        RawFrame::new(vec![fill; 16], 4, 4, timestamp_ms)
    }

    #[test]
    fn test_take_from_empty() {
        let buffer = FrameBuffer::new();
        assert!(buffer.take_latest().is_none());
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_newest_frame_wins() {
        let buffer = FrameBuffer::new();

        buffer.submit(frame(10, 0));
        buffer.submit(frame(20, 33));

        let taken = buffer.take_latest().unwrap();
        assert_eq!(taken.luma()[0], 20);
        assert_eq!(taken.timestamp_ms(), 33);

        let stats = buffer.stats();
        assert_eq!(stats.submitted, 2);
        assert_eq!(stats.replaced, 1);
    }

    #[test]
    fn test_take_consumes() {
        let buffer = FrameBuffer::new();
        buffer.submit(frame(5, 0));

        assert!(buffer.take_latest().is_some());
        assert!(buffer.take_latest().is_none());
    }

    #[test]
    fn test_clear_is_not_a_replacement() {
        let buffer = FrameBuffer::new();
        buffer.submit(frame(5, 0));
        buffer.clear();

        assert!(buffer.is_empty());
        assert_eq!(buffer.stats().replaced, 0);
    }

    #[test]
    fn test_concurrent_submit_and_take() {
        use std::thread;

        let buffer = Arc::new(FrameBuffer::new());
        let total = 2000u64;

        let producer = {
            let buffer = Arc::clone(&buffer);
            thread::spawn(move || {
                for i in 0..total {
                    buffer.submit(frame((i % 256) as u8, i));
                }
            })
        };

        let consumer = {
            let buffer = Arc::clone(&buffer);
            thread::spawn(move || {
                let mut taken = 0u64;
                let mut last_ts = None;
                while buffer.stats().submitted < total || !buffer.is_empty() {
                    if let Some(f) = buffer.take_latest() {
                        // A frame is never torn and never goes backward.
                        assert!(f.is_valid());
                        if let Some(prev) = last_ts {
                            assert!(f.timestamp_ms() > prev);
                        }
                        last_ts = Some(f.timestamp_ms());
                        taken += 1;
                    }
                }
                taken
            })
        };

        producer.join().unwrap();
        let taken = consumer.join().unwrap();

        // Joins make every submission visible; drain anything the
        // consumer exited past.
        let leftover = u64::from(buffer.take_latest().is_some());

        let stats = buffer.stats();
        assert_eq!(stats.submitted, total);
        assert!(buffer.is_empty());
        // Every frame was either taken or overwritten.
        assert_eq!(taken + leftover + stats.replaced, total);
    }
}
