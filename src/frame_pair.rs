use crate::frame::Frame;
use std::collections::VecDeque;
use tracing::trace;

/// Number of frames the pair holds before evicting
pub const PAIR_CAPACITY: usize = 2;

/// The two most recent test frames, oldest first.
///
/// Pushing into a full pair evicts the oldest frame before appending, so the
/// pair never holds more than [`PAIR_CAPACITY`] frames and never reorders them.
#[derive(Debug, Default)]
pub struct FramePair {
    frames: VecDeque<Frame>,
    stats: FramePairStats,
}

/// Counters for frames moving through the pair
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FramePairStats {
    pub frames_pushed: u64,
    pub frames_evicted: u64,
}

impl FramePair {
    pub fn new() -> Self {
        Self {
            frames: VecDeque::with_capacity(PAIR_CAPACITY),
            stats: FramePairStats::default(),
        }
    }

    /// Take ownership of a new frame, returning the evicted frame if the pair was full
    pub fn push(&mut self, frame: Frame) -> Option<Frame> {
        let evicted = if self.frames.len() == PAIR_CAPACITY {
            let oldest = self.frames.pop_front();
            if let Some(ref old) = oldest {
                trace!("Evicting frame {} from pair", old.id());
                self.stats.frames_evicted += 1;
            }
            oldest
        } else {
            None
        };

        trace!("Pushing frame {} into pair", frame.id());
        self.frames.push_back(frame);
        self.stats.frames_pushed += 1;

        evicted
    }

    pub fn is_full(&self) -> bool {
        self.frames.len() == PAIR_CAPACITY
    }

    pub fn oldest(&self) -> Option<&Frame> {
        self.frames.front()
    }

    pub fn newest(&self) -> Option<&Frame> {
        self.frames.back()
    }

    /// Both frames, oldest first, when the pair is full
    pub fn pair(&self) -> Option<(&Frame, &Frame)> {
        if self.is_full() {
            Some((&self.frames[0], &self.frames[1]))
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn stats(&self) -> FramePairStats {
        self.stats
    }
}
