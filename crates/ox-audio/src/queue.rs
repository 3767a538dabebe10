//! Bounded stereo sample queue

use std::collections::VecDeque;

/// Interleaved channel count
pub const CHANNELS: usize = 2;

/// Intake counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AudioStats {
    /// Frames accepted through single-sample pushes
    pub single_frames: u64,
    /// Frames accepted through batch pushes
    pub batch_frames: u64,
    /// Frames refused because the queue was full
    pub dropped_frames: u64,
    /// Trailing half-frames ignored in odd-length batches
    pub odd_samples: u64,
}

/// Bounded FIFO of interleaved stereo frames
///
/// Capacity is counted in frames (left/right pairs). A batch push accepts the
/// longest prefix that fits and returns its frame count, which is exactly the
/// partial-consumption value a batch callback reports back to the core.
#[derive(Debug, Clone)]
pub struct SampleQueue {
    samples: VecDeque<i16>,
    capacity_frames: usize,
    enabled: bool,
    stats: AudioStats,
}

impl SampleQueue {
    pub fn new(capacity_frames: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity_frames * CHANNELS),
            capacity_frames,
            enabled: true,
            stats: AudioStats::default(),
        }
    }

    /// Queue that accepts and discards everything
    pub fn disabled() -> Self {
        let mut queue = Self::new(0);
        queue.enabled = false;
        queue
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn capacity_frames(&self) -> usize {
        self.capacity_frames
    }

    /// Frames currently queued
    pub fn len_frames(&self) -> usize {
        self.samples.len() / CHANNELS
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Free space in frames
    pub fn available_frames(&self) -> usize {
        self.capacity_frames.saturating_sub(self.len_frames())
    }

    pub fn stats(&self) -> AudioStats {
        self.stats
    }

    /// Queue one stereo frame; returns false when it was dropped
    pub fn push_sample(&mut self, left: i16, right: i16) -> bool {
        if !self.enabled {
            self.stats.single_frames += 1;
            return true;
        }

        if self.available_frames() == 0 {
            self.stats.dropped_frames += 1;
            return false;
        }

        self.samples.push_back(left);
        self.samples.push_back(right);
        self.stats.single_frames += 1;
        true
    }

    /// Queue as many whole frames of `data` as fit, returning the count
    pub fn push_batch(&mut self, data: &[i16]) -> usize {
        let frames = data.len() / CHANNELS;
        if data.len() % CHANNELS != 0 {
            self.stats.odd_samples += 1;
            tracing::trace!("Ignoring trailing half-frame in batch of {} samples", data.len());
        }

        if !self.enabled {
            self.stats.batch_frames += frames as u64;
            return frames;
        }

        let accepted = frames.min(self.available_frames());
        self.samples.extend(data[..accepted * CHANNELS].iter().copied());
        self.stats.batch_frames += accepted as u64;
        if accepted < frames {
            self.stats.dropped_frames += (frames - accepted) as u64;
            tracing::trace!("Audio queue full: accepted {}/{} frames", accepted, frames);
        }
        accepted
    }

    /// Remove up to `max_frames` frames from the front
    pub fn drain_frames(&mut self, max_frames: usize) -> Vec<i16> {
        let count = max_frames.min(self.len_frames()) * CHANNELS;
        self.samples.drain(..count).collect()
    }

    /// Remove everything
    pub fn drain_all(&mut self) -> Vec<i16> {
        self.samples.drain(..).collect()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

impl Default for SampleQueue {
    fn default() -> Self {
        Self::new(4096)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_sample() {
        let mut queue = SampleQueue::new(2);
        assert!(queue.push_sample(1, -1));
        assert!(queue.push_sample(2, -2));
        assert!(!queue.push_sample(3, -3));
        assert_eq!(queue.len_frames(), 2);
        assert_eq!(queue.stats().dropped_frames, 1);
        assert_eq!(queue.drain_all(), vec![1, -1, 2, -2]);
    }

    #[test]
    fn test_batch_partial_consumption() {
        let mut queue = SampleQueue::new(3);
        let batch: Vec<i16> = (0..10).collect();

        assert_eq!(queue.push_batch(&batch), 3);
        assert_eq!(queue.available_frames(), 0);
        assert_eq!(queue.push_batch(&batch[6..]), 0);

        assert_eq!(queue.drain_frames(1), vec![0, 1]);
        assert_eq!(queue.push_batch(&batch[6..]), 1);
        assert_eq!(queue.drain_all(), vec![2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_odd_batch_ignores_trailing_sample() {
        let mut queue = SampleQueue::new(8);
        assert_eq!(queue.push_batch(&[1, 2, 3]), 1);
        assert_eq!(queue.stats().odd_samples, 1);
        assert_eq!(queue.len_frames(), 1);
    }

    #[test]
    fn test_disabled_accepts_everything() {
        let mut queue = SampleQueue::disabled();
        assert_eq!(queue.push_batch(&[0; 64]), 32);
        assert!(queue.push_sample(0, 0));
        assert!(queue.is_empty());
        assert_eq!(queue.stats().batch_frames, 32);
    }
}
