//! Audio intake for oxidized-retro frontends
//!
//! Cores push interleaved signed 16-bit stereo, either one frame at a time
//! or in batches. The frontend queues what fits and reports how many frames
//! it accepted; output and mixing happen elsewhere.

pub mod queue;

pub use queue::{AudioStats, SampleQueue, CHANNELS};
