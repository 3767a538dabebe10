//! Square-wave audio

use crate::layout::SAMPLE_RATE;

const FREQUENCY: f64 = 440.0;
const AMPLITUDE: i16 = 0x1000;

/// Deterministic stereo square-wave generator
#[derive(Debug, Clone, Default)]
pub struct Tone {
    phase: u32,
}

impl Tone {
    fn half_period() -> u32 {
        (SAMPLE_RATE / FREQUENCY / 2.0) as u32
    }

    pub fn phase(&self) -> u32 {
        self.phase
    }

    pub fn set_phase(&mut self, phase: u32) {
        self.phase = phase % (Self::half_period() * 2);
    }

    /// Fill `out` with interleaved stereo frames
    pub fn fill(&mut self, out: &mut [i16]) {
        let half = Self::half_period();
        for frame in out.chunks_exact_mut(2) {
            let value = if self.phase < half { AMPLITUDE } else { -AMPLITUDE };
            frame[0] = value;
            frame[1] = value;
            self.phase = (self.phase + 1) % (half * 2);
        }
    }
}
