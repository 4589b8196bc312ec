//! Test helpers

use std::collections::VecDeque;

use rand::RngCore;

/// RNG that yields a fixed script of `f64` draws, then zeros
pub struct ScriptedRng {
    draws: VecDeque<f64>,
}

impl ScriptedRng {
    pub fn new(draws: &[f64]) -> Self {
        Self {
            draws: draws.iter().copied().collect(),
        }
    }
}

impl RngCore for ScriptedRng {
    fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        // `random::<f64>()` keeps the top 53 bits
        let r = self.draws.pop_front().unwrap_or(0.0).clamp(0.0, 1.0 - f64::EPSILON);
        ((r * (1u64 << 53) as f64) as u64) << 11
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        for chunk in dst.chunks_mut(8) {
            let bytes = self.next_u64().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }
}
