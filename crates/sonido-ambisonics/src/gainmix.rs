//! Per-output-channel pan-gain projection and ramping (§3's `PanGain`/
//! `CurrentGain` matrices).
//!
//! Grounded in the teacher's `LinearSmoothedParam` idiom
//! (`sonido_core::param::LinearSmoothedParam`): a constant-rate ramp from
//! the matrix currently in effect toward the latest pan target, completing
//! exactly at the end of the block rather than using the coefficient
//! cross-fade machinery (which is reserved for `FADE_SAMPLES`-windowed
//! tap/coefficient changes per §4.2/§4.4).

use crate::constants::{MAX_OUTPUT_CHANNELS, NUM_LINES};
use crate::vecap::Block;

/// `NUM_LINES × MAX_OUTPUT_CHANNELS` gain matrix with a target (`pan`) and a
/// per-sample ramped value (`current`) that chases it.
#[derive(Debug, Clone, Copy)]
pub struct GainMatrix {
    pan: [[f32; MAX_OUTPUT_CHANNELS]; NUM_LINES],
    current: [[f32; MAX_OUTPUT_CHANNELS]; NUM_LINES],
}

impl Default for GainMatrix {
    fn default() -> Self {
        Self {
            pan: [[0.0; MAX_OUTPUT_CHANNELS]; NUM_LINES],
            current: [[0.0; MAX_OUTPUT_CHANNELS]; NUM_LINES],
        }
    }
}

impl GainMatrix {
    pub(crate) fn set_target(&mut self, target: [[f32; MAX_OUTPUT_CHANNELS]; NUM_LINES]) {
        self.pan = target;
    }

    /// Snaps `current` to `pan` immediately (used on a hard device re-init).
    pub(crate) fn snap(&mut self) {
        self.current = self.pan;
    }

    /// Mixes `source[line][0..todo]` into `out[channel][0..todo]`, ramping
    /// `current` linearly toward `pan` over the block and landing exactly
    /// on `pan` at the last sample.
    pub(crate) fn mix_into(&mut self, source: &Block, todo: usize, num_out: usize, out: &mut [&mut [f32]]) {
        if todo == 0 {
            return;
        }
        let step = 1.0 / todo as f32;
        for i in 0..todo {
            let f = (i + 1) as f32 * step;
            for line in 0..NUM_LINES {
                let sample = source[line][i];
                if sample == 0.0 {
                    continue;
                }
                for (ch, out_channel) in out.iter_mut().enumerate().take(num_out) {
                    let start = self.current[line][ch];
                    let end = self.pan[line][ch];
                    let gain = start + (end - start) * f;
                    out_channel[i] += sample * gain;
                }
            }
        }
        self.current = self.pan;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snap_makes_current_match_pan_immediately() {
        let mut gain = GainMatrix::default();
        let mut target = [[0.0; MAX_OUTPUT_CHANNELS]; NUM_LINES];
        target[0][0] = 0.5;
        target[2][1] = 0.25;
        gain.set_target(target);
        gain.snap();
        assert_eq!(gain.current, target);
    }

    #[test]
    fn mix_into_ramps_from_zero_and_lands_exactly_on_target() {
        let mut gain = GainMatrix::default();
        let mut target = [[0.0; MAX_OUTPUT_CHANNELS]; NUM_LINES];
        target[0][0] = 1.0;
        gain.set_target(target);

        let mut source: Block = [[0.0; crate::constants::MAX_UPDATE_SAMPLES]; NUM_LINES];
        source[0][..8].fill(1.0);
        let mut left = [0.0_f32; 8];
        let mut right = [0.0_f32; 8];
        {
            let mut out: [&mut [f32]; 2] = [&mut left, &mut right];
            gain.mix_into(&source, 8, 2, &mut out);
        }
        assert!((left[7] - 1.0).abs() < 1e-6);
        assert!(left[0] < left[7]);
        assert_eq!(gain.current, target);
    }

    #[test]
    fn mix_into_skips_silent_samples_without_panicking() {
        let mut gain = GainMatrix::default();
        let source: Block = [[0.0; crate::constants::MAX_UPDATE_SAMPLES]; NUM_LINES];
        let mut left = [0.0_f32; 4];
        let mut right = [0.0_f32; 4];
        let mut out: [&mut [f32]; 2] = [&mut left, &mut right];
        gain.mix_into(&source, 4, 2, &mut out);
        assert_eq!(left, [0.0; 4]);
    }
}
