//! Late reverb stage (§4.4): a four-line modified FDN.
//!
//! Grounded on `sonido_effects::reverb::Reverb`'s late-tail feedback loop,
//! adapted from its Hadamard-8 topology to the Gerzon 4×4 scattering matrix
//! and a per-line T60 filter (`sonido_core::Biquad`-backed, see
//! [`crate::t60`]) instead of the teacher's single damping one-pole.

use crate::constants::{FADE_SAMPLES, NUM_LINES};
use crate::dual::Dual;
use crate::gainmix::GainMatrix;
use crate::ring::{DelayLine, RingBuffer};
use crate::scatter::ScatterMix;
use crate::t60::T60Filter;
use crate::vecap::{Block, VecAllpass};

/// Feedback delay, per-line T60 filter, diffusion all-pass, density gain,
/// and pan-gain matrix for the late stage (§3).
#[derive(Debug, Clone)]
pub struct LateReverb {
    feedback: DelayLine,
    offset: [Dual<usize>; NUM_LINES],
    t60: [T60Filter; NUM_LINES],
    vecap: VecAllpass,
    density_gain: Dual<f32>,
    gain: GainMatrix,
}

impl LateReverb {
    pub(crate) fn new(feedback: DelayLine, vecap_delay: DelayLine) -> Self {
        Self {
            feedback,
            offset: [Dual::new(1); NUM_LINES],
            t60: core::array::from_fn(|_| T60Filter::default()),
            vecap: VecAllpass::new(vecap_delay),
            density_gain: Dual::new(0.0),
            gain: GainMatrix::default(),
        }
    }

    pub(crate) fn vecap_mut(&mut self) -> &mut VecAllpass {
        &mut self.vecap
    }

    pub(crate) fn gain_mut(&mut self) -> &mut GainMatrix {
        &mut self.gain
    }

    pub(crate) fn t60_mut(&mut self, line: usize) -> &mut T60Filter {
        &mut self.t60[line]
    }

    pub(crate) fn set_offset_pending(&mut self, offsets: [usize; NUM_LINES]) {
        for i in 0..NUM_LINES {
            self.offset[i].set_pending(offsets[i].max(1));
        }
    }

    pub(crate) fn set_density_gain_pending(&mut self, value: f32) {
        self.density_gain.set_pending(value);
    }

    pub(crate) fn commit(&mut self) {
        self.vecap.commit();
        self.density_gain.commit();
        for i in 0..NUM_LINES {
            self.offset[i].commit();
            self.t60[i].commit();
        }
    }

    pub(crate) fn min_current_offset(&self) -> usize {
        self.vecap
            .min_current_offset()
            .min(self.offset.iter().map(|o| o.current).min().unwrap_or(1))
    }

    /// §4.4 unfaded variant. `late_delay_tap` are the already selected
    /// (`.current`) main-delay tap positions.
    #[allow(clippy::too_many_arguments)]
    pub fn process_unfaded(
        &mut self,
        ring: &mut RingBuffer,
        main: &DelayLine,
        write_offset: usize,
        todo: usize,
        late_delay_tap: &[usize; NUM_LINES],
        mix: ScatterMix,
        temps: &mut Block,
        out: &mut Block,
    ) {
        let density = self.density_gain.current;
        for line in 0..NUM_LINES {
            let mid_gain = self.t60[line].mid_gain_current();
            for i in 0..todo {
                let main_pos = write_offset.wrapping_add(i).wrapping_sub(late_delay_tap[line]);
                let main_val = main.read(ring, main_pos, line) * density * mid_gain;
                let fb_pos = write_offset.wrapping_add(i).wrapping_sub(self.offset[line].current);
                let fb_val = self.feedback.read(ring, fb_pos, line) * mid_gain;
                temps[line][i] = main_val + fb_val;
            }
            for sample in temps[line][..todo].iter_mut() {
                *sample = self.t60[line].process(*sample);
            }
        }

        self.vecap.process_unfaded(ring, write_offset, todo, temps, mix);

        for line in 0..NUM_LINES {
            out[line][..todo].copy_from_slice(&temps[line][..todo]);
        }

        for i in 0..todo {
            let mut reversed = [0.0_f32; NUM_LINES];
            for line in 0..NUM_LINES {
                reversed[NUM_LINES - 1 - line] = out[line][i];
            }
            let scattered = mix.apply(reversed);
            self.feedback.write_interleaved(ring, write_offset.wrapping_add(i), scattered);
        }
    }

    /// §4.4 faded variant: both tap reads and the density/mid-gain products
    /// are cross-faded; the vector all-pass runs its faded variant.
    #[allow(clippy::too_many_arguments)]
    pub fn process_faded(
        &mut self,
        ring: &mut RingBuffer,
        main: &DelayLine,
        write_offset: usize,
        todo: usize,
        late_delay_tap: &[Dual<usize>; NUM_LINES],
        mix: ScatterMix,
        temps: &mut Block,
        out: &mut Block,
        fade_count: usize,
    ) {
        let step = 1.0 / FADE_SAMPLES as f32;
        for line in 0..NUM_LINES {
            for i in 0..todo {
                let f = ((fade_count + i) as f32 * step).min(1.0);

                let main_pos0 = write_offset.wrapping_add(i).wrapping_sub(late_delay_tap[line].current);
                let main_pos1 = write_offset.wrapping_add(i).wrapping_sub(late_delay_tap[line].pending);
                let main0 = main.read(ring, main_pos0, line);
                let main1 = main.read(ring, main_pos1, line);
                let main_read = (1.0 - f) * main0 + f * main1;
                let density_mid0 = self.density_gain.current * self.t60[line].mid_gain_current();
                let density_mid1 = self.density_gain.pending * self.t60[line].mid_gain_pending();
                let density_mid = (1.0 - f) * density_mid0 + f * density_mid1;

                let fb_pos0 = write_offset.wrapping_add(i).wrapping_sub(self.offset[line].current);
                let fb_pos1 = write_offset.wrapping_add(i).wrapping_sub(self.offset[line].pending);
                let fb0 = self.feedback.read(ring, fb_pos0, line);
                let fb1 = self.feedback.read(ring, fb_pos1, line);
                let fb_read = (1.0 - f) * fb0 + f * fb1;
                let mid0 = self.t60[line].mid_gain_current();
                let mid1 = self.t60[line].mid_gain_pending();
                let mid = (1.0 - f) * mid0 + f * mid1;

                temps[line][i] = main_read * density_mid + fb_read * mid;
            }
            for sample in temps[line][..todo].iter_mut() {
                *sample = self.t60[line].process(*sample);
            }
        }

        self.vecap.process_faded(ring, write_offset, todo, temps, mix, fade_count);

        for line in 0..NUM_LINES {
            out[line][..todo].copy_from_slice(&temps[line][..todo]);
        }

        for i in 0..todo {
            let mut reversed = [0.0_f32; NUM_LINES];
            for line in 0..NUM_LINES {
                reversed[NUM_LINES - 1 - line] = out[line][i];
            }
            let scattered = mix.apply(reversed);
            self.feedback.write_interleaved(ring, write_offset.wrapping_add(i), scattered);
        }
    }

    pub(crate) fn set_pan_target(&mut self, target: [[f32; crate::constants::MAX_OUTPUT_CHANNELS]; NUM_LINES]) {
        self.gain.set_target(target);
    }

    pub(crate) fn mix_into(&mut self, source: &Block, todo: usize, num_out: usize, out: &mut [&mut [f32]]) {
        self.gain.mix_into(source, todo, num_out, out);
    }
}
