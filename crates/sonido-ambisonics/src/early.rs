//! Early reflections stage (§4.3).
//!
//! Grounded on `sonido_effects::reverb::Reverb`'s split of tapped
//! early-reflection delays feeding a diffusion all-pass, generalised from
//! its Hadamard-8 mono/stereo shape to the four-line A-format topology and
//! the Gerzon scattering matrix.

use crate::constants::{FADE_SAMPLES, NUM_LINES};
use crate::dual::Dual;
use crate::gainmix::GainMatrix;
use crate::ring::{DelayLine, RingBuffer};
use crate::scatter::ScatterMix;
use crate::vecap::{Block, VecAllpass};

/// Diffusion all-pass, secondary-reflection echo line, and the pan-gain
/// matrix for the early stage (§3).
#[derive(Debug, Clone)]
pub struct EarlyReflections {
    vecap: VecAllpass,
    echo: DelayLine,
    echo_offset: [Dual<usize>; NUM_LINES],
    echo_coeff: [Dual<f32>; NUM_LINES],
    gain: GainMatrix,
}

impl EarlyReflections {
    pub(crate) fn new(vecap_delay: DelayLine, echo: DelayLine) -> Self {
        Self {
            vecap: VecAllpass::new(vecap_delay),
            echo,
            echo_offset: [Dual::new(1); NUM_LINES],
            echo_coeff: [Dual::new(0.0); NUM_LINES],
            gain: GainMatrix::default(),
        }
    }

    pub(crate) fn vecap_mut(&mut self) -> &mut VecAllpass {
        &mut self.vecap
    }

    pub(crate) fn gain_mut(&mut self) -> &mut GainMatrix {
        &mut self.gain
    }

    pub(crate) fn set_echo_pending(&mut self, offsets: [usize; NUM_LINES], coeffs: [f32; NUM_LINES]) {
        for i in 0..NUM_LINES {
            self.echo_offset[i].set_pending(offsets[i].max(1));
            self.echo_coeff[i].set_pending(coeffs[i]);
        }
    }

    pub(crate) fn commit(&mut self) {
        self.vecap.commit();
        for i in 0..NUM_LINES {
            self.echo_offset[i].commit();
            self.echo_coeff[i].commit();
        }
    }

    pub(crate) fn min_current_offset(&self) -> usize {
        self.vecap.min_current_offset().min(
            self.echo_offset.iter().map(|o| o.current).min().unwrap_or(1),
        )
    }

    /// §4.3 unfaded variant. `early_tap`/`early_coeff` are the already
    /// selected (`.current`) main-delay tap positions/coefficients; `temps`
    /// and `out` are scratch blocks owned by the caller.
    #[allow(clippy::too_many_arguments)]
    pub fn process_unfaded(
        &mut self,
        ring: &mut RingBuffer,
        main: &DelayLine,
        write_offset: usize,
        todo: usize,
        early_tap: &[usize; NUM_LINES],
        early_coeff: &[f32; NUM_LINES],
        late_feed_tap: usize,
        mix: ScatterMix,
        temps: &mut Block,
        out: &mut Block,
    ) {
        for line in 0..NUM_LINES {
            for i in 0..todo {
                let pos = write_offset.wrapping_add(i).wrapping_sub(early_tap[line]);
                temps[line][i] = main.read(ring, pos, line) * early_coeff[line];
            }
        }

        self.vecap.process_unfaded(ring, write_offset, todo, temps, mix);

        for i in 0..todo {
            let mut mirror = [0.0_f32; NUM_LINES];
            let mut reversed = [0.0_f32; NUM_LINES];
            for line in 0..NUM_LINES {
                let tap = self.echo_offset[line].current;
                let pos = write_offset.wrapping_add(i).wrapping_sub(tap);
                let echo_val = self.echo.read(ring, pos, line) * self.echo_coeff[line].current;
                let o = echo_val + temps[line][i];
                out[line][i] = o;
                mirror[NUM_LINES - 1 - line] = temps[line][i];
                reversed[NUM_LINES - 1 - line] = o;
            }
            self.echo.write_interleaved(ring, write_offset.wrapping_add(i), mirror);

            let scattered = mix.apply(reversed);
            let main_pos = write_offset.wrapping_add(i).wrapping_sub(late_feed_tap);
            main.write_interleaved(ring, main_pos, scattered);
        }
    }

    /// §4.3 faded variant: steps 1/3 cross-fade tap reads and coefficients;
    /// the vector all-pass runs its faded variant; steps 4/5 are unchanged.
    #[allow(clippy::too_many_arguments)]
    pub fn process_faded(
        &mut self,
        ring: &mut RingBuffer,
        main: &DelayLine,
        write_offset: usize,
        todo: usize,
        early_tap: &[Dual<usize>; NUM_LINES],
        early_coeff: &[Dual<f32>; NUM_LINES],
        late_feed_tap: usize,
        mix: ScatterMix,
        temps: &mut Block,
        out: &mut Block,
        fade_count: usize,
    ) {
        let step = 1.0 / FADE_SAMPLES as f32;
        for line in 0..NUM_LINES {
            for i in 0..todo {
                let f = ((fade_count + i) as f32 * step).min(1.0);
                let pos0 = write_offset.wrapping_add(i).wrapping_sub(early_tap[line].current);
                let pos1 = write_offset.wrapping_add(i).wrapping_sub(early_tap[line].pending);
                let d0 = main.read(ring, pos0, line);
                let d1 = main.read(ring, pos1, line);
                let delay_out = (1.0 - f) * d0 + f * d1;
                let coeff = early_coeff[line].lerp(f);
                temps[line][i] = delay_out * coeff;
            }
        }

        self.vecap.process_faded(ring, write_offset, todo, temps, mix, fade_count);

        for i in 0..todo {
            let f = ((fade_count + i) as f32 * step).min(1.0);
            let mut mirror = [0.0_f32; NUM_LINES];
            let mut reversed = [0.0_f32; NUM_LINES];
            for line in 0..NUM_LINES {
                let tap0 = self.echo_offset[line].current;
                let tap1 = self.echo_offset[line].pending;
                let pos0 = write_offset.wrapping_add(i).wrapping_sub(tap0);
                let pos1 = write_offset.wrapping_add(i).wrapping_sub(tap1);
                let d0 = self.echo.read(ring, pos0, line);
                let d1 = self.echo.read(ring, pos1, line);
                let echo_out = (1.0 - f) * d0 + f * d1;
                let coeff = self.echo_coeff[line].lerp(f);
                let echo_val = echo_out * coeff;
                let o = echo_val + temps[line][i];
                out[line][i] = o;
                mirror[NUM_LINES - 1 - line] = temps[line][i];
                reversed[NUM_LINES - 1 - line] = o;
            }
            self.echo.write_interleaved(ring, write_offset.wrapping_add(i), mirror);

            let scattered = mix.apply(reversed);
            let main_pos = write_offset.wrapping_add(i).wrapping_sub(late_feed_tap);
            main.write_interleaved(ring, main_pos, scattered);
        }
    }

    pub(crate) fn set_pan_target(&mut self, target: [[f32; crate::constants::MAX_OUTPUT_CHANNELS]; NUM_LINES]) {
        self.gain.set_target(target);
    }

    pub(crate) fn mix_into(&mut self, source: &Block, todo: usize, num_out: usize, out: &mut [&mut [f32]]) {
        self.gain.mix_into(source, todo, num_out, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ring::Sizer;

    fn make() -> (RingBuffer, DelayLine, EarlyReflections) {
        let mut sizer = Sizer::new();
        let main = sizer.region(256);
        let vecap_delay = sizer.region(64);
        let echo = sizer.region(64);
        let ring = RingBuffer::try_new(sizer.total_slots()).unwrap();
        (ring, main, EarlyReflections::new(vecap_delay, echo))
    }

    #[test]
    fn zero_input_through_main_stays_zero() {
        let (mut ring, main, mut early) = make();
        early.vecap_mut().set_pending(0.3, [3, 5, 7, 9]);
        early.set_echo_pending([4, 6, 8, 10], [0.2, 0.2, 0.2, 0.2]);
        early.commit();

        let mix = ScatterMix::from_diffusion(0.5);
        let early_tap = [20usize; NUM_LINES];
        let early_coeff = [0.5f32; NUM_LINES];
        let mut temps = [[0.0_f32; crate::constants::MAX_UPDATE_SAMPLES]; NUM_LINES];
        let mut out = [[0.0_f32; crate::constants::MAX_UPDATE_SAMPLES]; NUM_LINES];

        early.process_unfaded(&mut ring, &main, 100, 32, &early_tap, &early_coeff, 40, mix, &mut temps, &mut out);

        for line in &out {
            for &sample in &line[..32] {
                assert_eq!(sample, 0.0);
            }
        }
    }

    #[test]
    fn tapped_impulse_produces_finite_output() {
        let (mut ring, main, mut early) = make();
        early.vecap_mut().set_pending(0.4, [3, 5, 7, 9]);
        early.set_echo_pending([4, 6, 8, 10], [0.3, 0.3, 0.3, 0.3]);
        early.commit();

        for line in 0..NUM_LINES {
            main.write(&mut ring, 90, line, 1.0);
        }

        let mix = ScatterMix::from_diffusion(0.7);
        let early_tap = [10usize; NUM_LINES];
        let early_coeff = [0.6f32; NUM_LINES];
        let mut temps = [[0.0_f32; crate::constants::MAX_UPDATE_SAMPLES]; NUM_LINES];
        let mut out = [[0.0_f32; crate::constants::MAX_UPDATE_SAMPLES]; NUM_LINES];

        early.process_unfaded(&mut ring, &main, 100, 32, &early_tap, &early_coeff, 40, mix, &mut temps, &mut out);

        for line in &out {
            for &sample in &line[..32] {
                assert!(sample.is_finite());
            }
        }
    }
}
