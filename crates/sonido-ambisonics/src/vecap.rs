//! The Gerzon 4×4 MIMO vector all-pass (§4.2).
//!
//! Same Schroeder-allpass recurrence as
//! `sonido_core::allpass::AllpassFilter` (`out = delay_out - c*in; next_in =
//! in + c*out`), generalised from one line to a four-line block whose
//! `next_in` values are mixed through the [`ScatterMix`] before being
//! written back, instead of the teacher's identity (single-line) mix.

use sonido_core::flush_denormal;

use crate::constants::{FADE_SAMPLES, NUM_LINES};
use crate::dual::Dual;
use crate::ring::{DelayLine, RingBuffer};
use crate::scatter::ScatterMix;

/// Per-line staging block shared by the early/late stages and the vector
/// all-pass: `NUM_LINES` channels, up to `MAX_UPDATE_SAMPLES` samples each.
pub type Block = [[f32; crate::constants::MAX_UPDATE_SAMPLES]; NUM_LINES];

/// One four-line vector all-pass: a dedicated [`DelayLine`] region, a
/// dual-buffered feedback coefficient, and a dual-buffered tap offset per
/// line (§3).
#[derive(Debug, Clone, Copy)]
pub struct VecAllpass {
    delay: DelayLine,
    coeff: Dual<f32>,
    offset: [Dual<usize>; NUM_LINES],
}

impl VecAllpass {
    pub(crate) const fn new(delay: DelayLine) -> Self {
        Self {
            delay,
            coeff: Dual::new(0.0),
            offset: [Dual::new(1); NUM_LINES],
        }
    }

    pub(crate) fn set_pending(&mut self, coeff: f32, offsets: [usize; NUM_LINES]) {
        self.coeff.set_pending(coeff);
        for (slot, &value) in self.offset.iter_mut().zip(offsets.iter()) {
            slot.set_pending(value.max(1));
        }
    }

    pub(crate) fn commit(&mut self) {
        self.coeff.commit();
        for slot in &mut self.offset {
            slot.commit();
        }
    }

    pub(crate) fn min_current_offset(&self) -> usize {
        self.offset.iter().map(|o| o.current).min().unwrap_or(1)
    }

    /// Processes `temps[..][0..todo]` in place with the settled ("current")
    /// coefficient and taps.
    pub fn process_unfaded(
        &self,
        ring: &mut RingBuffer,
        write_offset: usize,
        todo: usize,
        temps: &mut Block,
        mix: ScatterMix,
    ) {
        let c = self.coeff.current;
        for i in 0..todo {
            let mut next_in = [0.0_f32; NUM_LINES];
            for line in 0..NUM_LINES {
                let tap = self.offset[line].current;
                let pos = write_offset.wrapping_add(i).wrapping_sub(tap);
                let delay_out = self.delay.read(ring, pos, line);
                let input = temps[line][i];
                let out = delay_out - c * input;
                next_in[line] = flush_denormal(input + c * out);
                temps[line][i] = out;
            }
            let mixed = mix.apply(next_in);
            self.delay.write_interleaved(ring, write_offset.wrapping_add(i), mixed);
        }
    }

    /// Processes `temps[..][0..todo]` in place, cross-fading both the
    /// coefficient and the tap reads between `current` and `pending`,
    /// advancing the fade fraction by `1/FADE_SAMPLES` per sample from
    /// `fade_count` (§4.2's faded variant).
    pub fn process_faded(
        &self,
        ring: &mut RingBuffer,
        write_offset: usize,
        todo: usize,
        temps: &mut Block,
        mix: ScatterMix,
        fade_count: usize,
    ) {
        let step = 1.0 / FADE_SAMPLES as f32;
        for i in 0..todo {
            let f = ((fade_count + i) as f32 * step).min(1.0);
            let c = self.coeff.current + (self.coeff.pending - self.coeff.current) * f;
            let mut next_in = [0.0_f32; NUM_LINES];
            for line in 0..NUM_LINES {
                let tap0 = self.offset[line].current;
                let tap1 = self.offset[line].pending;
                let pos0 = write_offset.wrapping_add(i).wrapping_sub(tap0);
                let pos1 = write_offset.wrapping_add(i).wrapping_sub(tap1);
                let d0 = self.delay.read(ring, pos0, line);
                let d1 = self.delay.read(ring, pos1, line);
                let delay_out = (1.0 - f) * d0 + f * d1;
                let input = temps[line][i];
                let out = delay_out - c * input;
                next_in[line] = flush_denormal(input + c * out);
                temps[line][i] = out;
            }
            let mixed = mix.apply(next_in);
            self.delay.write_interleaved(ring, write_offset.wrapping_add(i), mixed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ring::Sizer;

    fn make() -> (RingBuffer, VecAllpass) {
        let mut sizer = Sizer::new();
        let region = sizer.region(64);
        let ring = RingBuffer::try_new(sizer.total_slots()).unwrap();
        (ring, VecAllpass::new(region))
    }

    #[test]
    fn zero_input_stays_zero() {
        let (mut ring, mut vecap) = make();
        vecap.set_pending(0.3, [3, 5, 7, 11]);
        vecap.commit();
        let mix = ScatterMix::from_diffusion(0.6);
        let mut temps = [[0.0_f32; crate::constants::MAX_UPDATE_SAMPLES]; NUM_LINES];
        vecap.process_unfaded(&mut ring, 0, 32, &mut temps, mix);
        for line in &temps {
            for &sample in &line[..32] {
                assert_eq!(sample, 0.0);
            }
        }
    }

    #[test]
    fn faded_matches_unfaded_at_fade_count_zero_with_equal_taps() {
        let (mut ring_a, mut ap_a) = make();
        let (mut ring_b, mut ap_b) = make();
        for ap in [&mut ap_a, &mut ap_b] {
            ap.set_pending(0.25, [4, 6, 8, 10]);
            ap.commit();
            ap.set_pending(0.25, [4, 6, 8, 10]);
        }
        let mix = ScatterMix::from_diffusion(0.5);
        let mut temps_a = [[0.0_f32; crate::constants::MAX_UPDATE_SAMPLES]; NUM_LINES];
        for line in temps_a.iter_mut() {
            for (i, s) in line.iter_mut().enumerate().take(16) {
                *s = (i as f32 * 0.1).sin();
            }
        }
        let mut temps_b = temps_a;

        ap_a.process_unfaded(&mut ring_a, 0, 16, &mut temps_a, mix);
        ap_b.process_faded(&mut ring_b, 0, 16, &mut temps_b, mix, 0);

        for (a, b) in temps_a.iter().zip(temps_b.iter()) {
            for (x, y) in a[..16].iter().zip(b[..16].iter()) {
                assert!((x - y).abs() < 1e-5);
            }
        }
    }
}
