//! Three-band T60 damping filter (§3/§4.4).
//!
//! Reuses `sonido_core::Biquad` as the per-sample IIR evaluator (the
//! external "biquad evaluation primitive" per §1) for both shelf stages.
//! `sonido_core::biquad` only ships lowpass/highpass/bandpass/notch/
//! peaking-eq coefficient derivations, so the low-shelf/high-shelf RBJ
//! cookbook formulas below are new, written in the same style (shelf slope
//! `S = 1`, matching the standard "gentle shelf" RBJ preset).

use sonido_core::Biquad;

use crate::dual::Dual;

/// RBJ low-shelf coefficients (shelf slope `S = 1`) for a linear `gain_ratio`
/// (not dB) relative to the mid band, at `frequency` Hz / `sample_rate` Hz.
pub fn low_shelf_coefficients(frequency: f32, gain_ratio: f32, sample_rate: f32) -> [f32; 6] {
    let a = libm::sqrtf(gain_ratio.max(1e-6));
    let omega = 2.0 * core::f32::consts::PI * frequency / sample_rate;
    let (sin_w, cos_w) = (libm::sinf(omega), libm::cosf(omega));
    let alpha = sin_w * libm::sqrtf(2.0) / 2.0;
    let two_sqrt_a_alpha = 2.0 * libm::sqrtf(a) * alpha;

    let b0 = a * ((a + 1.0) - (a - 1.0) * cos_w + two_sqrt_a_alpha);
    let b1 = 2.0 * a * ((a - 1.0) - (a + 1.0) * cos_w);
    let b2 = a * ((a + 1.0) - (a - 1.0) * cos_w - two_sqrt_a_alpha);
    let a0 = (a + 1.0) + (a - 1.0) * cos_w + two_sqrt_a_alpha;
    let a1 = -2.0 * ((a - 1.0) + (a + 1.0) * cos_w);
    let a2 = (a + 1.0) + (a - 1.0) * cos_w - two_sqrt_a_alpha;
    [b0, b1, b2, a0, a1, a2]
}

/// RBJ high-shelf coefficients (shelf slope `S = 1`).
pub fn high_shelf_coefficients(frequency: f32, gain_ratio: f32, sample_rate: f32) -> [f32; 6] {
    let a = libm::sqrtf(gain_ratio.max(1e-6));
    let omega = 2.0 * core::f32::consts::PI * frequency / sample_rate;
    let (sin_w, cos_w) = (libm::sinf(omega), libm::cosf(omega));
    let alpha = sin_w * libm::sqrtf(2.0) / 2.0;
    let two_sqrt_a_alpha = 2.0 * libm::sqrtf(a) * alpha;

    let b0 = a * ((a + 1.0) + (a - 1.0) * cos_w + two_sqrt_a_alpha);
    let b1 = -2.0 * a * ((a - 1.0) + (a + 1.0) * cos_w);
    let b2 = a * ((a + 1.0) + (a - 1.0) * cos_w - two_sqrt_a_alpha);
    let a0 = (a + 1.0) - (a - 1.0) * cos_w + two_sqrt_a_alpha;
    let a1 = 2.0 * ((a - 1.0) - (a + 1.0) * cos_w);
    let a2 = (a + 1.0) - (a - 1.0) * cos_w - two_sqrt_a_alpha;
    [b0, b1, b2, a0, a1, a2]
}

/// Low-shelf + high-shelf cascade plus the dual-buffered mid-band gain.
///
/// Per §3, only `MidGain` is listed as dual-buffered; the shelf
/// coefficients themselves are snapped immediately on
/// [`T60Filter::set_pending`] (there is no `[0]`/`[1]` pair for them in the
/// data model), matching real FDN reverbs where the perceptually dominant
/// quantity to fade is the per-line gain, not the shelf corner itself.
#[derive(Debug, Clone, Default)]
pub struct T60Filter {
    low_shelf: Biquad,
    high_shelf: Biquad,
    mid_gain: Dual<f32>,
}

impl T60Filter {
    pub(crate) fn set_pending(
        &mut self,
        mid_gain: f32,
        low_shelf_ratio: f32,
        lf_reference_hz: f32,
        high_shelf_ratio: f32,
        hf_reference_hz: f32,
        sample_rate: f32,
    ) {
        self.mid_gain.set_pending(mid_gain.max(0.001));
        let [b0, b1, b2, a0, a1, a2] =
            low_shelf_coefficients(lf_reference_hz, low_shelf_ratio.max(0.001), sample_rate);
        self.low_shelf.set_coefficients(b0, b1, b2, a0, a1, a2);
        let [b0, b1, b2, a0, a1, a2] =
            high_shelf_coefficients(hf_reference_hz, high_shelf_ratio.max(0.001), sample_rate);
        self.high_shelf.set_coefficients(b0, b1, b2, a0, a1, a2);
    }

    pub(crate) fn commit(&mut self) {
        self.mid_gain.commit();
    }

    #[inline]
    pub(crate) fn mid_gain_current(&self) -> f32 {
        self.mid_gain.current
    }

    #[inline]
    pub(crate) fn mid_gain_pending(&self) -> f32 {
        self.mid_gain.pending
    }

    /// Runs the low-shelf then high-shelf cascade (§4.4 step 2). Does not
    /// apply `MidGain`; callers multiply by `mid_gain_current`/`_pending`
    /// themselves as part of the tap read (§4.4 step 1).
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        self.high_shelf.process(self.low_shelf.process(input))
    }
}
