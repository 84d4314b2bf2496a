//! Parameter update (§4.5): translates an externally supplied
//! [`ReverbParameters`] snapshot into the next-generation ("pending") tap
//! positions, coefficients, matrix coefficients, T60 shelf parameters,
//! density gain and panning matrices.
//!
//! Pure functions only — nothing here touches audio state; the caller
//! ([`crate::state::ReverbEngine::update`]) is responsible for writing the
//! derived values into the dual-buffered fields and deciding whether a
//! fade-relevant field moved.

use crate::buffer::late_feed_tap;
use crate::constants::{
    EARLY_LINE_LENGTHS, EARLY_TAP_LENGTHS, LATE_ALLPASS_LENGTHS, LATE_LINE_LENGTHS, MAX_LENGTH_MULT,
    MAX_UPDATE_SAMPLES, MIN_LENGTH_MULT, NUM_LINES, SPEED_OF_SOUND_MPS,
};
use crate::scatter::{feedback_coefficient, ScatterMix};

/// Snapshot of the host-supplied reverb parameters (§6). All ranges are
/// assumed already clamped by the external property-set layer; the engine
/// does not re-validate them (§7's `InvalidParameter` is out of scope).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReverbParameters {
    pub density: f32,
    pub diffusion: f32,
    pub gain: f32,
    pub gain_hf: f32,
    pub gain_lf: f32,
    pub decay_time: f32,
    pub decay_hf_ratio: f32,
    pub decay_lf_ratio: f32,
    pub reflections_gain: f32,
    pub late_reverb_gain: f32,
    pub reflections_delay: f32,
    pub late_reverb_delay: f32,
    pub air_absorption_gain_hf: f32,
    pub hf_reference: f32,
    pub lf_reference: f32,
    pub decay_hf_limit: bool,
    pub reflections_pan: [f32; 3],
    pub late_reverb_pan: [f32; 3],
}

impl Default for ReverbParameters {
    fn default() -> Self {
        Self {
            density: 1.0,
            diffusion: 1.0,
            gain: 0.32,
            gain_hf: 0.89,
            gain_lf: 1.0,
            decay_time: 1.49,
            decay_hf_ratio: 0.83,
            decay_lf_ratio: 1.0,
            reflections_gain: 0.05,
            late_reverb_gain: 1.26,
            reflections_delay: 0.007,
            late_reverb_delay: 0.011,
            air_absorption_gain_hf: 0.994,
            hf_reference: 5000.0,
            lf_reference: 250.0,
            decay_hf_limit: true,
            reflections_pan: [0.0, 0.0, 0.0],
            late_reverb_pan: [0.0, 0.0, 0.0],
        }
    }
}

/// The subset of `ReverbParameters` whose change requires a cross-fade
/// (§3's `Params` snapshot field).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FadeRelevant {
    pub density: f32,
    pub diffusion: f32,
    pub decay_time: f32,
    pub hf_decay_time: f32,
    pub lf_decay_time: f32,
    pub hf_reference: f32,
    pub lf_reference: f32,
}

/// `length_mult = max(MIN_LENGTH_MULT, cbrt(density * 125000))`, per §4.5.
pub fn length_mult(density: f32) -> f32 {
    libm::cbrtf(density * 125_000.0).max(MIN_LENGTH_MULT)
}

/// The −60 dB decay-coefficient model shared by every per-line gain derivation:
/// `0.001 ^ (length_seconds / decay_time)`.
pub fn decay_coeff(length_seconds: f32, decay_time: f32) -> f32 {
    libm::powf(0.001, length_seconds / decay_time.max(1e-4))
}

fn round_to_usize(value: f32) -> usize {
    value.max(0.0).round() as usize
}

/// Everything [`crate::state::ReverbEngine::update`] needs to write into the
/// pending slots of the engine's dual-buffered fields.
#[derive(Debug, Clone, Copy)]
pub struct DerivedParams {
    pub fade_relevant: FadeRelevant,
    pub early_tap: [usize; NUM_LINES],
    pub early_coeff: [f32; NUM_LINES],
    pub late_delay_tap: [usize; NUM_LINES],
    pub late_feed_tap: usize,
    pub vecap_coeff: f32,
    pub mix: ScatterMix,
    pub density_gain: f32,
    pub early_offset: [usize; NUM_LINES],
    pub early_echo_coeff: [f32; NUM_LINES],
    pub late_offset: [usize; NUM_LINES],
    pub mid_gain: [f32; NUM_LINES],
    pub low_shelf_ratio: [f32; NUM_LINES],
    pub high_shelf_ratio: [f32; NUM_LINES],
    pub max_update: usize,
    pub hf_decay_time: f32,
    pub lf_decay_time: f32,
}

/// HF-limit clamp (§4.5, §9's reciprocal-form open question): computed in
/// reciprocal space so `air_absorption_gain_hf → 1` (no limiting) never
/// divides by a value approaching zero.
fn hf_limited_ratio(decay_hf_ratio: f32, decay_time: f32, air_absorption_gain_hf: f32, decay_hf_limit: bool) -> f32 {
    if !decay_hf_limit || air_absorption_gain_hf >= 1.0 {
        return decay_hf_ratio.clamp(0.1, 20.0);
    }
    // limit_ratio = 1 / (log10(gHF) * decay * c / -60 * 20)
    // reciprocal_limit = log10(gHF) * decay * c * 20 / -60
    let reciprocal_limit =
        libm::log10f(air_absorption_gain_hf) * decay_time * SPEED_OF_SOUND_MPS * 20.0 / -60.0;
    let reciprocal_ratio = 1.0 / decay_hf_ratio;
    let limited = if reciprocal_limit > reciprocal_ratio {
        1.0 / reciprocal_limit
    } else {
        decay_hf_ratio
    };
    limited.max(0.1).min(20.0)
}

/// Band-weighted average decay time used by the density-gain formula
/// (§4.5). The exact weighting is an Open Question in `spec.md`; this uses
/// each band's share of the normalised spectrum (below `lf_reference`,
/// above `hf_reference`, and the mid band between them) as its weight,
/// recorded as a resolution in `DESIGN.md`.
fn weighted_decay_time(
    decay_time: f32,
    hf_decay_time: f32,
    lf_decay_time: f32,
    hf_reference: f32,
    lf_reference: f32,
    sample_rate: f32,
) -> f32 {
    let nyquist = sample_rate * 0.5;
    let lf_norm = (lf_reference / nyquist).clamp(0.0, 1.0);
    let hf_norm = (hf_reference / nyquist).clamp(0.0, 1.0);
    let lf_weight = lf_norm;
    let hf_weight = 1.0 - hf_norm;
    let mf_weight = (1.0 - lf_weight - hf_weight).max(0.0);
    let total = (lf_weight + mf_weight + hf_weight).max(1e-6);
    (lf_weight * lf_decay_time + mf_weight * decay_time + hf_weight * hf_decay_time) / total
}

/// Derives every pending coefficient/tap/gain from a parameter snapshot and
/// the working sample rate (§4.5). `reflections_gain`/`late_reverb_gain` are
/// not derived here: §4.3/§4.4 never fold them into a per-tap coefficient, so
/// the caller applies them as a flat multiplier on the pan-gain matrices
/// instead (see [`crate::format::pan_gain_matrix`]'s `stage_gain` and
/// `DESIGN.md`'s `params.rs` entry).
pub fn derive(params: &ReverbParameters, sample_rate: f32) -> DerivedParams {
    let mult = length_mult(params.density);

    let hf_decay_ratio = hf_limited_ratio(
        params.decay_hf_ratio,
        params.decay_time,
        params.air_absorption_gain_hf,
        params.decay_hf_limit,
    );
    let lf_decay_ratio = params.decay_lf_ratio.clamp(0.1, 2.0);
    let hf_decay_time = (params.decay_time * hf_decay_ratio).clamp(0.1, 20.0);
    let lf_decay_time = (params.decay_time * lf_decay_ratio).clamp(0.1, 20.0);

    let mut early_tap = [0usize; NUM_LINES];
    let mut early_coeff = [0.0f32; NUM_LINES];
    for i in 0..NUM_LINES {
        early_tap[i] = round_to_usize(
            sample_rate * (params.reflections_delay + EARLY_TAP_LENGTHS[i] * mult),
        );
        early_coeff[i] = decay_coeff(EARLY_TAP_LENGTHS[i] * mult, params.decay_time);
    }

    let late_feed = late_feed_tap(sample_rate);
    let mut late_delay_tap = [0usize; NUM_LINES];
    for i in 0..NUM_LINES {
        let spread = (LATE_LINE_LENGTHS[i] - LATE_LINE_LENGTHS[0]) * 0.25 * mult;
        late_delay_tap[i] =
            late_feed + round_to_usize(sample_rate * (params.late_reverb_delay + spread));
    }

    let vecap_coeff = feedback_coefficient(params.diffusion);
    let mix = ScatterMix::from_diffusion(params.diffusion);

    let mut early_offset = [0usize; NUM_LINES];
    let mut early_echo_coeff = [0.0f32; NUM_LINES];
    for i in 0..NUM_LINES {
        let length = EARLY_LINE_LENGTHS[i] * mult;
        early_offset[i] = round_to_usize(sample_rate * length).max(1);
        early_echo_coeff[i] = decay_coeff(length, params.decay_time);
    }

    let mut late_offset = [0usize; NUM_LINES];
    let mut mid_gain = [0.0f32; NUM_LINES];
    let mut low_shelf_ratio = [0.0f32; NUM_LINES];
    let mut high_shelf_ratio = [0.0f32; NUM_LINES];
    let mut sum_loop_length = 0.0f32;
    for i in 0..NUM_LINES {
        let line_length = LATE_LINE_LENGTHS[i] * mult;
        late_offset[i] = round_to_usize(sample_rate * line_length).max(1);
        sum_loop_length += line_length + LATE_ALLPASS_LENGTHS[i] * mult;

        let mf_gain = decay_coeff(line_length, params.decay_time).min(0.98);
        let lf_gain = decay_coeff(line_length, lf_decay_time).min(0.98);
        let hf_gain = decay_coeff(line_length, hf_decay_time).min(0.98);
        mid_gain[i] = mf_gain.max(0.001);
        low_shelf_ratio[i] = (lf_gain / mf_gain.max(1e-6)).max(0.001);
        high_shelf_ratio[i] = (hf_gain / mf_gain.max(1e-6)).max(0.001);
    }

    let average_loop_length = sum_loop_length / NUM_LINES as f32;
    let weighted_decay = weighted_decay_time(
        params.decay_time,
        hf_decay_time,
        lf_decay_time,
        params.hf_reference,
        params.lf_reference,
        sample_rate,
    );
    let density_decay = decay_coeff(average_loop_length, weighted_decay).min(0.98);
    let density_gain = libm::sqrtf((1.0 - density_decay * density_decay).max(0.0));

    let max_update = MAX_UPDATE_SAMPLES.min(early_offset[0]).min(late_offset[0]);

    let fade_relevant = FadeRelevant {
        density: params.density,
        diffusion: params.diffusion,
        decay_time: params.decay_time,
        hf_decay_time,
        lf_decay_time,
        hf_reference: params.hf_reference,
        lf_reference: params.lf_reference,
    };

    DerivedParams {
        fade_relevant,
        early_tap,
        early_coeff,
        late_delay_tap,
        late_feed_tap: late_feed,
        vecap_coeff,
        mix,
        density_gain,
        early_offset,
        early_echo_coeff,
        late_offset,
        mid_gain,
        low_shelf_ratio,
        high_shelf_ratio,
        max_update,
        hf_decay_time,
        lf_decay_time,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_mult_spans_expected_range() {
        assert_eq!(length_mult(0.0), MIN_LENGTH_MULT);
        assert!((length_mult(1.0) - MAX_LENGTH_MULT).abs() < 1e-3);
    }

    #[test]
    fn max_update_is_always_at_least_one() {
        for density_pct in 0..=100 {
            let density = density_pct as f32 / 100.0;
            let params = ReverbParameters { density, ..ReverbParameters::default() };
            let derived = derive(&params, 48000.0);
            assert!(derived.max_update >= 1);
        }
    }

    #[test]
    fn hf_limit_leaves_ratio_untouched_near_unity_absorption() {
        let params = ReverbParameters {
            air_absorption_gain_hf: 1.0,
            decay_hf_limit: true,
            decay_hf_ratio: 0.5,
            ..ReverbParameters::default()
        };
        let derived = derive(&params, 48000.0);
        assert!(derived.hf_decay_time.is_finite());
    }

    #[test]
    fn derive_never_produces_nan_across_sample_rates() {
        for sample_rate in [22050.0_f32, 44100.0, 48000.0, 96000.0, 192000.0] {
            let params = ReverbParameters::default();
            let derived = derive(&params, sample_rate);
            assert!(derived.density_gain.is_finite());
            for v in derived.mid_gain {
                assert!(v.is_finite() && v > 0.0);
            }
        }
    }
}
