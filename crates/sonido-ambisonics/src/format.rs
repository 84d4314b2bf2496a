//! A-format ↔ B-format rotation and pan-gain matrices (§4.5/§4.6, GLOSSARY).
//!
//! The fixed 4×4 matrix is the classic tetrahedral encoding (its entries are
//! the order-4 Hadamard matrix `H`, which satisfies `H·H = 4I` since `H` is
//! symmetric and `H·Hᵀ = 4I`). §8 invariant 6 requires the *composed*
//! `A2B · B2A` to equal `(3/4)·I`, not `I` — i.e. the two directions are
//! deliberately not exact inverses of one another, with the residual factor
//! folded into the (out-of-scope, external) output gain stage. Scaling
//! `B2A` by `1/2` and `A2B` by `3/8` gives `(3/8 · H)·(1/2 · H) = 3/16 ·
//! H·H = 3/16 · 4I = 3/4 · I`, matching the required identity exactly.

use crate::constants::{MAX_OUTPUT_CHANNELS, NUM_LINES};

/// Unscaled tetrahedral (Hadamard) rotation matrix shared by both directions.
const H: [[f32; 4]; 4] = [
    [1.0, 1.0, 1.0, 1.0],
    [1.0, 1.0, -1.0, -1.0],
    [1.0, -1.0, 1.0, -1.0],
    [1.0, -1.0, -1.0, 1.0],
];

fn apply(matrix: &[[f32; 4]; 4], scale: f32, input: [f32; 4]) -> [f32; 4] {
    let mut out = [0.0_f32; 4];
    for (row, slot) in matrix.iter().zip(out.iter_mut()) {
        *slot = scale * row.iter().zip(input.iter()).map(|(m, x)| m * x).sum::<f32>();
    }
    out
}

/// B-format (`[W, X, Y, Z]`) to A-format (tetrahedral capsule order).
pub fn b_to_a(b_format: [f32; NUM_LINES]) -> [f32; NUM_LINES] {
    apply(&H, 0.5, b_format)
}

/// A-format to B-format (`[W, X, Y, Z]`).
pub fn a_to_b(a_format: [f32; NUM_LINES]) -> [f32; NUM_LINES] {
    apply(&H, 0.375, a_format)
}

/// Encodes a 3D pan vector (magnitude up to `1`, used as focus strength) as
/// a B-format `[W, X, Y, Z]` focus vector: omnidirectional when `pan` is
/// zero, fully focused toward `pan` as its magnitude approaches `1`. Uses
/// the conventional FuMa `sqrt(2)` weighting between `W` and `X/Y/Z`.
fn focus_b_format(pan: [f32; 3], magnitude: f32) -> [f32; NUM_LINES] {
    if magnitude < 1e-6 {
        return [1.0, 0.0, 0.0, 0.0];
    }
    let sqrt2 = core::f32::consts::SQRT_2;
    let (nx, ny, nz) = (pan[0] / magnitude, pan[1] / magnitude, pan[2] / magnitude);
    [1.0, sqrt2 * nx * magnitude, sqrt2 * ny * magnitude, sqrt2 * nz * magnitude]
}

fn channel_direction(channel: usize) -> [f32; 3] {
    const DIRS: [[f32; 3]; MAX_OUTPUT_CHANNELS] = [
        [1.0, 0.0, 0.0],
        [-1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, -1.0, 0.0],
        [0.0, 0.0, 1.0],
        [0.0, 0.0, -1.0],
        [0.0, 0.0, 0.0],
        [0.0, 0.0, 0.0],
    ];
    DIRS[channel]
}

/// Computes the `NUM_LINES × MAX_OUTPUT_CHANNELS` pan-gain matrix for one
/// stage (early or late), per §4.5's "focus matrix ... compose with the
/// A-to-B rotation, distribute to per-output-channel pan gains" and §3's
/// `PanGain` field. The device-specific channel layout is an external
/// collaborator (§1); this produces a reasonable, testable approximation
/// using up to six canonical ±X/±Y/±Z directions (remaining channels, if
/// any, get no directional emphasis), recorded as an Open Question
/// resolution in `DESIGN.md`.
///
/// `stage_gain` is the host-supplied `reflections_gain`/`late_reverb_gain`
/// (§6), applied as a flat multiplier on the whole matrix: neither §4.3 nor
/// §4.4 fold it into a per-tap coefficient, so it is applied here instead,
/// at the point where the stage's output is projected to device channels —
/// see `DESIGN.md`'s `params.rs` entry.
pub fn pan_gain_matrix(
    pan: [f32; 3],
    num_out_channels: usize,
    stage_gain: f32,
) -> [[f32; MAX_OUTPUT_CHANNELS]; NUM_LINES] {
    let magnitude = libm::sqrtf(pan[0] * pan[0] + pan[1] * pan[1] + pan[2] * pan[2]).min(1.0);
    let b = focus_b_format(pan, magnitude);
    let a = b_to_a(b);

    let mut out = [[0.0_f32; MAX_OUTPUT_CHANNELS]; NUM_LINES];
    let n = num_out_channels.clamp(1, MAX_OUTPUT_CHANNELS);
    let uniform = 1.0 / n as f32;

    for (line, weight) in a.iter().enumerate() {
        for ch in 0..n {
            let dir = channel_direction(ch);
            let dot = if magnitude > 1e-6 {
                (pan[0] * dir[0] + pan[1] * dir[1] + pan[2] * dir[2]) / magnitude
            } else {
                0.0
            };
            let directional = (0.5 + 0.5 * dot).max(0.0);
            out[line][ch] = stage_gain * weight.abs() * (magnitude * directional + (1.0 - magnitude) * uniform);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_scales_by_three_quarters() {
        let w = [1.0_f32, 0.0, 0.0, 0.0];
        let a = b_to_a(w);
        // Unit impulse on W should spread equally across all four A channels.
        for &v in &a {
            assert!((v.abs() - 0.5).abs() < 1e-6);
        }
        let back = a_to_b(a);
        for (original, reconstructed) in w.iter().zip(back.iter()) {
            assert!((reconstructed - 0.75 * original).abs() < 1e-6);
        }
    }

    #[test]
    fn composed_matrix_is_three_quarters_identity() {
        for channel in 0..4 {
            let mut unit = [0.0_f32; 4];
            unit[channel] = 1.0;
            let round_tripped = a_to_b(b_to_a(unit));
            for (i, &v) in round_tripped.iter().enumerate() {
                let expected = if i == channel { 0.75 } else { 0.0 };
                assert!((v - expected).abs() < 1e-6, "channel={channel} i={i} v={v}");
            }
        }
    }

    #[test]
    fn pan_focuses_weight_toward_named_direction() {
        let gains = pan_gain_matrix([1.0, 0.0, 0.0], 2, 1.0);
        let total_plus_x: f32 = gains.iter().map(|row| row[0]).sum();
        let total_minus_x: f32 = gains.iter().map(|row| row[1]).sum();
        assert!(total_plus_x > total_minus_x);
    }

    #[test]
    fn stage_gain_scales_the_whole_matrix() {
        let unity = pan_gain_matrix([1.0, 0.0, 0.0], 2, 1.0);
        let scaled = pan_gain_matrix([1.0, 0.0, 0.0], 2, 2.0);
        for (row_unity, row_scaled) in unity.iter().zip(scaled.iter()) {
            for (u, s) in row_unity.iter().zip(row_scaled.iter()) {
                assert!((s - 2.0 * u).abs() < 1e-6);
            }
        }
    }
}
