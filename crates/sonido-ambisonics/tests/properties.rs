//! Property-based tests for the ambisonic FDN reverb engine.
//!
//! Grounded on `sonido-core`/`sonido-effects`'s `tests/properties.rs`: uses
//! proptest to cover the testable invariants directly rather than a fixed
//! set of example inputs.

use proptest::prelude::*;
use sonido_ambisonics::{ReverbEngine, ReverbParameters, SpatialEffectState};

const SAMPLE_RATE: f32 = 48000.0;

fn silence(len: usize) -> [Vec<f32>; 4] {
    [vec![0.0; len], vec![0.0; len], vec![0.0; len], vec![0.0; len]]
}

fn impulse_on_w(len: usize) -> [Vec<f32>; 4] {
    let mut w = vec![0.0; len];
    w[0] = 1.0;
    [w, vec![0.0; len], vec![0.0; len], vec![0.0; len]]
}

fn run_block(engine: &mut ReverbEngine, b_format: &[Vec<f32>; 4], num_out: usize) -> Vec<Vec<f32>> {
    let len = b_format[0].len();
    let mut outs: Vec<Vec<f32>> = (0..num_out).map(|_| vec![0.0; len]).collect();
    {
        let inputs = [
            b_format[0].as_slice(),
            b_format[1].as_slice(),
            b_format[2].as_slice(),
            b_format[3].as_slice(),
        ];
        let mut refs: Vec<&mut [f32]> = outs.iter_mut().map(|v| v.as_mut_slice()).collect();
        engine.process(inputs, &mut refs);
    }
    outs
}

fn params_from(density: f32, diffusion: f32, decay_time: f32) -> ReverbParameters {
    ReverbParameters { density, diffusion, decay_time, ..ReverbParameters::default() }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Invariant 1 (silence preservation): after a parameter update and
    /// enough silent samples to flush the fade window and the late delay,
    /// continued silence in must produce near-zero output.
    #[test]
    fn silence_preservation(
        density in 0.0f32..=1.0,
        diffusion in 0.0f32..=1.0,
        decay_time in 0.1f32..=5.0,
    ) {
        let mut engine = ReverbEngine::create();
        engine.device_update(SAMPLE_RATE).unwrap();
        engine.update(&params_from(density, diffusion, decay_time), 2);

        let flush = silence(16384);
        run_block(&mut engine, &flush, 2);

        let probe = silence(2048);
        let out = run_block(&mut engine, &probe, 2);
        for v in out[0].iter().chain(out[1].iter()) {
            prop_assert!(v.abs() < 1e-5, "expected near-silence, got {v}");
        }
    }

    /// Invariant 2 (energy contraction / no NaN): for bounded input, across
    /// the full supported sample-rate range, output must always be finite.
    #[test]
    fn bounded_input_never_produces_nan_or_inf(
        density in 0.0f32..=1.0,
        diffusion in 0.0f32..=1.0,
        decay_time in 0.1f32..=20.0,
        sample_rate in prop::sample::select(vec![22050.0f32, 44100.0, 48000.0, 88200.0, 96000.0, 192000.0]),
        samples in prop::collection::vec(-1.0f32..=1.0f32, 16..=256),
    ) {
        let mut engine = ReverbEngine::create();
        engine.device_update(sample_rate).unwrap();
        engine.update(&params_from(density, diffusion, decay_time), 2);

        let len = samples.len();
        let b_format = [samples, vec![0.0; len], vec![0.0; len], vec![0.0; len]];
        let out = run_block(&mut engine, &b_format, 2);
        for v in out[0].iter().chain(out[1].iter()) {
            prop_assert!(v.is_finite(), "non-finite output: {v}");
        }
    }

    /// Invariant 4 (deterministic commit): running with unchanging parameters
    /// well past the fade window, then replaying the same input from a fresh
    /// engine for the same total sample count, must produce identical output
    /// (the fade machinery is deterministic and converges to the same state).
    #[test]
    fn repeated_runs_with_identical_parameters_are_deterministic(
        diffusion in 0.0f32..=1.0,
        decay_time in 0.2f32..=3.0,
    ) {
        let params = params_from(1.0, diffusion, decay_time);
        let total = 1024usize;
        let input = impulse_on_w(total);

        let mut engine_a = ReverbEngine::create();
        engine_a.device_update(SAMPLE_RATE).unwrap();
        engine_a.update(&params, 2);
        let out_a = run_block(&mut engine_a, &input, 2);

        let mut engine_b = ReverbEngine::create();
        engine_b.device_update(SAMPLE_RATE).unwrap();
        engine_b.update(&params, 2);
        let out_b = run_block(&mut engine_b, &input, 2);

        for (a, b) in out_a[0].iter().zip(out_b[0].iter()) {
            prop_assert_eq!(a.to_bits(), b.to_bits());
        }
        for (a, b) in out_a[1].iter().zip(out_b[1].iter()) {
            prop_assert_eq!(a.to_bits(), b.to_bits());
        }
    }

    /// Invariant 4, stricter form: splitting an otherwise-identical input
    /// into two `process` calls (forcing a commit to land mid-stream from
    /// the caller's point of view) must produce the same samples as one call
    /// over the whole input — chunk boundaries must be invisible.
    #[test]
    fn chunked_processing_matches_single_call(
        diffusion in 0.0f32..=1.0,
        decay_time in 0.2f32..=3.0,
        split in 1usize..=2047,
    ) {
        let params = params_from(1.0, diffusion, decay_time);
        let total = 2048usize;
        let input = impulse_on_w(total);

        let mut whole = ReverbEngine::create();
        whole.device_update(SAMPLE_RATE).unwrap();
        whole.update(&params, 2);
        let out_whole = run_block(&mut whole, &input, 2);

        let mut chunked = ReverbEngine::create();
        chunked.device_update(SAMPLE_RATE).unwrap();
        chunked.update(&params, 2);

        let first: [Vec<f32>; 4] = [
            input[0][..split].to_vec(),
            input[1][..split].to_vec(),
            input[2][..split].to_vec(),
            input[3][..split].to_vec(),
        ];
        let second: [Vec<f32>; 4] = [
            input[0][split..].to_vec(),
            input[1][split..].to_vec(),
            input[2][split..].to_vec(),
            input[3][split..].to_vec(),
        ];
        let out_first = run_block(&mut chunked, &first, 2);
        let out_second = run_block(&mut chunked, &second, 2);

        for ch in 0..2 {
            for (i, &expected) in out_whole[ch].iter().enumerate() {
                let got = if i < split { out_first[ch][i] } else { out_second[ch][i - split] };
                prop_assert_eq!(expected.to_bits(), got.to_bits());
            }
        }
    }

    /// Invariant 5 (max-update ceiling): for every density in [0, 1] and
    /// every supported sample rate, the derived early/late offsets stay
    /// `>= 1`, so `MaxUpdate` can never collapse to zero.
    #[test]
    fn max_update_never_collapses(
        density in 0.0f32..=1.0,
        sample_rate in prop::sample::select(vec![22050.0f32, 44100.0, 48000.0, 96000.0, 192000.0]),
    ) {
        let mut engine = ReverbEngine::create();
        engine.device_update(sample_rate).unwrap();
        engine.update(&params_from(density, 1.0, 1.0), 2);

        // If MaxUpdate had collapsed to zero, process would spin forever on
        // a nonzero sample count; bound the call by only requesting a small,
        // finite number of samples and trusting the loop terminates.
        let probe = silence(64);
        let out = run_block(&mut engine, &probe, 2);
        prop_assert_eq!(out[0].len(), 64);
    }
}
