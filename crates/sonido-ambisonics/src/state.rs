//! Root reverb state and the top-level process loop (§3, §4.6, §4.7).

use sonido_core::Biquad;

use crate::buffer::{self, Regions};
use crate::constants::{FADE_SAMPLES, MAX_OUTPUT_CHANNELS, MAX_UPDATE_SAMPLES, NUM_LINES};
use crate::dual::Dual;
use crate::early::EarlyReflections;
use crate::error::Result;
use crate::format::{b_to_a, pan_gain_matrix};
use crate::late::LateReverb;
use crate::params::{self, DerivedParams, FadeRelevant, ReverbParameters};
use crate::ring::RingBuffer;
use crate::scatter::ScatterMix;
use crate::t60::{high_shelf_coefficients, low_shelf_coefficients};
use crate::vecap::Block;

/// Lifecycle states for one reverb slot (§4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// `create()`d but never `device_update()`d; `process` must not be called.
    Uninitialised,
    /// Buffer allocated, no fade in progress.
    ReadyClean,
    /// A fade-relevant parameter changed; cross-fading for the next
    /// `FADE_SAMPLES` samples of audio.
    ReadyFading,
}

/// The small capability trait every `sonido` effect-state family member
/// implements (§9's "macro-expanded vtables → capability abstraction",
/// scoped here to the reverb variant per the design note). `create` is
/// deliberately not part of the trait: constructing a fresh, untuned state
/// does not need dynamic dispatch and is exposed as an inherent associated
/// function instead, mirroring `sonido_core::Effect`'s split between a
/// free-standing constructor and the trait's instance methods.
pub trait SpatialEffectState {
    /// (Re)allocates the shared delay buffer for `frequency` Hz and resets
    /// all state to [`EngineState::ReadyClean`].
    fn device_update(&mut self, frequency: f32) -> Result<()>;

    /// Ingests a parameter snapshot and computes pending coefficients.
    fn update(&mut self, params: &ReverbParameters, num_out_channels: usize);

    /// Runs the pipeline over `b_format_in` (four channels, equal length),
    /// mixing into `out` (up to [`MAX_OUTPUT_CHANNELS`] channels, same length).
    fn process(&mut self, b_format_in: [&[f32]; NUM_LINES], out: &mut [&mut [f32]]);
}

/// Root reverb state (§3's `ReverbState`).
pub struct ReverbEngine {
    ring: RingBuffer,
    regions: Regions,
    state: EngineState,
    sample_rate: f32,

    master_hf: [Biquad; NUM_LINES],
    master_lf: [Biquad; NUM_LINES],

    early_tap: [Dual<usize>; NUM_LINES],
    early_coeff: [Dual<f32>; NUM_LINES],
    late_delay_tap: [Dual<usize>; NUM_LINES],
    late_feed_tap: usize,
    /// Shared scattering-matrix coefficients (§3's `MixX, MixY`), used by
    /// both VecAps and both stages' scatter-write steps.
    mix: Dual<ScatterMix>,

    early: EarlyReflections,
    late: LateReverb,

    fade_count: usize,
    max_update: Dual<usize>,
    offset: usize,

    last_fade_relevant: Option<FadeRelevant>,
    num_out_channels: usize,

    a_temps: Block,
    early_temps: Block,
    early_out: Block,
    late_temps: Block,
    late_out: Block,
}

impl ReverbEngine {
    /// §6 `create()`: a fresh, untuned state. `process`/`update` must not be
    /// called before a successful [`ReverbEngine::device_update`].
    pub fn create() -> Self {
        // A minimal placeholder allocation; replaced on the first
        // `device_update`. Sized for 48 kHz so `Default`-like construction
        // never fails before the caller picks a real sample rate.
        let (ring, regions) = buffer::allocate(48_000.0).expect("initial allocation must succeed");
        Self {
            ring,
            regions,
            state: EngineState::Uninitialised,
            sample_rate: 48_000.0,
            master_hf: core::array::from_fn(|_| Biquad::new()),
            master_lf: core::array::from_fn(|_| Biquad::new()),
            early_tap: [Dual::new(1); NUM_LINES],
            early_coeff: [Dual::new(0.0); NUM_LINES],
            late_delay_tap: [Dual::new(1); NUM_LINES],
            late_feed_tap: buffer::late_feed_tap(48_000.0),
            mix: Dual::new(ScatterMix::from_diffusion(1.0)),
            early: EarlyReflections::new(regions.early_vecap, regions.early_echo),
            late: LateReverb::new(regions.late_feedback, regions.late_vecap),
            fade_count: 0,
            max_update: Dual::new(MAX_UPDATE_SAMPLES),
            offset: 0,
            last_fade_relevant: None,
            num_out_channels: 2,
            a_temps: [[0.0; MAX_UPDATE_SAMPLES]; NUM_LINES],
            early_temps: [[0.0; MAX_UPDATE_SAMPLES]; NUM_LINES],
            early_out: [[0.0; MAX_UPDATE_SAMPLES]; NUM_LINES],
            late_temps: [[0.0; MAX_UPDATE_SAMPLES]; NUM_LINES],
            late_out: [[0.0; MAX_UPDATE_SAMPLES]; NUM_LINES],
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }
}

impl SpatialEffectState for ReverbEngine {
    fn device_update(&mut self, frequency: f32) -> Result<()> {
        let (ring, regions) = buffer::allocate(frequency)?;
        #[cfg(feature = "tracing")]
        tracing::debug!(frequency, total_samples = ?regions.main.len(), "reverb buffer (re)allocated");

        self.ring = ring;
        self.regions = regions;
        self.sample_rate = frequency;
        self.late_feed_tap = buffer::late_feed_tap(frequency);

        for f in self.master_hf.iter_mut().chain(self.master_lf.iter_mut()) {
            f.clear();
        }
        self.early = EarlyReflections::new(regions.early_vecap, regions.early_echo);
        self.late = LateReverb::new(regions.late_feedback, regions.late_vecap);
        self.early_tap = [Dual::new(1); NUM_LINES];
        self.early_coeff = [Dual::new(0.0); NUM_LINES];
        self.late_delay_tap = [Dual::new(1); NUM_LINES];
        self.mix = Dual::new(ScatterMix::from_diffusion(1.0));
        self.fade_count = 0;
        self.max_update = Dual::new(MAX_UPDATE_SAMPLES);
        self.offset = 0;
        self.last_fade_relevant = None;
        self.a_temps = [[0.0; MAX_UPDATE_SAMPLES]; NUM_LINES];
        self.early_temps = [[0.0; MAX_UPDATE_SAMPLES]; NUM_LINES];
        self.early_out = [[0.0; MAX_UPDATE_SAMPLES]; NUM_LINES];
        self.late_temps = [[0.0; MAX_UPDATE_SAMPLES]; NUM_LINES];
        self.late_out = [[0.0; MAX_UPDATE_SAMPLES]; NUM_LINES];

        self.state = EngineState::ReadyClean;
        Ok(())
    }

    fn update(&mut self, params: &ReverbParameters, num_out_channels: usize) {
        self.num_out_channels = num_out_channels.clamp(1, MAX_OUTPUT_CHANNELS);
        let derived: DerivedParams = params::derive(params, self.sample_rate);

        for i in 0..NUM_LINES {
            self.early_tap[i].set_pending(derived.early_tap[i]);
            self.early_coeff[i].set_pending(derived.early_coeff[i]);
            self.late_delay_tap[i].set_pending(derived.late_delay_tap[i]);
        }
        self.late_feed_tap = derived.late_feed_tap;
        self.mix.set_pending(derived.mix);

        self.early.vecap_mut().set_pending(derived.vecap_coeff, derived.early_offset);
        self.early.set_echo_pending(derived.early_offset, derived.early_echo_coeff);

        self.late.vecap_mut().set_pending(derived.vecap_coeff, derived.late_offset);
        self.late.set_offset_pending(derived.late_offset);
        self.late.set_density_gain_pending(derived.density_gain);

        for line in 0..NUM_LINES {
            self.late.t60_mut(line).set_pending(
                derived.mid_gain[line],
                derived.low_shelf_ratio[line],
                params.lf_reference,
                derived.high_shelf_ratio[line],
                params.hf_reference,
                self.sample_rate,
            );
        }

        for f in &mut self.master_hf {
            let [b0, b1, b2, a0, a1, a2] =
                high_shelf_coefficients(params.hf_reference, params.gain_hf.max(0.001), self.sample_rate);
            f.set_coefficients(b0, b1, b2, a0, a1, a2);
        }
        for f in &mut self.master_lf {
            let [b0, b1, b2, a0, a1, a2] =
                low_shelf_coefficients(params.lf_reference, params.gain_lf.max(0.001), self.sample_rate);
            f.set_coefficients(b0, b1, b2, a0, a1, a2);
        }

        let early_pan = pan_gain_matrix(params.reflections_pan, self.num_out_channels, params.reflections_gain);
        let late_pan = pan_gain_matrix(params.late_reverb_pan, self.num_out_channels, params.late_reverb_gain);
        self.early.set_pan_target(early_pan);
        self.late.set_pan_target(late_pan);
        if self.state == EngineState::ReadyClean && self.fade_count == 0 && self.last_fade_relevant.is_none() {
            self.early.gain_mut().snap();
            self.late.gain_mut().snap();
        }

        self.max_update.set_pending(derived.max_update);

        let changed = self.last_fade_relevant != Some(derived.fade_relevant);
        self.last_fade_relevant = Some(derived.fade_relevant);
        if changed {
            #[cfg(feature = "tracing")]
            tracing::trace!("reverb parameter change triggered a fade");
            self.fade_count = 0;
            self.state = EngineState::ReadyFading;
        }
    }

    fn process(&mut self, b_format_in: [&[f32]; NUM_LINES], out: &mut [&mut [f32]]) {
        let samples_to_do = b_format_in[0].len();
        let num_out = self.num_out_channels.min(out.len());

        let mut done = 0usize;
        while done < samples_to_do {
            let remaining = samples_to_do - done;
            let mut todo = remaining.min(self.max_update.current).min(self.max_update.pending);
            let fading = self.fade_count < FADE_SAMPLES;
            if fading {
                todo = todo.min(FADE_SAMPLES - self.fade_count);
            }
            let is_last_chunk = todo >= remaining;
            if !is_last_chunk && todo >= 4 {
                todo -= todo % 4;
            }
            todo = todo.max(1).min(MAX_UPDATE_SAMPLES);

            self.process_block(&b_format_in, out, done, todo, num_out, fading);

            self.offset = self.offset.wrapping_add(todo);
            done += todo;

            if fading {
                self.fade_count += todo;
                if self.fade_count >= FADE_SAMPLES {
                    self.commit_fade();
                }
            }
        }
    }
}

impl ReverbEngine {
    #[allow(clippy::too_many_arguments)]
    fn process_block(
        &mut self,
        b_format_in: &[&[f32]; NUM_LINES],
        out: &mut [&mut [f32]],
        done: usize,
        todo: usize,
        num_out: usize,
        fading: bool,
    ) {
        // Step 2: B-to-A rotation, master HF/LF shelves, write into main delay.
        for i in 0..todo {
            let b = [
                b_format_in[0][done + i],
                b_format_in[1][done + i],
                b_format_in[2][done + i],
                b_format_in[3][done + i],
            ];
            let a = b_to_a(b);
            for (line, value) in a.into_iter().enumerate() {
                self.a_temps[line][i] = value;
            }
        }
        for line in 0..NUM_LINES {
            for sample in self.a_temps[line][..todo].iter_mut() {
                *sample = self.master_lf[line].process(self.master_hf[line].process(*sample));
            }
            self.regions.main.write_block(&mut self.ring, self.offset, line, &self.a_temps[line][..todo]);
        }

        if fading {
            let f = (self.fade_count as f32 / FADE_SAMPLES as f32).min(1.0);
            let mix = ScatterMix::lerp(&self.mix.current, &self.mix.pending, f);
            self.early.process_faded(
                &mut self.ring,
                &self.regions.main,
                self.offset,
                todo,
                &self.early_tap,
                &self.early_coeff,
                self.late_feed_tap,
                mix,
                &mut self.early_temps,
                &mut self.early_out,
                self.fade_count,
            );
            self.early.mix_into(&self.early_out, todo, num_out, out);

            self.late.process_faded(
                &mut self.ring,
                &self.regions.main,
                self.offset,
                todo,
                &self.late_delay_tap,
                mix,
                &mut self.late_temps,
                &mut self.late_out,
                self.fade_count,
            );
            self.late.mix_into(&self.late_out, todo, num_out, out);
        } else {
            let mix = self.mix.current;
            let early_tap_current: [usize; NUM_LINES] = core::array::from_fn(|i| self.early_tap[i].current);
            let early_coeff_current: [f32; NUM_LINES] = core::array::from_fn(|i| self.early_coeff[i].current);
            self.early.process_unfaded(
                &mut self.ring,
                &self.regions.main,
                self.offset,
                todo,
                &early_tap_current,
                &early_coeff_current,
                self.late_feed_tap,
                mix,
                &mut self.early_temps,
                &mut self.early_out,
            );
            self.early.mix_into(&self.early_out, todo, num_out, out);

            let late_tap_current: [usize; NUM_LINES] = core::array::from_fn(|i| self.late_delay_tap[i].current);
            self.late.process_unfaded(
                &mut self.ring,
                &self.regions.main,
                self.offset,
                todo,
                &late_tap_current,
                mix,
                &mut self.late_temps,
                &mut self.late_out,
            );
            self.late.mix_into(&self.late_out, todo, num_out, out);
        }
    }

    fn commit_fade(&mut self) {
        for i in 0..NUM_LINES {
            self.early_tap[i].commit();
            self.early_coeff[i].commit();
            self.late_delay_tap[i].commit();
        }
        self.mix.commit();
        self.early.commit();
        self.late.commit();
        self.max_update.commit();
        self.fade_count = FADE_SAMPLES;
        self.state = EngineState::ReadyClean;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(engine: &mut ReverbEngine, w: &[f32]) -> (Vec<f32>, Vec<f32>) {
        let len = w.len();
        let zeros = vec![0.0_f32; len];
        let inputs: [&[f32]; NUM_LINES] = [w, &zeros, &zeros, &zeros];
        let mut left = vec![0.0_f32; len];
        let mut right = vec![0.0_f32; len];
        {
            let mut out: [&mut [f32]; 2] = [&mut left, &mut right];
            engine.process(inputs, &mut out);
        }
        (left, right)
    }

    #[test]
    fn create_starts_uninitialised() {
        let engine = ReverbEngine::create();
        assert_eq!(engine.state(), EngineState::Uninitialised);
    }

    #[test]
    fn device_update_transitions_to_ready_clean() {
        let mut engine = ReverbEngine::create();
        engine.device_update(48000.0).unwrap();
        assert_eq!(engine.state(), EngineState::ReadyClean);
    }

    #[test]
    fn parameter_change_enters_fading_then_settles() {
        let mut engine = ReverbEngine::create();
        engine.device_update(48000.0).unwrap();
        engine.update(&ReverbParameters::default(), 2);
        assert_eq!(engine.state(), EngineState::ReadyFading);

        let w = vec![0.0_f32; FADE_SAMPLES * 2];
        run(&mut engine, &w);
        assert_eq!(engine.state(), EngineState::ReadyClean);
    }

    #[test]
    fn process_on_silence_produces_finite_silence() {
        let mut engine = ReverbEngine::create();
        engine.device_update(48000.0).unwrap();
        engine.update(&ReverbParameters::default(), 2);

        let w = vec![0.0_f32; 4096];
        let (left, right) = run(&mut engine, &w);
        for v in left.iter().chain(right.iter()) {
            assert!(v.is_finite());
        }
    }

    #[test]
    fn unchanged_parameters_do_not_retrigger_a_fade() {
        let mut engine = ReverbEngine::create();
        engine.device_update(48000.0).unwrap();
        let params = ReverbParameters::default();
        engine.update(&params, 2);

        let w = vec![0.0_f32; FADE_SAMPLES * 2];
        run(&mut engine, &w);
        assert_eq!(engine.state(), EngineState::ReadyClean);

        engine.update(&params, 2);
        assert_eq!(engine.state(), EngineState::ReadyClean);
    }
}
