//! Fixed sizing and tuning constants for the ambisonic reverb engine.
//!
//! The four-element tables are reference lengths *in seconds*, measured at a
//! virtual 1 m room. They are scaled at runtime by `length_mult` (see
//! [`crate::params::length_mult`]) to cover the 5 m–50 m virtual room range.
//!
//! No canonical upstream source for the exact tap/line tables was available
//! (see `DESIGN.md`); the values below are original, chosen to keep early
//! reflections inside a realistic ~1–80 ms window and late lines inside a
//! realistic ~1–140 ms window once scaled by the full `[5, 50]` multiplier
//! range, in the same spirit as the Freeverb-derived tunings in
//! `sonido_effects::reverb`.

/// Number of parallel reverb lines (fixed for the A-format tetrahedral layout).
pub const NUM_LINES: usize = 4;

/// Maximum number of physical device output channels the engine will mix into.
pub const MAX_OUTPUT_CHANNELS: usize = 8;

/// Samples over which a parameter change is cross-faded.
pub const FADE_SAMPLES: usize = 128;

/// Maximum number of samples processed by one inner iteration of [`crate::state::ReverbEngine::process`].
pub const MAX_UPDATE_SAMPLES: usize = 256;

/// Minimum `length_mult`, corresponding to a ~5 m virtual room.
pub const MIN_LENGTH_MULT: f32 = 5.0;

/// `length_mult` at `density == 1.0`, corresponding to a ~50 m virtual room.
/// Used to size the buffer allocator (which must never under-allocate) and
/// to compute the fixed [`LateFeedTap`](crate::params) position.
pub const MAX_LENGTH_MULT: f32 = 50.0;

/// Maximum reflections delay accepted from the host, in seconds.
pub const MAX_REFLECTIONS_DELAY: f32 = 0.3;

/// Maximum late-reverb delay accepted from the host, in seconds.
pub const MAX_LATE_REVERB_DELAY: f32 = 0.1;

/// Speed of sound used by the HF air-absorption limit formula, in m/s.
pub const SPEED_OF_SOUND_MPS: f32 = 343.3;

/// Early reflection tap offsets, seconds at the 1 m reference.
pub const EARLY_TAP_LENGTHS: [f32; NUM_LINES] = [0.0000, 0.0005, 0.0010, 0.0017];

/// Early vector-allpass per-line delay lengths, seconds at the 1 m reference.
pub const EARLY_ALLPASS_LENGTHS: [f32; NUM_LINES] = [0.0012, 0.0014, 0.0016, 0.0019];

/// Early echo-line per-line delay lengths, seconds at the 1 m reference.
pub const EARLY_LINE_LENGTHS: [f32; NUM_LINES] = [0.0015, 0.0019, 0.0024, 0.0031];

/// Late vector-allpass per-line delay lengths, seconds at the 1 m reference.
pub const LATE_ALLPASS_LENGTHS: [f32; NUM_LINES] = [0.0012, 0.0015, 0.0018, 0.0021];

/// Late FDN line lengths, seconds at the 1 m reference.
pub const LATE_LINE_LENGTHS: [f32; NUM_LINES] = [0.0021, 0.0026, 0.0032, 0.0039];

/// Largest value in a reference table, used by the buffer allocator.
pub(crate) fn table_max(table: &[f32; NUM_LINES]) -> f32 {
    table.iter().copied().fold(0.0_f32, f32::max)
}
