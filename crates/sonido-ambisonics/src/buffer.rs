//! The buffer allocator (§4.1/§9 "indexed arenas").
//!
//! Sizes every logical delay line in the topology (the shared main delay,
//! the early/late vector-allpasses and the early echo / late feedback
//! lines) from the maximum-density multiplier, rounds each to a power of
//! two, and performs a single allocation. Per §9's open question, sizing
//! always assumes `MAX_LENGTH_MULT` even though the live `length_mult` may
//! be smaller: the buffer is over-allocated, never under-allocated, and is
//! never resized again until the sample rate changes.

use crate::constants::{
    table_max, EARLY_ALLPASS_LENGTHS, EARLY_LINE_LENGTHS, LATE_ALLPASS_LENGTHS, LATE_LINE_LENGTHS,
    MAX_LATE_REVERB_DELAY, MAX_LENGTH_MULT, MAX_REFLECTIONS_DELAY, MAX_UPDATE_SAMPLES,
};
use crate::error::Result;
use crate::ring::{next_pow2, DelayLine, RingBuffer, Sizer};

/// The five logical delay-line regions carved out of one [`RingBuffer`].
#[derive(Debug, Clone, Copy)]
pub struct Regions {
    /// The shared main delay (early taps, late taps, and the early stage's
    /// scatter-write-back all read/write this region).
    pub main: DelayLine,
    pub early_vecap: DelayLine,
    pub early_echo: DelayLine,
    pub late_feedback: DelayLine,
    pub late_vecap: DelayLine,
}

/// Position (in samples) of the fixed `LateFeedTap`, past which the late
/// stage is guaranteed to read data the early stage already wrote on a
/// prior iteration (§5's ordering guarantee). Depends only on `frequency`
/// since it is always computed at `MAX_LENGTH_MULT`, per §4.5.
pub(crate) fn late_feed_tap(frequency: f32) -> usize {
    let reach = MAX_REFLECTIONS_DELAY + table_max(&crate::constants::EARLY_TAP_LENGTHS) * MAX_LENGTH_MULT;
    (frequency * reach).round().max(0.0) as usize
}

/// Worst-case extent (in samples, past `Offset`) of the four `LateDelayTap`
/// reads into the main delay, at maximum density.
fn late_delay_tap_reach(frequency: f32) -> usize {
    let spread = (table_max(&LATE_LINE_LENGTHS) - LATE_LINE_LENGTHS[0]) * 0.25 * MAX_LENGTH_MULT;
    let extra = (frequency * (MAX_LATE_REVERB_DELAY + spread)).round().max(0.0) as usize;
    late_feed_tap(frequency) + extra
}

fn table_len_samples(table: &[f32; crate::constants::NUM_LINES], frequency: f32) -> usize {
    (frequency * table_max(table) * MAX_LENGTH_MULT).ceil().max(0.0) as usize
}

/// Allocates the shared [`RingBuffer`] and sizes every region for the given
/// `frequency`, assuming the worst case (maximum density / maximum
/// diffusion-independent tap spread).
pub fn allocate(frequency: f32) -> Result<(RingBuffer, Regions)> {
    let mut sizer = Sizer::new();

    let main_len = next_pow2(late_delay_tap_reach(frequency) + MAX_UPDATE_SAMPLES);
    let early_vecap_len = next_pow2(table_len_samples(&EARLY_ALLPASS_LENGTHS, frequency) + MAX_UPDATE_SAMPLES);
    let early_echo_len = next_pow2(table_len_samples(&EARLY_LINE_LENGTHS, frequency) + MAX_UPDATE_SAMPLES);
    let late_feedback_len = next_pow2(table_len_samples(&LATE_LINE_LENGTHS, frequency) + MAX_UPDATE_SAMPLES);
    let late_vecap_len = next_pow2(table_len_samples(&LATE_ALLPASS_LENGTHS, frequency) + MAX_UPDATE_SAMPLES);

    let main = sizer.region(main_len);
    let early_vecap = sizer.region(early_vecap_len);
    let early_echo = sizer.region(early_echo_len);
    let late_feedback = sizer.region(late_feedback_len);
    let late_vecap = sizer.region(late_vecap_len);

    let ring = RingBuffer::try_new(sizer.total_slots())?;
    Ok((
        ring,
        Regions { main, early_vecap, early_echo, late_feedback, late_vecap },
    ))
}
