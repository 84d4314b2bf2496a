//! Sonido Ambisonics - first-order ambisonic FDN reverb engine
//!
//! A real-time reverb built on A-format/B-format ambisonic rotation and a
//! four-line feedback delay network (FDN), designed for block-based
//! processing with glitch-free parameter updates.
//!
//! # Pipeline
//!
//! - [`format`] - A-format ↔ B-format conversion (Hadamard matrix) and
//!   pan-gain projection onto device output channels
//! - [`scatter`] - the Gerzon 4×4 scattering matrix used by the vector
//!   all-pass and both stages' feedback mixing
//! - [`vecap`] - the shared four-line vector all-pass primitive
//! - [`t60`] - per-line three-band T60 decay filter
//! - [`early`] - early reflections stage
//! - [`late`] - late reverb (FDN tail) stage
//! - [`params`] - parameter snapshot and pure derivation into pending state
//! - [`state`] - [`state::ReverbEngine`], the root state machine and process loop
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible. Disable the default `std` feature:
//!
//! ```toml
//! [dependencies]
//! sonido-ambisonics = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use sonido_ambisonics::{ReverbEngine, ReverbParameters, SpatialEffectState};
//!
//! let mut reverb = ReverbEngine::create();
//! reverb.device_update(48_000.0)?;
//! reverb.update(&ReverbParameters::default(), 2);
//!
//! let b_format_in = [w.as_slice(), x.as_slice(), y.as_slice(), z.as_slice()];
//! let mut left = vec![0.0; w.len()];
//! let mut right = vec![0.0; w.len()];
//! let mut out: [&mut [f32]; 2] = [&mut left, &mut right];
//! reverb.process(b_format_in, &mut out);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

mod buffer;
mod constants;
mod dual;
mod early;
mod error;
mod format;
mod gainmix;
mod late;
mod params;
mod ring;
mod scatter;
mod t60;
mod vecap;

pub mod state;

pub use constants::{MAX_OUTPUT_CHANNELS, NUM_LINES};
pub use error::{Error, Result};
pub use format::{a_to_b, b_to_a, pan_gain_matrix};
pub use params::ReverbParameters;
pub use state::{EngineState, ReverbEngine, SpatialEffectState};
