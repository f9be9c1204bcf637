//! Voltseq Core - envelope, rhythm and pitch primitives for CV sequencing
//!
//! This crate holds the parts of the sequencer that are pure functions of
//! their inputs (or carry a few bytes of timing state), so they run the same
//! on a desktop host and on an embedded control-rate loop.
//!
//! # Core Abstractions
//!
//! ## Envelopes
//!
//! - [`Envelope`] - ADSR description with shaped segments, velocity scaling,
//!   retrigger behavior and loop points. [`Envelope::value`] is stateless.
//! - [`EnvelopeVoice`] - Per-instance timing state (phase start, stage, last level)
//! - [`Curve`] - Segment shapes (linear, exponential, logarithmic, S-curve)
//!
//! ## Rhythm
//!
//! - [`euclid::generate`] - Bjorklund's algorithm with rotation
//! - [`euclid::generate_with_velocity`] - Onsets with accent velocities
//! - Pattern transforms: [`euclid::reverse`], [`euclid::invert`],
//!   [`euclid::shift_left`], [`euclid::double`], [`euclid::halve`], ...
//!
//! ## Pitch
//!
//! - [`ScaleQuantizer`] - Nearest-scale-note snapping with octave wrap
//! - [`note_to_volts`] - 1 V/octave conversion
//!
//! ## Control Smoothing
//!
//! - [`SlewLimiter`] - Linear rate limiting in units per millisecond
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible. Disable the default `std` feature:
//!
//! ```toml
//! [dependencies]
//! voltseq-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust
//! use voltseq_core::{Curve, Envelope, euclid};
//!
//! let env = Envelope::adsr(10.0, 50.0, 0.6, 100.0).with_attack_curve(Curve::Exponential);
//! let pattern = euclid::generate(16, 5, 0);
//!
//! for (step, &on) in pattern.iter().enumerate() {
//!     if on {
//!         let level = env.value(5.0, true, 1.0);
//!         assert!(level > 0.0 && level < 1.0, "step {step}");
//!     }
//! }
//! ```
//!
//! # Design Principles
//!
//! - **Total functions**: Out-of-range inputs are clamped, never rejected
//! - **No dependencies on std**: Pure `no_std` with `libm` for math
//! - **Caller owns the clock**: Time is always passed in, never read

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod curve;
pub mod envelope;
pub mod euclid;
pub mod math;
pub mod quantizer;
pub mod slew;
pub mod voice;

// Re-export main types at crate root
pub use curve::Curve;
pub use envelope::{
    Envelope, EnvelopePoint, LoopPoint, MAX_PHASE_MS, MIN_PHASE_MS, RetriggerMode,
    SUSTAIN_HOLD_FRACTION,
};
pub use euclid::EuclideanPattern;
pub use math::{clamp_bipolar, clamp_range, clamp_unit};
pub use quantizer::{Scale, ScaleQuantizer, note_to_volts};
pub use slew::SlewLimiter;
pub use voice::{EnvelopeVoice, VoiceStage};
