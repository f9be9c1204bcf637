//! ADSR envelope record and its stateless evaluator.
//!
//! [`Envelope`] is a plain value type: it is copied, never aliased, and edited
//! by replacing the whole record (the `with_*` methods consume `self` and
//! return the updated copy). Evaluation is a pure function of elapsed time,
//! gate state and velocity:
//!
//! ```text
//! velocity_scale = (1 − velocity_sensitivity) + velocity_sensitivity · velocity
//! peak           = peak_level · velocity_scale
//!
//! gate on:   t < A          → peak · attack_curve(t / A)
//!            t < A + D      → peak · (1 − (1 − S) · decay_curve((t − A) / D))
//!            otherwise      → peak · S
//! gate off:  t < R          → peak · S · (1 − release_curve(t / R))
//!            otherwise      → 0
//! ```
//!
//! With the gate off, `t` is measured from the instant the gate went false.
//! A zero-length phase is skipped, which makes it an instantaneous jump to the
//! phase's end value.
//!
//! The evaluator holds no state. Retrigger and loop bookkeeping live in
//! [`EnvelopeVoice`](crate::EnvelopeVoice), owned by the sequencer clock.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::curve::Curve;
use crate::math::{clamp_unit, elapsed_ms, phase_ms};

/// Shortest phase time accepted by the `with_*` setters, in milliseconds.
pub const MIN_PHASE_MS: f32 = 1.0;
/// Longest phase time accepted by the `with_*` setters, in milliseconds.
pub const MAX_PHASE_MS: f32 = 10_000.0;
/// Length of the synthetic sustain hold in [`Envelope::generate_points`],
/// as a fraction of `attack + decay + release`.
pub const SUSTAIN_HOLD_FRACTION: f32 = 0.3;

/// How a new trigger is handled while the envelope is still sounding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RetriggerMode {
    /// Restart the envelope from `t = 0`.
    #[default]
    Reset,
    /// Continue from the current level without a discontinuity.
    Legato,
    /// Ignore triggers until the release has finished.
    None,
}

/// Sub-range that repeats while the gate is held and looping is enabled.
///
/// | Loop point | Repeating range | Cycle length |
/// |------------|-----------------|--------------|
/// | `Sustain` | attack → decay, wrapping to `t = 0` | `A + D` |
/// | `Decay` | decay only, wrapping to `t = A` | `D` |
/// | `Release` | attack → decay → release, wrapping to `t = 0` | `A + D + R` |
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum LoopPoint {
    /// Cycle attack and decay instead of holding sustain.
    #[default]
    Sustain,
    /// Cycle the release segment after attack and decay.
    Release,
    /// Cycle the decay segment after the first attack.
    Decay,
}

/// Attack-decay-sustain-release envelope description.
///
/// Times are in milliseconds; levels and sensitivities are normalized.
/// Fields are public so the record can be built literally and serialized
/// as-is; the evaluator tolerates out-of-range values (zero-length phases
/// included), while the `with_*` setters clamp to the documented ranges.
///
/// # Example
///
/// ```rust
/// use voltseq_core::{Curve, Envelope};
///
/// let env = Envelope::default()
///     .with_attack_ms(10.0)
///     .with_decay_ms(90.0)
///     .with_sustain(0.5)
///     .with_release_ms(200.0)
///     .with_attack_curve(Curve::SCurve);
///
/// assert_eq!(env.value(0.0, true, 1.0), 0.0);
/// assert!((env.value(10.0, true, 1.0) - 1.0).abs() < 1e-6);
/// assert!((env.value(100.0, true, 1.0) - 0.5).abs() < 1e-6);
/// assert_eq!(env.value(200.0, false, 1.0), 0.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Envelope {
    /// Attack time, 1–10000 ms.
    pub attack_ms: f32,
    /// Decay time, 1–10000 ms.
    pub decay_ms: f32,
    /// Sustain level, 0–1 of peak.
    pub sustain: f32,
    /// Release time, 1–10000 ms.
    pub release_ms: f32,
    /// Peak level, 0–1.
    pub peak_level: f32,
    /// How much velocity scales the peak, 0 (ignored) to 1 (fully scaled).
    pub velocity_sensitivity: f32,
    /// Attack segment shape.
    pub attack_curve: Curve,
    /// Decay segment shape.
    pub decay_curve: Curve,
    /// Release segment shape.
    pub release_curve: Curve,
    /// Behavior on a trigger while sounding.
    pub retrigger_mode: RetriggerMode,
    /// Whether the gate-held portion repeats.
    pub loop_enabled: bool,
    /// Which sub-range repeats when looping.
    pub loop_point: LoopPoint,
}

impl Default for Envelope {
    /// 10 ms attack, 100 ms decay, 0.7 sustain, 200 ms release, full peak,
    /// half velocity sensitivity, linear curves, reset retrigger, no loop.
    fn default() -> Self {
        Self {
            attack_ms: 10.0,
            decay_ms: 100.0,
            sustain: 0.7,
            release_ms: 200.0,
            peak_level: 1.0,
            velocity_sensitivity: 0.5,
            attack_curve: Curve::Linear,
            decay_curve: Curve::Linear,
            release_curve: Curve::Linear,
            retrigger_mode: RetriggerMode::Reset,
            loop_enabled: false,
            loop_point: LoopPoint::Sustain,
        }
    }
}

/// One sample of a rendered envelope.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnvelopePoint {
    /// Position on the synthetic timeline, in milliseconds.
    pub time_ms: f32,
    /// Envelope level at that position.
    pub level: f32,
}

fn clamp_phase(ms: f32) -> f32 {
    if ms.is_nan() {
        MIN_PHASE_MS
    } else {
        ms.clamp(MIN_PHASE_MS, MAX_PHASE_MS)
    }
}

impl Envelope {
    /// Create an envelope with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an ADSR envelope with the given times and sustain, other fields default.
    pub fn adsr(attack_ms: f32, decay_ms: f32, sustain: f32, release_ms: f32) -> Self {
        Self::default()
            .with_attack_ms(attack_ms)
            .with_decay_ms(decay_ms)
            .with_sustain(sustain)
            .with_release_ms(release_ms)
    }

    /// Replace the attack time (clamped to 1–10000 ms).
    pub fn with_attack_ms(self, ms: f32) -> Self {
        Self {
            attack_ms: clamp_phase(ms),
            ..self
        }
    }

    /// Replace the decay time (clamped to 1–10000 ms).
    pub fn with_decay_ms(self, ms: f32) -> Self {
        Self {
            decay_ms: clamp_phase(ms),
            ..self
        }
    }

    /// Replace the release time (clamped to 1–10000 ms).
    pub fn with_release_ms(self, ms: f32) -> Self {
        Self {
            release_ms: clamp_phase(ms),
            ..self
        }
    }

    /// Replace the sustain level (clamped to 0–1).
    pub fn with_sustain(self, level: f32) -> Self {
        Self {
            sustain: clamp_unit(level),
            ..self
        }
    }

    /// Replace the peak level (clamped to 0–1).
    pub fn with_peak_level(self, level: f32) -> Self {
        Self {
            peak_level: clamp_unit(level),
            ..self
        }
    }

    /// Replace the velocity sensitivity (clamped to 0–1).
    pub fn with_velocity_sensitivity(self, amount: f32) -> Self {
        Self {
            velocity_sensitivity: clamp_unit(amount),
            ..self
        }
    }

    /// Replace the attack curve.
    pub fn with_attack_curve(self, curve: Curve) -> Self {
        Self {
            attack_curve: curve,
            ..self
        }
    }

    /// Replace the decay curve.
    pub fn with_decay_curve(self, curve: Curve) -> Self {
        Self {
            decay_curve: curve,
            ..self
        }
    }

    /// Replace the release curve.
    pub fn with_release_curve(self, curve: Curve) -> Self {
        Self {
            release_curve: curve,
            ..self
        }
    }

    /// Replace the retrigger mode.
    pub fn with_retrigger_mode(self, mode: RetriggerMode) -> Self {
        Self {
            retrigger_mode: mode,
            ..self
        }
    }

    /// Enable looping at `point`.
    pub fn with_loop(self, point: LoopPoint) -> Self {
        Self {
            loop_enabled: true,
            loop_point: point,
            ..self
        }
    }

    /// Disable looping, keeping the configured loop point.
    pub fn without_loop(self) -> Self {
        Self {
            loop_enabled: false,
            ..self
        }
    }

    /// Copy with every numeric field forced into its documented range.
    ///
    /// Used after deserializing records from outside the process.
    pub fn clamped(self) -> Self {
        self.with_attack_ms(self.attack_ms)
            .with_decay_ms(self.decay_ms)
            .with_release_ms(self.release_ms)
            .with_sustain(self.sustain)
            .with_peak_level(self.peak_level)
            .with_velocity_sensitivity(self.velocity_sensitivity)
    }

    /// Peak scaling for a given velocity.
    ///
    /// `(1 − sensitivity) + sensitivity · velocity`, with both inputs clamped.
    #[inline]
    pub fn velocity_scale(&self, velocity: f32) -> f32 {
        let sensitivity = clamp_unit(self.velocity_sensitivity);
        (1.0 - sensitivity) + sensitivity * clamp_unit(velocity)
    }

    /// Velocity-scaled peak level.
    #[inline]
    pub fn peak(&self, velocity: f32) -> f32 {
        clamp_unit(self.peak_level) * self.velocity_scale(velocity)
    }

    /// Evaluate the envelope.
    ///
    /// `t_ms` is time since gate-on when `gate_on` is true, and time since
    /// gate-off otherwise. Negative or NaN times read as `0`. The result lies
    /// in `[0, peak_level]`.
    #[inline]
    pub fn value(&self, t_ms: f32, gate_on: bool, velocity: f32) -> f32 {
        let peak = self.peak(velocity);
        let sustain = clamp_unit(self.sustain);
        let t = elapsed_ms(t_ms);

        if gate_on {
            let attack = phase_ms(self.attack_ms);
            let decay = phase_ms(self.decay_ms);
            // `t < phase` implies `phase > 0`, so the divisions are safe.
            if t < attack {
                return peak * self.attack_curve.apply(t / attack);
            }
            if t < attack + decay {
                let decay_amount = (1.0 - sustain) * self.decay_curve.apply((t - attack) / decay);
                return peak * (1.0 - decay_amount);
            }
            peak * sustain
        } else {
            let release = phase_ms(self.release_ms);
            if t < release {
                peak * sustain * (1.0 - self.release_curve.apply(t / release))
            } else {
                0.0
            }
        }
    }

    /// Map time since gate-on to the position to evaluate, applying the loop.
    ///
    /// Returns `(t, gate_on)` to pass to [`value`](Self::value). Without
    /// looping this is `(elapsed, true)`. With [`LoopPoint::Release`] the
    /// release part of each cycle is reported with `gate_on = false`.
    /// A loop whose cycle has zero length does not wrap.
    pub fn loop_position(&self, elapsed: f32) -> (f32, bool) {
        let t = elapsed_ms(elapsed);
        if !self.loop_enabled || !t.is_finite() {
            return (t, true);
        }
        let attack = phase_ms(self.attack_ms);
        let decay = phase_ms(self.decay_ms);
        let held = attack + decay;

        match self.loop_point {
            LoopPoint::Sustain => {
                if held > 0.0 && t > held {
                    (t % held, true)
                } else {
                    (t, true)
                }
            }
            LoopPoint::Decay => {
                if decay > 0.0 && t > held {
                    (attack + (t - attack) % decay, true)
                } else {
                    (t, true)
                }
            }
            LoopPoint::Release => {
                let cycle = held + phase_ms(self.release_ms);
                if cycle <= 0.0 || t < held {
                    return (t, true);
                }
                let within = t % cycle;
                if within < held {
                    (within, true)
                } else {
                    (within - held, false)
                }
            }
        }
    }

    /// Length of the synthetic sustain hold used for rendering.
    pub fn sustain_hold_ms(&self) -> f32 {
        SUSTAIN_HOLD_FRACTION
            * (phase_ms(self.attack_ms) + phase_ms(self.decay_ms) + phase_ms(self.release_ms))
    }

    /// Total length of the synthetic rendering timeline:
    /// `A + D + 0.3·(A + D + R) + R`.
    pub fn display_duration_ms(&self) -> f32 {
        phase_ms(self.attack_ms)
            + phase_ms(self.decay_ms)
            + self.sustain_hold_ms()
            + phase_ms(self.release_ms)
    }

    /// Sample the envelope for display at full velocity.
    ///
    /// Produces `resolution + 1` evenly spaced points (at least 2) over
    /// [`display_duration_ms`](Self::display_duration_ms). The gate is held for
    /// `A + D + hold` and released for the remainder; every level comes from
    /// [`value`](Self::value), so the rendering matches the control output.
    /// Loops are not unrolled.
    pub fn generate_points(&self, resolution: usize) -> Vec<EnvelopePoint> {
        let steps = resolution.max(1);
        let gate_ms = phase_ms(self.attack_ms) + phase_ms(self.decay_ms) + self.sustain_hold_ms();
        let total = gate_ms + phase_ms(self.release_ms);

        (0..=steps)
            .map(|i| {
                let time_ms = total * i as f32 / steps as f32;
                let level = if time_ms < gate_ms {
                    self.value(time_ms, true, 1.0)
                } else {
                    self.value(time_ms - gate_ms, false, 1.0)
                };
                EnvelopePoint { time_ms, level }
            })
            .collect()
    }
}
