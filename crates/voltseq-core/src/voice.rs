//! Per-voice envelope timing state.
//!
//! [`Envelope::value`] is stateless, so whoever owns the sequencer clock must
//! remember when the current phase started and what the envelope was last
//! producing. [`EnvelopeVoice`] is that bookkeeping: it turns absolute
//! timestamps into phase-relative time and applies the envelope's retrigger
//! mode and loop.
//!
//! Timestamps are absolute milliseconds as `f64` so long sessions keep sub-
//! millisecond precision; phase-relative time is handed to the evaluator as
//! `f32`.
//!
//! # Example
//!
//! ```rust
//! use voltseq_core::{Envelope, EnvelopeVoice, RetriggerMode};
//!
//! let env = Envelope::adsr(10.0, 10.0, 0.5, 50.0)
//!     .with_retrigger_mode(RetriggerMode::Legato);
//! let mut voice = EnvelopeVoice::new();
//!
//! voice.trigger(&env, 0.0, 1.0);
//! let before = voice.value_at(&env, 5.0);
//!
//! // Retrigger mid-attack: no jump in level.
//! voice.trigger(&env, 5.0, 1.0);
//! let after = voice.value_at(&env, 5.0);
//! assert!((before - after).abs() < 1e-4);
//! ```

use crate::envelope::{Envelope, RetriggerMode};
use crate::math::{clamp_unit, phase_ms};

/// Where a voice is in its gate cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VoiceStage {
    /// Not sounding.
    #[default]
    Idle,
    /// Gate held: attack, decay, sustain (or the loop).
    Held,
    /// Gate released; the release segment is running.
    Releasing,
}

/// Timing state for one envelope instance.
///
/// Small and `Copy`; the envelope itself is passed in on every call so the
/// voice never holds a reference to configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EnvelopeVoice {
    stage: VoiceStage,
    phase_start_ms: f64,
    velocity: f32,
    last_value: f32,
}

impl EnvelopeVoice {
    /// Create an idle voice.
    pub const fn new() -> Self {
        Self {
            stage: VoiceStage::Idle,
            phase_start_ms: 0.0,
            velocity: 0.0,
            last_value: 0.0,
        }
    }

    /// Current stage.
    pub fn stage(&self) -> VoiceStage {
        self.stage
    }

    /// Timestamp the current phase is measured from.
    pub fn phase_start_ms(&self) -> f64 {
        self.phase_start_ms
    }

    /// Velocity the current note was triggered with.
    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    /// Level produced by the most recent evaluation.
    pub fn last_value(&self) -> f32 {
        self.last_value
    }

    /// Whether the gate is currently held.
    pub fn is_gate_held(&self) -> bool {
        self.stage == VoiceStage::Held
    }

    /// Whether the voice is still producing output at `now_ms`.
    pub fn is_active(&self, env: &Envelope, now_ms: f64) -> bool {
        match self.stage {
            VoiceStage::Idle => false,
            VoiceStage::Held => true,
            VoiceStage::Releasing => self.elapsed(now_ms) < phase_ms(env.release_ms),
        }
    }

    /// Gate on.
    ///
    /// On an idle (or finished) voice this always starts a new note. On a
    /// sounding voice the envelope's [`RetriggerMode`] decides:
    ///
    /// - `Reset` restarts from `t = 0` with the new velocity.
    /// - `Legato` keeps the note's velocity and moves the phase start so the
    ///   attack curve resumes from the level produced right now. With a zero
    ///   attack the level jumps, since the attack itself is instantaneous.
    /// - `None` ignores the trigger.
    ///
    /// Returns `false` when the trigger was ignored.
    pub fn trigger(&mut self, env: &Envelope, now_ms: f64, velocity: f32) -> bool {
        if !self.is_active(env, now_ms) {
            self.start(now_ms, clamp_unit(velocity));
            return true;
        }

        match env.retrigger_mode {
            RetriggerMode::Reset => {
                self.start(now_ms, clamp_unit(velocity));
                true
            }
            RetriggerMode::None => false,
            RetriggerMode::Legato => {
                let current = self.evaluate(env, now_ms);
                let peak = env.peak(self.velocity);
                let ratio = if peak > 0.0 { current / peak } else { 0.0 };
                let seed_ms = phase_ms(env.attack_ms) * env.attack_curve.inverse(ratio);

                self.stage = VoiceStage::Held;
                self.phase_start_ms = now_ms - f64::from(seed_ms);
                self.last_value = current;
                true
            }
        }
    }

    /// Gate off. Has no effect unless the gate is held.
    ///
    /// The release is measured from `now_ms`.
    pub fn release(&mut self, env: &Envelope, now_ms: f64) {
        if self.stage == VoiceStage::Held {
            self.last_value = self.evaluate(env, now_ms);
            self.stage = VoiceStage::Releasing;
            self.phase_start_ms = now_ms;
        }
    }

    /// Evaluate the envelope at `now_ms` and remember the result.
    ///
    /// Moves to [`VoiceStage::Idle`] once the release has run out.
    #[inline]
    pub fn value_at(&mut self, env: &Envelope, now_ms: f64) -> f32 {
        let value = self.evaluate(env, now_ms);
        self.last_value = value;
        if self.stage == VoiceStage::Releasing && !self.is_active(env, now_ms) {
            self.stage = VoiceStage::Idle;
        }
        value
    }

    /// Return to idle immediately.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    fn start(&mut self, now_ms: f64, velocity: f32) {
        self.stage = VoiceStage::Held;
        self.phase_start_ms = now_ms;
        self.velocity = velocity;
    }

    fn elapsed(&self, now_ms: f64) -> f32 {
        (now_ms - self.phase_start_ms).max(0.0) as f32
    }

    fn evaluate(&self, env: &Envelope, now_ms: f64) -> f32 {
        let elapsed = self.elapsed(now_ms);
        match self.stage {
            VoiceStage::Idle => 0.0,
            VoiceStage::Held => {
                let (t, gate_on) = env.loop_position(elapsed);
                env.value(t, gate_on, self.velocity)
            }
            VoiceStage::Releasing => env.value(elapsed, false, self.velocity),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::Curve;
    use crate::envelope::LoopPoint;

    fn env(mode: RetriggerMode) -> Envelope {
        Envelope::adsr(20.0, 20.0, 0.5, 40.0)
            .with_velocity_sensitivity(1.0)
            .with_retrigger_mode(mode)
    }

    #[test]
    fn idle_voice_is_silent() {
        let mut voice = EnvelopeVoice::new();
        let e = env(RetriggerMode::Reset);
        assert_eq!(voice.value_at(&e, 100.0), 0.0);
        assert!(!voice.is_active(&e, 100.0));
    }

    #[test]
    fn full_cycle_returns_to_idle() {
        let e = env(RetriggerMode::Reset);
        let mut voice = EnvelopeVoice::new();
        assert!(voice.trigger(&e, 1000.0, 1.0));
        assert!((voice.value_at(&e, 1020.0) - 1.0).abs() < 1e-6);
        assert!((voice.value_at(&e, 1100.0) - 0.5).abs() < 1e-6);

        voice.release(&e, 1100.0);
        assert_eq!(voice.stage(), VoiceStage::Releasing);
        assert!((voice.value_at(&e, 1120.0) - 0.25).abs() < 1e-6);
        assert_eq!(voice.value_at(&e, 1140.0), 0.0);
        assert_eq!(voice.stage(), VoiceStage::Idle);
    }

    #[test]
    fn reset_restarts_from_zero() {
        let e = env(RetriggerMode::Reset);
        let mut voice = EnvelopeVoice::new();
        voice.trigger(&e, 0.0, 1.0);
        voice.value_at(&e, 30.0);
        assert!(voice.trigger(&e, 30.0, 0.5));
        assert_eq!(voice.value_at(&e, 30.0), 0.0);
        assert_eq!(voice.velocity(), 0.5);
    }

    #[test]
    fn none_ignores_triggers_until_release_ends() {
        let e = env(RetriggerMode::None);
        let mut voice = EnvelopeVoice::new();
        voice.trigger(&e, 0.0, 1.0);
        assert!(!voice.trigger(&e, 10.0, 1.0));
        assert_eq!(voice.phase_start_ms(), 0.0);

        voice.release(&e, 50.0);
        assert!(!voice.trigger(&e, 60.0, 1.0));
        // Release is 40 ms long; at 90 ms it has finished.
        assert!(voice.trigger(&e, 90.0, 1.0));
        assert_eq!(voice.phase_start_ms(), 90.0);
    }

    #[test]
    fn legato_is_continuous_from_every_stage() {
        for curve in Curve::ALL {
            let e = env(RetriggerMode::Legato).with_attack_curve(curve);
            for &at in &[5.0, 19.0, 30.0, 80.0] {
                let mut voice = EnvelopeVoice::new();
                voice.trigger(&e, 0.0, 0.8);
                let before = voice.value_at(&e, at);
                voice.trigger(&e, at, 0.2);
                let after = voice.value_at(&e, at);
                assert!(
                    (before - after).abs() < 1e-3,
                    "{curve:?} at {at}: {before} -> {after}"
                );
                assert_eq!(voice.velocity(), 0.8, "legato keeps note velocity");
            }
        }
    }

    #[test]
    fn legato_from_release_is_continuous() {
        let e = env(RetriggerMode::Legato);
        let mut voice = EnvelopeVoice::new();
        voice.trigger(&e, 0.0, 1.0);
        voice.release(&e, 100.0);
        let before = voice.value_at(&e, 110.0);
        voice.trigger(&e, 110.0, 1.0);
        assert!(voice.is_gate_held());
        assert!((voice.value_at(&e, 110.0) - before).abs() < 1e-4);
    }

    #[test]
    fn sustain_loop_repeats_while_held() {
        let e = env(RetriggerMode::Reset).with_loop(LoopPoint::Sustain);
        let mut voice = EnvelopeVoice::new();
        voice.trigger(&e, 0.0, 1.0);
        let first = voice.value_at(&e, 10.0);
        let second = voice.value_at(&e, 50.0);
        assert!((first - second).abs() < 1e-5);
        assert!((voice.value_at(&e, 60.0) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn release_ignored_when_idle() {
        let e = env(RetriggerMode::Reset);
        let mut voice = EnvelopeVoice::new();
        voice.release(&e, 10.0);
        assert_eq!(voice.stage(), VoiceStage::Idle);
    }
}
