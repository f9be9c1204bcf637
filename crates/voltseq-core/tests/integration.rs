//! Integration tests for voltseq-core primitives.
//!
//! Drives envelopes from Euclidean patterns at a fixed control rate, checks
//! that rendered curves match the evaluator, and verifies slew and pitch
//! conversion across modules.

use voltseq_core::{
    Curve, Envelope, EnvelopeVoice, LoopPoint, RetriggerMode, Scale, ScaleQuantizer,
    SlewLimiter, VoiceStage, euclid, note_to_volts,
};

const TICK_MS: f64 = 1.0;

/// Run one voice through a step pattern and return the level at every tick.
fn render_pattern(env: &Envelope, pattern: &[bool], step_ms: f64, gate_ms: f64) -> Vec<f32> {
    let mut voice = EnvelopeVoice::new();
    let total_ms = step_ms * pattern.len() as f64;
    let ticks = (total_ms / TICK_MS) as usize;
    let mut out = Vec::with_capacity(ticks);

    for tick in 0..ticks {
        let now = tick as f64 * TICK_MS;
        let step = (now / step_ms) as usize;
        let step_start = step as f64 * step_ms;
        if pattern[step] && now == step_start {
            voice.trigger(env, now, 1.0);
        }
        if pattern[step] && now == step_start + gate_ms {
            voice.release(env, now);
        }
        out.push(voice.value_at(env, now));
    }
    out
}

// ============================================================================
// 1. Pattern-driven envelopes
// ============================================================================

#[test]
fn tresillo_drives_three_envelope_peaks() {
    let env = Envelope::adsr(2.0, 10.0, 0.5, 20.0);
    let pattern = euclid::generate(8, 3, 0);
    let levels = render_pattern(&env, &pattern, 50.0, 25.0);

    // A peak is reached exactly at attack end after each onset.
    let peaks: Vec<usize> = levels
        .iter()
        .enumerate()
        .filter(|&(_, &v)| (v - 1.0).abs() < 1e-6)
        .map(|(i, _)| i)
        .collect();
    assert_eq!(peaks, [2, 152, 302]);

    // Silent before the next onset.
    assert_eq!(levels[100], 0.0);
    assert_eq!(levels[299], 0.0);
}

#[test]
fn four_on_the_floor_onsets_line_up_with_beats() {
    let pattern = euclid::generate(16, 4, 0);
    let env = Envelope::adsr(1.0, 1.0, 1.0, 1.0);
    let levels = render_pattern(&env, &pattern, 10.0, 5.0);
    for beat in 0..4 {
        assert!(levels[beat * 40 + 2] > 0.99, "beat {beat}");
        assert_eq!(levels[beat * 40 + 20], 0.0, "between beats {beat}");
    }
}

#[test]
fn accent_velocities_scale_peaks() {
    let env = Envelope::adsr(1.0, 1.0, 1.0, 1.0).with_velocity_sensitivity(1.0);
    let velocities = euclid::generate_with_velocity(8, 4, 0, 2, 1.0, 0.5);
    let peaks: Vec<f32> = velocities.iter().flatten().map(|&v| env.peak(v)).collect();
    assert_eq!(peaks, [1.0, 0.5, 1.0, 0.5]);
}

// ============================================================================
// 2. Rendering matches evaluation
// ============================================================================

#[test]
fn generated_points_match_evaluator() {
    for curve in Curve::ALL {
        let env = Envelope::adsr(30.0, 50.0, 0.6, 80.0)
            .with_attack_curve(curve)
            .with_decay_curve(curve)
            .with_release_curve(curve);
        let points = env.generate_points(200);
        let gate_ms = 30.0 + 50.0 + env.sustain_hold_ms();

        assert_eq!(points.len(), 201);
        assert!((points[200].time_ms - env.display_duration_ms()).abs() < 1e-3);
        for p in &points {
            let expected = if p.time_ms < gate_ms {
                env.value(p.time_ms, true, 1.0)
            } else {
                env.value(p.time_ms - gate_ms, false, 1.0)
            };
            assert_eq!(p.level, expected, "{curve:?} at {}", p.time_ms);
        }
    }
}

#[test]
fn rendered_hold_sits_at_sustain() {
    let env = Envelope::adsr(10.0, 10.0, 0.25, 10.0);
    // A + D + 0.3 * (A + D + R) + R = 10 + 10 + 9 + 10.
    assert!((env.display_duration_ms() - 39.0).abs() < 1e-4);
    let points = env.generate_points(39);
    assert!((points[25].level - 0.25).abs() < 1e-6);
}

// ============================================================================
// 3. Loops and retrigger at control rate
// ============================================================================

#[test]
fn sustain_loop_behaves_like_lfo() {
    let env = Envelope::adsr(10.0, 10.0, 0.0, 10.0).with_loop(LoopPoint::Sustain);
    let mut voice = EnvelopeVoice::new();
    voice.trigger(&env, 0.0, 1.0);
    let first: Vec<f32> = (0..20).map(|t| voice.value_at(&env, f64::from(t))).collect();
    let later: Vec<f32> = (200..220).map(|t| voice.value_at(&env, f64::from(t))).collect();
    for (a, b) in first.iter().zip(&later) {
        assert!((a - b).abs() < 1e-5);
    }
}

#[test]
fn release_loop_runs_full_cycle_with_gate_held() {
    let env = Envelope::adsr(10.0, 10.0, 0.5, 20.0).with_loop(LoopPoint::Release);
    let mut voice = EnvelopeVoice::new();
    voice.trigger(&env, 0.0, 1.0);
    // Cycle is 40 ms; 30 ms in is halfway through the release part.
    assert!((voice.value_at(&env, 30.0) - 0.25).abs() < 1e-6);
    assert!((voice.value_at(&env, 70.0) - 0.25).abs() < 1e-6);
    assert!(voice.is_gate_held());
}

#[test]
fn decay_loop_repeats_decay_only() {
    let env = Envelope::adsr(10.0, 20.0, 0.0, 10.0).with_loop(LoopPoint::Decay);
    let mut voice = EnvelopeVoice::new();
    voice.trigger(&env, 0.0, 1.0);
    let mid_first = voice.value_at(&env, 20.0);
    let mid_later = voice.value_at(&env, 60.0);
    assert!((mid_first - 0.5).abs() < 1e-6);
    assert!((mid_later - 0.5).abs() < 1e-6);
}

#[test]
fn none_mode_lets_release_finish() {
    let env = Envelope::adsr(5.0, 5.0, 1.0, 30.0).with_retrigger_mode(RetriggerMode::None);
    let mut voice = EnvelopeVoice::new();
    voice.trigger(&env, 0.0, 1.0);
    voice.release(&env, 10.0);
    assert!(!voice.trigger(&env, 20.0, 1.0));
    assert_eq!(voice.stage(), VoiceStage::Releasing);
    assert_eq!(voice.value_at(&env, 40.0), 0.0);
    assert!(voice.trigger(&env, 41.0, 1.0));
}

// ============================================================================
// 4. Slew and pitch
// ============================================================================

#[test]
fn slewed_envelope_lags_but_converges() {
    let env = Envelope::adsr(1.0, 1.0, 1.0, 1.0);
    let mut slew = SlewLimiter::new(0.1);
    slew.reset(0.0);
    let mut voice = EnvelopeVoice::new();
    voice.trigger(&env, 0.0, 1.0);

    let mut out = 0.0;
    for tick in 1..=20 {
        let target = voice.value_at(&env, f64::from(tick));
        out = slew.advance(target, 1.0);
        if tick < 10 {
            assert!(out < target);
        }
    }
    assert_eq!(out, 1.0);
}

#[test]
fn quantized_pitch_in_volts() {
    let q = ScaleQuantizer::new(Scale::PentatonicMinor);
    let volts: Vec<f32> = [60u8, 61, 62, 66, 71]
        .iter()
        .map(|&n| note_to_volts(q.quantize(n, 60)))
        .collect();
    let expected = [0.0, 0.0, 3.0 / 12.0, 5.0 / 12.0, 1.0];
    for (v, e) in volts.iter().zip(expected) {
        assert!((v - e).abs() < 1e-6, "{v} vs {e}");
    }
}
