//! Integration tests for voltseq-routing.
//!
//! Tests cover pattern-driven routing at a fixed control rate, multi-track
//! fan-out, legato retrigger through the router, voltage clamping, and
//! field-identical serialization of routing records.

use voltseq_core::{Curve, Envelope, LoopPoint, RetriggerMode, Scale, euclid};
use voltseq_routing::{
    AudioInterface, ChannelVoltage, CvOutputChannel, CvRouter, CvTrack, ModDestination,
    OutputType, PitchQuantize, RoutingSnapshot, TrackId, TriggerEvent,
};

const KICK: TrackId = TrackId(0);
const BASS: TrackId = TrackId(1);

fn interface() -> AudioInterface {
    AudioInterface::new("Test 8", 8, -10.0, 10.0)
}

fn channel(n: u16, output_type: OutputType, track: TrackId) -> CvOutputChannel {
    CvOutputChannel::new(n, output_type, &interface())
        .unwrap()
        .with_track(Some(track))
}

/// Play a Euclidean pattern on one track and collect every tick's outputs.
fn run_pattern(
    router: &mut CvRouter,
    track: TrackId,
    pattern: &[bool],
    step_ms: u32,
    gate_ms: u32,
) -> Vec<Vec<ChannelVoltage>> {
    let total = step_ms * pattern.len() as u32;
    let mut frames = Vec::with_capacity(total as usize);
    for now in 0..total {
        let step = (now / step_ms) as usize;
        let offset = now % step_ms;
        if pattern[step] && offset == 0 {
            router.handle(TriggerEvent::gate_on(track, 1.0, f64::from(now)));
        }
        if pattern[step] && offset == gate_ms {
            router.handle(TriggerEvent::gate_off(track, f64::from(now)));
        }
        frames.push(router.tick(f64::from(now)).to_vec());
    }
    frames
}

// ---------------------------------------------------------------------------
// 1. Pattern-driven routing
// ---------------------------------------------------------------------------

#[test]
fn tresillo_gate_channel_matches_pattern() {
    let mut router = CvRouter::new(interface());
    router.add_track(CvTrack::new(KICK, "Kick", 0)).unwrap();
    router.bind_channel(channel(0, OutputType::Gate, KICK)).unwrap();

    let pattern = euclid::generate(8, 3, 0);
    let frames = run_pattern(&mut router, KICK, &pattern, 20, 10);

    for (step, &on) in pattern.iter().enumerate() {
        let mid_gate = &frames[step * 20 + 5][0];
        let expected = if on { 5.0 } else { 0.0 };
        assert_eq!(mid_gate.volts, expected, "step {step}");
        assert_eq!(frames[step * 20 + 15][0].volts, 0.0, "step {step} after gate");
    }
}

#[test]
fn one_source_drives_several_outputs() {
    let iface = interface();
    let mut router = CvRouter::new(iface.clone());
    router
        .add_track(
            CvTrack::new(KICK, "Kick", 0).with_envelope(Envelope::adsr(2.0, 8.0, 0.0, 5.0)),
        )
        .unwrap();
    router
        .add_track(
            CvTrack::new(BASS, "Bass filter", 1)
                .with_source_track(Some(KICK))
                .with_destination(ModDestination::Vcf)
                .with_modulation_amount(0.5)
                .with_envelope(Envelope::adsr(2.0, 8.0, 0.0, 5.0)),
        )
        .unwrap();
    router.bind_channel(channel(0, OutputType::Envelope, KICK)).unwrap();
    router.bind_channel(channel(1, OutputType::Modulation, BASS)).unwrap();
    router.bind_channel(channel(2, OutputType::Trigger, KICK)).unwrap();

    assert_eq!(router.handle(TriggerEvent::gate_on(KICK, 1.0, 0.0)), 2);
    let out = router.tick(2.0);
    assert_eq!(out.len(), 3);
    assert!((out[0].volts - 5.0).abs() < 1e-5);
    assert!((out[1].volts - 2.5).abs() < 1e-5);
    assert_eq!(out[2].volts, 5.0);
}

#[test]
fn lfo_channel_keeps_cycling_while_held() {
    let iface = interface();
    let mut router = CvRouter::new(iface.clone());
    let lfo_env = Envelope::adsr(25.0, 25.0, 0.0, 10.0)
        .with_attack_curve(Curve::SCurve)
        .with_decay_curve(Curve::SCurve)
        .with_loop(LoopPoint::Sustain);
    router
        .add_track(CvTrack::new(KICK, "LFO", 0).with_envelope(lfo_env))
        .unwrap();
    router
        .bind_channel(
            channel(0, OutputType::Lfo, KICK)
                .with_voltage_scale(10.0)
                .with_voltage_offset(-5.0),
        )
        .unwrap();

    router.handle(TriggerEvent::gate_on(KICK, 1.0, 0.0));
    let first: Vec<f32> = (0..50).map(|t| router.tick(f64::from(t))[0].volts).collect();
    let later: Vec<f32> = (500..550).map(|t| router.tick(f64::from(t))[0].volts).collect();
    for (a, b) in first.iter().zip(&later) {
        assert!((a - b).abs() < 1e-4);
    }
    assert!((first[0] + 5.0).abs() < 1e-5);
    assert!((first[25] - 5.0).abs() < 1e-5);
}

#[test]
fn legato_track_glides_without_jumps() {
    let mut router = CvRouter::new(interface());
    let env = Envelope::adsr(20.0, 20.0, 0.5, 40.0).with_retrigger_mode(RetriggerMode::Legato);
    router
        .add_track(CvTrack::new(BASS, "Bass", 0).with_envelope(env))
        .unwrap();
    router.bind_channel(channel(0, OutputType::Envelope, BASS)).unwrap();
    router.bind_channel(channel(1, OutputType::Pitch, BASS)).unwrap();

    router.handle(TriggerEvent::gate_on(BASS, 1.0, 0.0).with_note(48));
    let mut prev = router.tick(0.0)[0].volts;
    for now in 1..200u32 {
        if now % 30 == 0 {
            router.handle(TriggerEvent::gate_on(BASS, 1.0, f64::from(now)).with_note(48 + (now / 30) as u8));
        }
        let out = router.tick(f64::from(now));
        assert!((out[0].volts - prev).abs() <= 0.3, "jump at {now}");
        prev = out[0].volts;
    }
    // Last legato note was 48 + 6.
    assert!((router.last_outputs()[1].volts - (54.0 - 60.0) / 12.0).abs() < 1e-6);
}

#[test]
fn quantized_pitch_output() {
    let mut router = CvRouter::new(interface());
    router.add_track(CvTrack::new(BASS, "Bass", 0)).unwrap();
    router
        .bind_channel(channel(0, OutputType::Pitch, BASS).with_quantize(Some(PitchQuantize {
            scale: Scale::PentatonicMajor,
            root: 60,
        })))
        .unwrap();

    router.handle(TriggerEvent::gate_on(BASS, 1.0, 0.0).with_note(71));
    assert_eq!(router.tick(0.0)[0].volts, 1.0);
    router.handle(TriggerEvent::gate_on(BASS, 1.0, 1.0).with_note(65));
    assert!((router.tick(1.0)[0].volts - 4.0 / 12.0).abs() < 1e-6);
}

// ---------------------------------------------------------------------------
// 2. Clamping
// ---------------------------------------------------------------------------

#[test]
fn extreme_scaling_stays_inside_interface_range() {
    let iface = AudioInterface::new("Eurorack", 4, -5.0, 8.0);
    let mut router = CvRouter::new(iface.clone());
    router.add_track(CvTrack::new(KICK, "Kick", 0)).unwrap();
    router
        .bind_channel(
            CvOutputChannel::new(0, OutputType::Gate, &iface)
                .unwrap()
                .with_voltage_scale(1000.0),
        )
        .unwrap();
    router
        .bind_channel(
            CvOutputChannel::new(1, OutputType::Gate, &iface)
                .unwrap()
                .with_track(Some(KICK))
                .with_voltage_scale(-1000.0),
        )
        .unwrap();

    router.handle(TriggerEvent::gate_on(KICK, 1.0, 0.0));
    let out = router.tick(1.0);
    assert_eq!(out[0].volts, 8.0);
    assert_eq!(out[1].volts, -5.0);
}

#[test]
fn offset_is_bounded_at_configuration() {
    let iface = AudioInterface::new("Eurorack", 4, -5.0, 8.0);
    let mut router = CvRouter::new(iface.clone());
    router
        .bind_channel(
            CvOutputChannel::new(0, OutputType::Envelope, &iface)
                .unwrap()
                .with_voltage_offset(12.0),
        )
        .unwrap();
    assert_eq!(router.channel(0).unwrap().voltage_offset, 8.0);
}

// ---------------------------------------------------------------------------
// 3. Serialization
// ---------------------------------------------------------------------------

#[test]
fn envelope_json_round_trip_is_field_identical() {
    let env = Envelope::adsr(12.5, 340.0, 0.35, 1200.0)
        .with_peak_level(0.8)
        .with_velocity_sensitivity(0.25)
        .with_attack_curve(Curve::Logarithmic)
        .with_decay_curve(Curve::Exponential)
        .with_release_curve(Curve::SCurve)
        .with_retrigger_mode(RetriggerMode::Legato)
        .with_loop(LoopPoint::Decay);
    let json = serde_json::to_string(&env).unwrap();
    let back: Envelope = serde_json::from_str(&json).unwrap();
    assert_eq!(back, env);
}

#[test]
fn routing_snapshot_json_round_trip() {
    let iface = interface();
    let tracks = vec![
        CvTrack::new(KICK, "Kick", 0),
        CvTrack::new(BASS, "Bass", 1)
            .with_source_track(Some(KICK))
            .with_destination(ModDestination::Pwm)
            .with_modulation_amount(-0.75)
            .with_enabled(false),
    ];
    let channels = vec![
        channel(0, OutputType::Clock, KICK).with_slew(0.25),
        channel(1, OutputType::Pitch, BASS).with_quantize(Some(PitchQuantize {
            scale: Scale::Dorian,
            root: 62,
        })),
    ];

    let json = serde_json::to_string(&(iface.clone(), &tracks, &channels)).unwrap();
    let (back_iface, back_tracks, back_channels): (
        AudioInterface,
        Vec<CvTrack>,
        Vec<CvOutputChannel>,
    ) = serde_json::from_str(&json).unwrap();
    assert_eq!(back_iface, iface);
    assert_eq!(back_tracks, tracks);
    assert_eq!(back_channels, channels);

    let router = CvRouter::from_snapshot(RoutingSnapshot {
        interface: back_iface,
        tracks: back_tracks,
        channels: back_channels,
    })
    .unwrap();
    assert_eq!(router.track_count(), 2);
    assert_eq!(router.channel_count(), 2);
}

#[test]
fn track_fields_default_when_missing() {
    let json = r#"{
        "id": 4,
        "name": "Minimal",
        "output_channel": 2,
        "envelope": { "attack_ms": 5.0 }
    }"#;
    let track: CvTrack = serde_json::from_str(json).unwrap();
    assert!(track.is_enabled);
    assert_eq!(track.modulation_amount, 1.0);
    assert_eq!(track.source_track_id, None);
    assert_eq!(track.envelope.attack_ms, 5.0);
    assert_eq!(track.envelope.decay_ms, Envelope::default().decay_ms);
}
