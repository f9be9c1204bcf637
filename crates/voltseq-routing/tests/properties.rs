//! Property-based tests for voltseq-routing.
//!
//! Checks that every voltage leaving the router stays inside the interface
//! range for arbitrary scaling, offsets and event streams.

use proptest::prelude::*;
use voltseq_core::Envelope;
use voltseq_routing::{
    AudioInterface, CvOutputChannel, CvRouter, CvTrack, OutputType, TrackId, TriggerEvent,
};

fn output_type_strategy() -> impl Strategy<Value = OutputType> {
    (0usize..8).prop_map(|i| OutputType::ALL[i])
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// final_voltage never leaves [min, max] for any raw, scale or offset.
    #[test]
    fn final_voltage_clamped(
        raw in -1000.0f32..1000.0f32,
        scale in -100.0f32..100.0f32,
        offset in -50.0f32..50.0f32,
        min in -12.0f32..0.0f32,
        max in 0.0f32..12.0f32,
    ) {
        let iface = AudioInterface::new("p", 2, min, max);
        let ch = CvOutputChannel::new(0, OutputType::Modulation, &iface)
            .unwrap()
            .with_voltage_scale(scale)
            .with_voltage_offset(offset);
        let v = ch.final_voltage(raw, &iface);
        prop_assert!(v >= min && v <= max, "{v} outside [{min}, {max}]");
    }

    /// Channels are accepted exactly when they exist on the interface.
    #[test]
    fn channel_validation(channel in 0u16..64, count in 0u16..32) {
        let iface = AudioInterface::new("p", count, -10.0, 10.0);
        let result = CvOutputChannel::new(channel, OutputType::Gate, &iface);
        prop_assert_eq!(result.is_ok(), channel < count);
    }

    /// Random event streams never push the router outside the interface range.
    #[test]
    fn router_outputs_stay_in_range(
        events in prop::collection::vec((any::<bool>(), 0.0f32..=1.0f32, 0u32..3), 1..60),
        output_type in output_type_strategy(),
        scale in -20.0f32..20.0f32,
        slew in 0.0f32..2.0f32,
        amount in -1.0f32..=1.0f32,
    ) {
        let iface = AudioInterface::new("p", 4, -5.0, 5.0);
        let mut router = CvRouter::new(iface.clone());
        for id in 0..3u32 {
            let track = CvTrack::new(TrackId(id), "t", id as u16)
                .with_envelope(Envelope::adsr(5.0, 5.0, 0.5, 5.0))
                .with_modulation_amount(amount);
            router.add_track(track).unwrap();
            router
                .bind_channel(
                    CvOutputChannel::new(id as u16, output_type, &iface)
                        .unwrap()
                        .with_voltage_scale(scale)
                        .with_slew(slew),
                )
                .unwrap();
        }

        let mut now = 0.0;
        for (gate_on, velocity, track) in events {
            let event = if gate_on {
                TriggerEvent::gate_on(TrackId(track), velocity, now).with_note(60 + track as u8)
            } else {
                TriggerEvent::gate_off(TrackId(track), now)
            };
            router.handle(event);
            for out in router.tick(now) {
                prop_assert!(out.volts >= -5.0 && out.volts <= 5.0);
            }
            now += 3.0;
        }
    }
}
