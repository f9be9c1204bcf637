//! Offline playback of a preset.
//!
//! [`schedule`] expands the preset's lanes into gate events on the sequencer
//! clock; [`render`] feeds those events to a router built from the preset and
//! ticks it at the preset's control rate.
//!
//! ```rust
//! use voltseq_config::{get_factory_preset, playback};
//!
//! let preset = get_factory_preset("tresillo-pluck").unwrap();
//! let frames = playback::render(&preset, 500.0).unwrap();
//! assert_eq!(frames.len(), 500);
//! ```

use serde::Serialize;
use voltseq_routing::{ChannelVoltage, TriggerEvent};

use crate::error::ConfigError;
use crate::preset::SequencerPreset;

/// Router outputs for one tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    /// Tick time in milliseconds.
    pub time_ms: f64,
    /// Voltages of every bound channel, in channel order.
    pub voltages: Vec<ChannelVoltage>,
}

/// Gate events for every lane up to `duration_ms`, in time order.
///
/// Lanes loop independently. At equal timestamps gate-offs sort before
/// gate-ons so a full-length gate is closed before the next step opens it.
pub fn schedule(preset: &SequencerPreset, duration_ms: f64) -> Vec<TriggerEvent> {
    let duration_ms = if duration_ms.is_nan() { 0.0 } else { duration_ms.max(0.0) };
    let step_ms = preset.step_ms();
    let mut events = Vec::new();

    for lane in &preset.lanes {
        let velocities = lane.velocities();
        if velocities.is_empty() {
            continue;
        }
        let gate_ms = step_ms * f64::from(lane.gate_fraction.clamp(0.0, 1.0));
        let mut onset = 0usize;
        let mut step = 0usize;
        loop {
            let start = step as f64 * step_ms;
            if start >= duration_ms {
                break;
            }
            if let Some(velocity) = velocities[step % velocities.len()] {
                let mut on = TriggerEvent::gate_on(lane.track_id, velocity, start);
                if let Some(note) = lane.note_for_onset(onset) {
                    on = on.with_note(note);
                }
                events.push(on);
                events.push(TriggerEvent::gate_off(lane.track_id, start + gate_ms));
                onset += 1;
            }
            step += 1;
        }
    }

    events.sort_by(|a, b| {
        a.timestamp_ms
            .total_cmp(&b.timestamp_ms)
            .then(a.gate_on.cmp(&b.gate_on))
    });
    events
}

/// Run the preset for `duration_ms` and collect every tick's outputs.
///
/// Events are delivered on the first tick at or after their timestamp.
pub fn render(preset: &SequencerPreset, duration_ms: f64) -> Result<Vec<Frame>, ConfigError> {
    let mut router = preset.build_router()?;
    let events = schedule(preset, duration_ms);
    let tick_ms = preset.tick_ms();
    let duration_ms = if duration_ms.is_nan() { 0.0 } else { duration_ms.max(0.0) };
    let ticks = (duration_ms / tick_ms).ceil() as usize;

    tracing::debug!(
        name = %preset.name,
        ticks,
        events = events.len(),
        "rendering preset"
    );

    let mut frames = Vec::with_capacity(ticks);
    let mut pending = events.iter().peekable();
    for n in 0..ticks {
        let now = n as f64 * tick_ms;
        while let Some(event) = pending.next_if(|e| e.timestamp_ms <= now) {
            router.handle(*event);
        }
        frames.push(Frame {
            time_ms: now,
            voltages: router.tick(now).to_vec(),
        });
    }
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preset::StepLane;
    use voltseq_routing::{CvOutputChannel, CvTrack, OutputType, TrackId};

    fn gate_preset(lane: StepLane) -> SequencerPreset {
        let preset = SequencerPreset::new("gate").with_bpm(150.0);
        let channel = CvOutputChannel::new(0, OutputType::Gate, &preset.interface)
            .unwrap()
            .with_track(Some(TrackId(0)));
        preset
            .with_track(CvTrack::new(TrackId(0), "Gate", 0))
            .with_channel(channel)
            .with_lane(lane)
    }

    #[test]
    fn schedule_emits_paired_gates() {
        // 150 bpm sixteenths = 100 ms steps.
        let preset = gate_preset(StepLane::from_steps(TrackId(0), [true, false, true, false]));
        let events = schedule(&preset, 400.0);
        let times: Vec<(f64, bool)> = events.iter().map(|e| (e.timestamp_ms, e.gate_on)).collect();
        assert_eq!(times, [(0.0, true), (50.0, false), (200.0, true), (250.0, false)]);
    }

    #[test]
    fn lanes_loop_until_duration() {
        let preset = gate_preset(StepLane::euclidean(TrackId(0), 2, 1, 0));
        let ons = schedule(&preset, 1000.0).iter().filter(|e| e.gate_on).count();
        assert_eq!(ons, 5);
    }

    #[test]
    fn full_length_gates_close_before_reopening() {
        let preset = gate_preset(StepLane::from_steps(TrackId(0), [true, true]).with_gate_fraction(1.0));
        let events = schedule(&preset, 200.0);
        assert!(!events[1].gate_on);
        assert!(events[2].gate_on);
        assert_eq!(events[1].timestamp_ms, events[2].timestamp_ms);
    }

    #[test]
    fn notes_cycle_across_onsets() {
        let preset = gate_preset(
            StepLane::from_steps(TrackId(0), [true, true, false]).with_notes([60, 64, 67]),
        );
        let notes: Vec<Option<u8>> = schedule(&preset, 600.0)
            .iter()
            .filter(|e| e.gate_on)
            .map(|e| e.note)
            .collect();
        assert_eq!(notes, [Some(60), Some(64), Some(67), Some(60)]);
    }

    #[test]
    fn render_follows_the_gate_pattern() {
        let preset = gate_preset(StepLane::from_steps(TrackId(0), [true, false]));
        let frames = render(&preset, 400.0).unwrap();
        assert_eq!(frames.len(), 400);
        assert_eq!(frames[10].voltages[0].volts, 5.0);
        assert_eq!(frames[60].voltages[0].volts, 0.0);
        assert_eq!(frames[150].voltages[0].volts, 0.0);
        assert_eq!(frames[210].voltages[0].volts, 5.0);
    }

    #[test]
    fn negative_duration_renders_nothing() {
        let preset = gate_preset(StepLane::from_steps(TrackId(0), [true]));
        assert!(schedule(&preset, -5.0).is_empty());
        assert!(render(&preset, f64::NAN).unwrap().is_empty());
    }
}
