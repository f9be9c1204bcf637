//! Trigger events from the transport.

use voltseq_core::clamp_unit;

use crate::track::TrackId;

/// A gate change for one sequencer track.
///
/// Produced once per transport tick, handed to
/// [`CvRouter::handle`](crate::CvRouter::handle) and dropped. Never persisted.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TriggerEvent {
    /// Track that fired.
    pub track_id: TrackId,
    /// `true` on note start, `false` on note end.
    pub gate_on: bool,
    /// Velocity in `[0, 1]`.
    pub velocity: f32,
    /// Absolute time in milliseconds on the sequencer clock.
    pub timestamp_ms: f64,
    /// MIDI note, for tracks that drive pitch outputs.
    pub note: Option<u8>,
}

impl TriggerEvent {
    /// Gate-on event. Velocity is clamped to `[0, 1]`.
    pub fn gate_on(track_id: TrackId, velocity: f32, timestamp_ms: f64) -> Self {
        Self {
            track_id,
            gate_on: true,
            velocity: clamp_unit(velocity),
            timestamp_ms,
            note: None,
        }
    }

    /// Gate-off event.
    pub fn gate_off(track_id: TrackId, timestamp_ms: f64) -> Self {
        Self {
            track_id,
            gate_on: false,
            velocity: 0.0,
            timestamp_ms,
            note: None,
        }
    }

    /// Attach a MIDI note (saturated to `0..=127`).
    pub fn with_note(mut self, note: u8) -> Self {
        self.note = Some(note.min(127));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn velocity_is_clamped() {
        let e = TriggerEvent::gate_on(TrackId(1), 1.7, 0.0);
        assert_eq!(e.velocity, 1.0);
        let e = TriggerEvent::gate_on(TrackId(1), -0.3, 0.0);
        assert_eq!(e.velocity, 0.0);
    }

    #[test]
    fn note_saturates() {
        let e = TriggerEvent::gate_on(TrackId(0), 0.5, 10.0).with_note(200);
        assert_eq!(e.note, Some(127));
        assert!(TriggerEvent::gate_off(TrackId(0), 20.0).note.is_none());
    }
}
